//! Real-time Delivery Module
//!
//! This module delivers chat events to live socket connections. It owns the
//! connection registry (the hub), the per-connection read and write loops,
//! presence, and the rules that decide who receives what.
//!
//! # Architecture
//!
//! - **`event_bus`** - kind-keyed publish/subscribe between services and the hub
//! - **`queue`** - connection handles and their bounded outbound queues
//! - **`hub`** - user ID to live connection map with non-blocking delivery
//! - **`policy`** - pure mapping from events and frames to delivery targets
//! - **`fanout`** - resolves targets (including group lookups) against the hub
//! - **`subscription`** - the hub's event bus handlers
//! - **`presence`** - ties registry changes to the online service
//! - **`connection`** - read and write loops for one transport
//! - **`handler`** - the authenticated `GET /ws` upgrade
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Realtime context and module exports
//! ├── event_bus.rs    - Event bus
//! ├── queue.rs        - Connection handles and outbound queues
//! ├── hub.rs          - Connection registry
//! ├── policy.rs       - Delivery policy
//! ├── fanout.rs       - Target resolution and delivery
//! ├── subscription.rs - Hub subscription to the event bus
//! ├── presence.rs     - Presence tracker
//! ├── connection.rs   - Read/write loops
//! └── handler.rs      - Socket upgrade handler
//! ```
//!
//! # Data Flow
//!
//! ```text
//! service --publish--> EventBus --handler--> Fanout --policy--> Hub --try_send--> queue --> write loop --> socket
//! socket --> read loop --chat--> MessageService::persist --> Fanout --> Hub
//! ```
//!
//! Delivery is at most once and best effort. Nothing is queued for users
//! who are not connected, and a connection that cannot keep up is closed
//! rather than buffered.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chathub::backend::realtime::{EventBus, Realtime};
//! use chathub::backend::store::MemoryStore;
//! use chathub::shared::HubConfig;
//!
//! # fn example() -> Result<(), chathub::shared::ConfigError> {
//! let realtime = Realtime::new(HubConfig::default(), Arc::new(MemoryStore::new()), EventBus::new())?;
//! assert!(realtime.presence().list_online().is_empty());
//! # Ok(())
//! # }
//! ```

mod connection;
pub mod event_bus;
pub mod fanout;
pub mod handler;
pub mod hub;
pub mod policy;
pub mod presence;
pub mod queue;
pub mod subscription;

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Sink, Stream};
use tokio::task::JoinHandle;

use crate::backend::chat::online::OnlineService;
use crate::backend::chat::service::MessageService;
use crate::backend::store::ChatStore;
use crate::shared::config::{ConfigError, HubConfig};
use connection::Connection;

pub use event_bus::EventBus;
pub use fanout::Fanout;
pub use handler::ws_upgrade;
pub use hub::Hub;
pub use policy::{PolicyError, Target};
pub use presence::Presence;
pub use queue::{outbound_queue, ConnectionHandle, ConnectionId, OutboundQueue, QueueError};

/// Everything a live connection needs, shared by all of them.
#[derive(Clone)]
pub struct Realtime {
    config: Arc<HubConfig>,
    bus: EventBus,
    hub: Arc<Hub>,
    fanout: Fanout,
    presence: Presence,
    messages: MessageService,
}

impl Realtime {
    /// Build the hub and subscribe it to `bus`.
    ///
    /// # Errors
    ///
    /// `ConfigError::Invalid` when `config` fails [`HubConfig::validate`].
    /// Nothing is subscribed in that case.
    pub fn new(config: HubConfig, store: Arc<dyn ChatStore>, bus: EventBus) -> Result<Self, ConfigError> {
        config.validate()?;

        let hub = Arc::new(Hub::new());
        let fanout = Fanout::new(hub.clone(), store.clone());
        let presence = Presence::new(hub.clone(), OnlineService::new(store.clone(), bus.clone()));
        let messages = MessageService::new(store, bus.clone());

        subscription::subscribe_hub(&bus, fanout.clone());

        Ok(Self {
            config: Arc::new(config),
            bus,
            hub,
            fanout,
            presence,
            messages,
        })
    }

    /// Register a new connection for `user_id` over the given transport
    /// halves and start its loops.
    ///
    /// The connection is registered, and the user marked online, before
    /// this returns, so frames sent to the user afterwards are queued for
    /// it. The returned task finishes once the connection is torn down.
    pub async fn connect<S, W, E>(&self, user_id: impl Into<String>, stream: S, sink: W) -> JoinHandle<()>
    where
        S: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: fmt::Display + Send + 'static,
        W: Sink<Message> + Unpin + Send + 'static,
        W::Error: fmt::Display,
    {
        let (handle, queue) = outbound_queue(user_id, self.config.send_queue_capacity);
        tracing::debug!(user_id = %handle.user_id(), connection = %handle.id(), "[Realtime] Connection accepted");

        self.presence.connected(handle.clone()).await;
        let connection = Connection::new(handle, self.clone());
        tokio::spawn(connection.run(stream, sink, queue))
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn messages(&self) -> &MessageService {
        &self.messages
    }
}
