/**
 * Event Bus
 *
 * Process-wide publish/subscribe register keyed by [`EventKind`]. Services
 * publish domain events here without knowing who listens; the hub
 * subscribes and turns them into frames.
 *
 * # Delivery
 *
 * `publish` snapshots the handler list for the event's kind and spawns one
 * task per handler, then returns. It never waits for a handler, never
 * fails, and makes no ordering promise between handlers or between
 * events. A panicking handler is caught at its task boundary and logged;
 * the publisher and the other handlers are unaffected.
 */
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use futures_util::FutureExt;
use tokio::runtime::Handle;

use crate::shared::event::{Event, EventKind};

type BoxedHandler =
    Arc<dyn Fn(Event) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<HashMap<EventKind, Vec<BoxedHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every event of `kind`.
    ///
    /// Handlers are invoked with their own clone of the event.
    pub fn subscribe<F, Fut>(&self, kind: EventKind, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: BoxedHandler =
            Arc::new(move |event| -> Pin<Box<dyn Future<Output = ()> + Send>> {
                Box::pin(handler(event))
            });
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(handler);
        tracing::debug!(kind = kind.as_str(), "[EventBus] Handler subscribed");
    }

    /// Fan `event` out to its subscribers.
    ///
    /// # Returns
    ///
    /// Number of handler tasks spawned. Zero when nobody listens to this
    /// kind or when called outside a Tokio runtime (the event is dropped
    /// and an error is logged).
    pub fn publish(&self, event: Event) -> usize {
        let kind = event.kind();
        let handlers: Vec<BoxedHandler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::debug!(kind = kind.as_str(), "[EventBus] No subscribers");
            return 0;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!(kind = kind.as_str(), error = %e, "[EventBus] Publish outside runtime, event dropped");
                return 0;
            }
        };

        for handler in &handlers {
            let handler = Arc::clone(handler);
            let event = event.clone();
            runtime.spawn(async move {
                let invocation = AssertUnwindSafe(async move { handler(event).await });
                if let Err(panic) = invocation.catch_unwind().await {
                    tracing::error!(
                        kind = kind.as_str(),
                        panic = panic_message(panic.as_ref()),
                        "[EventBus] Handler panicked"
                    );
                }
            });
        }

        tracing::debug!(kind = kind.as_str(), handlers = handlers.len(), "[EventBus] Event published");
        handlers.len()
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
