//! Shared Module
//!
//! Records, events and wire frames used across the backend, plus the
//! hub configuration. Nothing in here touches a socket, a lock or the
//! runtime, so every type can be built and checked in plain unit tests.

/// Chat messages, drafts and notifications
pub mod message;

/// Domain events published on the event bus
pub mod event;

/// Inbound and outbound socket frames
pub mod frame;

/// Shared error types
pub mod error;

/// Hub configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{ConfigError, HubConfig, HubConfigBuilder};
pub use error::SharedError;
pub use event::{Event, EventKind, GroupReadContent, MessageReadContent, UserStatusContent};
pub use frame::{InboundFrame, OutboundFrame};
pub use message::{ChatMessage, MessageDraft, MessageKind, Notification, NotificationDraft, NotificationKind};
