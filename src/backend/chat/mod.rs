//! Chat Backend Module
//!
//! This module contains the chat services that sit between the HTTP API,
//! live connections and the store:
//!
//! - **`service`** - `MessageService`: persist, send, mark as read
//! - **`online`** - `OnlineService`: stored online flag and presence events
//! - **`notifications`** - `NotificationService`: store and publish notifications
//! - **`handlers`** - HTTP handlers for the chat API
//! - **`error`** - `ServiceError`
//!
//! Services publish domain events on the event bus; they never touch
//! connections directly.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chathub::backend::chat::MessageService;
//! use chathub::backend::realtime::EventBus;
//! use chathub::backend::store::MemoryStore;
//! use chathub::shared::MessageDraft;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let messages = MessageService::new(Arc::new(MemoryStore::new()), EventBus::new());
//! let message = messages.send("alice", MessageDraft::direct("bob", "hi")).await?;
//! # Ok(())
//! # }
//! ```

/// Service errors
pub mod error;

/// Message service
pub mod service;

/// Online status service
pub mod online;

/// Notification service
pub mod notifications;

/// HTTP handlers
pub mod handlers;

/// Re-export commonly used types
pub use error::ServiceError;
pub use notifications::NotificationService;
pub use online::OnlineService;
pub use service::MessageService;
