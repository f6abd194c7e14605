//! Chat Handlers Module
//!
//! This module contains the Axum handlers for the chat HTTP API.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs           - Module exports and documentation
//! ├── messages.rs      - Send message, mark as read
//! ├── presence.rs      - Online users
//! └── notifications.rs - Create notification
//! ```
//!
//! Every handler requires a session token (see `AuthUser`).

/// Message handlers
pub mod messages;

/// Presence handlers
pub mod presence;

/// Notification handlers
pub mod notifications;

// Re-export commonly used handlers
pub use messages::{mark_message_read, send_message, SendMessageRequest};
pub use notifications::create_notification;
pub use presence::{list_online_users, user_online, OnlineUsersResponse, UserOnlineResponse};
