//! Chathub - Main Library
//!
//! Chathub is the real-time delivery backend of a chat service. It keeps a
//! registry of live socket connections and turns chat events (messages,
//! read receipts, presence changes, notifications) into frames delivered
//! to zero, one, or many of them.
//!
//! # Module Structure
//!
//! - **`shared`** - Records, events, socket frames, configuration, errors
//!   - Plain data, no I/O
//!
//! - **`backend`** - Server-side code
//!   - Event bus, connection hub, connection read/write loops, presence
//!   - Chat services (messages, online status, notifications)
//!   - Chat store (in-memory or PostgreSQL)
//!   - Axum routes, JWT authentication, error responses
//!
//! # Usage
//!
//! ```rust,no_run
//! use chathub::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config).await?;
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery Guarantees
//!
//! Delivery is at most once and best effort. Nothing is buffered for users
//! who are not connected; the store keeps the messages. A connection whose
//! outbound queue fills up is closed instead of slowing anyone else down.

/// Shared types
pub mod shared;

/// Server-side code
pub mod backend;

// Re-export shared types for convenience
pub use shared::*;
