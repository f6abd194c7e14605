//! Backend Module
//!
//! This module contains all server-side code for the chathub service.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`realtime`** - Event bus, connection hub, connection loops, presence
//! - **`chat`** - Message, online and notification services and their handlers
//! - **`store`** - Persistence (in-memory or PostgreSQL)
//! - **`auth`** - JWT session tokens
//! - **`middleware`** - Request extractors (authentication)
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── realtime/       - Real-time delivery
//! ├── chat/           - Chat services and handlers
//! ├── store/          - Persistence
//! ├── auth/           - Session tokens
//! ├── middleware/     - Request extractors
//! └── error/          - Error types
//! ```
//!
//! # Concurrency
//!
//! - The hub's connection map sits behind one `std::sync::RwLock`, held only
//!   for map operations and non-blocking queue pushes
//! - Each connection runs a read task and a write task joined by a bounded
//!   `tokio::sync::mpsc` queue
//! - Event bus handlers run as independent Tokio tasks
//!
//! # Error Handling
//!
//! Handlers return `BackendError`, which converts to a JSON error response.
//! Errors inside a connection close that connection and nothing else.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time delivery
pub mod realtime;

/// Chat services
pub mod chat;

/// Persistence
pub mod store;

/// Session tokens
pub mod auth;

/// Request extractors
pub mod middleware;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::BackendError;
pub use realtime::{EventBus, Hub, Realtime};
pub use server::{create_app, AppState, ServerConfig};
