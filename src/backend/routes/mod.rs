//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//! Routes are organized by functionality into focused submodules.
//!
//! # Architecture
//!
//! - **`router`** - Main router creation and route assembly
//! - **`chat_routes`** - Real-time socket endpoint
//! - **`api_routes`** - JSON API endpoints
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── chat_routes.rs  - Socket upgrade route
//! └── api_routes.rs   - API endpoint routes
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chathub::backend::routes::create_router;
//! use chathub::backend::server::AppState;
//! use chathub::backend::store::MemoryStore;
//! use chathub::shared::HubConfig;
//!
//! # fn example() -> Result<(), chathub::shared::ConfigError> {
//! let state = AppState::new(Arc::new(MemoryStore::new()), HubConfig::default(), "secret")?;
//! let router = create_router(state);
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

/// Chat route configuration
pub mod chat_routes;

/// API route configuration
pub mod api_routes;

pub use router::create_router;
