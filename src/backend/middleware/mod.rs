//! Middleware Module
//!
//! This module contains request processing shared by the HTTP handlers.
//!
//! # Architecture
//!
//! - **`auth`** - `AuthUser` extractor resolving the session token
//!
//! # Example
//!
//! ```rust,no_run
//! use chathub::backend::middleware::AuthUser;
//!
//! async fn whoami(AuthUser(user): AuthUser) -> String {
//!     user.user_id
//! }
//! ```

pub mod auth;

pub use auth::{AuthUser, AuthenticatedUser};
