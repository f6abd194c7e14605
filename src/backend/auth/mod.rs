//! Authentication Module
//!
//! This module verifies session tokens. Accounts, passwords and token
//! issuance live in the account service; the chat backend only needs to
//! know which user a request or socket belongs to.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! └── sessions.rs     - JWT creation and verification
//! ```
//!
//! # Security
//!
//! - HS256 tokens signed with `JWT_SECRET`
//! - Expiry is always checked
//! - Invalid tokens return 401 (no information leakage)

/// JWT token generation and validation
pub mod sessions;

pub use sessions::{create_token, verify_token, Claims};
