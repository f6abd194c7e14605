//! Integration tests
//!
//! - `realtime` - hub, connection loops and end-to-end delivery
//! - `api` - HTTP routes through the full router

mod api;
mod realtime;
