//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Realtime and app fixtures over the in-memory store
//! - A fake socket transport driven from the test
//! - Custom assertion macros

pub mod fixtures;
pub mod transport;

// Re-export commonly used utilities
pub use assertions::*;
pub use fixtures::*;
pub use transport::*;
