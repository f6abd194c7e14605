//! Real-time delivery integration tests

mod end_to_end_test;
mod hub_test;
