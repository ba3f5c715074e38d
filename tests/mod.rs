//! Integration tests for confplay
//!
//! Tests are organized by component:
//! - resolver_test: source precedence and resolution errors
//! - tracker_test: progress sampling, duration guards and teardown
//! - e2e_test: catalog -> resolve -> play -> track -> teardown

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
