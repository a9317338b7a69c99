//! Integration tests for sqlgate.
//!
//! Every test runs against its own temporary SQLite file, either the seeded
//! demo database or a small fixture built for the test.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
