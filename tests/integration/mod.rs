//! Integration test suite for liveupd
//!
//! End-to-end tests driving the public API and the `liveupd` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: the `liveupd` binary via `assert_cmd`
//! - **upgrade**: full update attempts against a `wiremock` release host

mod cli;
mod upgrade;
