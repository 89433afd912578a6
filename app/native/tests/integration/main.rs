//! Integration tests for Glint.
//!
//! Every test binds its control endpoint inside a private temporary
//! directory, so the suite never touches a running instance and tests can run
//! in parallel.
//!
//! ## Running Integration Tests
//!
//! ```bash
//! cargo nextest run -p glint --test integration
//!
//! # Run specific test module
//! cargo nextest run -p glint --test integration -E 'test(/control_server__lifecycle/)'
//! ```
//!
//! ## Test Organization
//!
//! Tests follow the naming convention `<module>__<test_name>` to allow filtering by module:
//! - `bootstrap__*` - Startup ordering and addon feasibility
//! - `control_server__*` - Single-instance endpoint and request handling

// Allow double-underscore naming for test modules (e.g., control_server__lifecycle)
#![allow(non_snake_case)]
// Relax clippy lints for integration tests - these are test utilities, not production code
#![allow(
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod common;

mod bootstrap__startup;
mod control_server__lifecycle;
mod control_server__requests;
