//! Glint - screenshot tool host.
//!
//! The library holds everything the `glint` binary runs:
//!
//! - [`registry`] - Capability registry with typed dependency slots
//! - [`services`] - Lifecycle units and the startup/shutdown orchestrator
//! - [`addons`] - Feasibility-gated destination exporters
//! - [`platform`] - The single-instance control endpoint
//! - [`ui`] - Hand-off of work to the UI-owning thread
//! - [`capture`] - Capture subsystem interface and delivery to destinations
//! - [`app`] - Wiring everything together
//! - [`cli`] - Command-line entry point

// Emit a clear compile-time error if attempted to compile on unsupported platforms
#[cfg(not(unix))]
compile_error!("Glint only supports Unix-like platforms.");

pub mod addons;
pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod core;
pub mod destinations;
pub mod logging;
pub mod platform;
pub mod registry;
pub mod services;
pub mod ui;
