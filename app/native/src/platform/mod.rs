//! Platform integration.
//!
//! - [`ipc`] - Single-instance control endpoint over Unix domain sockets

pub mod ipc;
