//! Unified error types for Glint.
//!
//! This module provides a hierarchical error system where each module defines
//! its own error type that converts into the base [`Error`] type.

use thiserror::Error;

use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::platform::ipc::{IpcError, RequestError};
use crate::registry::RegistryError;
use crate::services::ModuleError;
use crate::ui::UiError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Base error type for all Glint errors.
///
/// Each module's specific error type converts into this type through a `From`
/// implementation, so `?` works across module boundaries.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Capability registry errors.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Lifecycle unit errors.
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    /// Control endpoint errors.
    #[error("IPC error: {0}")]
    Ipc(#[from] IpcError),

    /// Control request errors.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Capture subsystem errors.
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// UI hand-off errors.
    #[error("UI error: {0}")]
    Ui(#[from] UiError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid arguments provided.
    #[error("{0}")]
    InvalidArguments(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an invalid arguments error.
    pub fn invalid_args(msg: impl Into<String>) -> Self { Self::InvalidArguments(msg.into()) }

    /// Creates a generic error.
    pub fn other(msg: impl Into<String>) -> Self { Self::Other(msg.into()) }
}

impl From<String> for Error {
    fn from(msg: String) -> Self { Self::Other(msg) }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self { Self::Other(msg.to_string()) }
}
