//! IPC error types.

use std::io;

use thiserror::Error;

use crate::ui::UiError;

/// Errors raised by the control endpoint and its clients.
#[derive(Debug, Error)]
pub enum IpcError {
    /// Another live instance already owns the endpoint for this user.
    #[error("control endpoint {endpoint} is already bound by another instance")]
    BindConflict { endpoint: String },

    /// Nothing is listening on the endpoint.
    #[error("no instance is listening on {endpoint}")]
    NotRunning { endpoint: String },

    /// The endpoint could not be set up for a reason other than a conflict.
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: io::Error,
    },

    /// The server answered with a fault.
    #[error("server fault: {0}")]
    Fault(String),

    /// The peer violated the wire protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// IO errors.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised while handling a single request.
///
/// These never reach the wire; callers only see a generic fault.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request is not valid JSON or names an unknown operation.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// The request line exceeds the size limit.
    #[error("request exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The UI thread no longer accepts work.
    #[error(transparent)]
    Ui(#[from] UiError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panicked(String),
}
