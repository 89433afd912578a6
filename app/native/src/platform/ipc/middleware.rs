//! Request handling chain.
//!
//! Every raw request line passes through
//! `MessageLog(FaultBoundary(service))`:
//!
//! - [`MessageLog`] logs the request and reply at debug level under a
//!   correlation id and never changes the reply.
//! - [`FaultBoundary`] decodes the request, calls the service, and turns any
//!   error or panic into the generic fault after logging the detail.

use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use super::error::RequestError;
use super::protocol::{ControlRequest, ControlResponse};
use crate::core::constants::endpoint::GENERIC_FAULT;
use crate::services::guard::catch_panic;

/// Turns one raw request line into a reply.
pub trait Handler: Send + Sync {
    fn call(&self, raw: &str) -> ControlResponse;
}

/// The operations behind the control contract.
pub trait ContractService: Send + Sync {
    /// Handles [`ControlRequest::Exit`].
    ///
    /// # Errors
    ///
    /// Returns an error if the work could not be queued.
    fn exit(&self) -> Result<(), RequestError>;

    /// Handles [`ControlRequest::OpenFile`].
    ///
    /// # Errors
    ///
    /// Returns an error if the work could not be queued.
    fn open_file(&self, path: &Path) -> Result<(), RequestError>;

    /// Handles [`ControlRequest::CaptureScreen`].
    ///
    /// # Errors
    ///
    /// Returns an error if the work could not be queued.
    fn capture_screen(&self, include_cursor: bool) -> Result<(), RequestError>;
}

/// The reply sent for any failed request.
///
/// Detail stays in the log; callers always get the same message.
#[must_use]
pub fn fault_for(err: &RequestError) -> ControlResponse {
    tracing::trace!(error = %err, "mapping request error to generic fault");
    ControlResponse::Fault { message: GENERIC_FAULT.to_string() }
}

/// Routes a decoded request to the matching operation of `service`.
///
/// # Errors
///
/// Returns the error raised by the operation.
pub fn invoke<S: ContractService + ?Sized>(service: &S, request: &ControlRequest) -> Result<(), RequestError> {
    match request {
        ControlRequest::Exit => service.exit(),
        ControlRequest::OpenFile { path } => service.open_file(path),
        ControlRequest::CaptureScreen { include_cursor } => service.capture_screen(*include_cursor),
    }
}

/// Decodes requests and contains service failures.
#[derive(Debug)]
pub struct FaultBoundary<S> {
    service: S,
}

impl<S: ContractService> FaultBoundary<S> {
    pub const fn new(service: S) -> Self { Self { service } }

    fn dispatch(&self, raw: &str) -> Result<(), RequestError> {
        let request: ControlRequest =
            serde_json::from_str(raw).map_err(|err| RequestError::Malformed(err.to_string()))?;
        invoke(&self.service, &request)
    }
}

impl<S: ContractService> Handler for FaultBoundary<S> {
    fn call(&self, raw: &str) -> ControlResponse {
        let outcome = catch_panic(|| self.dispatch(raw)).unwrap_or_else(|panic| Err(RequestError::Panicked(panic)));

        match outcome {
            Ok(()) => ControlResponse::Accepted,
            Err(err) => {
                tracing::error!(error = %err, "control request failed");
                fault_for(&err)
            }
        }
    }
}

/// Logs every request and reply.
#[derive(Debug)]
pub struct MessageLog<H> {
    inner: H,
}

impl<H: Handler> MessageLog<H> {
    pub const fn new(inner: H) -> Self { Self { inner } }
}

impl<H: Handler> Handler for MessageLog<H> {
    fn call(&self, raw: &str) -> ControlResponse {
        let correlation = Uuid::now_v7();
        tracing::debug!(%correlation, request = raw, "control request received");

        let response = self.inner.call(raw);

        tracing::debug!(%correlation, ?response, "control reply sent");
        response
    }
}

/// Builds the full handling chain around `service`.
pub fn dispatcher<S: ContractService + 'static>(service: S) -> Arc<dyn Handler> {
    Arc::new(MessageLog::new(FaultBoundary::new(service)))
}
