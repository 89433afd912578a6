//! Lifecycle unit trait definitions.
//!
//! This module defines the trait for application units that are started at
//! boot in a declared order and shut down at teardown, and the errors they
//! report to the orchestrator.

use thiserror::Error;

use super::context::AppContext;
use crate::platform::ipc::IpcError;
use crate::registry::RegistryError;

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Unit initialization failed.
    #[error("Failed to initialize module '{name}': {reason}")]
    InitializationFailed { name: &'static str, reason: String },

    /// A dependency slot could not be filled. This is a bootstrap defect.
    #[error(transparent)]
    Resolution(#[from] RegistryError),

    /// The control endpoint could not be bound or released.
    #[error(transparent)]
    Ipc(#[from] IpcError),

    /// The unit panicked inside a lifecycle hook.
    #[error("Module '{name}' panicked: {message}")]
    Panicked { name: &'static str, message: String },

    /// Unit operation failed.
    #[error("Module '{name}' operation failed: {reason}")]
    OperationFailed { name: &'static str, reason: String },
}

impl ModuleError {
    /// Creates an initialization failed error.
    pub fn init_failed(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InitializationFailed { name, reason: reason.into() }
    }

    /// Creates a panicked error.
    pub fn panicked(name: &'static str, message: impl Into<String>) -> Self {
        Self::Panicked { name, message: message.into() }
    }

    /// Creates an operation failed error.
    pub fn operation_failed(name: &'static str, reason: impl Into<String>) -> Self {
        Self::OperationFailed { name, reason: reason.into() }
    }
}

/// Result type for lifecycle operations.
pub type ModuleResult<T> = std::result::Result<T, ModuleError>;

/// A unit of work started at boot and shut down at exit.
///
/// Units are:
/// - Started once, in ascending [`order`](Self::order), on the bootstrap thread
/// - Shut down once at exit, but only if their start succeeded
/// - Isolated from each other: a failing unit does not stop its siblings
///   unless it is [critical](Self::is_critical)
///
/// # Example
///
/// ```ignore
/// struct ShareExporter;
///
/// impl LifecycleUnit for ShareExporter {
///     fn name(&self) -> &'static str { "share" }
///
///     fn order(&self) -> i32 { startup_order::ADDON }
///
///     fn start(&mut self, ctx: &AppContext) -> ModuleResult<()> {
///         // probe, construct, inject, export
///         Ok(())
///     }
/// }
/// ```
pub trait LifecycleUnit: Send {
    /// Returns the unit name for logging and identification.
    fn name(&self) -> &'static str;

    /// Returns the startup tier. Lower values start first.
    fn order(&self) -> i32;

    /// Whether a start failure must abort the remaining startup.
    fn is_critical(&self) -> bool { false }

    /// Starts the unit.
    ///
    /// Called at most once per process lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit could not start. The orchestrator logs it
    /// and skips the unit's shutdown.
    fn start(&mut self, ctx: &AppContext) -> ModuleResult<()>;

    /// Shuts the unit down.
    ///
    /// Called during exit for units that started. Default implementation does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if teardown failed; remaining units are still shut down.
    fn shutdown(&mut self) -> ModuleResult<()> { Ok(()) }
}
