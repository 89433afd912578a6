//! Delivery of finished captures to destinations.

use std::fmt;
use std::sync::Arc;

use super::{CaptureDetails, CaptureService};
use crate::config::ConfigProvider;
use crate::destinations::ExportInformation;
use crate::registry::{CAPTURE, CONFIGURATION, CapabilityRegistry, DESTINATION, RegistryResult};
use crate::services::guard::catch_panic;
use crate::ui::{CommandHandler, UiCommand};

/// Handles capture commands on the UI thread.
///
/// Each capture is delivered to every registered destination listed in
/// `output.destinations`. Destinations are resolved per capture, so
/// providers exported after startup are picked up too.
pub struct CaptureHelper {
    registry: Arc<CapabilityRegistry>,
    capture: Arc<dyn CaptureService>,
    config: Arc<dyn ConfigProvider>,
}

impl CaptureHelper {
    /// Creates a helper from explicit collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        capture: Arc<dyn CaptureService>,
        config: Arc<dyn ConfigProvider>,
    ) -> Self {
        Self { registry, capture, config }
    }

    /// Creates a helper from the capture and configuration providers in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::registry::RegistryError::Unresolved`] if either is missing.
    pub fn from_registry(registry: Arc<CapabilityRegistry>) -> RegistryResult<Self> {
        let capture = registry.resolve_one(CAPTURE)?;
        let config = registry.resolve_one(CONFIGURATION)?;
        Ok(Self::new(registry, capture, config))
    }

    /// Exports `details` to every selected destination.
    ///
    /// A destination that fails or panics is logged and skipped.
    pub fn deliver(&self, details: &CaptureDetails) -> Vec<ExportInformation> {
        let output = &self.config.settings().output;
        let selected: Vec<_> = self
            .registry
            .resolve(DESTINATION)
            .into_iter()
            .filter(|destination| output.wants_all() || output.has_destination(destination.designation()))
            .collect();

        if selected.is_empty() {
            tracing::warn!(
                destinations = ?output.destinations,
                "no registered destination matches the configured output"
            );
            return Vec::new();
        }

        let mut exports = Vec::with_capacity(selected.len());
        for destination in selected {
            let designation = destination.designation();
            match catch_panic(|| destination.export(details)) {
                Ok(Ok(info)) => {
                    tracing::info!(destination = designation, path = %details.path.display(), "capture exported");
                    exports.push(info);
                }
                Ok(Err(err)) => {
                    tracing::error!(destination = designation, error = %err, "export failed");
                }
                Err(panic) => {
                    tracing::error!(destination = designation, panic = %panic, "export panicked");
                }
            }
        }
        exports
    }
}

impl fmt::Debug for CaptureHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureHelper").field("registry", &self.registry).finish_non_exhaustive()
    }
}

impl CommandHandler for CaptureHelper {
    fn handle(&mut self, command: UiCommand) -> crate::core::Result<()> {
        let details = match command {
            UiCommand::CaptureFile { path } => self.capture.capture_file(&path)?,
            UiCommand::CaptureFullscreen { include_cursor, mode } => {
                self.capture.capture_fullscreen(include_cursor, mode)?
            }
            UiCommand::Exit => return Ok(()),
        };

        let exports = self.deliver(&details);
        tracing::debug!(title = %details.title, exports = exports.len(), "capture handled");
        Ok(())
    }
}
