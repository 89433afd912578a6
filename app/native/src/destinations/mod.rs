//! Export targets for finished captures.
//!
//! Destinations are contributed by addons at startup and registered under the
//! `Destination` capability. The UI thread resolves them after each capture.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::capture::CaptureDetails;
use crate::registry::RegistryError;

/// Errors raised while exporting a capture.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// A dependency slot was used before it was filled.
    #[error("destination is not wired: {0}")]
    NotWired(#[from] RegistryError),

    /// The host application could not be started.
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// IO error while exporting.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportInformation {
    /// Designation of the destination that handled the export.
    pub designation: &'static str,
    /// File the capture was written to, when the destination keeps one.
    pub location: Option<PathBuf>,
    /// Link to the exported capture, when the destination provides one.
    pub uri: Option<String>,
}

impl ExportInformation {
    /// Export information without a location or link.
    #[must_use]
    pub const fn handed_off(designation: &'static str) -> Self {
        Self { designation, location: None, uri: None }
    }
}

/// An export target.
pub trait Destination: Send + Sync {
    /// Stable identifier used in `output.destinations`.
    fn designation(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> String;

    /// Exports `capture`.
    ///
    /// # Errors
    ///
    /// Returns an error if the export could not be completed.
    fn export(&self, capture: &CaptureDetails) -> Result<ExportInformation, DestinationError>;
}
