//! Capture subsystem interface.
//!
//! The screen-grabbing and image-encoding pipeline lives outside this crate;
//! it is reached through [`CaptureService`]. This module also hosts the
//! command-line backed default implementation and the UI-thread handler that
//! routes finished captures to destinations.
//!
//! - [`command`] - [`CaptureService`] driven by an external screenshot tool
//! - [`router`] - UI command handler delivering captures to destinations

pub mod command;
pub mod router;

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use command::CommandCapture;
pub use router::CaptureHelper;

/// How the screen is captured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenCaptureMode {
    /// Let the capture backend decide.
    #[default]
    Auto,
    /// Every screen as one image.
    FullScreen,
    /// Only the screen at the given zero-based index.
    Fixed(usize),
}

impl ScreenCaptureMode {
    /// Value substituted for `{mode}` in capture commands.
    #[must_use]
    pub fn as_arg(self) -> String {
        match self {
            Self::Auto => "auto".to_string(),
            Self::FullScreen => "fullscreen".to_string(),
            Self::Fixed(screen) => screen.to_string(),
        }
    }
}

/// Where a capture came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// An existing image file was loaded.
    File,
    /// The screen was grabbed.
    Screen,
}

/// A finished capture, ready to be exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureDetails {
    /// Image file holding the capture.
    pub path: PathBuf,
    /// Human-readable title, used by destinations for naming.
    pub title: String,
    /// Where the capture came from.
    pub source: CaptureSource,
}

impl CaptureDetails {
    /// Describes an image loaded from `path`, titled after its file stem.
    #[must_use]
    pub fn from_file(path: &Path) -> Self {
        let title = path
            .file_stem()
            .map_or_else(|| "capture".to_string(), |stem| stem.to_string_lossy().into_owned());
        Self { path: path.to_path_buf(), title, source: CaptureSource::File }
    }
}

/// Errors raised by the capture subsystem.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The file to load does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file is not an image the application can load.
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// No screen capture command is configured.
    #[error("no screen capture command configured")]
    NoCaptureCommand,

    /// The capture command ran but did not produce an image.
    #[error("capture command failed: {0}")]
    CommandFailed(String),

    /// IO error while capturing.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The capture subsystem consumed by the UI thread.
pub trait CaptureService: Send + Sync {
    /// Loads an existing image file as a capture.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not a supported image.
    fn capture_file(&self, path: &Path) -> Result<CaptureDetails, CaptureError>;

    /// Captures the screen.
    ///
    /// # Errors
    ///
    /// Returns an error if no capture backend is available or it failed.
    fn capture_fullscreen(
        &self,
        include_cursor: bool,
        mode: ScreenCaptureMode,
    ) -> Result<CaptureDetails, CaptureError>;
}
