//! Contract operations of a running instance.

use std::path::Path;

use super::error::RequestError;
use super::middleware::ContractService;
use crate::capture::ScreenCaptureMode;
use crate::ui::{UiCommand, UiDispatcher};

/// Queues accepted requests onto the UI thread and returns immediately.
#[derive(Debug, Clone)]
pub struct ControlContract {
    ui: UiDispatcher,
}

impl ControlContract {
    #[must_use]
    pub const fn new(ui: UiDispatcher) -> Self { Self { ui } }
}

impl ContractService for ControlContract {
    fn exit(&self) -> Result<(), RequestError> {
        tracing::info!("exit requested over the control endpoint");
        Ok(self.ui.run_on(UiCommand::Exit)?)
    }

    fn open_file(&self, path: &Path) -> Result<(), RequestError> {
        if !path.is_file() {
            tracing::warn!(path = %path.display(), "requested file does not exist; ignoring");
            return Ok(());
        }
        Ok(self.ui.run_on(UiCommand::CaptureFile { path: path.to_path_buf() })?)
    }

    fn capture_screen(&self, include_cursor: bool) -> Result<(), RequestError> {
        Ok(self.ui.run_on(UiCommand::CaptureFullscreen { include_cursor, mode: ScreenCaptureMode::Auto })?)
    }
}
