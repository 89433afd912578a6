//! Capture service backed by an external screenshot tool.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use uuid::Uuid;

use super::{CaptureDetails, CaptureError, CaptureService, CaptureSource, ScreenCaptureMode};
use crate::config::{CaptureConfig, GlintConfig};
use crate::core::constants::APP_ID;

/// Image extensions accepted by [`CaptureService::capture_file`].
const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// Runs the configured capture command and loads image files from disk.
#[derive(Debug, Clone)]
pub struct CommandCapture {
    command: Vec<String>,
    cursor_args: Vec<String>,
    output_dir: PathBuf,
}

impl CommandCapture {
    /// Creates a capture service writing screen captures to `output_dir`.
    #[must_use]
    pub fn new(capture: &CaptureConfig, output_dir: PathBuf) -> Self {
        Self {
            command: capture.command.clone(),
            cursor_args: capture.cursor_args.clone(),
            output_dir,
        }
    }

    /// Creates a capture service from the loaded settings.
    #[must_use]
    pub fn from_config(config: &GlintConfig) -> Self {
        Self::new(&config.capture, config.output.output_dir())
    }

    fn arguments(&self, output: &Path, include_cursor: bool, mode: ScreenCaptureMode) -> Vec<String> {
        let output = output.to_string_lossy();
        let mode = mode.as_arg();
        let mut args: Vec<String> = self
            .command
            .iter()
            .skip(1)
            .map(|arg| arg.replace("{output}", &output).replace("{mode}", &mode))
            .collect();

        if include_cursor {
            // Cursor flags go before the output path, which most tools expect last.
            let at = args.iter().position(|arg| arg.as_str() == output).unwrap_or(args.len());
            args.splice(at..at, self.cursor_args.iter().cloned());
        }
        args
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

impl CaptureService for CommandCapture {
    fn capture_file(&self, path: &Path) -> Result<CaptureDetails, CaptureError> {
        if !path.is_file() {
            return Err(CaptureError::NotFound(path.to_path_buf()));
        }
        if !is_supported_image(path) {
            return Err(CaptureError::UnsupportedFormat(path.to_path_buf()));
        }

        tracing::debug!(path = %path.display(), "loaded image file");
        Ok(CaptureDetails::from_file(path))
    }

    fn capture_fullscreen(
        &self,
        include_cursor: bool,
        mode: ScreenCaptureMode,
    ) -> Result<CaptureDetails, CaptureError> {
        let Some(program) = self.command.first().filter(|program| !program.trim().is_empty())
        else {
            return Err(CaptureError::NoCaptureCommand);
        };

        fs::create_dir_all(&self.output_dir)?;
        let id = Uuid::now_v7();
        let output = self.output_dir.join(format!("{APP_ID}-{id}.png"));
        let args = self.arguments(&output, include_cursor, mode);

        tracing::debug!(program = %program, ?args, "running capture command");
        let status = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|err| CaptureError::CommandFailed(format!("{program}: {err}")))?;

        if !status.success() {
            return Err(CaptureError::CommandFailed(format!("{program} exited with {status}")));
        }
        if !output.is_file() {
            return Err(CaptureError::CommandFailed(format!(
                "{program} did not write {}",
                output.display()
            )));
        }

        Ok(CaptureDetails {
            title: format!("Screenshot {id}"),
            path: output,
            source: CaptureSource::Screen,
        })
    }
}
