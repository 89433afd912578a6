//! Screen capture command configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the external screen capture tool.
///
/// The command is run without a shell. `{output}` in any argument is
/// replaced with the image path to write and `{mode}` with the capture mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    /// Program and arguments that write a screenshot to `{output}`.
    ///
    /// An empty list disables screen capture.
    pub command: Vec<String>,

    /// Extra arguments appended when the cursor should be captured.
    pub cursor_args: Vec<String>,

    /// Capture the cursor when a request does not say otherwise.
    /// Default: true
    pub include_cursor: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let (command, cursor): (&[&str], &[&str]) = if cfg!(target_os = "macos") {
            (&["screencapture", "-x", "{output}"], &["-C"])
        } else {
            (&["grim", "{output}"], &["-c"])
        };

        Self {
            command: command.iter().map(ToString::to_string).collect(),
            cursor_args: cursor.iter().map(ToString::to_string).collect(),
            include_cursor: true,
        }
    }
}

impl CaptureConfig {
    /// Returns `true` when a capture command is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.command.first().is_some_and(|program| !program.trim().is_empty())
    }
}
