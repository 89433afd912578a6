//! Output configuration types.
//!
//! Controls where finished captures are written and which destinations
//! receive them.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::constants::destinations::{CLIPBOARD, PICKER};

/// Smallest palette `reduceColorsTo` accepts.
const MIN_COLORS: u32 = 2;

/// Largest palette `reduceColorsTo` accepts.
const MAX_COLORS: u32 = 256;

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    /// Destinations every capture is delivered to, by designation.
    ///
    /// `"Picker"` selects every available destination. Entries may also use
    /// the legacy `"Word|Share"` form.
    /// Default: `["Picker"]`
    pub destinations: Vec<String>,

    /// Directory screen captures are written to. Supports `~`.
    /// Default: `"~/Pictures/Glint"`
    pub file_path: String,

    /// Copy the saved file path to the clipboard after a capture.
    ///
    /// Read by the external encoding pipeline, not by this crate. Ignored
    /// when the clipboard itself is a destination.
    pub copy_path_to_clipboard: bool,

    /// Reduce the palette of saved images. Read by the external encoding pipeline.
    pub reduce_colors: bool,

    /// Palette size used when `reduceColors` is on, between 2 and 256.
    /// Default: 256
    pub reduce_colors_to: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            destinations: vec![PICKER.to_string()],
            file_path: "~/Pictures/Glint".to_string(),
            copy_path_to_clipboard: false,
            reduce_colors: false,
            reduce_colors_to: MAX_COLORS,
        }
    }
}

impl OutputConfig {
    /// Normalizes values read from disk.
    pub fn prepare(&mut self) {
        let mut destinations: Vec<String> = Vec::new();
        for entry in &self.destinations {
            for name in entry.split('|').map(str::trim).filter(|name| !name.is_empty()) {
                if !destinations.iter().any(|known| known.eq_ignore_ascii_case(name)) {
                    destinations.push(name.to_string());
                }
            }
        }
        if destinations.is_empty() {
            destinations.push(PICKER.to_string());
        }
        self.destinations = destinations;

        if self.copy_path_to_clipboard && self.has_destination(CLIPBOARD) {
            tracing::debug!("clipboard is a destination; not copying the path as well");
            self.copy_path_to_clipboard = false;
        }

        self.reduce_colors_to = self.reduce_colors_to.clamp(MIN_COLORS, MAX_COLORS);
    }

    /// Returns `true` if `designation` is listed, ignoring case.
    #[must_use]
    pub fn has_destination(&self, designation: &str) -> bool {
        self.destinations.iter().any(|name| name.eq_ignore_ascii_case(designation))
    }

    /// Returns `true` when every available destination should be used.
    #[must_use]
    pub fn wants_all(&self) -> bool { self.has_destination(PICKER) }

    /// The capture directory with `~` expanded.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.file_path).into_owned())
    }
}
