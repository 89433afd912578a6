//! Destination addon configuration types.

use std::collections::HashMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Office destinations configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct OfficeConfig {
    /// Whether office destinations are offered at all.
    /// Default: true
    pub enabled: bool,

    /// Designations to leave out, e.g. `["Outlook"]`.
    pub disabled: Vec<String>,

    /// Executable names to look for, per designation.
    ///
    /// Replaces the built-in candidates for that application, e.g.
    /// `{ "Word": ["abiword"] }`.
    pub executables: HashMap<String, Vec<String>>,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self { enabled: true, disabled: Vec::new(), executables: HashMap::new() }
    }
}

impl OfficeConfig {
    /// Returns `true` unless office destinations or `designation` are disabled.
    #[must_use]
    pub fn allows(&self, designation: &str) -> bool {
        self.enabled && !self.disabled.iter().any(|name| name.eq_ignore_ascii_case(designation))
    }

    /// Configured executable names for `designation`, if any.
    #[must_use]
    pub fn executables_for(&self, designation: &str) -> Option<&[String]> {
        self.executables
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(designation))
            .map(|(_, executables)| executables.as_slice())
    }
}

/// OS share sheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ShareConfig {
    /// Whether the share destination is offered.
    /// Default: true
    pub enabled: bool,

    /// Helper programs that hand a file to the desktop, first found wins.
    ///
    /// Empty means the platform default (`open` on macOS, `xdg-open` elsewhere).
    pub helpers: Vec<String>,
}

impl Default for ShareConfig {
    fn default() -> Self { Self { enabled: true, helpers: Vec::new() } }
}

/// Cloud upload through a locally synchronized folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CloudConfig {
    /// Folder kept in sync by the cloud client. Supports `~`.
    ///
    /// The cloud destination is only offered when this is an existing directory.
    pub sync_folder: String,

    /// Public URL the sync folder is served under, used to build share links.
    pub public_url: String,
}

impl CloudConfig {
    /// The sync folder with `~` expanded, or `None` when unset.
    #[must_use]
    pub fn sync_folder_path(&self) -> Option<PathBuf> {
        let folder = self.sync_folder.trim();
        if folder.is_empty() {
            return None;
        }
        Some(PathBuf::from(shellexpand::tilde(folder).into_owned()))
    }
}
