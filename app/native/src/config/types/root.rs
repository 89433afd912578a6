//! Root configuration types and loading functions.
//!
//! Contains the main `GlintConfig` struct and configuration file loading utilities.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::addons::{CloudConfig, OfficeConfig, ShareConfig};
use super::capture::CaptureConfig;
use super::output::OutputConfig;
use super::server::ServerConfig;
use crate::core::constants::APP_ID;
use crate::core::constants::config::{CONFIG_FILE, CONFIG_FILE_ALT, CONFIG_FILE_LEGACY};

/// Root configuration structure for Glint.
///
/// Every section falls back to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct GlintConfig {
    /// Where captures are written and which destinations receive them.
    pub output: OutputConfig,

    /// External screen capture tool.
    pub capture: CaptureConfig,

    /// Word, Excel, Outlook, PowerPoint and OneNote destinations.
    pub office: OfficeConfig,

    /// OS share sheet destination.
    pub share: ShareConfig,

    /// Cloud upload through a synchronized folder.
    pub cloud: CloudConfig,

    /// Single-instance control endpoint.
    pub server: ServerConfig,
}

impl GlintConfig {
    /// Normalizes values after loading.
    ///
    /// This is called automatically by [`load_config()`].
    pub fn prepare(&mut self) { self.output.prepare(); }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/glint/config.jsonc, \
         ~/.config/glint/config.json, or ~/.glint.json"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/glint/`, when set
/// 2. `~/.config/glint/`
/// 3. The platform config directory, e.g. `~/Library/Application Support/glint/`
/// 4. `~/.glint.jsonc` or `~/.glint.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut dirs_to_check = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        dirs_to_check.push(PathBuf::from(xdg_config).join(APP_ID));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_to_check.push(home.join(".config").join(APP_ID));
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_check.push(config_dir.join(APP_ID));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for dir in dirs_to_check {
        for filename in [CONFIG_FILE, CONFIG_FILE_ALT] {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        paths.extend(CONFIG_FILE_LEGACY.iter().map(|filename| home.join(filename)));
    }

    paths
}

/// Loads the configuration from a specific file path.
///
/// Comments (`//` and `/* */`) are stripped before parsing.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::Io` if it could not be read, and `ConfigError::Parse`
/// if it is not valid JSON.
pub fn load_config_from_path(path: &Path) -> Result<GlintConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let mut config: GlintConfig = serde_json::from_reader(reader)?;
    config.prepare();
    Ok(config)
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists, or the
/// error from [`load_config_from_path`] for the file that was found.
pub fn load_config() -> Result<(GlintConfig, PathBuf), ConfigError> {
    let path = config_paths().into_iter().find(|path| path.exists()).ok_or(ConfigError::NotFound)?;
    let config = load_config_from_path(&path)?;
    Ok((config, path))
}

/// Loads the configuration, falling back to defaults.
///
/// A missing file is normal. A file that cannot be read or parsed is logged
/// and ignored so a typo never prevents the application from starting.
#[must_use]
pub fn load_or_default() -> GlintConfig {
    match load_config() {
        Ok((config, path)) => {
            tracing::info!(path = %path.display(), "loaded configuration");
            config
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("no configuration file found; using defaults");
            let mut config = GlintConfig::default();
            config.prepare();
            config
        }
        Err(err) => {
            tracing::warn!(error = %err, "ignoring configuration file");
            let mut config = GlintConfig::default();
            config.prepare();
            config
        }
    }
}

/// Renders the JSON Schema of the configuration file.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn schema_json() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(GlintConfig);
    serde_json::to_string_pretty(&schema)
}
