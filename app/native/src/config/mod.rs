//! Configuration for Glint.
//!
//! Settings are read from a JSONC file once at startup and then exposed
//! read-only to the rest of the application through [`ConfigProvider`].
//!
//! - [`types`] - Configuration structures and file loading
//! - [`provider`] - Read-only access for lifecycle units

pub mod provider;
pub mod types;

pub use provider::{ConfigProvider, StaticConfig};
pub use types::{
    CaptureConfig, CloudConfig, ConfigError, GlintConfig, OfficeConfig, OutputConfig,
    ServerConfig, ShareConfig, config_paths, load_config, load_config_from_path,
    load_or_default, schema_json,
};
