//! Configuration types.
//!
//! Each section of the configuration file has its own module; [`root`] ties
//! them together and owns file discovery and parsing.

mod addons;
mod capture;
mod output;
mod root;
mod server;

pub use addons::{CloudConfig, OfficeConfig, ShareConfig};
pub use capture::CaptureConfig;
pub use output::OutputConfig;
pub use root::{
    ConfigError, GlintConfig, config_paths, load_config, load_config_from_path, load_or_default,
    schema_json,
};
pub use server::ServerConfig;
