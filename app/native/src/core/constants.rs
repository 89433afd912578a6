//! Application constants for Glint.
//!
//! This module contains global constants used throughout the application,
//! including application names, startup tiers, and endpoint naming.

/// The application name, used in endpoint addresses.
pub const APP_NAME: &str = "Glint";

/// Lowercase application identifier, used for directories and file names.
pub const APP_ID: &str = "glint";

/// Application version from Cargo.toml.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Startup tiers for lifecycle units.
///
/// Units run in ascending order; units sharing a value form one tier.
pub mod startup_order {
    /// Addon exporters that register destinations.
    pub const ADDON: i32 = 10;

    /// The single-instance control server.
    ///
    /// Runs after the addons so that accepted requests see every destination.
    pub const SERVER: i32 = 20;
}

/// Control endpoint naming and limits.
pub mod endpoint {
    use std::time::Duration;

    /// URI scheme of the local transport.
    pub const SCHEME: &str = "unix";

    /// Prefix of the per-user endpoint name.
    pub const SERVER_PREFIX: &str = "Server_";

    /// Suffix of the introspection address.
    pub const MEX_SUFFIX: &str = "/mex";

    /// Largest accepted request line, excluding the trailing newline.
    pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

    /// Idle timeout for a connected client.
    pub const READ_TIMEOUT: Duration = Duration::from_secs(30);

    /// How long a client waits for a reply.
    pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Fault message returned to callers in place of internal error detail.
    pub const GENERIC_FAULT: &str = "internal error";
}

/// Well-known destination designations.
pub mod destinations {
    /// Lets the user pick; for headless routing this selects every destination.
    pub const PICKER: &str = "Picker";

    /// The clipboard destination.
    pub const CLIPBOARD: &str = "Clipboard";
}

/// Default configuration file names.
pub mod config {
    /// Primary config file name.
    pub const CONFIG_FILE: &str = "config.jsonc";

    /// Alternative config file name (JSON without comments).
    pub const CONFIG_FILE_ALT: &str = "config.json";

    /// Legacy config file names in the home directory.
    pub const CONFIG_FILE_LEGACY: &[&str] = &[".glint.jsonc", ".glint.json"];
}
