//! Control server configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Control server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    /// Whether this instance claims the per-user control endpoint.
    ///
    /// When disabled, later launches start their own instance instead of
    /// handing their request over.
    /// Default: true
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self { Self { enabled: true } }
}
