//! Read-only configuration access for lifecycle units.

use serde_json::Value;

use super::GlintConfig;

/// Read-only view of the application settings.
///
/// Registered under the `Configuration` capability so addons can import it
/// instead of reading files themselves.
pub trait ConfigProvider: Send + Sync {
    /// Typed settings.
    fn settings(&self) -> &GlintConfig;

    /// Looks up a value by dotted key, e.g. `"output.destinations"`.
    ///
    /// Segments use the spelling of the configuration file.
    fn get(&self, key: &str) -> Option<Value>;
}

/// Settings fixed at startup.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    settings: GlintConfig,
    tree: Value,
}

impl StaticConfig {
    /// Wraps loaded settings.
    #[must_use]
    pub fn new(settings: GlintConfig) -> Self {
        let tree = serde_json::to_value(&settings).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "configuration cannot be viewed by key");
            Value::Null
        });
        Self { settings, tree }
    }
}

impl ConfigProvider for StaticConfig {
    fn settings(&self) -> &GlintConfig { &self.settings }

    fn get(&self, key: &str) -> Option<Value> {
        let pointer = format!("/{}", key.trim_matches('.').replace('.', "/"));
        self.tree.pointer(&pointer).cloned()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_get_by_dotted_key() {
        let provider = StaticConfig::new(GlintConfig::default());
        assert_eq!(provider.get("output.destinations"), Some(json!(["Picker"])));
        assert_eq!(provider.get("server.enabled"), Some(json!(true)));
    }

    #[test]
    fn test_get_unknown_key() {
        let provider = StaticConfig::new(GlintConfig::default());
        assert_eq!(provider.get("output.missing"), None);
        assert_eq!(provider.get("nope"), None);
    }

    #[test]
    fn test_settings_are_typed() {
        let mut config = GlintConfig::default();
        config.cloud.sync_folder = "/srv/sync".to_string();
        let provider = StaticConfig::new(config);
        assert_eq!(provider.settings().cloud.sync_folder, "/srv/sync");
        assert_eq!(provider.get("cloud.syncFolder"), Some(json!("/srv/sync")));
    }
}
