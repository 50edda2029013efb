//! Plugin manifest definition

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::errors::PluginError;

/// Plugin metadata, read from `<name>.yaml` or `<name>/plugin.yaml`
///
/// Every field is optional; an empty file is a valid manifest whose entry
/// point is the plugin's own name.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginManifest {
    /// Catalog entry point; defaults to the plugin name
    pub entry: Option<String>,

    /// Plugin description
    pub description: Option<String>,

    /// Plugin version
    pub version: Option<String>,

    /// Free-form settings handed to the plugin constructor
    pub settings: serde_json::Value,
}

impl PluginManifest {
    pub fn parse(content: &str, path: impl AsRef<Path>) -> Result<Self, PluginError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).map_err(|e| PluginError::ManifestParse {
            path: path.as_ref().to_path_buf(),
            message: e.to_string(),
        })
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PluginError::ManifestRead {
                path: path.to_path_buf(),
                source,
            })?;

        Self::parse(&content, path)
    }

    /// Entry point to build, falling back to the plugin name
    pub fn entry_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.entry.as_deref().unwrap_or(name)
    }

    /// Deserialize `settings`, using the default when none were given
    pub fn settings<T: DeserializeOwned + Default>(&self) -> Result<T, PluginError> {
        if self.settings.is_null() {
            return Ok(T::default());
        }

        serde_json::from_value(self.settings.clone())
            .map_err(|e| PluginError::Settings(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(rename_all = "kebab-case")]
    struct Settings {
        admin_ids: Vec<String>,
    }

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let manifest = PluginManifest::parse("  \n", "p.yaml").unwrap();
        assert_eq!(manifest, PluginManifest::default());
        assert_eq!(manifest.entry_or("greeter"), "greeter");
        assert_eq!(manifest.settings::<Settings>().unwrap(), Settings::default());
    }

    #[test]
    fn test_parse_full_manifest() {
        let yaml = "entry: lifetime\ndescription: Shutdown command\nsettings:\n  admin-ids: [\"42\"]\n";
        let manifest = PluginManifest::parse(yaml, "p.yaml").unwrap();
        assert_eq!(manifest.entry_or("core"), "lifetime");
        assert_eq!(manifest.description.as_deref(), Some("Shutdown command"));

        let settings: Settings = manifest.settings().unwrap();
        assert_eq!(settings.admin_ids, vec!["42"]);
    }

    #[test]
    fn test_invalid_manifest_is_an_error() {
        let err = PluginManifest::parse("entry: [unclosed", "bad.yaml").unwrap_err();
        assert!(matches!(err, PluginError::ManifestParse { .. }));
    }
}
