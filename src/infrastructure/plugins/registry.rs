//! Plugin catalog - The explicit set of plugin constructors a host can build

use std::collections::HashMap;
use std::sync::Arc;

use super::manifest::PluginManifest;
use crate::application::errors::PluginError;
use crate::plugins::trait_def::{Plugin, PluginFactory};

/// Entry point name to constructor
#[derive(Default, Clone)]
pub struct PluginCatalog {
    factories: HashMap<String, PluginFactory>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constructor under an entry point name
    pub fn register<F>(&mut self, entry: impl Into<String>, factory: F) -> Result<(), PluginError>
    where
        F: Fn(&PluginManifest) -> Result<Box<dyn Plugin>, PluginError> + Send + Sync + 'static,
    {
        let entry = entry.into();
        if self.factories.contains_key(&entry) {
            return Err(PluginError::Duplicate(entry));
        }

        self.factories.insert(entry, Arc::new(factory));
        Ok(())
    }

    pub fn get(&self, entry: &str) -> Option<PluginFactory> {
        self.factories.get(entry).cloned()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.factories.contains_key(entry)
    }

    /// Build the plugin behind an entry point
    pub fn instantiate(&self, entry: &str, manifest: &PluginManifest) -> Result<Box<dyn Plugin>, PluginError> {
        let factory = self.get(entry)
            .ok_or_else(|| PluginError::UnknownEntry(entry.to_string()))?;
        factory(manifest)
    }

    /// Entry point names, sorted
    pub fn entries(&self) -> Vec<String> {
        let mut entries: Vec<String> = self.factories.keys().cloned().collect();
        entries.sort();
        entries
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::api::PluginApi;

    struct Quiet;

    impl Plugin for Quiet {
        fn register(&self, _api: &PluginApi) -> Result<Option<serde_json::Value>, PluginError> {
            Ok(None)
        }
    }

    #[test]
    fn test_register_and_instantiate() {
        let mut catalog = PluginCatalog::new();
        catalog.register("quiet", |_: &PluginManifest| Ok(Box::new(Quiet) as Box<dyn Plugin>)).unwrap();

        assert!(catalog.contains("quiet"));
        assert_eq!(catalog.entries(), vec!["quiet"]);
        assert!(catalog.instantiate("quiet", &PluginManifest::default()).is_ok());
    }

    #[test]
    fn test_unknown_and_duplicate_entries() {
        let mut catalog = PluginCatalog::new();
        catalog.register("quiet", |_: &PluginManifest| Ok(Box::new(Quiet) as Box<dyn Plugin>)).unwrap();

        let dup = catalog.register("quiet", |_: &PluginManifest| Ok(Box::new(Quiet) as Box<dyn Plugin>));
        assert!(matches!(dup, Err(PluginError::Duplicate(name)) if name == "quiet"));

        let missing = catalog.instantiate("loud", &PluginManifest::default());
        assert!(matches!(missing, Err(PluginError::UnknownEntry(name)) if name == "loud"));
    }
}
