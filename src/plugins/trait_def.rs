//! Plugin trait definitions

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::errors::PluginError;
use crate::infrastructure::plugins::PluginManifest;
use crate::plugins::api::PluginApi;

/// Core plugin trait that all plugins must implement
///
/// `register` is the single integration point: it receives the plugin's
/// capability object and returns an optional value that the host keeps as
/// the plugin's registration result.
pub trait Plugin: Send + Sync {
    /// Register commands and listeners with the host
    fn register(&self, api: &PluginApi) -> Result<Option<serde_json::Value>, PluginError>;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }
}

/// Constructor for a plugin, configured from its manifest
pub type PluginFactory =
    Arc<dyn Fn(&PluginManifest) -> Result<Box<dyn Plugin>, PluginError> + Send + Sync>;

/// Plugin information for listing
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub entry: String,
    pub path: PathBuf,
    pub description: String,
    pub result: Option<serde_json::Value>,
}
