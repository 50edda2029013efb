//! Plugin discovery for tendril-bot
//! 
//! A plugin is either a single `<name>.yaml` manifest or a directory holding a
//! `plugin.yaml` manifest. Manifests name an entry point in the plugin
//! catalog; nothing on disk is executed.

pub mod loader;
pub mod manifest;
pub mod registry;

pub use loader::{LoadedPlugin, PluginLoader};
pub use manifest::PluginManifest;
pub use registry::PluginCatalog;
