//! Plugin system for tendril-bot
//! 
//! Plugins are selected and configured by manifests found in plugin
//! directories, built from an explicit catalog of constructors, and handed a
//! `PluginApi` through which they register commands and event listeners.

pub mod api;
pub mod builtin;
pub mod manager;
pub mod trait_def;

pub use api::{CommandNames, PluginApi};
pub use manager::{ManagerState, PluginManager};
pub use trait_def::{Plugin, PluginFactory, PluginInfo};
