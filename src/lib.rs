//! tendril-bot - A minimal extensible chat bot host
//!
//! A remote client feeds events through its listener registry; the plugin
//! manager loads plugins from manifest directories, hands each a `PluginApi`
//! and dispatches `!`/`.` prefixed messages to the commands they register.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;
