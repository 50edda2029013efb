//! Plugins compiled into the host
//!
//! Manifests in a plugin directory select one of these by entry name.

pub mod help;
pub mod lifetime;
pub mod ping;

use serde_json::json;

use crate::application::errors::{CommandError, PluginError};
use crate::infrastructure::plugins::PluginCatalog;

pub use help::HelpPlugin;
pub use lifetime::LifetimePlugin;
pub use ping::PingPlugin;

/// Catalog holding every built-in plugin
pub fn catalog() -> Result<PluginCatalog, PluginError> {
    let mut catalog = PluginCatalog::new();
    catalog.register("lifetime", LifetimePlugin::from_manifest)?;
    catalog.register("ping", PingPlugin::from_manifest)?;
    catalog.register("help", HelpPlugin::from_manifest)?;
    Ok(catalog)
}

/// Registration result listing the names a `register_command` call actually bound
fn bound_commands(names: &[&str], registered: Result<(), CommandError>) -> serde_json::Value {
    let rejected = match registered {
        Ok(()) => Vec::new(),
        Err(CommandError::AlreadyRegistered(rejected)) => rejected,
        Err(_) => names.iter().map(|n| n.to_string()).collect(),
    };

    let bound: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| !rejected.iter().any(|r| r == n))
        .collect();
    json!({ "commands": bound })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{Plugin, PluginManager};
    use std::sync::Arc;

    #[test]
    fn test_builtin_catalog() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.entries(), vec!["help", "lifetime", "ping"]);
    }

    #[test]
    fn test_bound_commands_drops_rejected_names() {
        assert_eq!(bound_commands(&["help", "commands"], Ok(())), json!({ "commands": ["help", "commands"] }));
        assert_eq!(
            bound_commands(&["help", "commands"], Err(CommandError::AlreadyRegistered(vec!["help".to_string()]))),
            json!({ "commands": ["commands"] })
        );
        assert_eq!(
            bound_commands(&["ping"], Err(CommandError::Internal("gone".to_string()))),
            json!({ "commands": [] })
        );
    }

    #[test]
    fn test_results_report_only_owned_commands() {
        let manager = PluginManager::new(Arc::new(PluginCatalog::new()));
        let api = manager.plugin_api();
        api.register_command("ping", |_, _| Ok(())).unwrap();

        let ping = PingPlugin.register(&api).unwrap();
        assert_eq!(ping, Some(json!({ "commands": [] })));

        let help = HelpPlugin.register(&api).unwrap();
        assert_eq!(help, Some(json!({ "commands": ["help", "commands"] })));
    }
}
