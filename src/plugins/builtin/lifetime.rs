//! Lifetime plugin - lets administrators shut the bot down from chat

use serde::Deserialize;
use tracing::{info, warn};

use super::bound_commands;
use crate::application::errors::{CommandError, PluginError};
use crate::application::events::listener;
use crate::domain::entities::{EventPayload, EventType, IncomingMessage};
use crate::infrastructure::plugins::PluginManifest;
use crate::plugins::api::PluginApi;
use crate::plugins::trait_def::Plugin;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LifetimeSettings {
    /// Accounts allowed to use `kill`
    pub admin_ids: Vec<String>,
}

impl LifetimeSettings {
    pub fn is_admin(&self, message: &IncomingMessage) -> bool {
        self.admin_ids.iter().any(|id| *id == message.author.id)
    }
}

pub struct LifetimePlugin {
    settings: LifetimeSettings,
}

impl LifetimePlugin {
    pub fn new(settings: LifetimeSettings) -> Self {
        Self { settings }
    }

    pub fn from_manifest(manifest: &PluginManifest) -> Result<Box<dyn Plugin>, PluginError> {
        let settings: LifetimeSettings = manifest.settings()?;
        if settings.admin_ids.is_empty() {
            warn!("lifetime: no admin-ids configured, !kill is disabled");
        }
        Ok(Box::new(Self::new(settings)))
    }
}

impl Plugin for LifetimePlugin {
    fn register(&self, api: &PluginApi) -> Result<Option<serde_json::Value>, PluginError> {
        let settings = self.settings.clone();
        let host = api.clone();

        let registered = api.register_command("kill", move |message, _args| {
            if !settings.is_admin(message) {
                info!("lifetime: ignoring kill from {}", message.author);
                return Ok(());
            }

            if let Err(e) = message.reply("Disconnecting") {
                warn!("lifetime: could not announce disconnect: {}", e);
            }
            host.disconnect()
                .map_err(|e| CommandError::ExecutionFailed(e.to_string()))
        });

        let _ = api.add_event_listener(EventType::Ready, listener(|event| {
            if let EventPayload::Session { account } = &event.payload {
                info!("Connected as {}", account);
            }
            Ok(())
        }));

        Ok(Some(bound_commands(&["kill"], registered)))
    }

    fn description(&self) -> &str {
        "Administrative shutdown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Channel, User};

    #[test]
    fn test_settings_from_manifest() {
        let manifest = PluginManifest::parse("settings:\n  admin-ids: [\"7\"]\n", "lifetime.yaml").unwrap();
        let settings: LifetimeSettings = manifest.settings().unwrap();
        assert_eq!(settings.admin_ids, vec!["7"]);
    }

    #[test]
    fn test_only_admins_match() {
        let settings = LifetimeSettings { admin_ids: vec!["7".to_string()] };
        let admin = IncomingMessage::new(User::new("7"), Channel::new("c"), "!kill");
        let other = IncomingMessage::new(User::new("8"), Channel::new("c"), "!kill");
        assert!(settings.is_admin(&admin));
        assert!(!settings.is_admin(&other));
    }

    #[test]
    fn test_kill_disconnects_even_when_reply_fails() {
        use crate::application::messaging::DispatchOutcome;
        use crate::domain::entities::Event;
        use crate::infrastructure::plugins::PluginCatalog;
        use crate::plugins::PluginManager;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let manager = PluginManager::new(Arc::new(PluginCatalog::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        manager
            .set_disconnect_callback(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();

        let plugin = LifetimePlugin::new(LifetimeSettings { admin_ids: vec!["7".to_string()] });
        let result = plugin.register(&manager.plugin_api()).unwrap();
        assert_eq!(result, Some(serde_json::json!({ "commands": ["kill"] })));

        // A channel without an outbox cannot carry the reply
        let kill = IncomingMessage::new(User::new("7"), Channel::new("c"), "!kill");
        assert_eq!(manager.dispatch(&Event::message_create(kill)), DispatchOutcome::Handled("kill".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
