use super::bound_commands;
use crate::application::errors::{CommandError, PluginError};
use crate::infrastructure::plugins::PluginManifest;
use crate::plugins::api::PluginApi;
use crate::plugins::trait_def::Plugin;

const NAMES: [&str; 2] = ["help", "commands"];

/// Lists the registered commands
pub struct HelpPlugin;

impl HelpPlugin {
    pub fn from_manifest(_manifest: &PluginManifest) -> Result<Box<dyn Plugin>, PluginError> {
        Ok(Box::new(HelpPlugin))
    }
}

fn help_text(names: &[String]) -> String {
    if names.is_empty() {
        return "No commands registered".to_string();
    }

    let listed: Vec<String> = names.iter().map(|n| format!("!{}", n)).collect();
    format!("Available commands: {}", listed.join(", "))
}

impl Plugin for HelpPlugin {
    fn register(&self, api: &PluginApi) -> Result<Option<serde_json::Value>, PluginError> {
        let host = api.clone();
        let registered = api.register_command(NAMES, move |message, _args| {
            message
                .reply(help_text(&host.command_names()))
                .map_err(|e| CommandError::ExecutionFailed(e.to_string()))
        });

        Ok(Some(bound_commands(&NAMES, registered)))
    }

    fn description(&self) -> &str {
        "Lists available commands"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_text() {
        assert_eq!(help_text(&[]), "No commands registered");
        assert_eq!(
            help_text(&["help".to_string(), "ping".to_string()]),
            "Available commands: !help, !ping"
        );
    }
}
