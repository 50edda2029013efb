use super::bound_commands;
use crate::application::errors::{BotError, CommandError, PluginError};
use crate::domain::entities::IncomingMessage;
use crate::infrastructure::plugins::PluginManifest;
use crate::plugins::api::PluginApi;
use crate::plugins::trait_def::Plugin;

/// Replies `pong`, echoing any arguments
pub struct PingPlugin;

impl PingPlugin {
    pub fn from_manifest(_manifest: &PluginManifest) -> Result<Box<dyn Plugin>, PluginError> {
        Ok(Box::new(PingPlugin))
    }
}

fn pong(message: &IncomingMessage, args: &[String]) -> Result<(), CommandError> {
    let reply = if args.is_empty() {
        "pong".to_string()
    } else {
        format!("pong {}", args.join(" "))
    };

    message.reply(reply).map_err(|e: BotError| CommandError::ExecutionFailed(e.to_string()))
}

impl Plugin for PingPlugin {
    fn register(&self, api: &PluginApi) -> Result<Option<serde_json::Value>, PluginError> {
        // A taken name is already logged by the API
        let registered = api.register_command("ping", pong);
        Ok(Some(bound_commands(&["ping"], registered)))
    }

    fn description(&self) -> &str {
        "Liveness check"
    }
}
