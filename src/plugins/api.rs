//! Plugin API - The capability object handed to plugins at registration
//!
//! Every operation is delegated to the owning manager through a weak
//! reference and reports failures twice: it logs them, so plugins that ignore
//! the result still leave a trace, and it returns them to the caller.

use std::sync::{Arc, Weak};
use tracing::error;

use crate::application::errors::{BotError, CommandError, ListenerError};
use crate::application::events::Listener;
use crate::domain::entities::{Command, CommandHandler, EventType, IncomingMessage};
use crate::plugins::manager::HostState;

/// One or more command names to bind a handler under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNames(Vec<String>);

impl CommandNames {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for CommandNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for CommandNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for CommandNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for CommandNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for CommandNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for CommandNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Capability object given to plugins; cheap to clone
#[derive(Clone)]
pub struct PluginApi {
    host: Weak<HostState>,
}

impl PluginApi {
    pub(crate) fn new(host: Weak<HostState>) -> Self {
        Self { host }
    }

    fn host(&self) -> Result<Arc<HostState>, ListenerError> {
        self.host.upgrade().ok_or(ListenerError::HostGone)
    }

    /// Bind `handler` under each name; names already taken keep their handler
    ///
    /// Free names are bound even when others are rejected; the rejected ones
    /// are returned in `CommandError::AlreadyRegistered`.
    pub fn register_command<N, F>(&self, names: N, handler: F) -> Result<(), CommandError>
    where
        N: Into<CommandNames>,
        F: Fn(&IncomingMessage, &[String]) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        let host = self.host().map_err(|e| CommandError::Internal(e.to_string()))?;
        let handler: CommandHandler = Arc::new(handler);

        let mut commands = host.commands.write()
            .map_err(|_| CommandError::Internal("Lock poisoned".to_string()))?;

        let mut rejected = Vec::new();
        for name in names.into().into_vec() {
            if commands.register(Command::with_handler(name.clone(), handler.clone())).is_err() {
                error!("Error registering command {} :: Command already exists", name);
                rejected.push(name);
            }
        }

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(CommandError::AlreadyRegistered(rejected))
        }
    }

    /// Names of every registered command, sorted
    pub fn command_names(&self) -> Vec<String> {
        self.host()
            .ok()
            .and_then(|host| host.commands.read().ok().map(|c| c.names()))
            .unwrap_or_default()
    }

    pub fn add_event_listener(&self, event_type: EventType, listener: Listener) -> Result<(), ListenerError> {
        let result = self.host().and_then(|host| {
            let add = host.add_listener()?;
            add(event_type, listener)
        });

        if let Err(e) = &result {
            error!("Error adding listener: {}", e);
        }
        result
    }

    pub fn remove_event_listener(&self, event_type: EventType, listener: &Listener) -> Result<(), ListenerError> {
        let result = self.host().and_then(|host| {
            let remove = host.remove_listener()?;
            remove(event_type, listener)
        });

        if let Err(e) = &result {
            error!("Error removing listener: {}", e);
        }
        result
    }

    /// Ask the remote client to disconnect
    pub fn disconnect(&self) -> Result<(), BotError> {
        let result = self.host()
            .map_err(BotError::from)
            .and_then(|host| {
                let disconnect = host.disconnect_callback()?;
                disconnect()
            });

        if let Err(e) = &result {
            error!("Error disconnecting: {}", e);
        }
        result
    }

    /* messages */

    pub fn register_message_create_listener(&self, listener: Listener) -> Result<(), ListenerError> {
        self.add_event_listener(EventType::MessageCreate, listener)
    }

    pub fn unregister_message_create_listener(&self, listener: &Listener) -> Result<(), ListenerError> {
        self.remove_event_listener(EventType::MessageCreate, listener)
    }

    pub fn register_message_edit_listener(&self, listener: Listener) -> Result<(), ListenerError> {
        self.add_event_listener(EventType::MessageUpdate, listener)
    }

    pub fn unregister_message_edit_listener(&self, listener: &Listener) -> Result<(), ListenerError> {
        self.remove_event_listener(EventType::MessageUpdate, listener)
    }

    pub fn register_message_delete_listener(&self, listener: Listener) -> Result<(), ListenerError> {
        self.add_event_listener(EventType::MessageDelete, listener)
    }

    pub fn unregister_message_delete_listener(&self, listener: &Listener) -> Result<(), ListenerError> {
        self.remove_event_listener(EventType::MessageDelete, listener)
    }

    /* reactions */

    pub fn register_reaction_add_listener(&self, listener: Listener) -> Result<(), ListenerError> {
        self.add_event_listener(EventType::MessageReactionAdd, listener)
    }

    pub fn unregister_reaction_add_listener(&self, listener: &Listener) -> Result<(), ListenerError> {
        self.remove_event_listener(EventType::MessageReactionAdd, listener)
    }

    pub fn register_reaction_remove_listener(&self, listener: Listener) -> Result<(), ListenerError> {
        self.add_event_listener(EventType::MessageReactionRemove, listener)
    }

    pub fn unregister_reaction_remove_listener(&self, listener: &Listener) -> Result<(), ListenerError> {
        self.remove_event_listener(EventType::MessageReactionRemove, listener)
    }
}
