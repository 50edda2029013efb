//! Command dispatcher - Routes command messages to registered handlers

use tracing::{debug, error};

use super::parser::CommandParser;
use crate::application::guard::guarded;
use crate::domain::entities::{Event, IncomingMessage, SharedCommandTable};

/// What happened to a message passed to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a message, or no command prefix
    Ignored,
    /// Prefixed, but no command by that name
    Unknown(String),
    /// The handler ran and succeeded
    Handled(String),
    /// The handler returned an error or panicked
    Failed(String),
}

/// Dispatches prefixed messages to the active command table
#[derive(Clone)]
pub struct CommandDispatcher {
    parser: CommandParser,
    commands: SharedCommandTable,
}

impl CommandDispatcher {
    pub fn new(commands: SharedCommandTable) -> Self {
        Self {
            parser: CommandParser::new(),
            commands,
        }
    }

    /// Handle a message event; other payloads are ignored
    pub fn handle_incoming(&self, event: &Event) -> DispatchOutcome {
        match event.message() {
            Some(message) => self.handle_message(message),
            None => DispatchOutcome::Ignored,
        }
    }

    /// Parse a message and run the matching command handler
    ///
    /// Handler errors and panics are logged and reported in the outcome,
    /// never propagated to the caller's event loop.
    pub fn handle_message(&self, message: &IncomingMessage) -> DispatchOutcome {
        let Some(parsed) = self.parser.parse(&message.content) else {
            return DispatchOutcome::Ignored;
        };

        // Clone the binding out so handlers may register commands themselves
        let command = match self.commands.read() {
            Ok(commands) => commands.get(&parsed.name).cloned(),
            Err(_) => {
                error!("Command table lock poisoned, dropping {}", parsed.name);
                return DispatchOutcome::Failed(parsed.name);
            }
        };

        let Some(command) = command else {
            debug!("Ignoring unknown command: {}", parsed.name);
            return DispatchOutcome::Unknown(parsed.name);
        };

        debug!("[{}] {} {:?}", message.channel.id, command.name, parsed.args);

        match guarded(|| command.invoke(message, &parsed.args)) {
            Ok(Ok(())) => DispatchOutcome::Handled(parsed.name),
            Ok(Err(e)) => {
                error!("Command {} failed: {}", parsed.name, e);
                DispatchOutcome::Failed(parsed.name)
            }
            Err(panic) => {
                error!("Command {} panicked: {}", parsed.name, panic);
                DispatchOutcome::Failed(parsed.name)
            }
        }
    }
}
