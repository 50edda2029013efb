use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use super::IncomingMessage;
use crate::application::errors::CommandError;

/// Command handler function type
pub type CommandHandler =
    Arc<dyn Fn(&IncomingMessage, &[String]) -> Result<(), CommandError> + Send + Sync>;

/// Command table shared between a manager, its plugin APIs and its dispatcher
pub type SharedCommandTable = Arc<RwLock<CommandTable>>;

/// A chat command bound to exactly one handler
#[derive(Clone)]
pub struct Command {
    pub name: String,
    handler: CommandHandler,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&IncomingMessage, &[String]) -> Result<(), CommandError> + Send + Sync + 'static,
    {
        Self::with_handler(name, Arc::new(handler))
    }

    /// Bind a handler that may be shared with other command names
    pub fn with_handler(name: impl Into<String>, handler: CommandHandler) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    pub fn invoke(&self, message: &IncomingMessage, args: &[String]) -> Result<(), CommandError> {
        (self.handler)(message, args)
    }

    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Command table keyed on exact, case-sensitive names
#[derive(Default, Clone, Debug)]
pub struct CommandTable {
    commands: HashMap<String, Command>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a command; an existing binding for the same name is kept
    pub fn register(&mut self, command: Command) -> Result<(), CommandError> {
        if self.commands.contains_key(&command.name) {
            return Err(CommandError::AlreadyRegistered(vec![command.name]));
        }
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> CommandHandler {
        Arc::new(|_: &IncomingMessage, _: &[String]| Ok(()))
    }

    #[test]
    fn test_first_registration_wins() {
        let mut table = CommandTable::new();
        let first = noop();
        table.register(Command::with_handler("kill", first.clone())).unwrap();

        let err = table.register(Command::with_handler("kill", noop())).unwrap_err();
        assert_eq!(err, CommandError::AlreadyRegistered(vec!["kill".to_string()]));
        assert!(Arc::ptr_eq(table.get("kill").unwrap().handler(), &first));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut table = CommandTable::new();
        table.register(Command::with_handler("Ping", noop())).unwrap();
        assert!(table.contains("Ping"));
        assert!(!table.contains("ping"));
    }
}
