//! Command parser - Splits prefixed text into a command name and arguments

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// A match means the text is a command invocation
static COMMAND_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[!.]").expect("valid command regex"));

/// A command name and its whitespace-separated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Parses `!name arg...` and `.name arg...` messages
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    pub fn is_command(&self, text: &str) -> bool {
        COMMAND_PREFIX.is_match(text)
    }

    /// Parse a command; `None` when the text has no command prefix
    ///
    /// No quoting or escaping: arguments are a plain whitespace split.
    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        if !self.is_command(text) {
            return None;
        }

        let mut parts = text.split_whitespace();
        let name = parts
            .next()
            .map(|first| COMMAND_PREFIX.replace(first, "").into_owned())
            .unwrap_or_default();
        let args = parts.map(str::to_string).collect();

        Some(ParsedCommand { name, args })
    }
}
