//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Listener error: {0}")]
    Listener(#[from] ListenerError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Event listener callbacks have not been set")]
    NotWired,

    #[error("Not connected")]
    NotConnected,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Plugin discovery and registration errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Error loading plugins from {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("No plugin entry point named '{0}'")]
    UnknownEntry(String),

    #[error("A plugin with name {0} has already been registered")]
    Duplicate(String),

    #[error("Registration failed: {0}")]
    Registration(String),

    #[error("Invalid plugin settings: {0}")]
    Settings(String),
}

/// Event listener registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    #[error("Not a valid event type: {0}")]
    InvalidEventType(String),

    #[error("No matching listener function found for event {0}")]
    NotFound(String),

    #[error("Event listener callbacks have not been set")]
    NotWired,

    #[error("Plugin host is no longer running")]
    HostGone,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command registration and execution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command already registered: {}", .0.join(", "))]
    AlreadyRegistered(Vec<String>),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
