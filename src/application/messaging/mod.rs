//! Message handling - Command parsing and dispatch

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{CommandDispatcher, DispatchOutcome};
pub use parser::{CommandParser, ParsedCommand};
