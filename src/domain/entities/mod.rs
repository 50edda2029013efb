//! Domain entities - Core business objects shared by the host and its plugins

pub mod command;
pub mod event;
pub mod message;
pub mod user;

pub use command::{Command, CommandHandler, CommandTable, SharedCommandTable};
pub use event::{Event, EventPayload, EventType, Reaction};
pub use message::{Channel, IncomingMessage, OutgoingMessage};
pub use user::User;
