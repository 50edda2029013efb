use async_trait::async_trait;
use std::collections::HashMap;

use crate::application::errors::{BotError, ListenerError};
use crate::application::events::Listener;
use crate::domain::entities::{EventType, User};

/// Remote client trait - abstraction for messaging service connections
///
/// Implementations own an event listener registry and feed every event
/// they receive through it.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Connect and process events until `disconnect` is called
    async fn connect(&self) -> Result<(), BotError>;

    /// Ask a running connection to stop
    fn disconnect(&self) -> Result<(), BotError>;

    /// Subscribe a listener to an event type
    fn add_event_listener(&self, event_type: EventType, listener: Listener) -> Result<(), ListenerError>;

    /// Unsubscribe a previously added listener, matched by reference
    fn remove_event_listener(&self, event_type: EventType, listener: &Listener) -> Result<(), ListenerError>;

    /// Snapshot of the registered listeners
    fn event_listeners(&self) -> HashMap<EventType, Vec<Listener>>;

    /// The account this client is connected as, once known
    fn account(&self) -> Option<User>;
}
