//! Remote client adapters
//!
//! Each adapter owns a `ClientCore`: the listener registry, the connected
//! account, the outgoing message queue and the shutdown signal.

pub mod console;
pub mod telegram;

pub use console::ConsoleClient;
pub use telegram::TelegramClient;

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};

use crate::application::errors::{BotError, ListenerError};
use crate::application::events::{EventListenerRegistry, Listener};
use crate::domain::entities::{Channel, Event, EventType, OutgoingMessage, User};
use crate::domain::entities::message::Outbox;

/// State shared by every remote client implementation
pub struct ClientCore {
    registry: EventListenerRegistry,
    account: RwLock<Option<User>>,
    outbox: Outbox,
    outgoing: Mutex<Option<mpsc::UnboundedReceiver<OutgoingMessage>>>,
    shutdown: watch::Sender<bool>,
}

impl ClientCore {
    pub fn new() -> Self {
        let (outbox, outgoing) = mpsc::unbounded_channel();
        let (shutdown, _) = watch::channel(false);

        Self {
            registry: EventListenerRegistry::new(),
            account: RwLock::new(None),
            outbox,
            outgoing: Mutex::new(Some(outgoing)),
            shutdown,
        }
    }

    pub fn registry(&self) -> &EventListenerRegistry {
        &self.registry
    }

    /// A channel whose replies go through this client
    pub fn channel(&self, id: impl Into<String>) -> Channel {
        Channel::new(id).with_outbox(self.outbox.clone())
    }

    /// Take the outgoing queue; only one connection may drain it
    pub fn take_outgoing(&self) -> Result<mpsc::UnboundedReceiver<OutgoingMessage>, BotError> {
        self.outgoing.lock()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?
            .take()
            .ok_or_else(|| BotError::Internal("Client is already connected".to_string()))
    }

    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Record the connected account and announce it to listeners
    pub fn connected(&self, account: User) {
        self.registry.set_self_id(Some(account.id.clone()));
        if let Ok(mut current) = self.account.write() {
            *current = Some(account.clone());
        }
        self.emit(&Event::ready(account));
    }

    pub fn account(&self) -> Option<User> {
        self.account.read().ok().and_then(|a| a.clone())
    }

    pub fn emit(&self, event: &Event) -> usize {
        self.registry.dispatch(event)
    }

    pub fn add_event_listener(&self, event_type: EventType, listener: Listener) -> Result<(), ListenerError> {
        self.registry.add(event_type, listener)
    }

    pub fn remove_event_listener(&self, event_type: EventType, listener: &Listener) -> Result<(), ListenerError> {
        self.registry.remove(event_type, listener)
    }

    pub fn event_listeners(&self) -> HashMap<EventType, Vec<Listener>> {
        self.registry.listeners()
    }
}

impl Default for ClientCore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_queue_taken_once() {
        let core = ClientCore::new();
        let mut outgoing = core.take_outgoing().unwrap();
        assert!(core.take_outgoing().is_err());

        core.channel("room").send_message("hello").unwrap();
        assert_eq!(outgoing.try_recv().unwrap().text, "hello");
    }

    #[test]
    fn test_connected_account_is_filtered() {
        let core = ClientCore::new();
        core.connected(User::new("bot").bot());
        assert_eq!(core.account().unwrap().id, "bot");
        assert_eq!(core.registry().self_id().as_deref(), Some("bot"));
    }

    #[test]
    fn test_shutdown_signal() {
        let core = ClientCore::new();
        let signal = core.shutdown_signal();
        assert!(!*signal.borrow());
        core.request_shutdown();
        assert!(*signal.borrow());
    }
}
