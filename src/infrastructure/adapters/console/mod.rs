//! Console adapter for development/testing

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::ClientCore;
use crate::application::errors::{BotError, ListenerError};
use crate::application::events::Listener;
use crate::domain::entities::{Event, EventType, IncomingMessage, OutgoingMessage, User};
use crate::domain::traits::RemoteClient;

/// Channel id used for every console message
pub const CONSOLE_CHANNEL: &str = "console";

/// Console client: stdin lines become messages, replies are printed
pub struct ConsoleClient {
    core: ClientCore,
    bot_name: String,
    user: User,
}

impl ConsoleClient {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            core: ClientCore::new(),
            bot_name: bot_name.into(),
            user: User::new("console-user").with_username("you"),
        }
    }

    /// Run a line of input through the listeners as a new message
    pub fn submit(&self, line: &str) -> usize {
        let message = IncomingMessage::new(self.user.clone(), self.core.channel(CONSOLE_CHANNEL), line)
            .with_platform("console");
        self.core.emit(&Event::message_create(message))
    }

    fn print(message: &OutgoingMessage) {
        println!("[BOT] {}", message.text);
    }
}

impl Default for ConsoleClient {
    fn default() -> Self {
        Self::new("tendril-bot")
    }
}

#[async_trait]
impl RemoteClient for ConsoleClient {
    async fn connect(&self) -> Result<(), BotError> {
        let mut outgoing = self.core.take_outgoing()?;
        let mut shutdown = self.core.shutdown_signal();

        tracing::info!("Starting console bot (dev mode)");
        self.core.connected(User::new("console-bot").with_username(self.bot_name.clone()).bot());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while !*shutdown.borrow() {
            tokio::select! {
                _ = shutdown.changed() => break,
                Some(message) = outgoing.recv() => Self::print(&message),
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if !line.is_empty() {
                            self.submit(line);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => return Err(BotError::Network(format!("Failed to read stdin: {}", e))),
                },
            }
        }

        while let Ok(message) = outgoing.try_recv() {
            Self::print(&message);
        }

        self.core.emit(&Event::disconnected(None));
        Ok(())
    }

    fn disconnect(&self) -> Result<(), BotError> {
        self.core.request_shutdown();
        Ok(())
    }

    fn add_event_listener(&self, event_type: EventType, listener: Listener) -> Result<(), ListenerError> {
        self.core.add_event_listener(event_type, listener)
    }

    fn remove_event_listener(&self, event_type: EventType, listener: &Listener) -> Result<(), ListenerError> {
        self.core.remove_event_listener(event_type, listener)
    }

    fn event_listeners(&self) -> HashMap<EventType, Vec<Listener>> {
        self.core.event_listeners()
    }

    fn account(&self) -> Option<User> {
        self.core.account()
    }
}
