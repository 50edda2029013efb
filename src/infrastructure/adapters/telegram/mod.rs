//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::ClientCore;
use crate::application::errors::{BotError, ListenerError};
use crate::application::events::Listener;
use crate::domain::entities::{Event, EventType, IncomingMessage, OutgoingMessage, User};
use crate::domain::traits::RemoteClient;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Wait before polling again after a failed request
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramUser {
    pub id: i64,
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl From<&TelegramUser> for User {
    fn from(user: &TelegramUser) -> Self {
        let mut converted = User::new(user.id.to_string());
        converted.username = user.username.clone();
        converted.is_bot = user.is_bot;
        converted
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
    pub title: Option<String>,
}

#[derive(Deserialize)]
struct Response<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl<T> Response<T> {
    fn into_result(self) -> Result<T, BotError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Network(format!(
                "Telegram API error: {}",
                self.description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }
}

/// Telegram client using long polling
pub struct TelegramClient {
    token: String,
    client: Client,
    poll_timeout: u64,
    core: ClientCore,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>, poll_timeout: u64) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            poll_timeout,
            core: ClientCore::new(),
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn call<Req: Serialize, Res: for<'de> Deserialize<'de>>(&self, method: &str, request: &Req) -> Result<Res, BotError> {
        let response = self.client
            .post(self.api_url(method))
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: Response<Res> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        data.into_result()
    }

    /// Fetch the bot account from Telegram
    pub async fn fetch_account(&self) -> Result<User, BotError> {
        let me: TelegramUser = self.call("getMe", &serde_json::json!({})).await?;
        Ok(User::from(&me))
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout,
            allowed_updates: vec!["message".to_string(), "edited_message".to_string()],
        };

        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update]) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(0)
    }

    /// Send a message via Telegram API
    pub async fn send_message_api(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: &'a str,
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        let result: MessageResult = self.call("sendMessage", &SendMessageRequest { chat_id, text }).await?;
        Ok(result.message_id.to_string())
    }

    /// Convert an update into a host event; updates without text are dropped
    pub fn to_event(&self, update: &Update) -> Option<Event> {
        let (message, edited) = match (&update.message, &update.edited_message) {
            (Some(message), _) => (message, false),
            (None, Some(message)) => (message, true),
            (None, None) => return None,
        };

        let author = User::from(message.from.as_ref()?);
        let text = message.text.clone()?;

        let mut channel = self.core.channel(message.chat.id.to_string());
        channel.name = message.chat.title.clone();

        let mut incoming = IncomingMessage::new(author, channel, text)
            .with_id(message.message_id.to_string())
            .with_platform("telegram");
        if let Ok(raw) = serde_json::to_value(message) {
            incoming = incoming.with_raw(raw);
        }

        Some(if edited {
            Event::message_update(incoming)
        } else {
            Event::message_create(incoming)
        })
    }

    async fn deliver(&self, message: OutgoingMessage) {
        if let Err(e) = self.send_message_api(&message.channel_id, &message.text).await {
            tracing::error!("Failed to send message to {}: {}", message.channel_id, e);
        }
    }
}

#[async_trait]
impl RemoteClient for TelegramClient {
    async fn connect(&self) -> Result<(), BotError> {
        let mut outgoing = self.core.take_outgoing()?;
        let mut shutdown = self.core.shutdown_signal();

        let account = self.fetch_account().await?;
        tracing::info!("Bot started: @{}", account.display_name());
        self.core.connected(account);

        let mut offset: i64 = 0;

        while !*shutdown.borrow() {
            tokio::select! {
                _ = shutdown.changed() => break,
                Some(message) = outgoing.recv() => self.deliver(message).await,
                updates = self.get_updates(offset) => match updates {
                    Ok(updates) => {
                        offset = offset.max(Self::get_next_offset(&updates));
                        for event in updates.iter().filter_map(|u| self.to_event(u)) {
                            self.core.emit(&event);
                        }
                    }
                    Err(e) => {
                        tracing::error!("Lost Connection: {}", e);
                        tracing::error!("[Delay: {:?}] Attempting to reconnect...", RECONNECT_DELAY);
                        tokio::select! {
                            _ = shutdown.changed() => break,
                            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                        }
                    }
                },
            }
        }

        while let Ok(message) = outgoing.try_recv() {
            self.deliver(message).await;
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
