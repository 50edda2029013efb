use super::User;
use crate::application::errors::BotError;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// A message queued for delivery by the remote client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub channel_id: String,
    pub text: String,
}

/// Sender half of a client's outgoing message queue
pub type Outbox = mpsc::UnboundedSender<OutgoingMessage>;

/// A conversation a message was posted in
///
/// Channels carry the send capability handed out by the client that produced
/// them. A channel built without an outbox cannot send.
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: String,
    pub name: Option<String>,
    outbox: Option<Outbox>,
}

impl Channel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            outbox: None,
        }
    }

    pub fn with_outbox(mut self, outbox: Outbox) -> Self {
        self.outbox = Some(outbox);
        self
    }

    /// Queue a text message for this channel
    pub fn send_message(&self, text: impl Into<String>) -> Result<(), BotError> {
        let outbox = self.outbox.as_ref().ok_or(BotError::NotConnected)?;
        outbox
            .send(OutgoingMessage {
                channel_id: self.id.clone(),
                text: text.into(),
            })
            .map_err(|_| BotError::NotConnected)
    }
}

/// A text message received from the remote service
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: String,
    pub author: User,
    pub channel: Channel,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub platform: String,
    pub raw: Option<serde_json::Value>,
}

impl IncomingMessage {
    pub fn new(author: User, channel: Channel, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            author,
            channel,
            content: content.into(),
            timestamp: Utc::now(),
            platform: "unknown".to_string(),
            raw: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Reply in the channel this message came from
    pub fn reply(&self, text: impl Into<String>) -> Result<(), BotError> {
        self.channel.send_message(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_without_outbox_cannot_send() {
        let channel = Channel::new("general");
        assert!(matches!(channel.send_message("hi"), Err(BotError::NotConnected)));
    }

    #[test]
    fn test_reply_goes_to_source_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let msg = IncomingMessage::new(User::new("42"), Channel::new("room").with_outbox(tx), "!ping");

        msg.reply("pong").unwrap();

        let sent = rx.try_recv().unwrap();
        assert_eq!(sent.channel_id, "room");
        assert_eq!(sent.text, "pong");
    }
}
