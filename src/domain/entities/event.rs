use super::{IncomingMessage, User};
use crate::application::errors::ListenerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categories of notifications emitted by the remote client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Ready,
    Disconnected,
    MessageCreate,
    MessageUpdate,
    MessageDelete,
    MessageReactionAdd,
    MessageReactionRemove,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::Ready,
        EventType::Disconnected,
        EventType::MessageCreate,
        EventType::MessageUpdate,
        EventType::MessageDelete,
        EventType::MessageReactionAdd,
        EventType::MessageReactionRemove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Ready => "READY",
            EventType::Disconnected => "DISCONNECTED",
            EventType::MessageCreate => "MESSAGE_CREATE",
            EventType::MessageUpdate => "MESSAGE_UPDATE",
            EventType::MessageDelete => "MESSAGE_DELETE",
            EventType::MessageReactionAdd => "MESSAGE_REACTION_ADD",
            EventType::MessageReactionRemove => "MESSAGE_REACTION_REMOVE",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ListenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ListenerError::InvalidEventType(s.to_string()))
    }
}

/// A reaction placed on or removed from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub message_id: String,
    pub channel_id: String,
    pub user: User,
    pub emoji: String,
}

#[derive(Debug, Clone)]
pub enum EventPayload {
    Message(IncomingMessage),
    MessageDeleted { channel_id: String, message_id: String },
    Reaction(Reaction),
    /// The account the client is connected as
    Session { account: User },
    Disconnected { reason: Option<String> },
}

/// A notification from the remote client
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    /// Account that caused the event, used to drop the bot's own events
    pub user: Option<User>,
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    fn new(event_type: EventType, user: Option<User>, payload: EventPayload) -> Self {
        Self {
            event_type,
            user,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn message_create(message: IncomingMessage) -> Self {
        Self::new(EventType::MessageCreate, Some(message.author.clone()), EventPayload::Message(message))
    }

    pub fn message_update(message: IncomingMessage) -> Self {
        Self::new(EventType::MessageUpdate, Some(message.author.clone()), EventPayload::Message(message))
    }

    pub fn message_delete(channel_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self::new(
            EventType::MessageDelete,
            None,
            EventPayload::MessageDeleted {
                channel_id: channel_id.into(),
                message_id: message_id.into(),
            },
        )
    }

    pub fn reaction_add(reaction: Reaction) -> Self {
        Self::new(EventType::MessageReactionAdd, Some(reaction.user.clone()), EventPayload::Reaction(reaction))
    }

    pub fn reaction_remove(reaction: Reaction) -> Self {
        Self::new(EventType::MessageReactionRemove, Some(reaction.user.clone()), EventPayload::Reaction(reaction))
    }

    pub fn ready(account: User) -> Self {
        Self::new(EventType::Ready, None, EventPayload::Session { account })
    }

    pub fn disconnected(reason: Option<String>) -> Self {
        Self::new(EventType::Disconnected, None, EventPayload::Disconnected { reason })
    }

    pub fn message(&self) -> Option<&IncomingMessage> {
        match &self.payload {
            EventPayload::Message(message) => Some(message),
            _ => None,
        }
    }
}
