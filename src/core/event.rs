//! Typed notifications produced by a chat session.
//!
//! Every notification the session can deliver is one variant of [`ChatEvent`].
//! Events are built once by a producer, moved through the event channel and
//! consumed exactly once by the dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat participant as reported by the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub nick: String,
    /// Feature flags such as `admin`, `moderator`, `subscriber` or `bot`.
    #[serde(default)]
    pub features: Vec<String>,
}

impl User {
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            features: Vec::new(),
        }
    }

    pub fn with_features<I, S>(nick: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nick: nick.into(),
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f.eq_ignore_ascii_case(feature))
    }

    pub fn role(&self) -> UserRole {
        if self.has_feature("admin") {
            UserRole::Admin
        } else if self.has_feature("moderator") {
            UserRole::Moderator
        } else if self.has_feature("bot") {
            UserRole::Bot
        } else if self.has_feature("subscriber") {
            UserRole::Subscriber
        } else {
            UserRole::Regular
        }
    }
}

/// Display rank derived from a user's feature flags, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserRole {
    Admin,
    Moderator,
    Bot,
    Subscriber,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: User,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

/// A mute or unmute issued by a moderator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mute {
    pub moderator: User,
    pub target: String,
    pub duration_secs: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

/// A ban or unban issued by a moderator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ban {
    pub moderator: User,
    pub target: String,
    pub reason: Option<String>,
    pub duration_secs: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

/// A user entering or leaving the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomAction {
    pub user: User,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubOnly {
    pub moderator: User,
    pub enabled: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ping {
    pub timestamp: DateTime<Utc>,
}

/// One notification from the session.
///
/// `Unknown` carries frames the session could not classify. The dispatcher
/// ignores it so newer servers can add event kinds without breaking older
/// clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Message(ChatMessage),
    Error(String),
    Mute(Mute),
    Unmute(Mute),
    Ban(Ban),
    Unban(Ban),
    Join(RoomAction),
    Quit(RoomAction),
    SubOnly(SubOnly),
    Broadcast(Broadcast),
    Ping(Ping),
    Unknown { kind: String, payload: String },
}

impl ChatEvent {
    /// Short kind label used in logs.
    pub fn kind(&self) -> &str {
        match self {
            ChatEvent::Message(_) => "message",
            ChatEvent::Error(_) => "error",
            ChatEvent::Mute(_) => "mute",
            ChatEvent::Unmute(_) => "unmute",
            ChatEvent::Ban(_) => "ban",
            ChatEvent::Unban(_) => "unban",
            ChatEvent::Join(_) => "join",
            ChatEvent::Quit(_) => "quit",
            ChatEvent::SubOnly(_) => "subonly",
            ChatEvent::Broadcast(_) => "broadcast",
            ChatEvent::Ping(_) => "ping",
            ChatEvent::Unknown { kind, .. } => kind,
        }
    }

    pub fn is_presence(&self) -> bool {
        matches!(self, ChatEvent::Join(_) | ChatEvent::Quit(_))
    }
}
