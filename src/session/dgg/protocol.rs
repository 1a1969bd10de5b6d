//! Text frames of a destiny.gg-style chat server.
//!
//! Every frame is `TYPE <json>`. Types this client does not know become
//! [`ChatEvent::Unknown`] rather than errors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::event::{
    Ban, Broadcast, ChatEvent, ChatMessage, Mute, Ping, RoomAction, SubOnly, User,
};

#[derive(Debug)]
pub enum ProtocolError {
    Malformed {
        kind: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed { kind, source } => {
                write!(f, "malformed {kind} frame: {source}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Malformed { source, .. } => Some(source),
        }
    }
}

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// Full user list, sent once after connecting.
    Names {
        users: Vec<User>,
        connection_count: u64,
    },
    Event(ChatEvent),
}

#[derive(Debug, Deserialize)]
struct UserFrame {
    nick: String,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    duration: Option<u64>,
    #[serde(default)]
    reason: Option<String>,
}

impl UserFrame {
    fn user(&self) -> User {
        User {
            nick: self.nick.clone(),
            features: self.features.clone(),
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        from_millis(self.timestamp)
    }

    fn data(&self) -> String {
        self.data.clone().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct NamesFrame {
    #[serde(default, rename = "connectioncount")]
    connection_count: u64,
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct BroadcastFrame {
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    data: String,
}

/// Echo of a client `PING`; the server returns the payload unchanged.
#[derive(Debug, Deserialize)]
struct PongFrame {
    #[serde(alias = "data")]
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct OutgoingPing {
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    data: &'a str,
}

fn from_millis(millis: Option<i64>) -> DateTime<Utc> {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}

fn decode<'a, T: Deserialize<'a>>(kind: &str, payload: &'a str) -> Result<T, ProtocolError> {
    serde_json::from_str(payload).map_err(|source| ProtocolError::Malformed {
        kind: kind.to_string(),
        source,
    })
}

/// Split `TYPE {json}` into its parts. A frame without a payload yields `""`.
pub fn split_frame(frame: &str) -> (&str, &str) {
    match frame.split_once(' ') {
        Some((kind, payload)) => (kind, payload.trim()),
        None => (frame.trim(), ""),
    }
}

pub fn parse_frame(frame: &str) -> Result<Incoming, ProtocolError> {
    let (kind, payload) = split_frame(frame);
    let event = match kind {
        "NAMES" => {
            let names: NamesFrame = decode(kind, payload)?;
            return Ok(Incoming::Names {
                users: names.users,
                connection_count: names.connection_count,
            });
        }
        "MSG" => {
            let msg: UserFrame = decode(kind, payload)?;
            ChatEvent::Message(ChatMessage {
                author: msg.user(),
                body: msg.data(),
                timestamp: msg.timestamp(),
            })
        }
        "MUTE" | "UNMUTE" => {
            let frame: UserFrame = decode(kind, payload)?;
            let mute = Mute {
                moderator: frame.user(),
                target: frame.data(),
                duration_secs: frame.duration,
                timestamp: frame.timestamp(),
            };
            if kind == "MUTE" {
                ChatEvent::Mute(mute)
            } else {
                ChatEvent::Unmute(mute)
            }
        }
        "BAN" | "UNBAN" => {
            let frame: UserFrame = decode(kind, payload)?;
            let ban = Ban {
                moderator: frame.user(),
                target: frame.data(),
                reason: frame.reason.clone().filter(|reason| !reason.is_empty()),
                duration_secs: frame.duration,
                timestamp: frame.timestamp(),
            };
            if kind == "BAN" {
                ChatEvent::Ban(ban)
            } else {
                ChatEvent::Unban(ban)
            }
        }
        "JOIN" | "QUIT" => {
            let frame: UserFrame = decode(kind, payload)?;
            let action = RoomAction {
                user: frame.user(),
                timestamp: frame.timestamp(),
            };
            if kind == "JOIN" {
                ChatEvent::Join(action)
            } else {
                ChatEvent::Quit(action)
            }
        }
        "SUBONLY" => {
            let frame: UserFrame = decode(kind, payload)?;
            ChatEvent::SubOnly(SubOnly {
                moderator: frame.user(),
                enabled: frame.data().eq_ignore_ascii_case("on"),
                timestamp: frame.timestamp(),
            })
        }
        "BROADCAST" => {
            let frame: BroadcastFrame = decode(kind, payload)?;
            ChatEvent::Broadcast(Broadcast {
                text: frame.data,
                timestamp: from_millis(frame.timestamp),
            })
        }
        "PONG" => {
            let frame: PongFrame = decode(kind, payload)?;
            ChatEvent::Ping(Ping {
                timestamp: from_millis(Some(frame.timestamp)),
            })
        }
        "ERR" => {
            // Usually a JSON string such as "needlogin"; keep raw text otherwise.
            let text = serde_json::from_str::<String>(payload).unwrap_or_else(|_| payload.to_string());
            ChatEvent::Error(describe_error(&text))
        }
        _ => ChatEvent::Unknown {
            kind: kind.to_string(),
            payload: payload.to_string(),
        },
    };
    Ok(Incoming::Event(event))
}

/// Human-readable text for the server's error codes.
pub fn describe_error(code: &str) -> String {
    match code {
        "needlogin" => "you must be logged in to chat (set auth_token)".to_string(),
        "muted" => "you are muted".to_string(),
        "banned" => "you are banned".to_string(),
        "throttled" => "slow down, you are sending too fast".to_string(),
        "duplicate" => "duplicate message".to_string(),
        "submode" => "the room is in subscriber-only mode".to_string(),
        "invalidmsg" => "message rejected as invalid".to_string(),
        other => other.to_string(),
    }
}

pub fn encode_message(text: &str) -> String {
    // Serializing a struct of one &str cannot fail.
    let payload = serde_json::to_string(&OutgoingMessage { data: text })
        .unwrap_or_else(|_| String::from("{\"data\":\"\"}"));
    format!("MSG {payload}")
}

/// Latency probe; the server answers with a `PONG` carrying the same payload.
pub fn encode_ping(sent_at: DateTime<Utc>) -> String {
    let ping = OutgoingPing {
        timestamp: sent_at.timestamp_millis(),
    };
    match serde_json::to_string(&ping) {
        Ok(payload) => format!("PING {payload}"),
        Err(_) => format!("PING {{\"timestamp\":{}}}", ping.timestamp),
    }
}
