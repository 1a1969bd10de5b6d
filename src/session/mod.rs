//! Connection to the chat service.
//!
//! The rest of the crate only talks to [`ChatSession`]. [`dgg`] provides the
//! websocket implementation used by the binary.

pub mod dgg;

use std::fmt;

use async_trait::async_trait;

use crate::core::channel::EventSender;
use crate::core::event::User;

#[derive(Debug)]
pub enum SessionError {
    /// The connection could not be established.
    Connect(String),
    /// An operation needed an open connection.
    NotConnected,
    /// A frame could not be written.
    Send(String),
    /// The server rejected or could not parse our request.
    Protocol(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Connect(reason) => write!(f, "failed to connect: {reason}"),
            SessionError::NotConnected => write!(f, "not connected"),
            SessionError::Send(reason) => write!(f, "failed to send: {reason}"),
            SessionError::Protocol(reason) => write!(f, "protocol error: {reason}"),
        }
    }
}

impl std::error::Error for SessionError {}

#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Connect and start delivering notifications into `events`, one typed
    /// [`ChatEvent`](crate::core::event::ChatEvent) per notification.
    async fn open(&self, events: EventSender) -> Result<(), SessionError>;

    /// Snapshot of the users currently in the room. Empty until the server
    /// has sent its first user list.
    fn users(&self) -> Vec<User>;

    async fn send_message(&self, text: &str) -> Result<(), SessionError>;

    async fn close(&self) -> Result<(), SessionError>;
}
