use std::time::Duration;

use crate::core::channel::DEFAULT_EVENT_CAPACITY;
use crate::core::config::data::Config;

pub const DEFAULT_URL: &str = "wss://chat.destiny.gg/ws";
pub const DEFAULT_SCROLLBACK: usize = 2000;
pub const DEFAULT_STARTUP_POLL_MS: u64 = 300;
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 30;

impl Config {
    pub fn url(&self) -> &str {
        self.url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_URL)
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }

    pub fn show_join_leave(&self) -> bool {
        self.show_join_leave.unwrap_or(false)
    }

    pub fn scrollback(&self) -> usize {
        self.scrollback.unwrap_or(DEFAULT_SCROLLBACK).max(1)
    }

    pub fn event_capacity(&self) -> usize {
        self.event_capacity.unwrap_or(DEFAULT_EVENT_CAPACITY).max(1)
    }

    pub fn startup_poll_interval(&self) -> Duration {
        Duration::from_millis(self.startup_poll_ms.unwrap_or(DEFAULT_STARTUP_POLL_MS).max(1))
    }

    /// `None` means wait for the first user list indefinitely.
    pub fn startup_timeout(&self) -> Option<Duration> {
        match self
            .startup_timeout_secs
            .unwrap_or(DEFAULT_STARTUP_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// True when `text` mentions the own nick or any highlighted term.
    pub fn is_highlighted(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        let username = self.username().trim();
        if !username.is_empty() && haystack.contains(&username.to_lowercase()) {
            return true;
        }
        self.highlighted
            .iter()
            .map(|term| term.trim())
            .filter(|term| !term.is_empty())
            .any(|term| haystack.contains(&term.to_lowercase()))
    }

    pub fn is_own_nick(&self, nick: &str) -> bool {
        let username = self.username().trim();
        !username.is_empty() && username.eq_ignore_ascii_case(nick)
    }
}
