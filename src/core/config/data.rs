use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings read from `config.toml`.
///
/// Every field is optional on disk; the accessors in `defaults.rs` resolve
/// the effective value.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Login token, sent to the server as the `authtoken` cookie.
    pub auth_token: Option<String>,
    /// Websocket endpoint of the chat server.
    pub url: Option<String>,
    /// Own nick, used to highlight mentions and own messages.
    pub username: Option<String>,
    /// Extra case-insensitive terms that highlight a message.
    #[serde(default)]
    pub highlighted: Vec<String>,
    /// Render join and leave notices in the transcript.
    pub show_join_leave: Option<bool>,
    /// Number of transcript lines kept in memory.
    pub scrollback: Option<usize>,
    /// Capacity of the event channel between the session and the dispatcher.
    pub event_capacity: Option<usize>,
    /// Interval between roster checks while waiting for the first user list.
    pub startup_poll_ms: Option<u64>,
    /// Give up waiting for the first user list after this many seconds; 0 waits forever.
    pub startup_timeout_secs: Option<u64>,
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
