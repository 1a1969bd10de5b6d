//! Boundaries between the core and whatever draws the chat.

use async_trait::async_trait;

use crate::core::event::{Ban, Broadcast, ChatMessage, Mute, RoomAction, SubOnly, User};

/// One call per visible event kind. Implementations append to a transcript,
/// update a user list, or record calls in tests.
#[async_trait]
pub trait ChatRenderer: Send + Sync {
    async fn render_chat(&self, message: &ChatMessage);
    async fn render_error(&self, text: &str);
    async fn render_mute(&self, mute: &Mute);
    async fn render_unmute(&self, mute: &Mute);
    async fn render_ban(&self, ban: &Ban);
    async fn render_unban(&self, ban: &Ban);
    async fn render_join(&self, action: &RoomAction);
    async fn render_quit(&self, action: &RoomAction);
    async fn render_sub_only(&self, sub_only: &SubOnly);
    async fn render_broadcast(&self, broadcast: &Broadcast);
    /// `users` is already sorted for display.
    async fn render_users(&self, users: &[User]);
}

/// The editable input line.
pub trait InputDisplay {
    fn input_text(&self) -> String;
    /// Empty the field and move its cursor and scroll back to the origin.
    fn clear_input(&mut self);
    /// Replace the field's content with a history entry.
    fn show_history_entry(&mut self, text: &str);
}
