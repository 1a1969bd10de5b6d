//! Terminal-side state of the chat: transcript, user list and input field.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders};
use tokio::sync::{mpsc, Mutex};
use tui_textarea::{CursorMove, Input, TextArea};

use crate::core::config::Config;
use crate::core::event::{Ban, Broadcast, ChatMessage, Mute, RoomAction, SubOnly, User};
use crate::core::render::{ChatRenderer, InputDisplay};
use crate::ui::chat_loop::UiEvent;
use crate::ui::theme::Theme;
use crate::ui::transcript;
use crate::utils::input::sanitize_text_input;

const INPUT_TITLE: &str = "Message (Enter to send, /help for help, Ctrl+C to quit)";

pub struct ChatView {
    pub theme: Theme,
    config: Arc<Config>,
    lines: VecDeque<Line<'static>>,
    scrollback: usize,
    users: Vec<User>,
    textarea: TextArea<'static>,
    /// Rows scrolled up from the newest line; 0 follows new messages.
    scroll_offset: usize,
    exit_requested: bool,
}

impl ChatView {
    pub fn new(config: Arc<Config>, theme: Theme) -> Self {
        let scrollback = config.scrollback();
        let mut view = Self {
            theme,
            config,
            lines: VecDeque::new(),
            scrollback,
            users: Vec::new(),
            textarea: TextArea::default(),
            scroll_offset: 0,
            exit_requested: false,
        };
        view.configure_textarea();
        view
    }

    fn configure_textarea(&mut self) {
        let textarea_style = self
            .theme
            .input_text_style
            .patch(ratatui::style::Style::default().bg(self.theme.background_color));
        self.textarea.set_style(textarea_style);
        self.textarea
            .set_cursor_style(self.theme.input_cursor_style);
        self.textarea
            .set_cursor_line_style(self.theme.input_cursor_line_style);
        self.textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.input_border_style)
                .title(INPUT_TITLE)
                .title_style(self.theme.input_title_style),
        );
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lines(&self) -> &VecDeque<Line<'static>> {
        &self.lines
    }

    /// Append a line, dropping the oldest once scrollback is full.
    pub fn push_line(&mut self, line: Line<'static>) {
        self.lines.push_back(line);
        while self.lines.len() > self.scrollback {
            self.lines.pop_front();
        }
    }

    pub fn push_system_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            let line = transcript::system_line(line.as_ref(), &self.theme);
            self.push_line(line);
        }
    }

    pub fn clear_transcript(&mut self) {
        self.lines.clear();
        self.scroll_offset = 0;
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn set_users(&mut self, users: Vec<User>) {
        self.users = users;
    }

    pub fn textarea(&self) -> &TextArea<'static> {
        &self.textarea
    }

    /// Feed an editing key to the input field.
    pub fn input(&mut self, input: impl Into<Input>) {
        self.textarea.input(input);
    }

    /// Insert pasted text as a single line.
    pub fn paste(&mut self, text: &str) {
        let clean = sanitize_text_input(text);
        self.textarea.insert_str(clean);
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    /// Clamp the offset once the renderer knows how many rows exist.
    pub fn clamp_scroll(&mut self, max_offset: usize) {
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    fn set_input_text(&mut self, text: &str) {
        self.textarea = if text.is_empty() {
            TextArea::default()
        } else {
            TextArea::from([text.to_string()])
        };
        self.textarea.move_cursor(CursorMove::End);
        self.configure_textarea();
    }
}

impl InputDisplay for ChatView {
    fn input_text(&self) -> String {
        self.textarea.lines().join(" ")
    }

    fn clear_input(&mut self) {
        self.set_input_text("");
    }

    fn show_history_entry(&mut self, text: &str) {
        self.set_input_text(text);
    }
}

/// Renders events into a shared [`ChatView`] and asks the chat loop to redraw.
pub struct ViewRenderer {
    view: Arc<Mutex<ChatView>>,
    redraw: mpsc::UnboundedSender<UiEvent>,
}

impl ViewRenderer {
    pub fn new(view: Arc<Mutex<ChatView>>, redraw: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { view, redraw }
    }

    async fn append<F>(&self, build: F)
    where
        F: FnOnce(&Config, &Theme) -> Line<'static>,
    {
        {
            let mut view = self.view.lock().await;
            let line = build(view.config.as_ref(), &view.theme);
            view.push_line(line);
        }
        let _ = self.redraw.send(UiEvent::RequestRedraw);
    }
}

#[async_trait]
impl ChatRenderer for ViewRenderer {
    async fn render_chat(&self, message: &ChatMessage) {
        self.append(|config, theme| transcript::chat_line(message, config, theme))
            .await;
    }

    async fn render_error(&self, text: &str) {
        self.append(|_, theme| transcript::error_line(text, theme))
            .await;
    }

    async fn render_mute(&self, mute: &Mute) {
        self.append(|_, theme| transcript::mute_line(mute, theme))
            .await;
    }

    async fn render_unmute(&self, mute: &Mute) {
        self.append(|_, theme| transcript::unmute_line(mute, theme))
            .await;
    }

    async fn render_ban(&self, ban: &Ban) {
        self.append(|_, theme| transcript::ban_line(ban, theme))
            .await;
    }

    async fn render_unban(&self, ban: &Ban) {
        self.append(|_, theme| transcript::unban_line(ban, theme))
            .await;
    }

    async fn render_join(&self, action: &RoomAction) {
        self.append(|_, theme| transcript::join_line(action, theme))
            .await;
    }

    async fn render_quit(&self, action: &RoomAction) {
        self.append(|_, theme| transcript::quit_line(action, theme))
            .await;
    }

    async fn render_sub_only(&self, sub_only: &SubOnly) {
        self.append(|_, theme| transcript::sub_only_line(sub_only, theme))
            .await;
    }

    async fn render_broadcast(&self, broadcast: &Broadcast) {
        self.append(|_, theme| transcript::broadcast_line(broadcast, theme))
            .await;
    }

    async fn render_users(&self, users: &[User]) {
        self.view.lock().await.set_users(users.to_vec());
        let _ = self.redraw.send(UiEvent::RequestRedraw);
    }
}
