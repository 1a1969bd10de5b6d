use ratatui::style::{Color, Modifier, Style};

use crate::core::event::UserRole;

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,

    // Transcript
    pub timestamp_style: Style,
    pub text_style: Style,
    pub own_nick_style: Style,
    pub highlight_style: Style,
    pub admin_nick_style: Style,
    pub moderator_nick_style: Style,
    pub bot_nick_style: Style,
    pub subscriber_nick_style: Style,
    pub regular_nick_style: Style,
    pub error_style: Style,
    pub moderation_style: Style,
    pub presence_style: Style,
    pub broadcast_style: Style,
    pub system_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub users_border_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
    pub input_cursor_line_style: Style,
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Reset,

            timestamp_style: Style::default().fg(Color::DarkGray),
            text_style: Style::default().fg(Color::Gray),
            own_nick_style: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            highlight_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow),
            admin_nick_style: Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
            moderator_nick_style: Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
            bot_nick_style: Style::default().fg(Color::LightMagenta),
            subscriber_nick_style: Style::default().fg(Color::LightBlue),
            regular_nick_style: Style::default().fg(Color::Cyan),
            error_style: Style::default().fg(Color::Red),
            moderation_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
            presence_style: Style::default().fg(Color::DarkGray),
            broadcast_style: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            system_text_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default().fg(Color::Gray),
            users_border_style: Style::default().fg(Color::DarkGray),
            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),
        }
    }

    pub fn nick_style(&self, role: UserRole) -> Style {
        match role {
            UserRole::Admin => self.admin_nick_style,
            UserRole::Moderator => self.moderator_nick_style,
            UserRole::Bot => self.bot_nick_style,
            UserRole::Subscriber => self.subscriber_nick_style,
            UserRole::Regular => self.regular_nick_style,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}
