//! Turns chat events into styled transcript lines.
//!
//! Lines are wrapped here rather than by ratatui's `Paragraph`, so the
//! renderer always knows how many rows the transcript occupies and can keep
//! the scroll offset anchored to the newest line.

use chrono::{DateTime, Local, Utc};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::core::config::Config;
use crate::core::event::{Ban, Broadcast, ChatMessage, Mute, RoomAction, SubOnly, User};
use crate::ui::theme::Theme;

fn timestamp_span(timestamp: &DateTime<Utc>, theme: &Theme) -> Span<'static> {
    let local = timestamp.with_timezone(&Local);
    Span::styled(format!("{} ", local.format("%H:%M")), theme.timestamp_style)
}

fn nick_span(user: &User, config: &Config, theme: &Theme) -> Span<'static> {
    let style = if config.is_own_nick(&user.nick) {
        theme.own_nick_style
    } else {
        theme.nick_style(user.role())
    };
    Span::styled(user.nick.clone(), style)
}

fn notice(timestamp: &DateTime<Utc>, text: String, style: Style, theme: &Theme) -> Line<'static> {
    Line::from(vec![timestamp_span(timestamp, theme), Span::styled(text, style)])
}

/// Compact duration such as `90s`, `10m`, `2h` or `3d`.
pub fn format_duration(secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    match secs {
        s if s >= DAY && s % DAY == 0 => format!("{}d", s / DAY),
        s if s >= HOUR && s % HOUR == 0 => format!("{}h", s / HOUR),
        s if s >= MINUTE && s % MINUTE == 0 => format!("{}m", s / MINUTE),
        s => format!("{s}s"),
    }
}

pub fn chat_line(message: &ChatMessage, config: &Config, theme: &Theme) -> Line<'static> {
    let own = config.is_own_nick(&message.author.nick);
    let body_style = if !own && config.is_highlighted(&message.body) {
        theme.highlight_style
    } else {
        theme.text_style
    };

    let mut spans = vec![timestamp_span(&message.timestamp, theme)];
    if let Some(action) = message.body.strip_prefix("/me ") {
        spans.push(Span::styled("* ", body_style));
        spans.push(nick_span(&message.author, config, theme));
        spans.push(Span::styled(format!(" {action}"), body_style));
    } else {
        spans.push(nick_span(&message.author, config, theme));
        spans.push(Span::styled(": ", theme.text_style));
        spans.push(Span::styled(message.body.clone(), body_style));
    }
    Line::from(spans)
}

pub fn error_line(text: &str, theme: &Theme) -> Line<'static> {
    notice(&Utc::now(), format!("error: {text}"), theme.error_style, theme)
}

pub fn mute_line(mute: &Mute, theme: &Theme) -> Line<'static> {
    let duration = mute
        .duration_secs
        .map(|secs| format!(" for {}", format_duration(secs)))
        .unwrap_or_default();
    let text = format!("{} muted {}{duration}", mute.moderator.nick, mute.target);
    notice(&mute.timestamp, text, theme.moderation_style, theme)
}

pub fn unmute_line(mute: &Mute, theme: &Theme) -> Line<'static> {
    let text = format!("{} unmuted {}", mute.moderator.nick, mute.target);
    notice(&mute.timestamp, text, theme.moderation_style, theme)
}

pub fn ban_line(ban: &Ban, theme: &Theme) -> Line<'static> {
    let duration = match ban.duration_secs {
        Some(secs) if secs > 0 => format!(" for {}", format_duration(secs)),
        _ => " permanently".to_string(),
    };
    let reason = ban
        .reason
        .as_deref()
        .map(|reason| format!(": {reason}"))
        .unwrap_or_default();
    let text = format!(
        "{} banned {}{duration}{reason}",
        ban.moderator.nick, ban.target
    );
    notice(&ban.timestamp, text, theme.moderation_style, theme)
}

pub fn unban_line(ban: &Ban, theme: &Theme) -> Line<'static> {
    let text = format!("{} unbanned {}", ban.moderator.nick, ban.target);
    notice(&ban.timestamp, text, theme.moderation_style, theme)
}

pub fn join_line(action: &RoomAction, theme: &Theme) -> Line<'static> {
    let text = format!("{} joined", action.user.nick);
    notice(&action.timestamp, text, theme.presence_style, theme)
}

pub fn quit_line(action: &RoomAction, theme: &Theme) -> Line<'static> {
    let text = format!("{} left", action.user.nick);
    notice(&action.timestamp, text, theme.presence_style, theme)
}

pub fn sub_only_line(sub_only: &SubOnly, theme: &Theme) -> Line<'static> {
    let state = if sub_only.enabled {
        "enabled"
    } else {
        "disabled"
    };
    let text = format!(
        "{} {state} subscriber-only mode",
        sub_only.moderator.nick
    );
    notice(&sub_only.timestamp, text, theme.moderation_style, theme)
}

pub fn broadcast_line(broadcast: &Broadcast, theme: &Theme) -> Line<'static> {
    notice(
        &broadcast.timestamp,
        broadcast.text.clone(),
        theme.broadcast_style,
        theme,
    )
}

/// Client-side notes such as `/help` output.
pub fn system_line(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), theme.system_text_style))
}

/// Display width of a line in terminal cells.
pub fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .flat_map(|span| span.content.chars())
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

/// Break `line` into rows no wider than `width` cells, keeping span styles.
///
/// Wrapping is per character; a wide character that does not fit moves to
/// the next row whole.
pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line_width(line) <= width {
        return vec![line.clone()];
    }

    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;

    for span in &line.spans {
        let mut chunk = String::new();
        for c in span.content.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width && used > 0 {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            chunk.push(c);
            used += w;
        }
        if !chunk.is_empty() {
            current.push(Span::styled(chunk, span.style));
        }
    }
    if !current.is_empty() {
        rows.push(Line::from(current));
    }
    rows
}
