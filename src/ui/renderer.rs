use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::event::User;
use crate::ui::theme::Theme;
use crate::ui::transcript::wrap_line;
use crate::ui::view::ChatView;

const INPUT_HEIGHT: u16 = 3;
const MIN_WIDTH_FOR_USERS: u16 = 48;
const USERS_MIN_WIDTH: u16 = 12;
const USERS_MAX_WIDTH: u16 = 26;

/// Rows of the transcript that fit in `height`, wrapped at `width`, ending
/// `offset` rows above the newest one.
///
/// Returns the rows and the largest offset that still shows a full page.
pub fn visible_rows<'a, I>(
    lines: I,
    width: usize,
    height: usize,
    offset: usize,
) -> (Vec<Line<'static>>, usize)
where
    I: DoubleEndedIterator<Item = &'a Line<'static>>,
{
    // Walk backwards from the newest line, wrapping only what can be seen.
    let needed = height.saturating_add(offset);
    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut exhausted = true;
    for line in lines.rev() {
        if rows.len() >= needed {
            exhausted = false;
            break;
        }
        let mut wrapped = wrap_line(line, width);
        wrapped.reverse();
        rows.extend(wrapped);
    }
    rows.reverse();

    let max_offset = if exhausted {
        rows.len().saturating_sub(height)
    } else {
        // More history exists above; allow scrolling one more page.
        offset.saturating_add(height)
    };
    let offset = offset.min(max_offset);
    let end = rows.len().saturating_sub(offset);
    let start = end.saturating_sub(height);
    (rows[start..end].to_vec(), max_offset)
}

/// Sidebar width: the widest nick plus borders, within fixed bounds.
pub fn users_width(users: &[User], total: u16) -> u16 {
    if total < MIN_WIDTH_FOR_USERS {
        return 0;
    }
    let widest = users
        .iter()
        .map(|user| user.nick.width())
        .max()
        .unwrap_or(0);
    let wanted = u16::try_from(widest).unwrap_or(u16::MAX).saturating_add(2);
    wanted.clamp(USERS_MIN_WIDTH, USERS_MAX_WIDTH)
}

fn render_users(f: &mut Frame, area: Rect, users: &[User], theme: &Theme) {
    let items: Vec<ListItem> = users
        .iter()
        .map(|user| {
            ListItem::new(Line::from(Span::styled(
                user.nick.clone(),
                theme.nick_style(user.role()),
            )))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::LEFT)
            .border_style(theme.users_border_style)
            .title(Span::styled(format!(" {} users", users.len()), theme.title_style)),
    );
    f.render_widget(list, area);
}

pub fn ui(f: &mut Frame, view: &mut ChatView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INPUT_HEIGHT)])
        .split(f.area());

    let sidebar = users_width(view.users(), chunks[0].width);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(sidebar)])
        .split(chunks[0]);

    let title = format!(
        "dggterm v{} - {}",
        env!("CARGO_PKG_VERSION"),
        view.config().url()
    );
    let block = Block::default().title(Span::styled(title, view.theme.title_style));
    let inner = block.inner(top[0]);

    let (rows, max_offset) = visible_rows(
        view.lines().iter(),
        inner.width as usize,
        inner.height as usize,
        view.scroll_offset(),
    );
    view.clamp_scroll(max_offset);

    // Bottom-align the transcript so new lines appear just above the input.
    let padding = (inner.height as usize).saturating_sub(rows.len());
    let mut text: Vec<Line<'static>> = vec![Line::default(); padding];
    text.extend(rows);
    f.render_widget(Paragraph::new(text).block(block), top[0]);

    if sidebar > 0 {
        render_users(f, top[1], view.users(), &view.theme);
    }

    f.render_widget(view.textarea(), chunks[1]);
}
