//! Submitted-line history with Up/Down navigation.

/// What the input field should show after a navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView<'a> {
    /// A previously submitted line.
    Entry(&'a str),
    /// The empty live slot past the newest entry.
    Live,
}

/// Append-only list of submitted lines plus a cursor in `[0, len]`.
///
/// A cursor equal to `len` is the live slot. Navigation clamps at both ends
/// and never fails.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    entries: Vec<String>,
    cursor: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line and return the cursor to the live slot.
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        self.cursor = self.entries.len();
    }

    /// Step towards older entries. `None` when already at the oldest.
    pub fn up(&mut self) -> Option<HistoryView<'_>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(HistoryView::Entry(&self.entries[self.cursor]))
    }

    /// Step towards the live slot. `None` when already there.
    pub fn down(&mut self) -> Option<HistoryView<'_>> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        if self.cursor == self.entries.len() {
            Some(HistoryView::Live)
        } else {
            Some(HistoryView::Entry(&self.entries[self.cursor]))
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_live(&self) -> bool {
        self.cursor == self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(lines: &[&str]) -> HistoryBuffer {
        let mut history = HistoryBuffer::new();
        for line in lines {
            history.push(*line);
        }
        history
    }

    #[test]
    fn empty_history_navigation_is_a_no_op() {
        let mut history = HistoryBuffer::new();
        assert_eq!(history.up(), None);
        assert_eq!(history.down(), None);
        assert_eq!(history.cursor(), 0);
        assert!(history.is_live());
    }

    #[test]
    fn up_walks_to_oldest_then_holds() {
        let mut history = filled(&["one", "two", "three"]);
        assert_eq!(history.up(), Some(HistoryView::Entry("three")));
        assert_eq!(history.up(), Some(HistoryView::Entry("two")));
        assert_eq!(history.up(), Some(HistoryView::Entry("one")));
        assert_eq!(history.cursor(), 0);

        for _ in 0..3 {
            assert_eq!(history.up(), None);
            assert_eq!(history.cursor(), 0);
        }
    }

    #[test]
    fn down_from_oldest_returns_to_live_slot_then_holds() {
        let mut history = filled(&["one", "two", "three"]);
        while history.up().is_some() {}

        assert_eq!(history.down(), Some(HistoryView::Entry("two")));
        assert_eq!(history.down(), Some(HistoryView::Entry("three")));
        assert_eq!(history.down(), Some(HistoryView::Live));
        assert!(history.is_live());

        assert_eq!(history.down(), None);
        assert_eq!(history.cursor(), history.len());
    }

    #[test]
    fn push_resets_cursor_to_live_slot() {
        let mut history = filled(&["one", "two"]);
        history.up();
        history.up();
        assert_eq!(history.cursor(), 0);

        history.push("three");
        assert_eq!(history.cursor(), 3);
        assert!(history.is_live());
        assert_eq!(history.up(), Some(HistoryView::Entry("three")));
    }

    #[test]
    fn single_entry_round_trip() {
        let mut history = filled(&["only"]);
        assert_eq!(history.up(), Some(HistoryView::Entry("only")));
        assert_eq!(history.up(), None);
        assert_eq!(history.down(), Some(HistoryView::Live));
        assert_eq!(history.down(), None);
    }
}
