//! Handles lines submitted from the input field and history navigation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::commands::{process_input, CommandResult};
use crate::core::history::{HistoryBuffer, HistoryView};
use crate::core::render::InputDisplay;
use crate::session::{ChatSession, SessionError};

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    Sent,
    SendFailed(SessionError),
    /// A local command for the chat loop to carry out.
    Command(CommandResult),
}

pub struct InputHandler {
    session: Arc<dyn ChatSession>,
    history: HistoryBuffer,
}

impl InputHandler {
    pub fn new(session: Arc<dyn ChatSession>) -> Self {
        Self {
            session,
            history: HistoryBuffer::new(),
        }
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Take the line out of `display` without touching the session.
    ///
    /// Non-blank lines land in history and the field is cleared. Returns
    /// `None` for blank input, which leaves history and the field alone.
    pub fn prepare<D>(&mut self, display: &mut D) -> Option<CommandResult>
    where
        D: InputDisplay + ?Sized,
    {
        let raw = display.input_text();
        let line = raw.trim();
        if line.is_empty() {
            return None;
        }
        let line = line.to_string();
        self.history.push(line.clone());
        display.clear_input();
        Some(process_input(&line))
    }

    /// Forward a prepared line to the session, or hand a local command back.
    ///
    /// Holds no borrow of the input field, so callers can release any lock
    /// on it while the send is in flight.
    pub async fn send(&self, prepared: CommandResult) -> SubmitOutcome {
        let text = match prepared {
            CommandResult::ProcessAsMessage(text) => text,
            command => return SubmitOutcome::Command(command),
        };
        match self.session.send_message(&text).await {
            Ok(()) => {
                debug!(len = text.len(), "message sent");
                SubmitOutcome::Sent
            }
            Err(err) => {
                warn!(error = %err, "message send failed");
                SubmitOutcome::SendFailed(err)
            }
        }
    }

    /// [`prepare`](Self::prepare) then [`send`](Self::send).
    pub async fn submit<D>(&mut self, display: &mut D) -> SubmitOutcome
    where
        D: InputDisplay + ?Sized,
    {
        match self.prepare(display) {
            Some(prepared) => self.send(prepared).await,
            None => SubmitOutcome::Ignored,
        }
    }

    /// Show the previous history entry. Returns false at the oldest entry.
    pub fn history_up<D>(&mut self, display: &mut D) -> bool
    where
        D: InputDisplay + ?Sized,
    {
        match self.history.up() {
            Some(HistoryView::Entry(text)) => {
                display.show_history_entry(text);
                true
            }
            Some(HistoryView::Live) | None => false,
        }
    }

    /// Show the next history entry, or the empty live slot past the newest.
    /// Returns false when already at the live slot.
    pub fn history_down<D>(&mut self, display: &mut D) -> bool
    where
        D: InputDisplay + ?Sized,
    {
        match self.history.down() {
            Some(HistoryView::Entry(text)) => {
                display.show_history_entry(text);
                true
            }
            Some(HistoryView::Live) => {
                display.clear_input();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{RecordingInput, ScriptedSession};

    fn handler() -> (InputHandler, Arc<ScriptedSession>) {
        let session = Arc::new(ScriptedSession::default());
        (InputHandler::new(session.clone()), session)
    }

    #[tokio::test]
    async fn blank_input_has_no_effect() {
        let (mut handler, session) = handler();
        for blank in ["", "   ", "\t \n"] {
            let mut input = RecordingInput::with_text(blank);
            let outcome = handler.submit(&mut input).await;
            assert!(matches!(outcome, SubmitOutcome::Ignored));
            assert_eq!(input.clears, 0);
        }
        assert!(session.sent().is_empty());
        assert!(handler.history().is_empty());
    }

    #[tokio::test]
    async fn line_is_sent_once_recorded_and_cleared() {
        let (mut handler, session) = handler();
        let mut input = RecordingInput::with_text("  hello world ");
        handler.history_up(&mut input);

        let outcome = handler.submit(&mut input).await;

        assert!(matches!(outcome, SubmitOutcome::Sent));
        assert_eq!(session.sent(), vec!["hello world"]);
        assert_eq!(handler.history().entries(), ["hello world"]);
        assert!(handler.history().is_live());
        assert_eq!(input.clears, 1);
        assert!(input.text.is_empty());
    }

    #[tokio::test]
    async fn failed_send_still_lands_in_history() {
        let (mut handler, session) = handler();
        session.fail_sends(true);
        let mut input = RecordingInput::with_text("lost");

        let outcome = handler.submit(&mut input).await;

        assert!(matches!(
            outcome,
            SubmitOutcome::SendFailed(SessionError::Send(_))
        ));
        assert!(session.sent().is_empty());
        assert_eq!(handler.history().entries(), ["lost"]);
        assert_eq!(input.clears, 1);
    }

    #[tokio::test]
    async fn local_commands_are_not_sent() {
        let (mut handler, session) = handler();
        let mut input = RecordingInput::with_text("/users");

        let outcome = handler.submit(&mut input).await;

        assert!(matches!(
            outcome,
            SubmitOutcome::Command(CommandResult::RefreshUsers)
        ));
        assert!(session.sent().is_empty());
        assert_eq!(handler.history().entries(), ["/users"]);
        assert_eq!(input.clears, 1);
    }

    #[tokio::test]
    async fn navigation_walks_history_and_back_to_empty() {
        let (mut handler, _session) = handler();
        for line in ["one", "two", "three"] {
            let mut input = RecordingInput::with_text(line);
            handler.submit(&mut input).await;
        }

        let mut input = RecordingInput::default();
        for _ in 0..3 {
            assert!(handler.history_up(&mut input));
        }
        assert_eq!(input.shown, vec!["three", "two", "one"]);
        assert!(!handler.history_up(&mut input));
        assert_eq!(input.text, "one");

        assert!(handler.history_down(&mut input));
        assert!(handler.history_down(&mut input));
        assert_eq!(input.text, "three");
        assert!(handler.history_down(&mut input));
        assert!(input.text.is_empty());
        assert_eq!(input.clears, 1);
        assert!(!handler.history_down(&mut input));
        assert_eq!(input.clears, 1);
    }

    #[tokio::test]
    async fn prepare_clears_field_before_anything_is_sent() {
        let (mut handler, session) = handler();
        let mut input = RecordingInput::with_text(" later ");

        let prepared = handler.prepare(&mut input);

        assert!(matches!(
            prepared,
            Some(CommandResult::ProcessAsMessage(ref text)) if text == "later"
        ));
        assert!(input.text.is_empty());
        assert_eq!(handler.history().entries(), ["later"]);
        assert!(session.sent().is_empty());

        let outcome = handler.send(prepared.unwrap()).await;
        assert!(matches!(outcome, SubmitOutcome::Sent));
        assert_eq!(session.sent(), vec!["later"]);
    }

    #[test]
    fn prepare_ignores_blank_input() {
        let (mut handler, _session) = handler();
        let mut input = RecordingInput::with_text("  ");
        assert!(handler.prepare(&mut input).is_none());
        assert_eq!(input.clears, 0);
        assert!(handler.history().is_empty());
    }
}
