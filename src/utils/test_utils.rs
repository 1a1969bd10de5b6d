#[cfg(test)]
use crate::core::channel::EventSender;
#[cfg(test)]
use crate::core::event::{Ban, Broadcast, ChatMessage, Mute, RoomAction, SubOnly, User};
#[cfg(test)]
use crate::core::render::{ChatRenderer, InputDisplay};
#[cfg(test)]
use crate::session::{ChatSession, SessionError};
#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::time::Duration;
#[cfg(test)]
use tokio::sync::Notify;

/// One observed call on [`RecordingRenderer`], reduced to the fields tests compare.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    Chat(String, String),
    Error(String),
    /// Target, moderator.
    Mute(String, String),
    Unmute(String, String),
    Ban(String, String),
    Unban(String, String),
    Join(String),
    Quit(String),
    SubOnly(bool),
    Broadcast(String),
    Users(Vec<String>),
}

#[cfg(test)]
#[derive(Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
    notify: Notify,
}

#[cfg(test)]
impl RecordingRenderer {
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub async fn wait_for_calls(&self, count: usize) {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                if self.calls.lock().unwrap().len() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .expect("timed out waiting for render calls");
    }

    fn record(&self, call: RenderCall) {
        self.calls.lock().unwrap().push(call);
        self.notify.notify_waiters();
    }
}

#[cfg(test)]
#[async_trait]
impl ChatRenderer for RecordingRenderer {
    async fn render_chat(&self, message: &ChatMessage) {
        self.record(RenderCall::Chat(
            message.author.nick.clone(),
            message.body.clone(),
        ));
    }

    async fn render_error(&self, text: &str) {
        self.record(RenderCall::Error(text.to_string()));
    }

    async fn render_mute(&self, mute: &Mute) {
        self.record(RenderCall::Mute(
            mute.target.clone(),
            mute.moderator.nick.clone(),
        ));
    }

    async fn render_unmute(&self, mute: &Mute) {
        self.record(RenderCall::Unmute(
            mute.target.clone(),
            mute.moderator.nick.clone(),
        ));
    }

    async fn render_ban(&self, ban: &Ban) {
        self.record(RenderCall::Ban(ban.target.clone(), ban.moderator.nick.clone()));
    }

    async fn render_unban(&self, ban: &Ban) {
        self.record(RenderCall::Unban(
            ban.target.clone(),
            ban.moderator.nick.clone(),
        ));
    }

    async fn render_join(&self, action: &RoomAction) {
        self.record(RenderCall::Join(action.user.nick.clone()));
    }

    async fn render_quit(&self, action: &RoomAction) {
        self.record(RenderCall::Quit(action.user.nick.clone()));
    }

    async fn render_sub_only(&self, sub_only: &SubOnly) {
        self.record(RenderCall::SubOnly(sub_only.enabled));
    }

    async fn render_broadcast(&self, broadcast: &Broadcast) {
        self.record(RenderCall::Broadcast(broadcast.text.clone()));
    }

    async fn render_users(&self, users: &[User]) {
        self.record(RenderCall::Users(
            users.iter().map(|user| user.nick.clone()).collect(),
        ));
    }
}

/// In-process session with a settable roster.
///
/// Snapshots queued with [`ScriptedSession::queue_snapshots`] are returned by
/// successive `users()` calls before falling back to the current roster.
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedSession {
    roster: Mutex<Vec<User>>,
    snapshots: Mutex<VecDeque<Vec<User>>>,
    sent: Mutex<Vec<String>>,
    events: Mutex<Option<EventSender>>,
    users_calls: AtomicUsize,
    fail_sends: AtomicBool,
    fail_open: AtomicBool,
    closed: AtomicBool,
    send_gate: Mutex<Option<Arc<Notify>>>,
}

#[cfg(test)]
impl ScriptedSession {
    pub fn with_roster(users: Vec<User>) -> Self {
        let session = Self::default();
        session.set_roster(users);
        session
    }

    pub fn set_roster(&self, users: Vec<User>) {
        *self.roster.lock().unwrap() = users;
    }

    pub fn queue_snapshots(&self, snapshots: Vec<Vec<User>>) {
        self.snapshots.lock().unwrap().extend(snapshots);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn users_calls(&self) -> usize {
        self.users_calls.load(Ordering::SeqCst)
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Make every later `send_message` wait until the returned gate is notified.
    pub fn hold_sends(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.send_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Option<EventSender> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl ChatSession for ScriptedSession {
    async fn open(&self, events: EventSender) -> Result<(), SessionError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(SessionError::Connect("scripted failure".into()));
        }
        *self.events.lock().unwrap() = Some(events);
        Ok(())
    }

    fn users(&self) -> Vec<User> {
        self.users_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(snapshot) = self.snapshots.lock().unwrap().pop_front() {
            return snapshot;
        }
        self.roster.lock().unwrap().clone()
    }

    async fn send_message(&self, text: &str) -> Result<(), SessionError> {
        let gate = self.send_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(SessionError::Send("scripted failure".into()));
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.closed.store(true, Ordering::SeqCst);
        self.events.lock().unwrap().take();
        Ok(())
    }
}

/// Input field double that records every display operation.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingInput {
    pub text: String,
    pub clears: usize,
    pub shown: Vec<String>,
}

#[cfg(test)]
impl RecordingInput {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
impl InputDisplay for RecordingInput {
    fn input_text(&self) -> String {
        self.text.clone()
    }

    fn clear_input(&mut self) {
        self.text.clear();
        self.clears += 1;
    }

    fn show_history_entry(&mut self, text: &str) {
        self.text = text.to_string();
        self.shown.push(text.to_string());
    }
}
