//! The dispatch loop: drains the event channel and routes each event to
//! exactly one render behavior.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::channel::EventReceiver;
use crate::core::config::Config;
use crate::core::event::{ChatEvent, User};
use crate::core::render::ChatRenderer;
use crate::core::roster::RosterCache;
use crate::session::ChatSession;

/// Whether an event produced visible output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Rendered,
    /// Recorded without rendering (pings).
    Observed,
    /// Unknown kinds.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub rendered: u64,
    pub observed: u64,
    pub ignored: u64,
}

impl DispatchStats {
    fn record(&mut self, outcome: Dispatched) {
        match outcome {
            Dispatched::Rendered => self.rendered += 1,
            Dispatched::Observed => self.observed += 1,
            Dispatched::Ignored => self.ignored += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.rendered + self.observed + self.ignored
    }
}

pub struct Dispatcher {
    renderer: Arc<dyn ChatRenderer>,
    session: Arc<dyn ChatSession>,
    config: Arc<Config>,
    roster: RosterCache,
    last_ping: Option<DateTime<Utc>>,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(
        renderer: Arc<dyn ChatRenderer>,
        session: Arc<dyn ChatSession>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            renderer,
            session,
            config,
            roster: RosterCache::new(),
            last_ping: None,
            stats: DispatchStats::default(),
        }
    }

    pub fn session(&self) -> &Arc<dyn ChatSession> {
        &self.session
    }

    pub fn roster(&self) -> &RosterCache {
        &self.roster
    }

    /// Timestamp carried by the most recent ping.
    pub fn last_ping(&self) -> Option<DateTime<Utc>> {
        self.last_ping
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Take a fresh snapshot from the session and render it.
    pub async fn refresh_roster(&mut self) {
        let snapshot = self.session.users();
        self.seed_roster(snapshot).await;
    }

    /// Replace the cached roster with `users` and render it.
    pub async fn seed_roster(&mut self, users: Vec<User>) {
        self.roster.refresh(users);
        let sorted = self.roster.sorted();
        self.renderer.render_users(&sorted).await;
    }

    /// Route one event.
    pub async fn dispatch(&mut self, event: ChatEvent) -> Dispatched {
        let renderer = Arc::clone(&self.renderer);
        let outcome = match &event {
            ChatEvent::Message(message) => {
                renderer.render_chat(message).await;
                Dispatched::Rendered
            }
            ChatEvent::Error(text) => {
                renderer.render_error(text).await;
                Dispatched::Rendered
            }
            ChatEvent::Ping(ping) => {
                self.last_ping = Some(ping.timestamp);
                Dispatched::Observed
            }
            ChatEvent::Mute(mute) => {
                renderer.render_mute(mute).await;
                Dispatched::Rendered
            }
            ChatEvent::Unmute(mute) => {
                renderer.render_unmute(mute).await;
                Dispatched::Rendered
            }
            ChatEvent::Ban(ban) => {
                renderer.render_ban(ban).await;
                Dispatched::Rendered
            }
            ChatEvent::Unban(ban) => {
                renderer.render_unban(ban).await;
                Dispatched::Rendered
            }
            ChatEvent::Join(action) => {
                if self.config.show_join_leave() {
                    renderer.render_join(action).await;
                }
                self.refresh_roster().await;
                Dispatched::Rendered
            }
            ChatEvent::Quit(action) => {
                if self.config.show_join_leave() {
                    renderer.render_quit(action).await;
                }
                self.refresh_roster().await;
                Dispatched::Rendered
            }
            ChatEvent::SubOnly(sub_only) => {
                renderer.render_sub_only(sub_only).await;
                Dispatched::Rendered
            }
            ChatEvent::Broadcast(broadcast) => {
                renderer.render_broadcast(broadcast).await;
                Dispatched::Rendered
            }
            // Newer servers may send kinds this client does not know.
            ChatEvent::Unknown { .. } => Dispatched::Ignored,
        };
        debug!(kind = event.kind(), ?outcome, "dispatched event");
        self.stats.record(outcome);
        outcome
    }

    /// Drain `events` until cancelled or until every producer is gone.
    ///
    /// On cancellation the channel is closed to new pushes and whatever was
    /// already queued is still dispatched before returning.
    pub async fn run(mut self, mut events: EventReceiver, cancel: CancellationToken) -> DispatchStats {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = events.recv() => match next {
                    Some(event) => {
                        self.dispatch(event).await;
                    }
                    None => break,
                },
            }
        }

        events.close();
        let mut drained = 0usize;
        while let Some(event) = events.try_recv() {
            self.dispatch(event).await;
            drained += 1;
        }
        debug!(drained, total = self.stats.total(), "dispatch loop stopped");
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::channel::event_channel;
    use crate::core::event::{Ban, Broadcast, ChatMessage, Mute, Ping, RoomAction, SubOnly};
    use crate::utils::test_utils::{RecordingRenderer, RenderCall, ScriptedSession};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn chat(nick: &str, body: &str) -> ChatEvent {
        ChatEvent::Message(ChatMessage {
            author: User::new(nick),
            body: body.to_string(),
            timestamp: at(1),
        })
    }

    fn room(nick: &str) -> RoomAction {
        RoomAction {
            user: User::new(nick),
            timestamp: at(2),
        }
    }

    fn mute(target: &str, by: &str) -> Mute {
        Mute {
            moderator: User::new(by),
            target: target.to_string(),
            duration_secs: None,
            timestamp: at(3),
        }
    }

    fn ban(target: &str, by: &str) -> Ban {
        Ban {
            moderator: User::new(by),
            target: target.to_string(),
            reason: Some("spam".into()),
            duration_secs: Some(600),
            timestamp: at(4),
        }
    }

    fn setup(
        show_join_leave: bool,
        session: ScriptedSession,
    ) -> (Dispatcher, Arc<RecordingRenderer>, Arc<ScriptedSession>) {
        let renderer = Arc::new(RecordingRenderer::default());
        let session = Arc::new(session);
        let config = Arc::new(Config {
            show_join_leave: Some(show_join_leave),
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(renderer.clone(), session.clone(), config);
        (dispatcher, renderer, session)
    }

    #[tokio::test]
    async fn every_known_kind_renders_exactly_once() {
        let (mut dispatcher, renderer, _session) = setup(false, ScriptedSession::default());
        let events = vec![
            chat("alice", "hi"),
            ChatEvent::Error("needlogin".into()),
            ChatEvent::Mute(mute("bob", "mod")),
            ChatEvent::Unmute(mute("bob", "mod")),
            ChatEvent::Ban(ban("eve", "mod")),
            ChatEvent::Unban(ban("eve", "mod")),
            ChatEvent::SubOnly(SubOnly {
                moderator: User::new("mod"),
                enabled: true,
                timestamp: at(5),
            }),
            ChatEvent::Broadcast(Broadcast {
                text: "maintenance".into(),
                timestamp: at(6),
            }),
        ];

        for event in events {
            assert_eq!(dispatcher.dispatch(event).await, Dispatched::Rendered);
        }

        assert_eq!(
            renderer.calls(),
            vec![
                RenderCall::Chat("alice".into(), "hi".into()),
                RenderCall::Error("needlogin".into()),
                RenderCall::Mute("bob".into(), "mod".into()),
                RenderCall::Unmute("bob".into(), "mod".into()),
                RenderCall::Ban("eve".into(), "mod".into()),
                RenderCall::Unban("eve".into(), "mod".into()),
                RenderCall::SubOnly(true),
                RenderCall::Broadcast("maintenance".into()),
            ]
        );
        assert_eq!(dispatcher.stats().rendered, 8);
    }

    #[tokio::test]
    async fn unknown_kind_has_no_observable_effect() {
        let (mut dispatcher, renderer, _session) = setup(true, ScriptedSession::default());
        let outcome = dispatcher
            .dispatch(ChatEvent::Unknown {
                kind: "PRIVMSG".into(),
                payload: "{\"nick\":\"x\"}".into(),
            })
            .await;

        assert_eq!(outcome, Dispatched::Ignored);
        assert!(renderer.calls().is_empty());
        assert_eq!(dispatcher.stats().ignored, 1);
    }

    #[tokio::test]
    async fn ping_is_recorded_but_not_rendered() {
        let (mut dispatcher, renderer, _session) = setup(true, ScriptedSession::default());
        let outcome = dispatcher.dispatch(ChatEvent::Ping(Ping { timestamp: at(42) })).await;

        assert_eq!(outcome, Dispatched::Observed);
        assert_eq!(dispatcher.last_ping(), Some(at(42)));
        assert!(renderer.calls().is_empty());
    }

    #[tokio::test]
    async fn presence_hidden_still_refreshes_roster() {
        let session = ScriptedSession::with_roster(vec![User::new("alice")]);
        let (mut dispatcher, renderer, _session) = setup(false, session);

        dispatcher.dispatch(ChatEvent::Join(room("alice"))).await;

        assert_eq!(
            renderer.calls(),
            vec![RenderCall::Users(vec!["alice".into()])]
        );
    }

    #[tokio::test]
    async fn hidden_quit_only_refreshes_roster() {
        let session = ScriptedSession::with_roster(vec![User::new("bob")]);
        let (mut dispatcher, renderer, _session) = setup(false, session);

        let outcome = dispatcher.dispatch(ChatEvent::Quit(room("alice"))).await;

        assert_eq!(outcome, Dispatched::Rendered);
        assert_eq!(renderer.calls(), vec![RenderCall::Users(vec!["bob".into()])]);
    }

    #[tokio::test]
    async fn presence_shown_renders_notice_before_roster() {
        let session = ScriptedSession::with_roster(vec![User::new("alice")]);
        let (mut dispatcher, renderer, session) = setup(true, session);

        dispatcher.dispatch(ChatEvent::Join(room("alice"))).await;
        session.set_roster(vec![]);
        dispatcher.dispatch(ChatEvent::Quit(room("alice"))).await;

        assert_eq!(
            renderer.calls(),
            vec![
                RenderCall::Join("alice".into()),
                RenderCall::Users(vec!["alice".into()]),
                RenderCall::Quit("alice".into()),
                RenderCall::Users(vec![]),
            ]
        );
        assert!(dispatcher.roster().is_empty());
    }

    #[tokio::test]
    async fn join_chat_mute_quit_scenario() {
        let session = ScriptedSession::with_roster(vec![User::new("bystander")]);
        let (dispatcher, renderer, session) = setup(true, session);
        let (tx, rx) = event_channel(16);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(dispatcher.run(rx, cancel.clone()));

        // The session updates its roster before emitting the presence event.
        session.set_roster(vec![User::new("bystander"), User::new("u1")]);
        tx.push(ChatEvent::Join(room("u1"))).await.unwrap();
        tx.push(chat("u1", "hi")).await.unwrap();
        tx.push(ChatEvent::Mute(mute("u1", "mod"))).await.unwrap();
        renderer.wait_for_calls(4).await;
        session.set_roster(vec![User::new("bystander")]);
        tx.push(ChatEvent::Quit(room("u1"))).await.unwrap();
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.rendered, 4);
        assert_eq!(
            renderer.calls(),
            vec![
                RenderCall::Join("u1".into()),
                RenderCall::Users(vec!["bystander".into(), "u1".into()]),
                RenderCall::Chat("u1".into(), "hi".into()),
                RenderCall::Mute("u1".into(), "mod".into()),
                RenderCall::Quit("u1".into()),
                RenderCall::Users(vec!["bystander".into()]),
            ]
        );
    }

    #[tokio::test]
    async fn run_preserves_push_order() {
        let (dispatcher, renderer, _session) = setup(false, ScriptedSession::default());
        let (tx, rx) = event_channel(4);
        let handle = tokio::spawn(dispatcher.run(rx, CancellationToken::new()));

        for i in 0..20 {
            tx.push(chat("alice", &i.to_string())).await.unwrap();
            if i % 5 == 0 {
                tx.push(ChatEvent::Unknown {
                    kind: "NEW".into(),
                    payload: String::new(),
                })
                .await
                .unwrap();
            }
        }
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.rendered, 20);
        assert_eq!(stats.ignored, 4);
        let bodies: Vec<String> = renderer
            .calls()
            .into_iter()
            .map(|call| match call {
                RenderCall::Chat(_, body) => body,
                other => panic!("unexpected call {other:?}"),
            })
            .collect();
        let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        assert_eq!(bodies, expected);
    }

    #[tokio::test]
    async fn cancellation_drains_queued_events_and_rejects_new_ones() {
        let (dispatcher, renderer, _session) = setup(false, ScriptedSession::default());
        let (tx, rx) = event_channel(8);
        tx.push(chat("alice", "one")).await.unwrap();
        tx.push(chat("alice", "two")).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let stats = dispatcher.run(rx, cancel).await;

        assert_eq!(stats.rendered, 2);
        assert_eq!(renderer.calls().len(), 2);
        assert!(tx.push(chat("alice", "late")).await.is_err());
    }
}
