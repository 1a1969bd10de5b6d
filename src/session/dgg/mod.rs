//! Websocket session for destiny.gg-style chat servers.

pub mod protocol;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use self::protocol::{encode_message, encode_ping, parse_frame, Incoming};
use super::{ChatSession, SessionError};
use crate::core::channel::EventSender;
use crate::core::event::{ChatEvent, User};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type SharedRoster = Arc<RwLock<BTreeMap<String, User>>>;
type SharedSink = Arc<Mutex<Option<WsSink>>>;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub struct DggSession {
    url: String,
    auth_token: Option<String>,
    roster: SharedRoster,
    sink: SharedSink,
    reader: std::sync::Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    ping_interval: Duration,
}

impl DggSession {
    pub fn new(url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: auth_token.filter(|token| !token.trim().is_empty()),
            roster: Arc::new(RwLock::new(BTreeMap::new())),
            sink: Arc::new(Mutex::new(None)),
            reader: std::sync::Mutex::new(None),
            cancel: CancellationToken::new(),
            ping_interval: PING_INTERVAL,
        }
    }

    /// How often a latency `PING` is sent while connected.
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn write_frame(sink: &SharedSink, frame: String) -> Result<(), SessionError> {
        let mut guard = sink.lock().await;
        let sink = guard.as_mut().ok_or(SessionError::NotConnected)?;
        sink.send(Message::text(frame))
            .await
            .map_err(|err| SessionError::Send(err.to_string()))
    }
}

#[async_trait]
impl ChatSession for DggSession {
    async fn open(&self, events: EventSender) -> Result<(), SessionError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|err| SessionError::Connect(err.to_string()))?;
        if let Some(token) = &self.auth_token {
            let cookie = HeaderValue::from_str(&format!("authtoken={token}"))
                .map_err(|err| SessionError::Connect(format!("invalid auth token: {err}")))?;
            request.headers_mut().insert(COOKIE, cookie);
        }

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|err| SessionError::Connect(err.to_string()))?;
        info!(url = %self.url, authenticated = self.auth_token.is_some(), "connected");

        let (sink, stream) = stream.split();
        *self.sink.lock().await = Some(sink);

        let reader = FrameReader {
            roster: Arc::clone(&self.roster),
            sink: Arc::clone(&self.sink),
            events,
            cancel: self.cancel.child_token(),
            ping_interval: self.ping_interval,
        };
        let handle = tokio::spawn(reader.run(stream));
        *self.reader.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    fn users(&self) -> Vec<User> {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    async fn send_message(&self, text: &str) -> Result<(), SessionError> {
        Self::write_frame(&self.sink, encode_message(text)).await
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.cancel.cancel();
        let handle = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        let sink = self.sink.lock().await.take();
        if let Some(mut sink) = sink {
            let result = sink.close().await;
            if let Err(err) = result {
                debug!(error = %err, "websocket close failed");
            }
        }
        info!("session closed");
        Ok(())
    }
}

/// Background task turning websocket frames into events.
struct FrameReader {
    roster: SharedRoster,
    sink: SharedSink,
    events: EventSender,
    cancel: CancellationToken,
    ping_interval: Duration,
}

impl FrameReader {
    async fn run(self, mut stream: SplitStream<WsStream>) {
        debug!("frame reader started");
        let mut ping = interval_at(Instant::now() + self.ping_interval, self.ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = ping.tick() => self.send_ping().await,
                next = stream.next() => match next {
                    Some(Ok(Message::Text(text))) => {
                        if !self.handle_frame(text.as_str()).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "server closed the connection");
                        self.notify_disconnect("connection closed by server").await;
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(error = %err, "websocket error");
                        self.notify_disconnect(&format!("connection lost: {err}")).await;
                        break;
                    }
                    None => {
                        self.notify_disconnect("connection closed").await;
                        break;
                    }
                },
            }
        }
        debug!("frame reader stopped");
    }

    /// Returns false once nobody is listening for events any more.
    async fn handle_frame(&self, frame: &str) -> bool {
        let incoming = match parse_frame(frame) {
            Ok(incoming) => incoming,
            Err(err) => {
                warn!(error = %err, "skipping frame");
                return true;
            }
        };

        let event = match incoming {
            Incoming::Names {
                users,
                connection_count,
            } => {
                debug!(users = users.len(), connection_count, "received user list");
                let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
                *roster = users
                    .into_iter()
                    .map(|user| (user.nick.to_lowercase(), user))
                    .collect();
                return true;
            }
            Incoming::Event(event) => event,
        };

        // The roster must already reflect a presence change when its event is consumed.
        self.apply_presence(&event);

        match self.events.push(event).await {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "event channel closed");
                false
            }
        }
    }

    async fn send_ping(&self) {
        if let Err(err) = DggSession::write_frame(&self.sink, encode_ping(Utc::now())).await {
            debug!(error = %err, "ping failed");
        }
    }

    fn apply_presence(&self, event: &ChatEvent) {
        let mut roster = self.roster.write().unwrap_or_else(PoisonError::into_inner);
        match event {
            ChatEvent::Join(action) => {
                roster.insert(action.user.nick.to_lowercase(), action.user.clone());
            }
            ChatEvent::Quit(action) => {
                roster.remove(&action.user.nick.to_lowercase());
            }
            _ => {}
        }
    }

    async fn notify_disconnect(&self, reason: &str) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.events.push(ChatEvent::Error(reason.to_string())).await;
    }
}
