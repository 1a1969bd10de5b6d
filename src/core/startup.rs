//! Startup barrier: nothing is dispatched or rendered until the session has
//! reported its first non-empty user list.

use std::fmt;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::channel::EventReceiver;
use crate::core::config::Config;
use crate::core::dispatch::{DispatchStats, Dispatcher};
use crate::core::event::User;
use crate::session::ChatSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// The session never reported any users within the allowed time.
    RosterTimeout { waited: Duration, polls: usize },
    /// Startup was cancelled while waiting.
    Cancelled,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::RosterTimeout { waited, polls } => write!(
                f,
                "no user list received after {:.1}s ({polls} checks); is the server reachable?",
                waited.as_secs_f64()
            ),
            StartupError::Cancelled => write!(f, "startup cancelled"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Polls the session roster at a fixed interval.
///
/// The session exposes no readiness signal, so polling is the only option;
/// the optional timeout turns a silent stall into a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupBarrier {
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl StartupBarrier {
    pub fn new(poll_interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.startup_poll_interval(), config.startup_timeout())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Wait until `session.users()` is non-empty and return that snapshot.
    pub async fn wait_for_roster(
        &self,
        session: &dyn ChatSession,
        cancel: &CancellationToken,
    ) -> Result<Vec<User>, StartupError> {
        let started = tokio::time::Instant::now();
        let mut polls = 0usize;
        loop {
            let users = session.users();
            polls += 1;
            if !users.is_empty() {
                info!(users = users.len(), polls, "initial user list received");
                return Ok(users);
            }

            let waited = started.elapsed();
            if let Some(timeout) = self.timeout {
                if waited >= timeout {
                    return Err(StartupError::RosterTimeout { waited, polls });
                }
            }
            debug!(polls, "user list still empty");

            tokio::select! {
                _ = cancel.cancelled() => return Err(StartupError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

/// Wait for the roster, render it once, then spawn the dispatch loop.
pub async fn start_dispatch(
    barrier: &StartupBarrier,
    mut dispatcher: Dispatcher,
    events: EventReceiver,
    cancel: CancellationToken,
) -> Result<JoinHandle<DispatchStats>, StartupError> {
    let session = dispatcher.session().clone();
    let users = barrier.wait_for_roster(session.as_ref(), &cancel).await?;
    dispatcher.seed_roster(users).await;
    Ok(tokio::spawn(dispatcher.run(events, cancel)))
}
