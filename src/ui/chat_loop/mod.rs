//! Main chat event loop
//!
//! Opens the session, holds the screen back until the first user list has
//! arrived, then runs the terminal UI while the dispatcher feeds the
//! transcript from its own task.

mod lifecycle;

use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use self::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use crate::commands::{help_lines, CommandResult};
use crate::core::channel::event_channel;
use crate::core::config::Config;
use crate::core::dispatch::{DispatchStats, Dispatcher};
use crate::core::input::{InputHandler, SubmitOutcome};
use crate::core::roster::sort_users;
use crate::core::startup::{start_dispatch, StartupBarrier, StartupError};
use crate::session::dgg::DggSession;
use crate::session::ChatSession;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::ui::transcript;
use crate::ui::view::{ChatView, ViewRenderer};

const MAX_FPS: u64 = 60;
const SCROLL_PAGE: usize = 10;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
    RequestRedraw,
}

/// Everything that runs once the startup barrier has opened.
struct ChatRuntime {
    session: Arc<dyn ChatSession>,
    view: Arc<Mutex<ChatView>>,
    dispatch: JoinHandle<DispatchStats>,
    cancel: CancellationToken,
}

impl ChatRuntime {
    /// Open `session`, wait for its first user list and start dispatching.
    ///
    /// Cancelling `cancel` while waiting aborts with
    /// [`StartupError::Cancelled`]; the session is closed on every failure
    /// after it was opened.
    async fn start(
        config: Arc<Config>,
        session: Arc<dyn ChatSession>,
        ui_tx: mpsc::UnboundedSender<UiEvent>,
        cancel: CancellationToken,
    ) -> Result<Self, Box<dyn Error>> {
        let (event_tx, event_rx) = event_channel(config.event_capacity());
        session.open(event_tx).await?;

        let view = Arc::new(Mutex::new(ChatView::new(
            config.clone(),
            Theme::dark_default(),
        )));
        let renderer = Arc::new(ViewRenderer::new(view.clone(), ui_tx));
        let dispatcher = Dispatcher::new(renderer, session.clone(), config.clone());

        let barrier = StartupBarrier::from_config(&config);
        let dispatch = match start_dispatch(&barrier, dispatcher, event_rx, cancel.clone()).await {
            Ok(handle) => handle,
            Err(err) => {
                if let Err(close_err) = session.close().await {
                    debug!(error = %close_err, "close after failed startup");
                }
                return Err(err.into());
            }
        };

        Ok(Self {
            session,
            view,
            dispatch,
            cancel,
        })
    }

    /// Stop dispatching, drain what was queued and close the session.
    async fn shutdown(self) -> DispatchStats {
        self.cancel.cancel();
        let stats = match self.dispatch.await {
            Ok(stats) => stats,
            Err(err) => {
                warn!(error = %err, "dispatch task failed");
                DispatchStats::default()
            }
        };
        if let Err(err) = self.session.close().await {
            warn!(error = %err, "session close failed");
        }
        stats
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && key.code == KeyCode::Char('c')
        && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Carry out what a submitted line asked for.
fn apply_submit_outcome(view: &mut ChatView, session: &dyn ChatSession, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Ignored | SubmitOutcome::Sent => {}
        SubmitOutcome::SendFailed(err) => {
            let line = transcript::error_line(&err.to_string(), &view.theme);
            view.push_line(line);
        }
        SubmitOutcome::Command(command) => match command {
            CommandResult::ShowHelp => view.push_system_lines(help_lines()),
            CommandResult::ClearTranscript => view.clear_transcript(),
            CommandResult::RefreshUsers => {
                let mut users = session.users();
                sort_users(&mut users);
                view.push_system_lines([format!("{} users in the room", users.len())]);
                view.set_users(users);
            }
            CommandResult::Quit => view.request_exit(),
            // Plain messages are sent by the input handler itself.
            CommandResult::ProcessAsMessage(_) => {}
        },
    }
}

/// Returns true when the screen needs a redraw.
///
/// The view lock is released while a message is being sent, so the
/// dispatcher keeps rendering behind a slow socket write.
async fn handle_key(
    view: &Mutex<ChatView>,
    input: &mut InputHandler,
    session: &dyn ChatSession,
    key: KeyEvent,
) -> bool {
    let mut guard = view.lock().await;
    if is_quit_key(&key) {
        guard.request_exit();
        return true;
    }
    match key.code {
        KeyCode::Enter => {
            let Some(prepared) = input.prepare(&mut *guard) else {
                return false;
            };
            drop(guard);
            let outcome = input.send(prepared).await;
            apply_submit_outcome(&mut *view.lock().await, session, outcome);
        }
        KeyCode::Up => return input.history_up(&mut *guard),
        KeyCode::Down => return input.history_down(&mut *guard),
        KeyCode::PageUp => guard.scroll_up(SCROLL_PAGE),
        KeyCode::PageDown => guard.scroll_down(SCROLL_PAGE),
        KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
            guard.scroll_down(usize::MAX);
        }
        // Ctrl+J and Ctrl+M would split the single-line input.
        KeyCode::Char('j' | 'm') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return false;
        }
        _ => guard.input(key),
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

async fn draw(
    terminal: &SharedTerminal,
    view: &Mutex<ChatView>,
) -> Result<(), Box<dyn Error>> {
    let mut view = view.lock().await;
    terminal.lock().await.draw(|f| ui(f, &mut view))?;
    Ok(())
}

async fn event_loop(
    runtime: &ChatRuntime,
    ui_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    terminal: &SharedTerminal,
) -> Result<(), Box<dyn Error>> {
    let mut input = InputHandler::new(runtime.session.clone());
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    loop {
        if runtime.view.lock().await.exit_requested() {
            return Ok(());
        }

        if request_redraw && last_draw.elapsed() >= frame_duration {
            draw(terminal, &runtime.view).await?;
            last_draw = Instant::now();
            request_redraw = false;
        }

        let ev = match tokio::time::timeout(frame_duration, ui_rx.recv()).await {
            Ok(Some(ev)) => ev,
            Ok(None) => return Ok(()),
            Err(_) => continue,
        };
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if handle_key(
                    &runtime.view,
                    &mut input,
                    runtime.session.as_ref(),
                    key,
                )
                .await
                {
                    request_redraw = true;
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                runtime.view.lock().await.paste(&text);
                request_redraw = true;
            }
            UiEvent::Crossterm(Event::Resize(_, _)) | UiEvent::RequestRedraw => {
                request_redraw = true;
            }
            UiEvent::Crossterm(_) => {}
        }
    }
}

/// Wait for the barrier while still honouring Ctrl+C from the key reader.
async fn start_interruptible(
    config: Arc<Config>,
    session: Arc<dyn ChatSession>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    ui_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> Result<ChatRuntime, Box<dyn Error>> {
    let cancel = CancellationToken::new();
    let start = ChatRuntime::start(config, session, ui_tx, cancel.clone());
    tokio::pin!(start);
    loop {
        tokio::select! {
            result = &mut start => return result,
            Some(ev) = ui_rx.recv() => {
                if let UiEvent::Crossterm(Event::Key(key)) = ev {
                    if is_quit_key(&key) {
                        info!("startup cancelled by user");
                        cancel.cancel();
                    }
                }
            }
        }
    }
}

async fn run_with_terminal(
    config: Arc<Config>,
    terminal: &SharedTerminal,
) -> Result<(), Box<dyn Error>> {
    let session: Arc<dyn ChatSession> = Arc::new(DggSession::new(
        config.url(),
        config.auth_token.clone(),
    ));

    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(ui_tx.clone());

    let runtime = match start_interruptible(config, session, ui_tx, &mut ui_rx).await {
        Ok(runtime) => runtime,
        Err(err) => {
            event_reader_handle.abort();
            if matches!(err.downcast_ref::<StartupError>(), Some(StartupError::Cancelled)) {
                return Ok(());
            }
            return Err(err);
        }
    };

    let result = event_loop(&runtime, &mut ui_rx, terminal).await;

    event_reader_handle.abort();
    let stats = runtime.shutdown().await;
    info!(
        rendered = stats.rendered,
        observed = stats.observed,
        ignored = stats.ignored,
        "chat finished"
    );
    result
}

/// Run the interactive chat until the user quits.
///
/// The terminal is set up before the session is opened, so a terminal that
/// cannot enter raw mode fails fast without touching the network. Nothing is
/// drawn until the first user list has arrived.
pub async fn run_chat(config: Config) -> Result<(), Box<dyn Error>> {
    let config = Arc::new(config);
    let terminal = setup_terminal()?;
    let result = run_with_terminal(config, &terminal).await;
    let restored = restore_terminal(&terminal).await;
    result.and(restored)
}
