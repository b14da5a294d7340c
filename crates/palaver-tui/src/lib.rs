//! palaver-tui: Terminal chat front-end for palaver
//!
//! This crate draws a session driven by `palaver-engine`:
//! - Transcript with speaker attribution, timestamps and markdown replies
//! - Typing indicator, input lock and voice indicator fed by surface events
//! - Multi-line input with recall of sent messages

mod app;
mod conversation;
mod event;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod text;
mod theme;
mod widgets;

pub use app::App;
pub use event::{Action, Event, EventHandler};
pub use palaver_engine;

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use palaver_engine::{
    select_recognizer, select_speech_output, start_session, ChannelSurface, Config,
    HttpAssistantClient, SessionController, SessionHandle, SpeechInputAdapter,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Event poll interval; also the typing animation rate.
const TICK_MS: u64 = 100;

/// How long to wait for the session task after asking it to stop.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Everything the main loop needs to talk to the running session.
struct Session {
    handle: SessionHandle,
    task: JoinHandle<SessionController>,
    voice: Arc<SpeechInputAdapter>,
    voice_task: Option<JoinHandle<()>>,
}

impl Session {
    /// Wire the engine to a channel surface and start the session task.
    fn start(config: &Config, surface: ChannelSurface) -> Result<Self, Box<dyn std::error::Error>> {
        let client = HttpAssistantClient::new(&config.server_url, config.request_timeout())?;
        let surface = Arc::new(surface);

        let controller = SessionController::new(
            Arc::new(client),
            surface.clone(),
            surface.clone(),
            select_speech_output(&config.speech),
        )
        .with_welcome_message(config.welcome_message.clone());
        info!(session_id = %controller.id(), server = %config.server_url, "starting session");

        let voice = Arc::new(SpeechInputAdapter::new(
            select_recognizer(&config.speech),
            surface,
        ));
        let (handle, task) = start_session(controller);

        Ok(Self {
            handle,
            task,
            voice,
            voice_task: None,
        })
    }

    /// Run one voice capture in the background.
    fn start_voice(&mut self) {
        if self.voice_task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("voice capture already running");
            return;
        }
        let voice = self.voice.clone();
        let sink = self.handle.clone();
        self.voice_task = Some(tokio::spawn(async move { voice.activate(&sink).await }));
    }

    /// Stop capture and the session, waiting briefly for the task to end.
    async fn stop(self) {
        if let Some(task) = self.voice_task {
            task.abort();
        }
        self.handle.shutdown();
        match tokio::time::timeout(SHUTDOWN_GRACE, self.task).await {
            Ok(Ok(controller)) => {
                info!(turns = controller.history().len(), "session stopped");
            }
            Ok(Err(e)) => warn!(error = %e, "session task failed"),
            Err(_) => warn!("session did not stop in time"),
        }
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs a session against `config.server_url`, and
/// restores the terminal on exit.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (surface, surface_rx) = ChannelSurface::new();
    let mut session = Session::start(config, surface)?;
    let mut app = App::new(config, surface_rx);

    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut events = EventHandler::new(TICK_MS);

    let result = run_loop(&mut terminal, &mut app, &mut events, &mut session).await;

    session.stop().await;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    session: &mut Session,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.process_surface_events();
        if session.task.is_finished() {
            app.mark_session_ended();
        }

        terminal.draw(|frame| {
            let area = frame.area();
            screens::render_chat(app, area, frame.buffer_mut());
        })?;

        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => dispatch_key(app, session, key),
            Event::Mouse(mouse) => app.handle_action(event::mouse_to_action(mouse)),
            Event::Tick => app.tick(),
            // Redrawn on the next pass
            Event::Resize(_, _) => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn dispatch_key(app: &mut App, session: &mut Session, key: crossterm::event::KeyEvent) {
    match event::key_to_action(key) {
        action @ (Action::Submit | Action::Voice) if app.show_help => app.handle_action(action),
        Action::Submit => {
            if let Some(text) = app.take_submission() {
                if !session.handle.submit(text) {
                    app.mark_session_ended();
                }
            }
        }
        Action::Voice => {
            if app.can_start_voice() {
                session.start_voice();
            }
        }
        Action::None => app.handle_input_key(key),
        action => app.handle_action(action),
    }
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use palaver_engine::{
        AssistantClient, RemoteAssistantError, Role, Turn, REPLY_ERROR_MESSAGE,
    };
    use palaver_engine::speech::SilentSpeech;

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    /// Greets by name, or fails on "Bob".
    struct GreetingClient;

    #[async_trait]
    impl AssistantClient for GreetingClient {
        async fn send(
            &self,
            message: &str,
            _history: Vec<Turn>,
        ) -> Result<Turn, RemoteAssistantError> {
            if message == "Bob" {
                return Err(RemoteAssistantError::new("server responded with 500"));
            }
            Ok(Turn::assistant(format!("Nice to meet you, {message}!")))
        }
    }

    fn start_app_session() -> (App, SessionHandle, JoinHandle<SessionController>) {
        let (surface, rx) = ChannelSurface::new();
        let surface = Arc::new(surface);
        let controller = SessionController::new(
            Arc::new(GreetingClient),
            surface.clone(),
            surface,
            Arc::new(SilentSpeech),
        );
        let (handle, task) = start_session(controller);
        let mut app = App::new(&Config::default(), rx);
        app.theme = crate::theme::Theme::default();
        (app, handle, task)
    }

    /// Pump surface events until the app accepts input again.
    async fn settle(app: &mut App) {
        for _ in 0..200 {
            app.process_surface_events();
            if app.input_enabled && !app.transcript.is_typing() && !app.transcript.is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_typed_message_round_trip() {
        let (mut app, handle, task) = start_app_session();
        settle(&mut app).await;
        assert_eq!(app.transcript.len(), 1);

        app.input_state.insert_str("Alice");
        let text = app.take_submission().unwrap();
        assert!(handle.submit(text));
        settle(&mut app).await;
        // The reply lands after the user message
        while app.transcript.len() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.process_surface_events();
        }

        let messages = app.transcript.messages();
        assert_eq!(messages[1].sender, Role::User);
        assert_eq!(messages[1].text, "Alice");
        assert_eq!(messages[2].text, "Nice to meet you, Alice!");
        assert!(app.input_enabled);

        let screen = crate::test_utils::render_app(&app, 80, 20);
        assert!(screen.contains("Nice to meet you, Alice!"));

        handle.shutdown();
        let controller = task.await.unwrap();
        assert_eq!(controller.history().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_reply_shows_error_and_unlocks_input() {
        let (mut app, handle, task) = start_app_session();
        settle(&mut app).await;

        app.input_state.insert_str("Bob");
        handle.submit(app.take_submission().unwrap());
        while app.transcript.len() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            app.process_surface_events();
        }
        settle(&mut app).await;

        assert!(app.transcript.messages()[2].is_error());
        assert_eq!(app.transcript.messages()[2].text, REPLY_ERROR_MESSAGE);
        assert!(app.input_enabled);

        handle.shutdown();
        task.await.unwrap();
    }
}
