//! Application state and update logic for the palaver TUI.
//!
//! The session engine never touches this state directly: it reports changes
//! as [`SurfaceEvent`]s, which the main loop drains into [`App`] every turn.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use palaver_engine::{Config, MarkupMode, SurfaceEvent};
use tokio::sync::mpsc;

use crate::conversation::{DisplayMessage, TranscriptState};
use crate::event::Action;
use crate::theme::Theme;
use crate::widgets::{InputMode, SessionPhase, StatusBarContent, TextInputState};

/// Ticks a notification stays visible (about 3 s at 10 Hz).
const NOTIFICATION_TICKS: usize = 30;

/// Application state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    pub theme: Theme,
    pub markup: MarkupMode,
    pub server_url: String,

    pub transcript: TranscriptState,
    pub input_state: TextInputState,

    /// Whether the session accepts a new submission.
    pub input_enabled: bool,
    /// Whether a speech recognizer exists.
    pub voice_available: bool,
    /// Whether a capture is running.
    pub voice_active: bool,
    /// Set once the session task has stopped.
    pub session_ended: bool,

    /// Tick counter for animations.
    pub tick: u64,
    pub notification: Option<String>,
    notification_ttl: usize,

    surface_rx: Option<mpsc::UnboundedReceiver<SurfaceEvent>>,
}

impl App {
    /// Create the app for a session whose surface reports on `surface_rx`.
    pub fn new(config: &Config, surface_rx: mpsc::UnboundedReceiver<SurfaceEvent>) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            theme: Theme::from_env(),
            markup: config.markup,
            server_url: config.server_url.clone(),
            transcript: TranscriptState::new(),
            input_state: TextInputState::new(),
            input_enabled: true,
            voice_available: false,
            voice_active: false,
            session_ended: false,
            tick: 0,
            notification: None,
            notification_ttl: 0,
            surface_rx: Some(surface_rx),
        }
    }

    /// App with default config and no session attached.
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        let mut app = Self::new(&Config::default(), mpsc::unbounded_channel().1);
        app.theme = Theme::default();
        app.surface_rx = None;
        app
    }

    /// Apply one engine-originated UI change.
    pub fn apply_surface_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::MessageAppended { text, sender } => {
                self.transcript.push(DisplayMessage::new(sender, text));
            }
            SurfaceEvent::TypingIndicator(visible) => self.transcript.set_typing(visible),
            SurfaceEvent::InputEnabled(enabled) => self.input_enabled = enabled,
            SurfaceEvent::InputCleared => self.input_state.clear(),
            SurfaceEvent::VoiceActive(active) => self.voice_active = active,
            SurfaceEvent::VoiceAvailable(available) => self.voice_available = available,
        }
    }

    /// Apply every surface event queued so far.
    pub fn process_surface_events(&mut self) {
        let Some(rx) = &mut self.surface_rx else {
            return;
        };
        let mut pending = Vec::new();
        while let Ok(event) = rx.try_recv() {
            pending.push(event);
        }
        for event in pending {
            self.apply_surface_event(event);
        }
    }

    /// Take the composed message for submission.
    ///
    /// Returns `None` while input is disabled or when the draft is blank.
    /// Input is disabled immediately so a second Enter cannot queue another
    /// turn before the engine reports the reply is pending.
    pub fn take_submission(&mut self) -> Option<String> {
        if !self.input_enabled || self.session_ended {
            return None;
        }
        if self.input_state.content().trim().is_empty() {
            return None;
        }
        self.input_enabled = false;
        Some(self.input_state.submit())
    }

    /// Whether a voice capture may start now.
    pub fn can_start_voice(&self) -> bool {
        self.voice_available && !self.voice_active && self.input_enabled && !self.session_ended
    }

    /// Record that the session task has stopped.
    pub fn mark_session_ended(&mut self) {
        if self.session_ended {
            return;
        }
        self.session_ended = true;
        self.input_enabled = false;
        self.transcript.set_typing(false);
        self.set_notification("Session ended; press Esc to quit".into());
    }

    /// Handle a non-editing action.
    pub fn handle_action(&mut self, action: Action) {
        if self.show_help {
            // Any bound key closes the overlay
            if action != Action::None {
                self.show_help = false;
            }
            return;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::Help => self.show_help = true,
            Action::ScrollUp => self.transcript.scroll_up(1),
            Action::ScrollDown => self.transcript.scroll_down(1),
            Action::PageUp => self.transcript.page_up(),
            Action::PageDown => self.transcript.page_down(),
            Action::ToggleFollow => {
                self.transcript.toggle_follow();
                let msg = if self.transcript.is_following() {
                    "Following new messages"
                } else {
                    "Transcript frozen"
                };
                self.set_notification(msg.into());
            }
            // Submission and voice need the session; the main loop owns those
            Action::Submit | Action::Voice | Action::None => {}
        }
    }

    /// Handle a key that has no binding: edit the draft or recall history.
    pub fn handle_input_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Up => {
                if self.input_state.is_empty() || self.input_state.is_recalling() {
                    self.input_state.history_prev();
                } else {
                    self.transcript.scroll_up(1);
                }
                return;
            }
            KeyCode::Down => {
                if self.input_state.is_recalling() {
                    self.input_state.history_next();
                } else {
                    self.transcript.scroll_down(1);
                }
                return;
            }
            _ => {}
        }

        if !self.input_enabled {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('j') if ctrl => self.input_state.insert('\n'),
            KeyCode::Enter => self.input_state.insert('\n'),
            KeyCode::Char(c) if !ctrl => self.input_state.insert(c),
            KeyCode::Tab => self.input_state.insert_str("    "),
            KeyCode::Backspace => self.input_state.backspace(),
            KeyCode::Delete => self.input_state.delete(),
            KeyCode::Left => self.input_state.move_left(),
            KeyCode::Right => self.input_state.move_right(),
            KeyCode::Home => self.input_state.move_home(),
            KeyCode::End => self.input_state.move_end(),
            _ => {}
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.session_ended {
            SessionPhase::Ended
        } else if self.voice_active {
            SessionPhase::Listening
        } else if !self.input_enabled || self.transcript.is_typing() {
            SessionPhase::Waiting
        } else {
            SessionPhase::Ready
        }
    }

    pub fn input_mode(&self) -> InputMode {
        match self.phase() {
            SessionPhase::Listening => InputMode::Listening,
            SessionPhase::Waiting | SessionPhase::Ended => InputMode::Waiting,
            SessionPhase::Ready => InputMode::Editing,
        }
    }

    pub fn status_content(&self) -> StatusBarContent {
        StatusBarContent {
            server_url: self.server_url.clone(),
            phase: self.phase(),
            voice_available: self.voice_available,
            notification: self.notification.clone(),
        }
    }

    /// Set a temporary notification message.
    pub fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Advance animations and expire notifications.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}
