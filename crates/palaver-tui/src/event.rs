//! Terminal events and key bindings for the chat screen.

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// No input within one tick; drives animation and housekeeping.
    Tick,
    Resize(u16, u16),
}

/// Polls crossterm on a dedicated thread and forwards events.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        // crossterm polling blocks, so it cannot live on the runtime
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            Event::Key(key)
                        }
                        Ok(CrosstermEvent::Mouse(mouse)) => Event::Mouse(mouse),
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        _ => continue,
                    }
                } else {
                    Event::Tick
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Wait for the next event.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// What a key press means on the chat screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Submit,
    Voice,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ToggleFollow,
    /// Not a binding; the key goes to the input editor.
    None,
}

/// Map a key to its action. Keys without a binding return [`Action::None`].
pub fn key_to_action(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('v') => Action::Voice,
            KeyCode::Char('l') => Action::ToggleFollow,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::F(1) => Action::Help,
        KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => Action::Submit,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => Action::None,
    }
}

/// Map mouse wheel movement to transcript scrolling.
pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollUp => Action::ScrollUp,
        MouseEventKind::ScrollDown => Action::ScrollDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_quit_bindings() {
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(ctrl('c')), Action::Quit);
    }

    #[test]
    fn test_chat_bindings() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(ctrl('v')), Action::Voice);
        assert_eq!(key_to_action(ctrl('l')), Action::ToggleFollow);
        assert_eq!(key_to_action(key(KeyCode::F(1))), Action::Help);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::PageUp);
        assert_eq!(key_to_action(key(KeyCode::PageDown)), Action::PageDown);
    }

    #[test]
    fn test_plain_characters_are_unbound() {
        // Letters must reach the input, including ones bound with Ctrl
        for c in ['q', 'v', 'l', '?'] {
            assert_eq!(key_to_action(key(KeyCode::Char(c))), Action::None);
        }
        assert_eq!(key_to_action(ctrl('j')), Action::None);
    }

    #[test]
    fn test_mouse_wheel_scrolls() {
        let wheel = |kind| MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(mouse_to_action(wheel(MouseEventKind::ScrollUp)), Action::ScrollUp);
        assert_eq!(
            mouse_to_action(wheel(MouseEventKind::ScrollDown)),
            Action::ScrollDown
        );
    }

    #[test]
    fn test_key_event_state_is_ignored() {
        let mut enter = key(KeyCode::Enter);
        enter.state = KeyEventState::CAPS_LOCK;
        assert_eq!(key_to_action(enter), Action::Submit);
    }
}
