//! The boundary between the session controller and whatever draws it.
//!
//! The controller never touches a concrete UI. It calls a [`Renderer`] to
//! show messages and toggle UI state, and an [`InputSource`] to clear the
//! composer. The speech input adapter drives a [`VoiceControl`].
//!
//! [`ChannelSurface`] implements all three by forwarding [`SurfaceEvent`]s
//! over a channel, so a UI running elsewhere can apply them on its own
//! schedule.

use tokio::sync::mpsc;

use crate::turn::Role;

/// Message log and UI-state toggles.
pub trait Renderer: Send + Sync {
    /// Append a message to the display log.
    fn append_message(&self, text: &str, sender: Role);

    /// Show or hide the typing indicator.
    fn set_typing_indicator(&self, visible: bool);

    /// Enable or disable submission.
    fn set_input_enabled(&self, enabled: bool);
}

/// The control the user types into.
pub trait InputSource: Send + Sync {
    /// Clear the current value.
    fn clear(&self);
}

/// The control that triggers voice capture.
pub trait VoiceControl: Send + Sync {
    /// Toggle the "listening" visual flag.
    fn set_voice_active(&self, active: bool);

    /// Show the control, or hide it when speech input is unsupported.
    fn set_voice_available(&self, available: bool);
}

/// A UI change requested by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A message was appended to the display log.
    MessageAppended { text: String, sender: Role },
    /// Typing indicator visibility changed.
    TypingIndicator(bool),
    /// Submission enabled/disabled.
    InputEnabled(bool),
    /// The input source should clear its value.
    InputCleared,
    /// Voice capture started or ended.
    VoiceActive(bool),
    /// Voice capture support detected or ruled out.
    VoiceAvailable(bool),
}

/// Surface that forwards every call as a [`SurfaceEvent`].
///
/// Sends silently ignore a dropped receiver: if the UI is gone the session
/// keeps running but stops producing events.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    tx: mpsc::UnboundedSender<SurfaceEvent>,
}

impl ChannelSurface {
    /// Create a surface and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SurfaceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: SurfaceEvent) {
        let _ = self.tx.send(event);
    }
}

impl Renderer for ChannelSurface {
    fn append_message(&self, text: &str, sender: Role) {
        self.emit(SurfaceEvent::MessageAppended {
            text: text.to_string(),
            sender,
        });
    }

    fn set_typing_indicator(&self, visible: bool) {
        self.emit(SurfaceEvent::TypingIndicator(visible));
    }

    fn set_input_enabled(&self, enabled: bool) {
        self.emit(SurfaceEvent::InputEnabled(enabled));
    }
}

impl InputSource for ChannelSurface {
    fn clear(&self) {
        self.emit(SurfaceEvent::InputCleared);
    }
}

impl VoiceControl for ChannelSurface {
    fn set_voice_active(&self, active: bool) {
        self.emit(SurfaceEvent::VoiceActive(active));
    }

    fn set_voice_available(&self, available: bool) {
        self.emit(SurfaceEvent::VoiceAvailable(available));
    }
}

/// Drain every event currently queued on `rx` without waiting.
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<SurfaceEvent>) -> Vec<SurfaceEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
