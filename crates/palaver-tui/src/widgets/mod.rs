//! Widgets for the chat screen.
//!
//! This module provides:
//! - [`StatusBar`] - Top bar with server, session phase and notifications
//! - [`InputBar`] - Bordered message entry backed by [`TextInputState`]
//! - [`FooterHints`] - Bottom keybinding hints

mod footer_hints;
mod input_bar;
mod status_bar;
mod text_input;

pub use footer_hints::{chat_hints, FooterHints, KeyHint};
pub use input_bar::{InputBar, InputMode};
pub use status_bar::{SessionPhase, StatusBar, StatusBarContent};
pub use text_input::TextInputState;
