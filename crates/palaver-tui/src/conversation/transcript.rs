//! Transcript state: the messages on screen and how far they are scrolled.

use std::cell::Cell;

use chrono::{DateTime, Local};
use palaver_engine::{Role, REPLY_ERROR_MESSAGE};

/// Lines moved per PgUp/PgDn.
pub const PAGE_LINES: usize = 10;

/// A message as displayed, stamped with when it reached the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMessage {
    pub sender: Role,
    pub text: String,
    pub received_at: DateTime<Local>,
}

impl DisplayMessage {
    pub fn new(sender: Role, text: impl Into<String>) -> Self {
        Self::at(sender, text, Local::now())
    }

    pub fn at(sender: Role, text: impl Into<String>, received_at: DateTime<Local>) -> Self {
        Self {
            sender,
            text: text.into(),
            received_at,
        }
    }

    /// The fixed notice shown when a reply could not be obtained.
    pub fn is_error(&self) -> bool {
        self.sender == Role::Assistant && self.text == REPLY_ERROR_MESSAGE
    }
}

/// Messages plus scroll position.
///
/// While following, the view is pinned to the newest line. Scrolling up
/// leaves follow mode; scrolling back to the bottom re-enters it.
#[derive(Debug, Default)]
pub struct TranscriptState {
    messages: Vec<DisplayMessage>,
    /// Top line of the view when not following.
    scroll_top: usize,
    follow: bool,
    typing: bool,
    /// Largest valid `scroll_top`, recorded by the last render.
    max_scroll: Cell<usize>,
}

impl TranscriptState {
    pub fn new() -> Self {
        Self {
            follow: true,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: DisplayMessage) {
        self.messages.push(message);
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Index of the first visible line for a transcript whose last valid
    /// offset is `max`.
    pub fn offset_for(&self, max: usize) -> usize {
        self.max_scroll.set(max);
        if self.follow {
            max
        } else {
            self.scroll_top.min(max)
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        if self.follow {
            self.scroll_top = self.max_scroll.get();
            self.follow = false;
        }
        self.scroll_top = self.scroll_top.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        if self.follow {
            return;
        }
        let max = self.max_scroll.get();
        self.scroll_top = (self.scroll_top + lines).min(max);
        if self.scroll_top >= max {
            self.follow = true;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(PAGE_LINES);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(PAGE_LINES);
    }

    /// Freeze the view where it is, or jump back to the newest message.
    pub fn toggle_follow(&mut self) {
        if self.follow {
            self.scroll_top = self.max_scroll.get();
            self.follow = false;
        } else {
            self.follow = true;
        }
    }
}
