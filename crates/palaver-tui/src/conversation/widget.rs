//! Conversation pane widget.
//!
//! ```text
//! ┌ Conversation ────────────────────────┐
//! │Assistant · 09:14                     │
//! │  Hi there! What is your name?        │
//! │                                      │
//! │You · 09:14                           │
//! │  Alice                               │
//! │                                      │
//! │Assistant is typing...                │
//! └──────────────────────────────────────┘
//! ```

use palaver_engine::markup::{self, MarkupMode};
use palaver_engine::Role;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::text::{render_markdown, wrap_indented, wrap_text};
use crate::theme::Theme;

use super::transcript::{DisplayMessage, TranscriptState};

const BODY_INDENT: &str = "  ";

/// Scrollable, bordered transcript.
pub struct ConversationPane<'a> {
    state: &'a TranscriptState,
    theme: &'a Theme,
    markup: MarkupMode,
    tick: u64,
}

impl<'a> ConversationPane<'a> {
    pub fn new(state: &'a TranscriptState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            markup: MarkupMode::default(),
            tick: 0,
        }
    }

    /// How assistant markup is presented.
    #[must_use]
    pub fn markup(mut self, markup: MarkupMode) -> Self {
        self.markup = markup;
        self
    }

    /// Animation tick for the typing indicator.
    #[must_use]
    pub fn tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    /// Every transcript line at the given inner width, newest last.
    pub fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (i, message) in self.state.messages().iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(self.header(message));
            lines.extend(self.body(message, width));
        }

        if self.state.is_typing() {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            let dots = ".".repeat(usize::try_from(self.tick % 4).unwrap_or(0));
            lines.push(Line::from(Span::styled(
                format!("Assistant is typing{dots}"),
                Style::default()
                    .fg(self.theme.muted)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    }

    fn header(&self, message: &DisplayMessage) -> Line<'static> {
        let (name, color) = match message.sender {
            Role::User => ("You", self.theme.user),
            Role::Assistant => ("Assistant", self.theme.assistant),
        };
        Line::from(vec![
            Span::styled(name, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" · {}", message.received_at.format("%H:%M")),
                Style::default().fg(self.theme.muted),
            ),
        ])
    }

    fn body(&self, message: &DisplayMessage, width: usize) -> Vec<Line<'static>> {
        if message.is_error() {
            let notice = Line::from(Span::styled(
                message.text.clone(),
                Style::default().fg(self.theme.error),
            ));
            return wrap_indented(vec![notice], width, Span::raw(BODY_INDENT));
        }

        match message.sender {
            Role::Assistant => wrap_indented(
                render_markdown(&markup::present(self.markup, &message.text), self.theme),
                width,
                Span::raw(BODY_INDENT),
            ),
            // User text is shown as typed, never interpreted
            Role::User => {
                let style = Style::default().fg(self.theme.text);
                let available = width.saturating_sub(BODY_INDENT.len()).max(1);
                message
                    .text
                    .split('\n')
                    .flat_map(|line| {
                        if line.trim().is_empty() {
                            vec![String::new()]
                        } else {
                            wrap_text(line, available)
                        }
                    })
                    .map(|row| Line::from(vec![Span::raw(BODY_INDENT), Span::styled(row, style)]))
                    .collect()
            }
        }
    }
}

impl Widget for ConversationPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Conversation ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = self.lines(usize::from(inner.width));
        if lines.is_empty() {
            Paragraph::new(Span::styled(
                "No messages yet",
                Style::default().fg(self.theme.muted),
            ))
            .render(inner, buf);
            return;
        }

        let height = usize::from(inner.height);
        let offset = self.state.offset_for(lines.len().saturating_sub(height));
        let visible: Vec<Line<'static>> = lines.into_iter().skip(offset).take(height).collect();
        Paragraph::new(visible).render(inner, buf);
    }
}
