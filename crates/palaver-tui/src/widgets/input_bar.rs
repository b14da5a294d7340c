//! Message entry bar at the bottom of the chat screen.
//!
//! Multi-line input uses Ctrl+J for newlines. While a reply is pending or
//! speech is being captured, the bar shows a status line instead of the
//! editable text.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Theme;

use super::TextInputState;

const CURSOR: &str = "█";
const PLACEHOLDER: &str = "Type a message";

/// What the input bar is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Accepting typed input.
    Editing,
    /// Input disabled while a reply is pending.
    Waiting,
    /// Microphone capture in progress.
    Listening,
}

/// Bordered input bar.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    theme: &'a Theme,
    mode: InputMode,
}

impl<'a> InputBar<'a> {
    pub fn new(input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            mode: InputMode::Editing,
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Display lines plus the index of the line holding the cursor.
    fn editing_lines(&self) -> (Vec<Line<'static>>, usize) {
        if self.input.is_empty() {
            let line = Line::from(vec![
                Span::raw("> "),
                Span::raw(CURSOR),
                Span::styled(PLACEHOLDER, Style::default().fg(self.theme.muted)),
            ]);
            return (vec![line], 0);
        }

        // Characters left before the cursor; `None` once it has been placed
        let mut remaining = Some(self.input.cursor());
        let mut cursor_line = 0;
        let mut lines = Vec::new();

        for (idx, text) in self.input.content().split('\n').enumerate() {
            let prefix = if idx == 0 { "> " } else { "  " };
            let len = text.chars().count();
            let mut spans = vec![Span::raw(prefix)];

            match remaining {
                Some(at) if at <= len => {
                    cursor_line = idx;
                    spans.push(Span::raw(text.chars().take(at).collect::<String>()));
                    spans.push(Span::raw(CURSOR));
                    spans.push(Span::raw(text.chars().skip(at).collect::<String>()));
                    remaining = None;
                }
                Some(at) => {
                    spans.push(Span::raw(text.to_string()));
                    remaining = Some(at - len - 1);
                }
                None => spans.push(Span::raw(text.to_string())),
            }
            lines.push(Line::from(spans));
        }

        (lines, cursor_line)
    }
}

impl Widget for InputBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = match self.mode {
            InputMode::Editing => self.theme.border_focused,
            InputMode::Waiting => self.theme.border,
            InputMode::Listening => self.theme.warning,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));

        let paragraph = match self.mode {
            InputMode::Waiting => Paragraph::new("● Waiting for reply...")
                .style(Style::default().fg(self.theme.muted)),
            InputMode::Listening => Paragraph::new("● Listening...")
                .style(Style::default().fg(self.theme.warning)),
            InputMode::Editing => {
                let (lines, cursor_line) = self.editing_lines();
                let visible = area.height.saturating_sub(2) as usize;
                // Keep the cursor line on screen
                let scroll = cursor_line.saturating_sub(visible.saturating_sub(1));
                Paragraph::new(lines)
                    .style(Style::default().fg(self.theme.text))
                    .scroll((scroll as u16, 0))
            }
        };

        paragraph.block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::render_widget;

    #[test]
    fn test_empty_input_shows_placeholder() {
        let input = TextInputState::new();
        let theme = Theme::default();
        let screen = render_widget(InputBar::new(&input, &theme), 40, 3);
        assert!(screen.contains("> █Type a message"));
    }

    #[test]
    fn test_cursor_inside_text() {
        let mut input = TextInputState::new();
        input.insert_str("Alice");
        input.move_left();
        let theme = Theme::default();
        let screen = render_widget(InputBar::new(&input, &theme), 40, 3);
        assert!(screen.contains("> Alic█e"));
    }

    #[test]
    fn test_cursor_on_second_line() {
        let mut input = TextInputState::new();
        input.insert_str("first\nsecond");
        let theme = Theme::default();
        let screen = render_widget(InputBar::new(&input, &theme), 40, 4);
        assert!(screen.contains("> first"));
        assert!(screen.contains("  second█"));
    }

    #[test]
    fn test_waiting_hides_text() {
        let mut input = TextInputState::new();
        input.insert_str("secret draft");
        let theme = Theme::default();
        let screen = render_widget(
            InputBar::new(&input, &theme).mode(InputMode::Waiting),
            40,
            3,
        );
        assert!(screen.contains("Waiting for reply"));
        assert!(!screen.contains("secret draft"));
    }

    #[test]
    fn test_listening_indicator() {
        let input = TextInputState::new();
        let theme = Theme::default();
        let screen = render_widget(
            InputBar::new(&input, &theme).mode(InputMode::Listening),
            40,
            3,
        );
        assert!(screen.contains("Listening"));
    }
}
