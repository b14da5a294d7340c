//! Footer keybinding hints.
//!
//! Format: `following            [Enter] send │ [Ctrl+J] newline │ [F1] help`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::text::visual_width;
use crate::theme::Theme;

/// A single keybinding hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHint {
    pub key: String,
    pub action: String,
}

impl KeyHint {
    pub fn new(key: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: action.into(),
        }
    }
}

/// Hints for the chat screen. The voice hint only appears when a
/// recognizer is available.
#[must_use]
pub fn chat_hints(voice_available: bool) -> Vec<KeyHint> {
    let mut hints = vec![
        KeyHint::new("Enter", "send"),
        KeyHint::new("Ctrl+J", "newline"),
    ];
    if voice_available {
        hints.push(KeyHint::new("Ctrl+V", "voice"));
    }
    hints.extend([
        KeyHint::new("PgUp/PgDn", "scroll"),
        KeyHint::new("F1", "help"),
        KeyHint::new("Esc", "quit"),
    ]);
    hints
}

/// Footer widget: scroll state on the left, hints right-aligned.
pub struct FooterHints<'a> {
    hints: &'a [KeyHint],
    theme: &'a Theme,
    following: bool,
}

impl<'a> FooterHints<'a> {
    pub fn new(hints: &'a [KeyHint], theme: &'a Theme) -> Self {
        Self {
            hints,
            theme,
            following: true,
        }
    }

    /// Whether the transcript is pinned to the newest message.
    #[must_use]
    pub fn following(mut self, following: bool) -> Self {
        self.following = following;
        self
    }
}

impl Widget for FooterHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut left_spans = vec![if self.following {
            Span::styled("following", Style::default().fg(self.theme.subtext))
        } else {
            Span::styled("scrolled", Style::default().fg(self.theme.warning))
        }];

        let mut right_spans = Vec::new();
        for (i, hint) in self.hints.iter().enumerate() {
            if i > 0 {
                right_spans.push(Span::styled(" │ ", Style::default().fg(self.theme.muted)));
            }
            right_spans.push(Span::styled("[", Style::default().fg(self.theme.muted)));
            right_spans.push(Span::styled(&hint.key, Style::default().fg(self.theme.primary)));
            right_spans.push(Span::styled("] ", Style::default().fg(self.theme.muted)));
            right_spans.push(Span::styled(&hint.action, Style::default().fg(self.theme.subtext)));
        }

        let width_of = |spans: &[Span<'_>]| -> usize {
            spans.iter().map(|s| visual_width(&s.content)).sum()
        };
        let padding = usize::from(area.width)
            .saturating_sub(width_of(&left_spans) + width_of(&right_spans));
        if padding > 0 {
            left_spans.push(Span::raw(" ".repeat(padding)));
        }
        left_spans.extend(right_spans);

        Paragraph::new(Line::from(left_spans))
            .style(Style::default().bg(self.theme.surface))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::render_widget;

    #[test]
    fn test_voice_hint_only_when_available() {
        let keys = |hints: Vec<KeyHint>| hints.into_iter().map(|h| h.key).collect::<Vec<_>>();
        assert!(!keys(chat_hints(false)).contains(&"Ctrl+V".to_string()));
        assert!(keys(chat_hints(true)).contains(&"Ctrl+V".to_string()));
    }

    #[test]
    fn test_hints_are_right_aligned() {
        let hints = vec![KeyHint::new("F1", "help")];
        let screen = render_widget(FooterHints::new(&hints, &Theme::default()), 40, 1);
        let row = screen.lines().next().unwrap_or_default();
        assert!(row.starts_with("following"));
        assert!(row.trim_end().ends_with("[F1] help"));
    }

    #[test]
    fn test_scrolled_indicator() {
        let hints = chat_hints(false);
        let screen = render_widget(
            FooterHints::new(&hints, &Theme::default()).following(false),
            120,
            1,
        );
        assert!(screen.contains("scrolled"));
        assert!(screen.contains("[Enter] send │ [Ctrl+J] newline"));
    }
}
