//! Status bar widget for the top of the chat screen.
//!
//! Format: `● palaver │ http://server │ Ready │ voice │ notification`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::text::truncate_to_width;
use crate::theme::Theme;

/// Longest server URL shown before it is shortened.
const MAX_SERVER_WIDTH: usize = 40;

/// Session phase as shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Ready,
    Waiting,
    Listening,
    /// The session task has stopped; no further input is processed.
    Ended,
}

impl SessionPhase {
    fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Waiting => "Waiting for reply",
            Self::Listening => "Listening",
            Self::Ended => "Session ended",
        }
    }
}

/// Status bar content.
#[derive(Debug, Clone, Default)]
pub struct StatusBarContent {
    pub server_url: String,
    pub phase: SessionPhase,
    /// Whether a speech recognizer is available.
    pub voice_available: bool,
    /// Transient message, e.g. a capture failure.
    pub notification: Option<String>,
}

/// Status bar widget.
pub struct StatusBar<'a> {
    content: &'a StatusBarContent,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(content: &'a StatusBarContent, theme: &'a Theme) -> Self {
        Self { content, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let separator = || Span::styled(" │ ", Style::default().fg(self.theme.muted));
        let phase_color = match self.content.phase {
            SessionPhase::Ready => self.theme.success,
            SessionPhase::Waiting => self.theme.info,
            SessionPhase::Listening => self.theme.warning,
            SessionPhase::Ended => self.theme.error,
        };

        let mut spans = vec![
            Span::styled("● ", Style::default().fg(phase_color)),
            Span::styled("palaver", Style::default().fg(self.theme.text)),
            separator(),
            Span::styled(
                truncate_to_width(&self.content.server_url, MAX_SERVER_WIDTH),
                Style::default().fg(self.theme.subtext),
            ),
            separator(),
            Span::styled(self.content.phase.label(), Style::default().fg(phase_color)),
        ];

        if self.content.voice_available {
            spans.push(separator());
            spans.push(Span::styled("voice", Style::default().fg(self.theme.secondary)));
        }

        if let Some(ref note) = self.content.notification {
            spans.push(separator());
            spans.push(Span::styled(
                format!("→ {note}"),
                Style::default().fg(self.theme.warning),
            ));
        }

        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(self.theme.surface))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::render_widget;

    fn content() -> StatusBarContent {
        StatusBarContent {
            server_url: "http://127.0.0.1:5000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ready_status() {
        let content = content();
        let screen = render_widget(StatusBar::new(&content, &Theme::default()), 80, 1);
        assert!(screen.contains("● palaver │ http://127.0.0.1:5000 │ Ready"));
        assert!(!screen.contains("voice"));
    }

    #[test]
    fn test_voice_and_notification() {
        let content = StatusBarContent {
            phase: SessionPhase::Listening,
            voice_available: true,
            notification: Some("No speech detected".into()),
            ..content()
        };
        let screen = render_widget(StatusBar::new(&content, &Theme::default()), 120, 1);
        assert!(screen.contains("Listening │ voice │ → No speech detected"));
    }

    #[test]
    fn test_long_server_url_is_shortened() {
        let content = StatusBarContent {
            server_url: format!("https://{}.example.com", "a".repeat(60)),
            ..content()
        };
        let screen = render_widget(StatusBar::new(&content, &Theme::default()), 120, 1);
        assert!(screen.contains('…'));
        assert!(!screen.contains("example.com"));
    }
}
