//! Screen layout for the chat UI.
//!
//! ```text
//! ● palaver │ http://127.0.0.1:5000 │ Ready
//! ┌ Conversation ───────────────────────────┐
//! │ ...                                     │
//! └─────────────────────────────────────────┘
//! ┌─────────────────────────────────────────┐
//! │> █Type a message                        │
//! └─────────────────────────────────────────┘
//! following        [Enter] send │ [F1] help
//! ```

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::app::App;
use crate::conversation::ConversationPane;
use crate::theme::Theme;
use crate::widgets::{chat_hints, FooterHints, InputBar, StatusBar};

/// Most input lines shown before the bar scrolls.
const MAX_INPUT_LINES: usize = 5;

/// Render the whole chat screen.
pub fn render_chat(app: &App, area: Rect, buf: &mut Buffer) {
    let input_lines = app.input_state.line_count().clamp(1, MAX_INPUT_LINES);
    let input_height = u16::try_from(input_lines).unwrap_or(1) + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(input_height),
            Constraint::Length(1),
        ])
        .split(area);

    let status = app.status_content();
    StatusBar::new(&status, &app.theme).render(chunks[0], buf);

    ConversationPane::new(&app.transcript, &app.theme)
        .markup(app.markup)
        .tick(app.tick)
        .render(chunks[1], buf);

    InputBar::new(&app.input_state, &app.theme)
        .mode(app.input_mode())
        .render(chunks[2], buf);

    let hints = chat_hints(app.voice_available);
    FooterHints::new(&hints, &app.theme)
        .following(app.transcript.is_following())
        .render(chunks[3], buf);

    if app.show_help {
        render_help_overlay(&app.theme, app.voice_available, area, buf);
    }
}

/// Key reference drawn over the chat screen.
pub fn render_help_overlay(theme: &Theme, voice_available: bool, area: Rect, buf: &mut Buffer) {
    let mut bindings = vec![
        ("Enter", "Send message"),
        ("Ctrl+J", "New line"),
        ("Up/Down", "Recall sent messages"),
        ("PgUp/PgDn", "Scroll transcript"),
        ("Ctrl+L", "Toggle follow"),
        ("F1", "Toggle this help"),
        ("Esc / Ctrl+C", "Quit"),
    ];
    if voice_available {
        bindings.insert(2, ("Ctrl+V", "Speak a message"));
    }

    let key_style = Style::default()
        .fg(theme.primary)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::default()];
    lines.extend(bindings.into_iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("  {key:<14}"), key_style),
            Span::styled(action, Style::default().fg(theme.text)),
        ])
    }));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "  [Press any key to close]",
        Style::default().fg(theme.muted),
    )));

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let overlay = centered_fixed(
        48.min(area.width.saturating_sub(4)),
        height.min(area.height.saturating_sub(2)),
        area,
    );

    Clear.render(overlay, buf);
    Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focused)),
        )
        .render(overlay, buf);
}

/// A rect of fixed size centered in `area`.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
