//! Style table for assistant reply markdown.

use ratatui::style::{Modifier, Style};

use crate::theme::Theme;

/// Maps markdown elements in a reply to ratatui styles.
#[derive(Debug, Clone)]
pub struct MarkdownStyles {
    pub h1: Style,
    pub h2: Style,
    /// Used for H3 and deeper.
    pub h3: Style,
    pub code: Style,
    pub code_block: Style,
    pub emphasis: Style,
    pub strong: Style,
    pub strikethrough: Style,
    /// Bullets, checkboxes, rules and link targets.
    pub list_marker: Style,
    pub link: Style,
    pub blockquote: Style,
    /// Body text of a reply.
    pub text: Style,
}

impl MarkdownStyles {
    pub fn from_theme(theme: &Theme) -> Self {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let literal = Style::default().fg(theme.secondary).bg(theme.surface);
        Self {
            h1: bold.fg(theme.assistant),
            h2: bold.fg(theme.text),
            h3: bold.fg(theme.subtext),
            code: literal,
            code_block: literal,
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: bold,
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),
            list_marker: Style::default().fg(theme.muted),
            link: Style::default()
                .fg(theme.info)
                .add_modifier(Modifier::UNDERLINED),
            blockquote: Style::default()
                .fg(theme.subtext)
                .add_modifier(Modifier::ITALIC),
            text: Style::default().fg(theme.text),
        }
    }
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}
