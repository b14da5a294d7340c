//! Word wrapping for plain strings and styled ratatui Lines.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::width::{char_width, visual_width};

/// Wrap a plain string to `width` columns.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

/// Wrap styled lines to `width` columns, keeping each span's style.
///
/// Every produced line starts with `indent`, which counts against `width`.
pub fn wrap_indented(
    lines: Vec<Line<'static>>,
    width: usize,
    indent: Span<'static>,
) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    let available = width.saturating_sub(visual_width(&indent.content)).max(1);
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, available, &indent))
        .collect()
}

/// Accumulates spans for one output row, merging runs of equal style.
struct RowBuilder {
    indent: Span<'static>,
    spans: Vec<Span<'static>>,
    width: usize,
}

impl RowBuilder {
    fn new(indent: Span<'static>) -> Self {
        Self {
            indent,
            spans: Vec::new(),
            width: 0,
        }
    }

    fn push(&mut self, text: &str, style: Style) {
        self.width += visual_width(text);
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.content.to_mut().push_str(text),
            _ => self.spans.push(Span::styled(text.to_string(), style)),
        }
    }

    fn finish(&mut self) -> Line<'static> {
        let mut spans = Vec::with_capacity(self.spans.len() + 1);
        if !self.indent.content.is_empty() {
            spans.push(self.indent.clone());
        }
        spans.append(&mut self.spans);
        self.width = 0;
        Line::from(spans)
    }
}

fn wrap_line(line: Line<'static>, available: usize, indent: &Span<'static>) -> Vec<Line<'static>> {
    let mut rows = Vec::new();
    let mut row = RowBuilder::new(indent.clone());
    let mut pending_space: Vec<(String, Style)> = Vec::new();
    let mut leading = true;

    for span in &line.spans {
        let style = line.style.patch(span.style);
        for (is_space, piece) in split_words(&span.content) {
            if is_space {
                // Leading whitespace is indentation (code blocks, nested lists)
                if leading {
                    row.push(piece, style);
                } else if row.width > 0 {
                    pending_space.push((piece.to_string(), style));
                }
                continue;
            }
            leading = false;

            let space_width: usize = pending_space.iter().map(|(s, _)| visual_width(s)).sum();
            let word_width = visual_width(piece);
            if row.width > 0 && row.width + space_width + word_width > available {
                rows.push(row.finish());
                pending_space.clear();
            } else {
                for (space, space_style) in pending_space.drain(..) {
                    row.push(&space, space_style);
                }
            }

            if word_width <= available {
                row.push(piece, style);
                continue;
            }
            // A single word wider than the row is broken between characters
            let mut buf = [0u8; 4];
            for ch in piece.chars() {
                if row.width > 0 && row.width + char_width(ch) > available {
                    rows.push(row.finish());
                }
                row.push(ch.encode_utf8(&mut buf), style);
            }
        }
    }

    if row.width > 0 || rows.is_empty() {
        rows.push(row.finish());
    }
    rows
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<(bool, &str)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        match current {
            Some(kind) if kind != is_space => {
                pieces.push((kind, &text[start..idx]));
                start = idx;
            }
            _ => {}
        }
        current = Some(is_space);
    }
    if let Some(kind) = current {
        pieces.push((kind, &text[start..]));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
        wrap_indented(lines, width, Span::raw(""))
    }

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_wrap_text_long() {
        let lines = wrap_text("What loan amount are you looking for today", 12);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
    }

    #[test]
    fn test_short_line_is_untouched() {
        let wrapped = wrap_lines(vec![Line::from("Hello Alice")], 40);
        assert_eq!(plain(&wrapped), vec!["Hello Alice"]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let wrapped = wrap_lines(vec![Line::from("one two three four")], 9);
        assert_eq!(plain(&wrapped), vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_style_survives_wrapping() {
        let red = Style::default().fg(Color::Red);
        let blue = Style::default().fg(Color::Blue);
        let line = Line::from(vec![
            Span::styled("alpha beta ", red),
            Span::styled("gamma", blue),
        ]);
        let wrapped = wrap_lines(vec![line], 10);
        assert_eq!(plain(&wrapped), vec!["alpha beta", "gamma"]);
        assert_eq!(wrapped[0].spans[0].style, red);
        assert_eq!(wrapped[1].spans[0].style, blue);
    }

    #[test]
    fn test_long_word_is_broken() {
        let wrapped = wrap_lines(vec![Line::from("abcdefghij")], 4);
        assert_eq!(plain(&wrapped), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wide_chars_respect_cell_width() {
        let wrapped = wrap_lines(vec![Line::from("贷款申请")], 4);
        assert_eq!(plain(&wrapped), vec!["贷款", "申请"]);
    }

    #[test]
    fn test_indent_prefixes_every_row() {
        let wrapped = wrap_indented(vec![Line::from("one two three")], 9, Span::raw("  "));
        assert_eq!(plain(&wrapped), vec!["  one two", "  three"]);
    }

    #[test]
    fn test_leading_whitespace_is_kept() {
        let wrapped = wrap_lines(vec![Line::from("    let x = 1;")], 40);
        assert_eq!(plain(&wrapped), vec!["    let x = 1;"]);
    }

    #[test]
    fn test_blank_line_survives() {
        let wrapped = wrap_lines(vec![Line::from("")], 10);
        assert_eq!(wrapped.len(), 1);
    }
}
