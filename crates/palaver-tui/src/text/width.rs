//! Terminal cell width helpers.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Width of `s` in terminal cells. CJK and most emoji take two.
pub fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Width of a single character in terminal cells.
pub(crate) fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Shorten `s` to at most `max_width` cells, ending in an ellipsis when cut.
///
/// Never splits a character.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if visual_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out: String = s
        .chars()
        .take_while(|&ch| {
            used += char_width(ch);
            used <= budget
        })
        .collect();
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_width() {
        assert_eq!(visual_width("loan"), 4);
        assert_eq!(visual_width(""), 0);
        assert_eq!(visual_width("贷款"), 4);
    }

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_to_width("http://127.0.0.1:5000", 40), "http://127.0.0.1:5000");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
    }

    #[test]
    fn test_truncate_wide_chars_do_not_overflow() {
        let cut = truncate_to_width("贷款申请", 5);
        assert_eq!(cut, "贷款…");
        assert!(visual_width(&cut) <= 5);
    }

    #[test]
    fn test_truncate_to_zero() {
        assert_eq!(truncate_to_width("hello", 0), "");
        assert_eq!(truncate_to_width("hello", 1), "…");
    }
}
