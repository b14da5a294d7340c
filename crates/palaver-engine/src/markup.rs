//! Presentation of assistant message content.
//!
//! Replies may carry inline HTML (download links, line breaks). Content is
//! stored verbatim in the history; only what gets displayed or spoken passes
//! through here.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// How message markup is treated on display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupMode {
    /// Reduce markup to plain text, keeping link targets visible.
    #[default]
    Sanitize,
    /// Display content exactly as received.
    Trusted,
}

/// Content as it should be displayed under `mode`.
pub fn present(mode: MarkupMode, content: &str) -> String {
    match mode {
        MarkupMode::Sanitize => sanitize(content),
        MarkupMode::Trusted => content.to_string(),
    }
}

/// Reduce inline HTML to displayable plain text.
///
/// `<br>` and block closers become newlines, `<a href="u">label</a>` becomes
/// `label (u)`, every other tag is dropped, entities are decoded, and control
/// characters other than newline and tab are removed.
pub fn sanitize(content: &str) -> String {
    render(content, LinkStyle::LabelAndTarget)
}

/// Plain text suitable for a speech synthesizer. Links keep only their label.
pub fn speakable(content: &str) -> String {
    render(content, LinkStyle::LabelOnly)
}

#[derive(Clone, Copy)]
enum LinkStyle {
    LabelAndTarget,
    LabelOnly,
}

fn render(content: &str, links: LinkStyle) -> String {
    let text = comment_re().replace_all(content, "");
    let text = break_re().replace_all(&text, "\n");
    let text = anchor_re().replace_all(&text, |caps: &Captures<'_>| {
        let target = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str())
            .trim();
        let label = tag_re().replace_all(caps.get(4).map_or("", |m| m.as_str()), "");
        let label = label.trim();
        match links {
            LinkStyle::LabelOnly if label.is_empty() => String::new(),
            LinkStyle::LabelOnly => label.to_string(),
            LinkStyle::LabelAndTarget if label.is_empty() || label == target => {
                target.to_string()
            }
            LinkStyle::LabelAndTarget => format!("{label} ({target})"),
        }
    });
    let text = tag_re().replace_all(&text, "");
    let text = decode_entities(&text);

    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    blank_lines_re()
        .replace_all(cleaned.trim(), "\n\n")
        .into_owned()
}

fn decode_entities(text: &str) -> String {
    entity_re()
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps[1];
            decode_entity(name).map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(hex) = name
        .strip_prefix("#x")
        .or_else(|| name.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex should compile"))
}

fn break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li|h[1-6])\s*>")
            .expect("break regex should compile")
    })
}

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))[^>]*>(.*?)</a\s*>"#,
        )
        .expect("anchor regex should compile")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("tag regex should compile"))
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});")
            .expect("entity regex should compile")
    })
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("blank line regex should compile"))
}
