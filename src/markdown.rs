//! Telegram MarkdownV2 safety pipeline.
//!
//! MarkdownV2 rejects messages containing unescaped reserved characters, but
//! blindly escaping webhook free-text corrupts any markdown the author wrote.
//! `format_safe` threads the needle: protect constructs that must survive
//! verbatim (links, code spans, fenced blocks, `<user@host>` tokens) behind
//! placeholder tokens, escape the rest, then restore the originals.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Lines of quoted text above which a release body is collapsed.
const QUOTE_COLLAPSE_LINES: usize = 10;
/// Characters of quoted text above which a release body is collapsed.
const QUOTE_COLLAPSE_CHARS: usize = 800;
/// Quoted lines left visible above the expandable region.
const QUOTE_VISIBLE_LINES: usize = 5;

/// The full MarkdownV2 reserved set.
fn is_reserved(c: char) -> bool {
    matches!(
        c,
        '_' | '*'
            | '['
            | ']'
            | '('
            | ')'
            | '~'
            | '`'
            | '>'
            | '#'
            | '+'
            | '-'
            | '='
            | '|'
            | '{'
            | '}'
            | '.'
            | '!'
    )
}

/// Backslash-escapes every MarkdownV2 reserved character.
///
/// Not idempotent: callers must apply it exactly once per raw span.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_reserved(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes only `(` and `)`, for the URL part of a `[label](url)` link.
pub fn escape_url(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '(' || c == ')' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// Angle-bracketed mailto-like tokens, e.g. "<bot@users.noreply.github.com>".
// The HTML conversion pass would otherwise eat them as bogus tags.
static EMAIL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}>").unwrap()
});

// Markdown constructs that must pass through unescaped, in priority order:
// fenced code blocks (non-greedy so an unterminated fence never swallows the
// rest of the text), inline code spans, inline links.
static MARKDOWN_CONSTRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```.*?```|`[^`\r\n]+`|\[[^\]\r\n]*\]\([^()\r\n]*\)").unwrap()
});

// Anything that looks like an HTML tag. Used to skip the HTML conversion pass
// for bodies that are plain markdown already.
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").unwrap());

// Placeholder tokens are built from Unicode private-use sentinels plus an
// index, so they cannot collide with incidental input text and contain no
// reserved characters.
fn email_placeholder(index: usize) -> String {
    format!("\u{e000}M{index}\u{e001}")
}

fn construct_placeholder(index: usize) -> String {
    format!("\u{e000}C{index}\u{e001}")
}

/// Converts mixed HTML/Markdown webhook free-text into MarkdownV2-safe text.
///
/// Well-formed links, inline code, and fenced code blocks survive verbatim;
/// everything else is escaped. HTML fragments are converted to markdown
/// first; if that conversion fails the original text is used unmodified
/// (fail-open).
pub fn format_safe(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    // Pass 1: hide email-like tokens behind placeholders.
    let mut emails: Vec<String> = Vec::new();
    let text = EMAIL_TOKEN
        .replace_all(raw, |caps: &Captures<'_>| {
            let token = email_placeholder(emails.len());
            emails.push(caps[0].to_string());
            token
        })
        .into_owned();

    // Pass 2: HTML to markdown, fail-open. Skipped when nothing in the text
    // looks like a tag, so markdown-only bodies are never rewritten.
    let text = if HTML_TAG.is_match(&text) {
        match htmd::convert(&text) {
            Ok(converted) => converted,
            Err(_) => text,
        }
    } else {
        text
    };

    // Pass 3: put the email tokens back.
    let mut text = text;
    for (index, original) in emails.iter().enumerate() {
        text = text.replace(&email_placeholder(index), original);
    }

    // Pass 4: hide markdown constructs behind placeholders, in order of
    // appearance. The ordered list makes the restoration pass auditable.
    let mut constructs: Vec<String> = Vec::new();
    let text = MARKDOWN_CONSTRUCT
        .replace_all(&text, |caps: &Captures<'_>| {
            let token = construct_placeholder(constructs.len());
            constructs.push(caps[0].to_string());
            token
        })
        .into_owned();

    // Pass 5: escape everything that is left.
    let mut text = escape(&text);

    // Pass 6: restore each construct by its escaped placeholder form. The
    // placeholder went through pass 5 like any literal text, so it is matched
    // the same way.
    for (index, original) in constructs.iter().enumerate() {
        text = text.replace(&escape(&construct_placeholder(index)), original);
    }

    text
}

/// Wraps a free-text body in a MarkdownV2 blockquote, collapsing long bodies
/// into Telegram's expandable-quote syntax.
///
/// Bodies within the thresholds are quoted line by line. Over-threshold
/// bodies keep the first lines visible, open an expandable region with `**>`,
/// and append the `||` expandability mark to the final line.
pub fn format_quoted(body: &str) -> String {
    let safe = format_safe(body);
    if safe.is_empty() {
        return safe;
    }

    let lines: Vec<&str> = safe.lines().collect();
    let over_threshold =
        lines.len() > QUOTE_COLLAPSE_LINES || safe.chars().count() > QUOTE_COLLAPSE_CHARS;

    if !over_threshold || lines.len() <= QUOTE_VISIBLE_LINES {
        return lines
            .iter()
            .map(|line| format!(">{line}"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let (visible, hidden) = lines.split_at(QUOTE_VISIBLE_LINES);
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 1);
    for line in visible {
        out.push(format!(">{line}"));
    }
    out.push("**>".to_string());
    for line in hidden {
        out.push(format!(">{line}"));
    }
    if let Some(last) = out.last_mut() {
        last.push_str("||");
    }
    out.join("\n")
}

/// Truncates free-text to a character budget, appending `...` when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_prefixes_every_reserved_char() {
        let input = "_*[]()~`>#+-=|{}.!";
        let out = escape(input);
        assert_eq!(out.len(), input.len() * 2);
        for pair in out.as_bytes().chunks(2) {
            assert_eq!(pair[0], b'\\');
        }
    }

    #[test]
    fn test_escape_length_property() {
        let input = "v1.2.3 (stable) - now with #tags!";
        let reserved = input.chars().filter(|c| is_reserved(*c)).count();
        assert_eq!(escape(input).chars().count(), input.chars().count() + reserved);
    }

    #[test]
    fn test_escape_identity_on_plain_text() {
        assert_eq!(escape("plain text 123"), "plain text 123");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_escape_is_not_idempotent() {
        // Applying twice double-escapes; callers must escape exactly once.
        assert_eq!(escape(escape("a.b").as_str()), "a\\\\.b");
    }

    #[test]
    fn test_escape_url_only_parens() {
        assert_eq!(escape_url("https://x.test/a_(b)"), "https://x.test/a_\\(b\\)");
        assert_eq!(escape_url("no parens _*."), "no parens _*.");
    }

    #[test]
    fn test_format_safe_empty() {
        assert_eq!(format_safe(""), "");
    }

    #[test]
    fn test_format_safe_escapes_plain_reserved_chars() {
        assert_eq!(format_safe("1. done!"), "1\\. done\\!");
    }

    #[test]
    fn test_format_safe_preserves_inline_link() {
        let out = format_safe("see [the docs](https://example.com/a_b) now.");
        assert!(out.contains("[the docs](https://example.com/a_b)"));
        assert!(!out.contains("\\[the docs\\]"));
        assert!(out.ends_with("now\\."));
    }

    #[test]
    fn test_format_safe_preserves_inline_code() {
        let out = format_safe("run `cargo build --release` first.");
        assert!(out.contains("`cargo build --release`"));
        assert!(out.ends_with("first\\."));
    }

    #[test]
    fn test_format_safe_preserves_fenced_block_contents() {
        let input = "before\n```rust\nlet x = a * b - c;\n```\nafter.";
        let out = format_safe(input);
        assert!(out.contains("```rust\nlet x = a * b - c;\n```"));
        assert!(out.ends_with("after\\."));
    }

    #[test]
    fn test_format_safe_unterminated_fence_is_escaped_not_swallowed() {
        // An unclosed fence is not a construct; it gets escaped like any
        // other text instead of consuming the rest of the message.
        let out = format_safe("```\nnever closed\ntrailing dot.");
        assert!(out.contains("\\`\\`\\`"));
        assert!(out.ends_with("trailing dot\\."));
    }

    #[test]
    fn test_format_safe_preserves_email_token() {
        let out = format_safe("ping <dev@example.com> about this.");
        assert!(out.contains("<dev@example.com>"));
        assert!(out.ends_with("this\\."));
    }

    #[test]
    fn test_format_safe_converts_html() {
        // Known edge case: conversion is fail-open, so valid HTML comes back
        // as markdown here, but broken HTML would pass through unconverted.
        let out = format_safe("<b>bold</b> move.");
        assert!(!out.contains("<b>"));
        assert!(out.to_lowercase().contains("bold"));
    }

    #[test]
    fn test_format_safe_html_anchor_becomes_protected_link() {
        let out = format_safe("<a href=\"https://example.com\">here</a>");
        assert!(out.contains("[here](https://example.com)"));
    }

    #[test]
    fn test_format_safe_multiple_constructs_in_order() {
        let out = format_safe("`a.b` then [x](http://c.d) end.");
        assert!(out.contains("`a.b`"));
        assert!(out.contains("[x](http://c.d)"));
        assert!(out.ends_with("end\\."));
    }

    #[test]
    fn test_format_quoted_short_body_fully_quoted() {
        let body = "line one\nline two";
        let out = format_quoted(body);
        assert_eq!(out, ">line one\n>line two");
        assert!(!out.contains("**>"));
        assert!(!out.contains("||"));
    }

    #[test]
    fn test_format_quoted_under_thresholds_no_collapse() {
        let body = (1..=10).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n");
        let out = format_quoted(&body);
        assert_eq!(out.lines().count(), 10);
        assert!(out.lines().all(|l| l.starts_with('>')));
        assert!(!out.contains("**>"));
    }

    #[test]
    fn test_format_quoted_twelve_lines_collapses() {
        let body = (1..=12).map(|i| format!("l{i}")).collect::<Vec<_>>().join("\n");
        let out = format_quoted(&body);
        let lines: Vec<&str> = out.lines().collect();
        // 5 visible quoted lines, the opener, 7 quoted lines inside.
        assert_eq!(lines.len(), 13);
        assert!(lines[..5].iter().all(|l| l.starts_with('>') && !l.starts_with("**>")));
        assert_eq!(lines[5], "**>");
        assert!(lines[6..].iter().all(|l| l.starts_with('>')));
        assert!(lines[12].ends_with("||"));
        assert_eq!(out.matches("**>").count(), 1);
        assert_eq!(out.matches("||").count(), 1);
    }

    #[test]
    fn test_format_quoted_long_chars_collapse() {
        let body = (1..=6).map(|_| "x".repeat(200)).collect::<Vec<_>>().join("\n");
        let out = format_quoted(&body);
        assert!(out.contains("**>"));
        assert!(out.ends_with("||"));
    }

    #[test]
    fn test_format_quoted_empty() {
        assert_eq!(format_quoted(""), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("0123456789ab", 10), "0123456789...");
    }
}
