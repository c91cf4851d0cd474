// ABOUTME: Text helpers for markup fragments: whitespace collapsing and diagnostic excerpts.
// ABOUTME: Excerpts give log lines a short plain-text view of a page whose layout did not match.

use scraper::{ElementRef, Html, Selector};

/// Longest excerpt attached to a diagnostic log line.
pub const EXCERPT_CHARS: usize = 200;

/// Concatenated text of an element with whitespace collapsed.
pub fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result.trim().to_string()
}

/// Plain-text view of a page body, cut to `max_chars` characters.
///
/// Scripts and styles are skipped. Falls back to the raw input when the
/// page has no visible text, since a layout change can leave only markup.
pub fn excerpt(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    if let Ok(body) = Selector::parse("body") {
        if let Some(el) = document.select(&body).next() {
            for node in el.descendants() {
                let Some(t) = node.value().as_text() else {
                    continue;
                };
                let hidden = node
                    .parent()
                    .and_then(|p| p.value().as_element().map(|e| e.name()))
                    .is_some_and(|name| matches!(name, "script" | "style" | "noscript"));
                if !hidden {
                    text.push_str(t);
                    text.push(' ');
                }
            }
        }
    }

    let mut text = collapse_whitespace(&text);
    if text.is_empty() {
        text = collapse_whitespace(html);
    }
    truncate_chars(&text, max_chars)
}

/// Truncates to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
