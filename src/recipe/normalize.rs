//! Item-name cleanup for tokens pulled out of wiki markup.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::sanitize::HTML_TAG;

static WIKI_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\[([^|\]]+)(?:\|[^\]]+)?\]\]").expect("Invalid wiki link regex")
});

static TEMPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[^}]*\}\}").expect("Invalid template regex"));

static BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[{}\[\]]").expect("Invalid bracket regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("Invalid digits regex"));

/// Turn an extracted token into a canonical item name.
///
/// `[[Iron Ingot|ingots]]` becomes `Iron Ingot`; nested templates and
/// stray tags vanish. An empty result means "no item".
pub fn normalize_item_name(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }

    let text = HTML_TAG.replace_all(token, "");
    let text = WIKI_LINK.replace_all(&text, "$1");
    let text = TEMPLATE.replace_all(&text, "");
    let text = BRACKETS.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");

    text.trim().to_string()
}

/// First integer found in `text`, if any fits in a `u32`.
pub fn extract_quantity(text: &str) -> Option<u32> {
    DIGITS.find(text)?.as_str().parse().ok()
}
