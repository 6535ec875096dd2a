//! Text sanitization for tool responses.
//!
//! Wiki content arrives as HTML or wikitext full of markup, entities and
//! non-ASCII glyphs. Everything handed back to an MCP client is reduced to
//! plain printable ASCII that can be embedded in a JSON string without
//! escaping surprises.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("Invalid HTML tag regex"));

static NON_PRINTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\x20-\x7E]").expect("Invalid non-printable regex"));

static UNSAFE_SYMBOLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[@^*"{}|<>]"#).expect("Invalid symbol regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Reduce raw wiki text to safe plain text.
///
/// Tags become spaces, `\uXXXX` escapes are decoded, then the result goes
/// through [`format_mcp_text`]. The output is printable ASCII only, has no
/// `"` or `\`, and `sanitize(sanitize(s)) == sanitize(s)`.
pub fn sanitize(raw: &str) -> String {
    let without_tags = HTML_TAG.replace_all(raw, " ");
    let decoded = decode_unicode_escapes(&without_tags);
    format_mcp_text(&decoded)
}

/// Character-level cleanup applied to every string in a response.
///
/// Used directly for short fields (titles, snippets) and as the tail of
/// [`sanitize`].
pub fn format_mcp_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let ascii = NON_PRINTABLE.replace_all(text, " ");
    let stripped = UNSAFE_SYMBOLS.replace_all(&ascii, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");

    collapsed
        .replace('"', "'")
        .replace('\\', "/")
        .trim()
        .to_string()
}

/// Decode literal `\uXXXX` escape sequences.
///
/// UTF-16 surrogate pairs written as two escapes are combined. A sequence
/// that is not four hex digits, or that names a lone surrogate, is kept
/// verbatim.
pub fn decode_unicode_escapes(text: &str) -> String {
    if !text.contains("\\u") {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("\\u") {
        out.push_str(&rest[..pos]);
        let escape = &rest[pos..];

        match parse_escape(escape) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &escape[consumed..];
            }
            None => {
                out.push_str("\\u");
                rest = &escape[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parse one escape (or surrogate pair) at the start of `s`.
///
/// Returns the decoded character and the number of bytes consumed.
fn parse_escape(s: &str) -> Option<(char, usize)> {
    let unit = hex_unit(s)?;

    if (0xD800..0xDC00).contains(&unit) {
        let low = hex_unit(s.get(6..)?)?;
        if !(0xDC00..0xE000).contains(&low) {
            return None;
        }
        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
        return char::from_u32(code).map(|ch| (ch, 12));
    }

    char::from_u32(unit).map(|ch| (ch, 6))
}

fn hex_unit(s: &str) -> Option<u32> {
    let digits = s.strip_prefix("\\u")?.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
