//! Pure string transforms applied to message bodies.
//!
//! Game chat logs store non-ASCII text as literal `\uXXXX` escapes. Loaders
//! decode them for printing; the HTML renderer turns whatever is left into
//! numeric character references and highlights emphasised words.

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn unicode_escape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\u([0-9a-fA-F]{4})").expect("valid unicode escape regex"))
}

fn trailing_tilde_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" (\w+)~").expect("valid trailing tilde regex"))
}

/// Counts whitespace-separated words.
///
/// ```
/// use rpformat::core::markup::count_words;
///
/// assert_eq!(count_words("  she  nods slowly "), 3);
/// assert_eq!(count_words(""), 0);
/// ```
pub fn count_words(body: &str) -> usize {
    body.split_whitespace().count()
}

/// Decodes literal `\uXXXX` escapes into the characters they name.
///
/// Escapes that do not name a valid scalar value (lone surrogates) are left
/// untouched.
///
/// ```
/// use rpformat::core::markup::decode_unicode_escapes;
///
/// assert_eq!(decode_unicode_escapes(r"caf\u00e9"), "café");
/// ```
pub fn decode_unicode_escapes(body: &str) -> String {
    unicode_escape_regex()
        .replace_all(body, |caps: &Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

/// Turns literal `\uXXXX` escapes into HTML numeric character references.
///
/// ```
/// use rpformat::core::markup::unicode_escapes_to_entities;
///
/// assert_eq!(unicode_escapes_to_entities(r"caf\u00e9"), "caf&#x00e9;");
/// ```
pub fn unicode_escapes_to_entities(body: &str) -> String {
    unicode_escape_regex()
        .replace_all(body, "&#x${1};")
        .into_owned()
}

/// Escapes the characters HTML treats specially.
pub fn escape_html(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps emphasised words in a coloured span.
///
/// Text bookended by one of `marks` (`~like this~`) is highlighted, marks
/// dropped. A single word followed by a tilde (` word~`) is highlighted as
/// well. Expects already-escaped HTML; `color` is inserted verbatim.
///
/// ```
/// use rpformat::core::markup::highlight_emphasis;
///
/// let html = highlight_emphasis("she *really* means it", &['*'], "#DD9FC1");
/// assert_eq!(
///     html,
///     r#"she <span style="color: #DD9FC1;">really</span> means it"#
/// );
/// ```
pub fn highlight_emphasis(body: &str, marks: &[char], color: &str) -> String {
    let replacement = format!(r#"<span style="color: {color};">${{1}}</span>"#);
    let mut out = body.to_string();

    for mark in marks {
        let escaped = regex::escape(&mark.to_string());
        let Ok(re) = Regex::new(&format!(r"{escaped}([ \w]+){escaped}")) else {
            continue;
        };
        out = re.replace_all(&out, replacement.as_str()).into_owned();
    }

    trailing_tilde_regex()
        .replace_all(&out, format!(" {replacement}").as_str())
        .into_owned()
}
