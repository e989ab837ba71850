//! Escaping for values spliced into emitted markup.
//!
//! Script values go through JSON encoding plus `\uXXXX` escapes for the
//! characters that matter to the HTML parser, so a value can never close
//! the surrounding `<script>` element or leave its string literal.

use serde::Serialize;

/// Encode any serializable value as a JavaScript expression that is safe
/// inside an inline `<script>` element.
pub fn js_json<T: Serialize + ?Sized>(value: &T) -> String {
    let json = serde_json::to_string(value).unwrap_or_else(|_| "null".into());
    harden(&json)
}

/// Quoted JavaScript string literal for `s`.
pub fn js_string(s: &str) -> String {
    js_json(s)
}

fn harden(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for an HTML attribute value (double or single quoted).
pub fn html_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for an HTML element body.
pub fn html_text(s: &str) -> String {
    html_attr(s)
}
