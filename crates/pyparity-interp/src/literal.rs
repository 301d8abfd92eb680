use std::fmt::Write as _;

/// Quotes `text` as an ASCII-only Python 3 string literal.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch.is_ascii() && !ch.is_ascii_control() => out.push(ch),
            ch if (ch as u32) <= 0xff => {
                let _ = write!(out, "\\x{:02x}", ch as u32);
            }
            ch if (ch as u32) <= 0xffff => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            ch => {
                let _ = write!(out, "\\U{:08x}", ch as u32);
            }
        }
    }
    out.push('\'');
    out
}

/// A Python list of string literals.
pub fn list_literal<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| string_literal(item.as_ref())).collect();
    format!("[{}]", quoted.join(", "))
}
