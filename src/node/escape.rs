//! Canonical escaping of IRI text and literal lexical forms
//!
//! Rendering uses one uniform `\uXXXX` (lowercase hex) escape for control
//! characters, space, DEL and the reserved `"`, `<`, `>`, `\`. Non-ASCII text
//! passes through. Unescaping also accepts the N-Triples short escapes and
//! `\UXXXXXXXX`.

use std::borrow::Cow;
use std::fmt::Write;

fn needs_escape(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{20}' | '"' | '<' | '>' | '\\' | '\u{7f}')
}

/// Escape text for canonical rendering
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.chars().any(needs_escape) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        if needs_escape(c) {
            // Writing into a String cannot fail
            let _ = write!(out, "\\u{:04x}", c as u32);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Reverse [`escape`]; the error names the offending escape sequence
pub fn unescape(text: &str) -> Result<Cow<'_, str>, String> {
    if !text.contains('\\') {
        return Ok(Cow::Borrowed(text));
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => out.push(hex_char(&mut chars, 4)?),
            Some('U') => out.push(hex_char(&mut chars, 8)?),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(format!("unknown escape \\{}", other)),
            None => return Err("dangling backslash".to_string()),
        }
    }
    Ok(Cow::Owned(out))
}

fn hex_char(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, String> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("malformed escape \\u{}", hex));
    }
    let code = u32::from_str_radix(&hex, 16).map_err(|_| format!("invalid escape \\u{}", hex))?;
    char::from_u32(code).ok_or_else(|| format!("escape \\u{} is not a character", hex))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_and_controls() {
        assert_eq!(escape("a b"), "a\\u0020b");
        assert_eq!(escape("\"<>\\"), "\\u0022\\u003c\\u003e\\u005c");
        assert_eq!(escape("line\nnext\t"), "line\\u000anext\\u0009");
        assert_eq!(escape("\u{7f}"), "\\u007f");
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(escape("Anna's"), Cow::Borrowed(_)));
        assert!(matches!(escape("Zürich→東京"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a\\u0020b").unwrap(), "a b");
        assert_eq!(unescape("\\U0001F600").unwrap(), "\u{1F600}");
        assert_eq!(unescape("\\n\\t\\\"\\\\").unwrap(), "\n\t\"\\");
        assert!(unescape("\\q").is_err());
        assert!(unescape("\\u00").is_err());
        assert!(unescape("\\uD800").is_err());
        assert!(unescape("end\\").is_err());
    }

    #[test]
    fn test_escape_unescape_inverse() {
        for text in ["", "plain", "with space", "tab\there", "quote\"", "back\\slash", "ünï"] {
            assert_eq!(unescape(&escape(text)).unwrap(), text);
        }
    }
}
