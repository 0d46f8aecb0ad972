//! Reading and writing Java `.properties` files.
//!
//! Gradle loads `key.properties` through `java.util.Properties`, so this
//! module follows that format: `#`/`!` comments, `=`, `:` or whitespace
//! separators, backslash line continuations and `\uXXXX` escapes. Files are
//! read as ISO-8859-1 and anything outside printable ASCII is written as a
//! `\uXXXX` escape, the same as `Properties.load` and `Properties.store`.

use std::fmt;
use std::path::Path;

use crate::error::{Result, SigningError};

/// Ordered key-value entries parsed from a properties file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    /// Creates an empty set of properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses properties text.
    pub fn parse(content: &str) -> Result<Self> {
        let mut props = Properties::new();
        let mut lines = split_lines(content).into_iter().enumerate();

        while let Some((idx, raw)) = lines.next() {
            let line_no = idx + 1;
            let trimmed = raw.trim_start_matches(is_blank);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = trimmed.to_string();
            while has_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            props.insert(unescape(key, line_no)?, unescape(value, line_no)?);
        }

        Ok(props)
    }

    /// Loads properties from a file, decoding it as ISO-8859-1.
    ///
    /// The file handle is closed as soon as the content has been read.
    pub fn load(path: &Path) -> Result<Self> {
        let content: String = std::fs::read(path)?.into_iter().map(char::from).collect();

        tracing::debug!("Loaded properties from {}", path.display());
        Self::parse(&content)
    }

    /// Returns the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets `key`, replacing any earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{}={}", escape(key, true), escape(value, false))?;
        }
        Ok(())
    }
}

/// Splits on `\r\n`, `\r` or `\n`.
fn split_lines(content: &str) -> Vec<&str> {
    let bytes = content.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&content[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&content[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < content.len() {
        lines.push(&content[start..]);
    }

    lines
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// A line continues when it ends with an odd number of backslashes.
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);
    if let Some(stripped) = rest.strip_prefix(|c: char| c == '=' || c == ':') {
        rest = stripped.trim_start_matches(is_blank);
    }
    (key, rest)
}

fn unescape(raw: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let unit = read_utf16_unit(&mut chars, line)?;
                let decoded = if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate, the low half must follow as another escape
                    let low = match (chars.next(), chars.next()) {
                        (Some('\\'), Some('u')) => read_utf16_unit(&mut chars, line)?,
                        _ => return Err(invalid(line, format!("unpaired surrogate \\u{:04X}", unit))),
                    };
                    char::decode_utf16([unit, low]).next().and_then(|r| r.ok())
                } else {
                    char::from_u32(u32::from(unit))
                };
                out.push(decoded.ok_or_else(|| {
                    invalid(line, format!("invalid code point U+{:04X}", unit))
                })?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_utf16_unit(chars: &mut std::str::Chars<'_>, line: usize) -> Result<u16> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid(line, format!("malformed \\uXXXX escape '\\u{}'", hex)));
    }
    u16::from_str_radix(&hex, 16)
        .map_err(|_| invalid(line, format!("malformed \\uXXXX escape '\\u{}'", hex)))
}

fn invalid(line: usize, message: String) -> SigningError {
    SigningError::InvalidProperties { line, message }
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{c}' => out.push_str("\\f"),
            ' ' if is_key || i == 0 => out.push_str("\\ "),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
            }
            c if !(' '..='~').contains(&c) => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators() {
        let props = Properties::parse("a=1\nb: 2\nc 3\nd   =   4\n").unwrap();
        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("4"));
        assert_eq!(props.len(), 4);
    }

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let content = "# generated\n! legacy comment\n\n   \nkeyAlias=upload\n";
        let props = Properties::parse(content).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("keyAlias"), Some("upload"));
    }

    #[test]
    fn test_parse_continuation_lines() {
        let content = "storeFile=/very/long/\\\n    path/upload.jks\nnext=1\n";
        let props = Properties::parse(content).unwrap();
        assert_eq!(props.get("storeFile"), Some("/very/long/path/upload.jks"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn test_parse_escaped_backslash_is_not_continuation() {
        let props = Properties::parse("dir=C:\\\\keys\\\\\nother=x\n").unwrap();
        assert_eq!(props.get("dir"), Some("C:\\keys\\"));
        assert_eq!(props.get("other"), Some("x"));
    }

    #[test]
    fn test_parse_escapes() {
        let props = Properties::parse("pass=a\\tb\\u0041\\=c\nkey\\ with\\ spaces=v\n").unwrap();
        assert_eq!(props.get("pass"), Some("a\tbA=c"));
        assert_eq!(props.get("key with spaces"), Some("v"));
    }

    #[test]
    fn test_parse_malformed_unicode_escape() {
        let err = Properties::parse("ok=1\nbad=\\u00G1\n").unwrap_err();
        match err {
            SigningError::InvalidProperties { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_empty_value_and_duplicates() {
        let props = Properties::parse("keyPassword=\nkeyAlias=a\nkeyAlias=b\n").unwrap();
        assert_eq!(props.get("keyPassword"), Some(""));
        assert_eq!(props.get("keyAlias"), Some("b"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        let props = Properties::parse("keyAlias=upload\r\nstorePassword=secret\r\n").unwrap();
        assert_eq!(props.get("keyAlias"), Some("upload"));
        assert_eq!(props.get("storePassword"), Some("secret"));
    }

    #[test]
    fn test_parse_cr_line_endings() {
        let props =
            Properties::parse("keyAlias=foo\rkeyPassword=bar\rstoreFile=/a\rstorePassword=baz\r").unwrap();
        assert_eq!(props.len(), 4);
        assert_eq!(props.get("keyAlias"), Some("foo"));
        assert_eq!(props.get("storePassword"), Some("baz"));
    }

    #[test]
    fn test_parse_mixed_line_endings_with_continuation() {
        let props = Properties::parse("storeFile=/keys/\\\r  upload.jks\r\nkeyAlias=a\n").unwrap();
        assert_eq!(props.get("storeFile"), Some("/keys/upload.jks"));
        assert_eq!(props.get("keyAlias"), Some("a"));
    }

    #[test]
    fn test_parse_rejects_signed_unicode_escape() {
        let err = Properties::parse("bad=\\u+041\n").unwrap_err();
        assert!(matches!(err, SigningError::InvalidProperties { line: 1, .. }));
    }

    #[test]
    fn test_parse_surrogate_pair_escape() {
        let props = Properties::parse("pass=\\uD83D\\uDE00\n").unwrap();
        assert_eq!(props.get("pass"), Some("\u{1F600}"));

        assert!(Properties::parse("pass=\\uD83Dx\n").is_err());
    }

    #[test]
    fn test_load_decodes_latin1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.properties");
        let mut content = b"keyAlias=upload\nkeyPassword=caf".to_vec();
        content.extend_from_slice(&[0xE9, b'\n']);
        content.extend_from_slice("storePassword=\u{e9}\n".as_bytes());
        std::fs::write(&path, content).unwrap();

        let props = Properties::load(&path).unwrap();
        assert_eq!(props.get("keyPassword"), Some("caf\u{e9}"));
        // UTF-8 bytes are read one char per byte, as Gradle does
        assert_eq!(props.get("storePassword"), Some("\u{c3}\u{a9}"));
    }

    #[test]
    fn test_render_escapes_non_ascii() {
        let mut props = Properties::new();
        props.insert("keyPassword", "caf\u{e9}\u{1F600}");

        let rendered = props.to_string();
        assert_eq!(rendered, "keyPassword=caf\\u00E9\\uD83D\\uDE00\n");
        assert!(rendered.is_ascii());
        assert_eq!(Properties::parse(&rendered).unwrap(), props);
    }

    #[test]
    fn test_render_escapes_special_characters() {
        let mut props = Properties::new();
        props.insert("storeFile", "C:\\keys\\upload.jks");
        props.insert("keyPassword", " leading");

        let rendered = props.to_string();
        assert_eq!(
            rendered,
            "storeFile=C:\\\\keys\\\\upload.jks\nkeyPassword=\\ leading\n"
        );
        assert_eq!(Properties::parse(&rendered).unwrap(), props);
    }
}
