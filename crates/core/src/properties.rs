//! Flat `key=value` properties documents.
//!
//! Responsibilities:
//! - Parse properties text (comments, `=`/`:`/whitespace separators, line
//!   continuations, backslash and `\uXXXX` escapes).
//! - Serialize a [`Properties`] map back to text that parses to the same map.
//!
//! Does NOT handle:
//! - Character sets other than UTF-8 (invalid UTF-8 is replaced lossily).
//!
//! Invariants:
//! - Later duplicates of a key overwrite earlier ones.
//! - Serialization order is the sorted key order.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// An ordered string map parsed from properties text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses properties from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(bytes))
    }

    /// Parses properties text.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            entries.insert(unescape(key), unescape(value));
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns true if `key` is set to `true`, ignoring case.
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// Renders the map as properties text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            let _ = writeln!(out, "{}={}", escape(key, true), escape(value, false));
        }
        out
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Joins continuation lines and drops comments and blank lines.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start();
        let mut piece = match current.take() {
            Some(acc) => acc + trimmed,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        let trailing = piece.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 1 {
            piece.pop();
            current = Some(piece);
        } else {
            lines.push(piece);
        }
    }
    if let Some(rest) = current {
        lines.push(rest);
    }
    lines
}

/// Splits a logical line into raw (still escaped) key and value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = idx;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
    }
    (key, rest)
}

fn unescape(raw: &str) -> String {
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
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for (idx, c) in raw.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' ' if is_key || idx == 0 => out.push_str("\\ "),
            '=' | ':' | '#' | '!' if is_key => {
                out.push('\\');
                out.push(c);
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
    fn test_parse_separators_and_comments() {
        let props = Properties::parse(
            "# comment\n! also comment\n\nobjectResolverKey=json\ncached : true\nreadonly false\n",
        );
        assert_eq!(props.get("objectResolverKey"), Some("json"));
        assert_eq!(props.get("cached"), Some("true"));
        assert_eq!(props.get("readonly"), Some("false"));
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn test_parse_continuation_lines() {
        let props = Properties::parse("list=a,\\\n    b,\\\n    c\n");
        assert_eq!(props.get("list"), Some("a,b,c"));
    }

    #[test]
    fn test_parse_escapes() {
        let props = Properties::parse("a\\ key=line1\\nline2\nuni=\\u0041\n");
        assert_eq!(props.get("a key"), Some("line1\nline2"));
        assert_eq!(props.get("uni"), Some("A"));
    }

    #[test]
    fn test_empty_value() {
        let props = Properties::parse("empty=\nbare\n");
        assert_eq!(props.get("empty"), Some(""));
        assert_eq!(props.get("bare"), Some(""));
    }

    #[test]
    fn test_is_true_ignores_case() {
        let props = Properties::parse("cached=TRUE\nreadonly=yes\n");
        assert!(props.is_true("cached"));
        assert!(!props.is_true("readonly"));
        assert!(!props.is_true("missing"));
    }

    #[test]
    fn test_to_text_parses_back() {
        let mut props = Properties::new();
        props.set("key with=sep", " leading space");
        props.set("multi", "a\nb");
        props.set("path", "C:\\dir");
        assert_eq!(Properties::parse(&props.to_text()), props);
    }
}
