//! Tag argument parsing.
//!
//! Parses the `key="value"` pairs carried inside a bracket tag, e.g.
//! `{image file-path="cats.png" caption="A cat"}`.

use std::collections::BTreeMap;

/// Parsed arguments from one tag occurrence.
///
/// Keys are bare identifiers (letters, digits, hyphens, underscores), values
/// are double-quoted strings that may contain `\"` escapes. Fragments that
/// do not follow that shape are skipped; validation against the tag's schema
/// happens separately in [`TagSchema`](crate::schema::TagSchema).
///
/// # Example
///
/// ```
/// use tagdown::TagArgs;
///
/// let args = TagArgs::parse(r#"file-path="cats.png" alt="A cat""#);
/// assert_eq!(args.get("file-path"), Some("cats.png"));
/// assert_eq!(args.get("alt"), Some("A cat"));
/// assert_eq!(args.get("caption"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagArgs {
    values: BTreeMap<String, String>,
}

impl TagArgs {
    /// Parse a raw argument string into structured arguments.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut args = Self::default();
        let mut remaining = raw.trim();

        while !remaining.is_empty() {
            remaining = remaining.trim_start();
            if let Some((key, value, rest)) = parse_key_value(remaining) {
                args.values.insert(key.to_owned(), value);
                remaining = rest;
            } else if let Some(next) = skip_char(remaining) {
                // Unrecognized fragment, skip one character and retry
                remaining = next;
            } else {
                break;
            }
        }

        args
    }

    /// Get an argument value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether an argument is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Iterate all parsed key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Number of parsed arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Advance past the first character.
fn skip_char(s: &str) -> Option<&str> {
    s.chars().next().map(|c| &s[c.len_utf8()..])
}

/// Parse one `key="value"` pair, unescaping `\"` and `\\` in the value.
///
/// Returns `(key, value, rest)` or `None` when `s` does not start with a
/// well-formed pair.
fn parse_key_value(s: &str) -> Option<(&str, String, &str)> {
    let eq_pos = s.find('=')?;
    let key = s[..eq_pos].trim();

    if key.is_empty() || !is_valid_key(key) {
        return None;
    }

    let after_eq = s[eq_pos + 1..].strip_prefix('"')?;

    let mut value = String::new();
    let mut chars = after_eq.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => return None,
            },
            '"' => return Some((key, value, &after_eq[i + 1..])),
            _ => value.push(c),
        }
    }

    // Unterminated quote
    None
}

/// Keys are bare identifiers: letters, digits, hyphens, underscores.
fn is_valid_key(key: &str) -> bool {
    key.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
