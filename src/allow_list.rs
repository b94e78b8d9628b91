//! Case-insensitive allow-list of element names
//!
//! Names are normalized to ASCII lower case on insertion and on lookup, so
//! `"B"`, `"b"` and `"<B>"`-derived tag names all resolve to the same entry.
//! HTML element names are ASCII; non-ASCII characters are kept as-is.

use std::collections::HashSet;

/// Separator used by the `whitelist` configuration setting
pub const LIST_SEPARATOR: char = '|';

/// Set of element names that survive sanitization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    names: HashSet<String>,
}

impl AllowList {
    /// Create an empty allow-list (nothing is allowed)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a pipe-delimited list such as `"b|i|p|a"`
    ///
    /// Tokens are trimmed and empty tokens are ignored, so `"b||i "` yields
    /// `{b, i}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use html_sanitizer::AllowList;
    ///
    /// let list = AllowList::parse_delimited("B|i| p");
    /// assert!(list.contains("b"));
    /// assert!(list.contains("P"));
    /// assert_eq!(list.len(), 3);
    /// ```
    pub fn parse_delimited(value: &str) -> Self {
        value.split(LIST_SEPARATOR).collect()
    }

    /// Add a name; returns `false` if it was already present
    pub fn insert(&mut self, name: &str) -> bool {
        match normalize(name) {
            Some(key) => self.names.insert(key),
            None => false,
        }
    }

    /// Remove a name; returns `true` if it was present
    pub fn remove(&mut self, name: &str) -> bool {
        match normalize(name) {
            Some(key) => self.names.remove(&key),
            None => false,
        }
    }

    /// Case-insensitive membership test
    pub fn contains(&self, name: &str) -> bool {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.names.contains(&name.to_ascii_lowercase())
        } else {
            self.names.contains(name)
        }
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the normalized (lower-case) names in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn normalize(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_lowercase())
    }
}

impl<S: AsRef<str>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = AllowList::new();
        list.extend(iter);
        list
    }
}

impl<S: AsRef<str>> Extend<S> for AllowList {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name.as_ref());
        }
    }
}
