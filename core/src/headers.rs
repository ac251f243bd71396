//! String-to-string header map shared by requests and responses.
//!
//! # Design
//! Names are stored exactly as given: no case folding, so `Content-Type`
//! and `content-type` are two different entries. Backed by a `BTreeMap` so
//! iteration (and therefore the header lines handed to the engine) is
//! deterministic.

use std::collections::BTreeMap;

/// A set of HTTP headers keyed by literal, case-sensitive name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: BTreeMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`. Last write wins.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Remove `name` if present.
    pub fn erase(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Value for `name`, or the empty string when it is absent.
    pub fn get(&self, name: &str) -> &str {
        self.entries.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
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

    /// Render every entry as a `name: value` line.
    pub fn to_lines(&self) -> Vec<String> {
        self.iter().map(|(k, v)| format!("{k}: {v}")).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HttpHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HttpHeaders::new();
        headers.extend(iter);
        headers
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for HttpHeaders {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}
