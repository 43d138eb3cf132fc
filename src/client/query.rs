//! URL and query-string construction.
//!
//! Option structs implement [`ToQuery`]; every field is checked for presence
//! and empty or zero values are left out of the encoded query.

use std::collections::BTreeMap;
use std::fmt::Display;

use url::Url;

/// Strips every trailing `/` from a server address.
pub fn sanitize_addr(addr: &str) -> &str {
    addr.trim_end_matches('/')
}

/// Splits a slash-separated storage path into non-empty segments.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Serializes node filters as `key: value` pairs separated by spaces.
pub fn node_filter(filters: &BTreeMap<String, String>) -> String {
    filters
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Implemented by option structs that encode into a query string.
pub trait ToQuery {
    fn to_query(&self, query: &mut Query);
}

/// Ordered list of query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: &impl ToQuery) -> Self {
        let mut query = Self::new();
        options.to_query(&mut query);
        query
    }

    pub fn push(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds the value unless it renders to an empty string.
    pub fn push_str(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.push(key, value);
        }
        self
    }

    pub fn push_opt(&mut self, key: &str, value: Option<impl Display>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Adds `key=true` only when the flag is set.
    pub fn push_flag(&mut self, key: &str, flag: bool) -> &mut Self {
        if flag {
            self.push(key, "true");
        }
        self
    }

    /// Adds the number unless it is zero.
    pub fn push_nonzero(&mut self, key: &str, value: u64) -> &mut Self {
        if value != 0 {
            self.push(key, value);
        }
        self
    }

    /// Adds the items joined by `sep` unless the list is empty.
    pub fn push_joined<T: Display>(&mut self, key: &str, items: &[T], sep: &str) -> &mut Self {
        if !items.is_empty() {
            let joined = items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(sep);
            self.push(key, joined);
        }
        self
    }

    /// Adds the key once per item.
    pub fn push_each<T: Display>(&mut self, key: &str, items: &[T]) -> &mut Self {
        for item in items {
            self.push(key, item);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Writes the pairs onto the URL. An empty query leaves the URL untouched.
    pub fn apply(&self, url: &mut Url) {
        if self.is_empty() {
            return;
        }
        url.query_pairs_mut()
            .extend_pairs(self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
}
