//! Request Cache Keys
//!
//! A cache key combines the request URL with a serialized form of its options,
//! so requests that differ only in options never share an entry.

use std::collections::BTreeMap;

use serde::Serialize;

/// Options that change what a GET request returns.
///
/// Maps are ordered so the serialized form, and therefore the cache key, does
/// not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestOptions {
    /// Query string parameters
    pub query: BTreeMap<String, String>,
    /// Extra request headers
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter, replacing any previous value for `name`.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Adds a header, replacing any previous value for `name`.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Builds the cache key for a request: `"{url}:{options as JSON}"`.
pub fn cache_key(url: &str, options: &RequestOptions) -> String {
    // String-keyed maps of strings always serialize
    let options = serde_json::to_string(options).unwrap_or_default();
    format!("{}:{}", url, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_format() {
        let key = cache_key("http://localhost:3001/posts", &RequestOptions::new());
        assert_eq!(key, r#"http://localhost:3001/posts:{"query":{},"headers":{}}"#);
    }

    #[test]
    fn test_cache_key_differs_by_options() {
        let url = "http://localhost:3001/posts";
        let plain = cache_key(url, &RequestOptions::new());
        let paged = cache_key(url, &RequestOptions::new().with_query("_page", "2"));
        let authed = cache_key(url, &RequestOptions::new().with_header("Authorization", "Bearer t"));

        assert_ne!(plain, paged);
        assert_ne!(plain, authed);
        assert_ne!(paged, authed);
    }

    #[test]
    fn test_cache_key_ignores_insertion_order() {
        let url = "http://localhost:3001/posts";
        let a = RequestOptions::new().with_query("a", "1").with_query("b", "2");
        let b = RequestOptions::new().with_query("b", "2").with_query("a", "1");

        assert_eq!(cache_key(url, &a), cache_key(url, &b));
    }

    #[test]
    fn test_with_query_replaces_value() {
        let options = RequestOptions::new()
            .with_query("userId", "1")
            .with_query("userId", "2");

        assert_eq!(options.query.len(), 1);
        assert_eq!(options.query["userId"], "2");
    }
}
