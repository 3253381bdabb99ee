//! Captured route data and query string parameters
//!
//! [`RouteParams`] holds the values a pattern captured from the path
//! (`users/:id` against `users/42` gives `id = "42"`). [`QueryParams`] holds
//! the parsed query string (`?page=1&tag=a&tag=b`).

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;

/// Characters left untouched when encoding a URI component.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decode a percent-encoded URI component. Invalid UTF-8 is replaced.
pub fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Percent-encode a URI component.
pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

/// Route data captured from path segments
///
/// # Example
///
/// ```
/// use wayfinder::RouteParams;
///
/// // Route pattern: users/:id
/// // Matched path: users/123
/// let mut params = RouteParams::new();
/// params.insert("id", "123");
///
/// assert_eq!(params.get("id"), Some("123"));
/// assert_eq!(params.get_as::<i32>("id"), Some(123));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: BTreeMap<String, String>,
}

impl RouteParams {
    /// Create new empty route params
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a parameter value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter and parse it as a specific type
    ///
    /// Returns `None` if the parameter doesn't exist or cannot be parsed.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.params.get(key)?.parse().ok()
    }

    /// Insert a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value.to_string());
        self
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterate over all parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

impl<K, V> FromIterator<(K, V)> for RouteParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters parsed from a URL query string
///
/// Keys keep the order of their first appearance. A key that appears more
/// than once collects every value.
///
/// # Example
///
/// ```
/// use wayfinder::QueryParams;
///
/// let query = QueryParams::from_query_string("page=1&sort=name&tag=rust&tag=web");
///
/// assert_eq!(query.get("page"), Some("1"));
/// assert_eq!(query.get_as::<i32>("page"), Some(1));
/// assert_eq!(query.get_all("tag"), Some(&["rust".to_string(), "web".to_string()][..]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    /// Create new empty query params
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a raw query string (without the leading `?`)
    ///
    /// Pairs without `=` get an empty value; pairs with an empty key are
    /// ignored. Only the first `=` separates key and value.
    pub fn from_query_string(query: &str) -> Self {
        let mut params = Self::new();

        for pair in query.split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key.is_empty() {
                continue;
            }
            params.insert(decode_uri_component(key), decode_uri_component(value));
        }

        params
    }

    /// Get first value for a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key)?.first().map(String::as_str)
    }

    /// Get all values for a parameter
    ///
    /// Useful for parameters that can appear multiple times like `?tag=rust&tag=web`
    pub fn get_all(&self, key: &str) -> Option<&[String]> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// Get parameter as a specific type
    ///
    /// Returns the first value parsed as type T.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: std::str::FromStr,
    {
        self.get(key)?.parse().ok()
    }

    /// Insert a parameter
    ///
    /// If the key already exists, the value is appended to the list.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.params.push((key, vec![value])),
        }
    }

    /// Check if parameter exists
    pub fn contains(&self, key: &str) -> bool {
        self.get_all(key).is_some()
    }

    /// Iterate over keys and their values in first-appearance order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    /// Convert back to an encoded query string
    ///
    /// # Example
    ///
    /// ```
    /// use wayfinder::QueryParams;
    ///
    /// let mut query = QueryParams::new();
    /// query.insert("q", "hello world");
    /// query.insert("page", "2");
    /// assert_eq!(query.to_query_string(), "q=hello%20world&page=2");
    /// ```
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<String> = self
            .params
            .iter()
            .flat_map(|(key, values)| {
                values.iter().map(move |value| {
                    format!(
                        "{}={}",
                        encode_uri_component(key),
                        encode_uri_component(value)
                    )
                })
            })
            .collect();

        pairs.join("&")
    }

    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get number of unique parameter keys
    pub fn len(&self) -> usize {
        self.params.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_params_basic() {
        let mut params = RouteParams::new();
        params.insert("id", "123");

        assert_eq!(params.get("id"), Some("123"));
        assert!(params.contains("id"));
        assert!(!params.contains("missing"));
    }

    #[test]
    fn test_route_params_get_as() {
        let params = RouteParams::new().with("id", 123).with("active", true);

        assert_eq!(params.get_as::<i32>("id"), Some(123));
        assert_eq!(params.get_as::<u32>("id"), Some(123));
        assert_eq!(params.get_as::<bool>("active"), Some(true));
        assert_eq!(params.get_as::<i32>("missing"), None);
    }

    #[test]
    fn test_route_params_from_iter() {
        let params: RouteParams = [("name", "John"), ("age", "30")].into_iter().collect();

        assert_eq!(params.get("name"), Some("John"));
        assert_eq!(params.get_as::<i32>("age"), Some(30));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_route_params_iter_is_ordered() {
        let params = RouteParams::new().with("b", 2).with("a", 1);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_query_params_basic() {
        let query = QueryParams::from_query_string("q=test&x=1");

        assert_eq!(query.get("q"), Some("test"));
        assert_eq!(query.get("x"), Some("1"));
        assert_eq!(query.get("missing"), None);
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_query_params_multiple_values() {
        let query = QueryParams::from_query_string("tag=rust&tag=web&tag=ui");

        let tags = query.get_all("tag").unwrap();
        assert_eq!(tags, ["rust", "web", "ui"]);
        assert_eq!(query.get("tag"), Some("rust"));
    }

    #[test]
    fn test_query_params_edge_pairs() {
        let query = QueryParams::from_query_string("flag&=ignored&token=a=b");

        assert_eq!(query.get("flag"), Some(""));
        assert_eq!(query.get("token"), Some("a=b"));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_query_params_decoding() {
        let query = QueryParams::from_query_string("name=John%20Doe&city=S%C3%A3o");

        assert_eq!(query.get("name"), Some("John Doe"));
        assert_eq!(query.get("city"), Some("São"));
    }

    #[test]
    fn test_uri_component_encoding() {
        assert_eq!(encode_uri_component("hello world"), "hello%20world");
        assert_eq!(encode_uri_component("a@b"), "a%40b");
        assert_eq!(encode_uri_component("safe-_.~"), "safe-_.~");
    }

    #[test]
    fn test_empty_query_string() {
        let query = QueryParams::from_query_string("");
        assert!(query.is_empty());
    }
}
