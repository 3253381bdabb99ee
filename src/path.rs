//! Path and URL normalization
//!
//! Every location the router sees goes through these helpers before it is
//! matched: slashes are trimmed, the query string and hash fragment are
//! split off, and paths are composed with the router root.

use std::borrow::Cow;

/// Strip leading and trailing slashes.
///
/// # Example
///
/// ```
/// use wayfinder::path::clean;
///
/// assert_eq!(clean("/users/42/"), "users/42");
/// assert_eq!(clean("///"), "");
/// ```
pub fn clean(path: &str) -> &str {
    path.trim_matches('/')
}

/// Split a URL into its cleaned path and its raw query string.
///
/// Only the first `?` separates the two; anything after it (including
/// further `?`) belongs to the query string.
///
/// # Example
///
/// ```
/// use wayfinder::path::extract_get_parameters;
///
/// let (url, query) = extract_get_parameters("/search?q=test&x=1");
/// assert_eq!(url, "search");
/// assert_eq!(query, "q=test&x=1");
/// ```
pub fn extract_get_parameters(url: &str) -> (&str, &str) {
    match url.split_once('?') {
        Some((path, query)) => (clean(path), query),
        None => (clean(url), ""),
    }
}

/// Hash fragment of a URL (text after the last `#`), empty when absent.
pub fn extract_hash(url: &str) -> &str {
    match url.rfind('#') {
        Some(pos) => &url[pos + 1..],
        None => "",
    }
}

/// Select the part of a URL the matcher should look at.
///
/// In hash mode the fragment carries the route (`/` when it is empty);
/// otherwise the fragment is dropped.
pub fn location_for_matching(url: &str, hash_mode: bool) -> Cow<'_, str> {
    if !url.contains('#') {
        return Cow::Borrowed(url);
    }

    let mut parts = url.split('#');
    if hash_mode {
        match parts.nth(1) {
            Some(fragment) if !fragment.is_empty() => Cow::Borrowed(fragment),
            _ => Cow::Borrowed("/"),
        }
    } else {
        Cow::Borrowed(parts.next().unwrap_or_default())
    }
}

/// Compose a route path with the router root.
///
/// # Example
///
/// ```
/// use wayfinder::path::compose_with_root;
///
/// assert_eq!(compose_with_root("app", "/users/:id"), "app/users/:id");
/// assert_eq!(compose_with_root("", "users"), "users");
/// ```
pub fn compose_with_root(root: &str, path: &str) -> String {
    clean(&format!("{}/{}", root, clean(path))).to_string()
}

/// Build the navigation target for `to`: `<root>/<to>`.
pub fn target_with_root(root: &str, to: &str) -> String {
    format!("{}/{}", clean(root), clean(to))
}

/// Remove the root prefix from a cleaned location.
pub fn strip_root<'a>(url: &'a str, root: &str) -> &'a str {
    if root.is_empty() {
        return url;
    }
    url.strip_prefix(root).unwrap_or(url)
}
