//! Route matching
//!
//! Patterns are matched structurally, segment by segment, against the
//! cleaned location:
//!
//! - literal text must match exactly (case-sensitive)
//! - `:name` captures the rest of a segment (one or more characters, no `/`);
//!   a segment may mix literals and parameters (`:name.:ext`)
//! - `*name` captures like `:name`
//! - a lone `*` segment accepts any remaining suffix, including none
//!
//! Captured values are percent-decoded. Query strings never take part in
//! matching; they are parsed into [`Match::params`] separately.

use crate::config::Strategy;
use crate::params::{decode_uri_component, QueryParams, RouteParams};
use crate::path::{clean, extract_get_parameters, extract_hash, strip_root};
use crate::route::{Route, RoutePath};
use crate::Match;
use std::rc::Rc;

/// Parsed path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

/// A single segment in a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text and parameters within one path segment
    Parts(Vec<Part>),
    /// `*`: any number of segments
    Wildcard,
}

/// Piece of a segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Literal(String),
    Param(String),
}

fn is_param_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Segment {
    /// Parse a segment from string
    ///
    /// Examples:
    /// - `"users"` -> `Parts([Literal("users")])`
    /// - `":id"` -> `Parts([Param("id")])`
    /// - `":name.:ext"` -> `Parts([Param("name"), Literal("."), Param("ext")])`
    /// - `"*"` -> `Wildcard`
    pub fn parse(s: &str) -> Self {
        if s == "*" {
            return Segment::Wildcard;
        }

        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = s;

        while let Some(c) = rest.chars().next() {
            let after = &rest[c.len_utf8()..];
            let name_len = after
                .char_indices()
                .find(|(_, c)| !is_param_char(*c))
                .map_or(after.len(), |(i, _)| i);

            if (c == ':' || c == '*') && name_len > 0 {
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                parts.push(Part::Param(after[..name_len].to_string()));
                rest = &after[name_len..];
            } else {
                literal.push(c);
                rest = after;
            }
        }

        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Segment::Parts(parts)
    }
}

impl RoutePattern {
    /// Parse a pattern; leading and trailing slashes are ignored.
    pub fn parse(path: &str) -> Self {
        let cleaned = clean(path);
        let segments = if cleaned.is_empty() {
            Vec::new()
        } else {
            cleaned.split('/').map(Segment::parse).collect()
        };

        Self {
            source: path.to_string(),
            segments,
        }
    }

    /// Pattern text as registered
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of the parameters this pattern captures, in order
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Parts(parts) => Some(parts),
                Segment::Wildcard => None,
            })
            .flatten()
            .filter_map(|part| match part {
                Part::Param(name) => Some(name.as_str()),
                Part::Literal(_) => None,
            })
            .collect()
    }

    /// Match this pattern against a path
    ///
    /// Returns the captured parameters if matched (empty when the pattern
    /// has none).
    ///
    /// # Example
    ///
    /// ```
    /// use wayfinder::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("/users/:id/*");
    /// let params = pattern.matches("users/42/posts/7").unwrap();
    /// assert_eq!(params.get("id"), Some("42"));
    /// assert!(pattern.matches("posts/42").is_none());
    /// ```
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let cleaned = clean(path);
        let path_segments: Vec<&str> = if cleaned.is_empty() {
            Vec::new()
        } else {
            cleaned.split('/').collect()
        };

        let mut captured = Vec::new();
        if match_segments(&self.segments, &path_segments, &mut captured) {
            Some(captured.into_iter().collect())
        } else {
            None
        }
    }
}

fn match_segments(pattern: &[Segment], path: &[&str], captured: &mut Vec<(String, String)>) -> bool {
    let Some((segment, rest)) = pattern.split_first() else {
        return path.is_empty();
    };

    let mark = captured.len();
    match segment {
        Segment::Wildcard => {
            for skip in 0..=path.len() {
                if match_segments(rest, &path[skip..], captured) {
                    return true;
                }
                captured.truncate(mark);
            }
            false
        }
        Segment::Parts(parts) => {
            let Some((first, tail)) = path.split_first() else {
                return false;
            };
            if match_parts(parts, first, captured) && match_segments(rest, tail, captured) {
                return true;
            }
            captured.truncate(mark);
            false
        }
    }
}

/// Match the parts of one segment. Parameters are greedy and backtrack.
fn match_parts(parts: &[Part], text: &str, captured: &mut Vec<(String, String)>) -> bool {
    let Some((part, rest)) = parts.split_first() else {
        return text.is_empty();
    };

    match part {
        Part::Literal(literal) => match text.strip_prefix(literal.as_str()) {
            Some(remaining) => match_parts(rest, remaining, captured),
            None => false,
        },
        Part::Param(name) => {
            let mark = captured.len();
            let ends = text
                .char_indices()
                .map(|(i, c)| i + c.len_utf8())
                .collect::<Vec<_>>();
            for end in ends.into_iter().rev() {
                captured.push((name.clone(), decode_uri_component(&text[..end])));
                if match_parts(rest, &text[end..], captured) {
                    return true;
                }
                captured.truncate(mark);
            }
            false
        }
    }
}

/// Run a route's path against a cleaned location (query already removed).
fn capture(path: &RoutePath, location: &str) -> Option<RouteParams> {
    match path {
        RoutePath::Pattern(pattern) => pattern.matches(location),
        RoutePath::Regex(regex) => {
            let caps = regex.captures(location)?;
            let named: Vec<&str> = regex.capture_names().flatten().collect();

            let data = if named.is_empty() {
                caps.iter()
                    .skip(1)
                    .enumerate()
                    .filter_map(|(i, m)| m.map(|m| (i.to_string(), decode_uri_component(m.as_str()))))
                    .collect()
            } else {
                named
                    .into_iter()
                    .filter_map(|name| {
                        caps.name(name)
                            .map(|m| (name.to_string(), decode_uri_component(m.as_str())))
                    })
                    .collect()
            };
            Some(data)
        }
        RoutePath::Custom { matcher, .. } => matcher(location),
    }
}

/// Where a match is being attempted
#[derive(Debug, Clone, Copy)]
pub struct Location<'a> {
    /// Location path to match (may carry a query string)
    pub path: &'a str,
    /// Original navigation target, source of the hash fragment
    pub to: &'a str,
    /// Router root (cleaned)
    pub root: &'a str,
}

impl<'a> Location<'a> {
    /// Location whose target is the path itself
    pub fn new(path: &'a str, root: &'a str) -> Self {
        Self {
            path,
            to: path,
            root,
        }
    }
}

/// Match one route against a location.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use wayfinder::matcher::{match_route, Location};
/// use wayfinder::{Handler, Route, RouteHooks, RoutePath};
///
/// let route = Rc::new(Route::new(
///     "search",
///     RoutePath::pattern("search"),
///     Handler::noop(),
///     RouteHooks::new(),
/// ));
///
/// let m = match_route(&route, Location::new("/search?q=test&x=1", "")).unwrap();
/// assert_eq!(m.url, "search");
/// assert_eq!(m.query_string, "q=test&x=1");
/// assert_eq!(m.params.unwrap().get("q"), Some("test"));
/// assert!(m.data.is_none());
/// ```
pub fn match_route(route: &Rc<Route>, location: Location<'_>) -> Option<Match> {
    let (current, query_string) = extract_get_parameters(clean(location.path));
    let data = capture(route.path(), current)?;

    Some(Match {
        url: clean(strip_root(current, location.root)).to_string(),
        query_string: query_string.to_string(),
        hash_string: extract_hash(location.to).to_string(),
        route: Rc::clone(route),
        data: if data.is_empty() { None } else { Some(data) },
        params: if query_string.is_empty() {
            None
        } else {
            Some(QueryParams::from_query_string(query_string))
        },
    })
}

/// Match routes in table order. `Strategy::One` stops at the first match.
pub fn match_routes(routes: &[Rc<Route>], location: Location<'_>, strategy: Strategy) -> Vec<Match> {
    let mut matches = Vec::new();
    for route in routes {
        if let Some(m) = match_route(route, location) {
            matches.push(m);
            if strategy == Strategy::One {
                break;
            }
        }
    }
    matches
}
