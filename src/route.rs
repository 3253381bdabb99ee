//! Route definition and configuration

use crate::error::RouterError;
use crate::lifecycle::RouteHooks;
use crate::matcher::RoutePattern;
use crate::params::RouteParams;
use crate::path::{clean, compose_with_root};
use crate::Match;
use regex::Regex;
use std::cell::{RefCell, RefMut};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Name given to the not-found route.
pub const NOT_FOUND_ROUTE_NAME: &str = "__NOT_FOUND__";

// ============================================================================
// Handler
// ============================================================================

/// Route handler
///
/// Handlers are compared by identity: two clones of the same `Handler` are
/// equal, two handlers built from identical closures are not. Keep a clone
/// around to remove the route later with [`Router::off`](crate::Router::off).
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Match)>);

impl Handler {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Match) + 'static,
    {
        Self(Rc::new(f))
    }

    /// Handler that does nothing
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Invoke the handler
    pub fn call(&self, m: &Match) {
        (self.0)(m);
    }

    /// Identity comparison
    pub fn same_as(&self, other: &Handler) -> bool {
        Rc::as_ptr(&self.0) as *const () == Rc::as_ptr(&other.0) as *const ()
    }
}

impl<F> From<F> for Handler
where
    F: Fn(&Match) + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// ============================================================================
// RoutePath
// ============================================================================

/// Custom matcher: receives the cleaned location (no query string) and
/// returns the captured data on a match.
pub type CustomMatcher = Rc<dyn Fn(&str) -> Option<RouteParams>>;

/// How a route recognizes a location
#[derive(Clone)]
pub enum RoutePath {
    /// Path pattern with `:param` and `*` segments
    Pattern(RoutePattern),
    /// Regular expression matched against the cleaned location
    Regex(Regex),
    /// Arbitrary matcher; `label` is used as its path string
    Custom {
        label: String,
        matcher: CustomMatcher,
    },
}

impl RoutePath {
    /// Parse a path pattern
    pub fn pattern(path: &str) -> Self {
        RoutePath::Pattern(RoutePattern::parse(path))
    }

    /// Compile a regular expression route
    ///
    /// # Example
    ///
    /// ```
    /// use wayfinder::RoutePath;
    ///
    /// assert!(RoutePath::regex(r"^users/(?P<id>\d+)$").is_ok());
    /// assert!(RoutePath::regex(r"^users/(\d+$").is_err());
    /// ```
    pub fn regex(pattern: &str) -> Result<Self, RouterError> {
        Regex::new(pattern)
            .map(RoutePath::Regex)
            .map_err(|e| RouterError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    /// Build a custom matcher route path
    pub fn custom<F>(label: impl Into<String>, matcher: F) -> Self
    where
        F: Fn(&str) -> Option<RouteParams> + 'static,
    {
        RoutePath::Custom {
            label: label.into(),
            matcher: Rc::new(matcher),
        }
    }

    /// String form: pattern source, regex source, or custom label
    pub fn as_str(&self) -> &str {
        match self {
            RoutePath::Pattern(pattern) => pattern.source(),
            RoutePath::Regex(regex) => regex.as_str(),
            RoutePath::Custom { label, .. } => label,
        }
    }

    /// Whether matching runs a user closure
    pub fn is_custom(&self) -> bool {
        matches!(self, RoutePath::Custom { .. })
    }

    /// Patterns are prefixed with the router root; other kinds are kept.
    pub(crate) fn with_root(self, root: &str) -> Self {
        match self {
            RoutePath::Pattern(pattern) => {
                RoutePath::pattern(&compose_with_root(root, pattern.source()))
            }
            other => other,
        }
    }
}

impl From<&str> for RoutePath {
    fn from(path: &str) -> Self {
        RoutePath::pattern(path)
    }
}

impl From<Regex> for RoutePath {
    fn from(regex: Regex) -> Self {
        RoutePath::Regex(regex)
    }
}

impl fmt::Debug for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePath::Pattern(pattern) => write!(f, "Pattern({:?})", pattern.source()),
            RoutePath::Regex(regex) => write!(f, "Regex({:?})", regex.as_str()),
            RoutePath::Custom { label, .. } => write!(f, "Custom({:?})", label),
        }
    }
}

// ============================================================================
// Route Validation
// ============================================================================

fn is_param_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Validate a route path pattern
///
/// # Validation Rules
///
/// - Path can be empty (matches the root)
/// - No consecutive slashes (`//`)
/// - Parameter names after `:` or `*` must be alphanumeric (or `_`) and
///   not empty; a lone `*` segment is a wildcard
/// - No duplicate parameter names
pub fn validate_route_path(path: &str) -> Result<(), RouterError> {
    let invalid = |reason: String| RouterError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Ok(());
    }

    if path.contains("//") {
        return Err(invalid(
            "Route path cannot contain consecutive slashes".to_string(),
        ));
    }

    let mut param_names = HashSet::new();
    for segment in clean(path).split('/') {
        if segment == "*" {
            continue;
        }

        let mut chars = segment.char_indices().peekable();
        while let Some((pos, c)) = chars.next() {
            if c != ':' && c != '*' {
                continue;
            }
            let rest = &segment[pos + 1..];
            let name_len = rest
                .char_indices()
                .find(|(_, c)| !is_param_char(*c))
                .map_or(rest.len(), |(i, _)| i);
            let name = &rest[..name_len];

            if name.is_empty() {
                if c == ':' {
                    return Err(invalid(
                        "Route parameter name cannot be empty".to_string(),
                    ));
                }
                continue;
            }

            if !param_names.insert(name.to_string()) {
                return Err(invalid(format!("Duplicate route parameter: '{}'", name)));
            }

            while chars.peek().is_some_and(|(i, _)| *i <= pos + name_len) {
                chars.next();
            }
        }
    }

    Ok(())
}

// ============================================================================
// Route
// ============================================================================

/// Registered route
///
/// Routes are shared between the route table and every [`Match`] produced
/// for them; identity is pointer identity of the `Rc<Route>`.
pub struct Route {
    name: String,
    path: RoutePath,
    handler: Handler,
    hooks: RefCell<RouteHooks>,
}

impl Route {
    /// Create a route. Pattern paths are used as given; the router composes
    /// them with its root before calling this.
    pub fn new(name: impl Into<String>, path: RoutePath, handler: Handler, hooks: RouteHooks) -> Self {
        Self {
            name: name.into(),
            path,
            handler,
            hooks: RefCell::new(hooks),
        }
    }

    /// Route name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route path
    pub fn path(&self) -> &RoutePath {
        &self.path
    }

    /// Route handler
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Snapshot of the route's hooks
    pub fn hooks(&self) -> RouteHooks {
        self.hooks.borrow().clone()
    }

    pub(crate) fn hooks_mut(&self) -> RefMut<'_, RouteHooks> {
        self.hooks.borrow_mut()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("hooks", &*self.hooks.borrow())
            .finish()
    }
}

// ============================================================================
// Registration helpers
// ============================================================================

/// Entry of a route map registered with [`Router::on_map`](crate::Router::on_map)
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub(crate) handler: Handler,
    pub(crate) name: Option<String>,
    pub(crate) hooks: RouteHooks,
}

impl RouteSpec {
    /// Route using `handler`
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Match) + 'static,
    {
        Self::with_handler(Handler::new(handler))
    }

    /// Route using an existing handler
    pub fn with_handler(handler: Handler) -> Self {
        Self {
            handler,
            name: None,
            hooks: RouteHooks::new(),
        }
    }

    /// Register under a name instead of the path
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach hooks
    pub fn hooks(mut self, hooks: RouteHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// Selects the routes removed by [`Router::off`](crate::Router::off)
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// Routes whose path string equals this one (slashes trimmed)
    Path(String),
    /// Routes registered with this handler
    Handler(Handler),
}

impl RouteTarget {
    pub(crate) fn matches(&self, route: &Route, root: &str) -> bool {
        match self {
            RouteTarget::Path(path) => {
                let own = clean(route.path.as_str());
                own == clean(path) || own == compose_with_root(root, path)
            }
            RouteTarget::Handler(handler) => route.handler.same_as(handler),
        }
    }
}

impl From<&str> for RouteTarget {
    fn from(path: &str) -> Self {
        RouteTarget::Path(path.to_string())
    }
}

impl From<String> for RouteTarget {
    fn from(path: String) -> Self {
        RouteTarget::Path(path)
    }
}

impl From<&Handler> for RouteTarget {
    fn from(handler: &Handler) -> Self {
        RouteTarget::Handler(handler.clone())
    }
}

impl From<Handler> for RouteTarget {
    fn from(handler: Handler) -> Self {
        RouteTarget::Handler(handler)
    }
}

/// Selects a route for [`Router::get_route`](crate::Router::get_route) and
/// the `add_*_hook` methods
#[derive(Debug, Clone)]
pub enum RouteLookup {
    /// By name; the root-composed name is tried second
    Name(String),
    /// By handler identity
    Handler(Handler),
    /// This exact route
    Route(Rc<Route>),
}

impl From<&str> for RouteLookup {
    fn from(name: &str) -> Self {
        RouteLookup::Name(name.to_string())
    }
}

impl From<String> for RouteLookup {
    fn from(name: String) -> Self {
        RouteLookup::Name(name)
    }
}

impl From<&Handler> for RouteLookup {
    fn from(handler: &Handler) -> Self {
        RouteLookup::Handler(handler.clone())
    }
}

impl From<&Rc<Route>> for RouteLookup {
    fn from(route: &Rc<Route>) -> Self {
        RouteLookup::Route(Rc::clone(route))
    }
}

impl From<Rc<Route>> for RouteLookup {
    fn from(route: Rc<Route>) -> Self {
        RouteLookup::Route(route)
    }
}

impl fmt::Display for RouteLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteLookup::Name(name) => f.write_str(name),
            RouteLookup::Handler(handler) => write!(f, "{:?}", handler),
            RouteLookup::Route(route) => f.write_str(route.name()),
        }
    }
}
