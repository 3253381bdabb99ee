//! # wayfinder
//!
//! A client-side URL router with support for:
//!
//! - **Route Matching** - `:param` segments, `*` wildcards, regex and custom matchers
//! - **Lifecycle Hooks** - `before`, `after`, `already` and `leave` hooks; `before` and `leave` can veto
//! - **Serialized Navigation** - one run at a time, re-entrant calls queued in order
//! - **Named Routes** - generate URLs from route names and data
//! - **History Integration** - push/replace through a [`Platform`], pop-state resolution
//! - **Router Links** - link discovery and click handling
//!
//! # Quick Start
//!
//! ```
//! use std::rc::Rc;
//! use wayfinder::{MemoryHistory, NavigateOptions, RouteHooks, Router};
//!
//! let history = Rc::new(MemoryHistory::new("/"));
//! let router = Router::with_platform("/", history.clone());
//!
//! router
//!     .on("/", |_| println!("home"))
//!     .on_with(
//!         "/users/:id",
//!         |m| println!("user {:?}", m.data),
//!         RouteHooks::new().before(|done, _| done.proceed()),
//!     );
//! router.listen();
//!
//! router.navigate("/users/7?tab=posts", None);
//! assert_eq!(history.current_entry().url, "/users/7?tab=posts");
//!
//! router.navigate("/", Some(NavigateOptions::default().update_browser_url(false)));
//! assert_eq!(router.last_resolved().unwrap()[0].url, "");
//! ```
//!
//! # Navigation lifecycle
//!
//! Every `navigate`/`resolve` call runs a [`pipeline`] of [`middleware`]
//! steps over a [`NavigationContext`]. Hooks receive a [`Done`] continuation
//! and may finish later; the router stays busy until they do.
//!
//! ```
//! use wayfinder::{RouteHooks, Router};
//!
//! let router = Router::new("/");
//! router.on_with("/admin", |_| {}, RouteHooks::new().before(|done, _| done.veto()));
//!
//! router.navigate("/admin", None);
//! assert!(router.last_outcome().unwrap().is_vetoed());
//! assert!(router.last_resolved().is_none());
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache of matcher results
//! - `serde` - Serialize/deserialize the option types

#![doc(html_root_url = "https://docs.rs/wayfinder/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Core routing modules
pub mod history;
pub mod matcher;
pub mod middleware;
pub mod path;
pub mod pipeline;
pub mod route;
pub mod router;
pub mod state;

// Error handling
pub mod error;

// Route lifecycle
pub mod context;
pub mod lifecycle;

// Other modules
pub mod config;
pub mod links;
pub mod params;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, MatchCache};
pub use config::{
    GenerateOptions, HistoryMethod, NavigateOptions, ResolveOptions, RouterOptions, Strategy,
    DEFAULT_LINKS_SELECTOR,
};
pub use context::{NavigationContext, Phase, RunKind};
pub use error::{NavigationOutcome, RouterError};
pub use history::{HistoryEntry, MemoryHistory, NoPlatform, Platform};
pub use lifecycle::{Done, HookHandle, HookPhase, RouteHooks};
pub use links::{ClickModifiers, LinkElement};
pub use matcher::RoutePattern;
pub use params::{QueryParams, RouteParams};
pub use route::{
    validate_route_path, Handler, Route, RouteLookup, RoutePath, RouteSpec, RouteTarget,
    NOT_FOUND_ROUTE_NAME,
};
pub use router::Router;

use std::fmt;
use std::rc::Rc;

/// Result of matching a location against a route.
///
/// # Example
///
/// ```
/// use wayfinder::Router;
///
/// let router = Router::new("/");
/// router.on("/search", |_| {});
///
/// let m = &router.match_path("/search?q=test&x=1").unwrap()[0];
/// assert_eq!(m.url, "search");
/// assert_eq!(m.query_string, "q=test&x=1");
/// assert_eq!(m.params.as_ref().unwrap().get("x"), Some("1"));
/// assert!(m.data.is_none());
/// ```
#[derive(Clone)]
pub struct Match {
    /// Matched path, root and slashes removed
    pub url: String,
    /// Raw query string without `?`
    pub query_string: String,
    /// Hash fragment without `#`
    pub hash_string: String,
    /// The route that matched
    pub route: Rc<Route>,
    /// Captured path parameters; `None` when the route captures nothing
    pub data: Option<RouteParams>,
    /// Parsed query string; `None` when it is empty
    pub params: Option<QueryParams>,
}

impl Match {
    /// Same route, url and query string
    pub fn same_location(&self, other: &Match) -> bool {
        Rc::ptr_eq(&self.route, &other.route)
            && self.url == other.url
            && self.query_string == other.query_string
    }
}

impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        self.same_location(other)
            && self.hash_string == other.hash_string
            && self.data == other.data
            && self.params == other.params
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("url", &self.url)
            .field("query_string", &self.query_string)
            .field("hash_string", &self.hash_string)
            .field("route", &self.route.name())
            .field("data", &self.data)
            .field("params", &self.params)
            .finish()
    }
}
