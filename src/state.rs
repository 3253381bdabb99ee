//! Router state management

#[cfg(feature = "cache")]
use crate::cache::MatchCache;
use crate::config::{RouterOptions, Strategy};
use crate::error::NavigationOutcome;
use crate::history::{ListenerId, Platform};
use crate::lifecycle::RouteHooks;
use crate::matcher::{match_routes, Location};
use crate::params::QueryParams;
use crate::path::{clean, extract_get_parameters, extract_hash, strip_root};
use crate::route::{Route, RouteLookup, RouteTarget};
use crate::{debug_log, trace_log, Match};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Navigation request parked while another run holds the router
pub(crate) type Deferred = Box<dyn FnOnce()>;

/// Router state
///
/// Owned by [`Router`](crate::Router) behind `Rc<RefCell<_>>`. Borrows of
/// it are short and never span user code.
pub struct RouterState {
    /// Root prefix, cleaned (`""` for `/`)
    pub(crate) root: String,
    /// Default resolve options
    pub(crate) options: RouterOptions,
    /// Registered routes in matching order
    pub(crate) routes: Vec<Rc<Route>>,
    pub(crate) not_found: Option<Rc<Route>>,
    /// Router-wide hooks placed in front of route hooks at registration
    pub(crate) generic_hooks: RouteHooks,
    /// Matches committed by the last completed run
    pub(crate) current: Option<Vec<Match>>,
    /// A pipeline run is active
    pub(crate) dirty: bool,
    waiting: VecDeque<Deferred>,
    /// The queue is being replayed by an outer `release`
    draining: bool,
    pub(crate) destroyed: bool,
    pub(crate) pop_state_listener: Option<ListenerId>,
    /// Pop-state events are ignored while the router writes the URL itself
    pub(crate) freeze_listening: bool,
    pub(crate) last_outcome: Option<NavigationOutcome>,
    pub(crate) platform: Rc<dyn Platform>,
    #[cfg(feature = "cache")]
    pub(crate) cache: MatchCache,
}

impl RouterState {
    /// Create a new router state
    pub(crate) fn new(root: String, options: RouterOptions, platform: Rc<dyn Platform>) -> Self {
        Self {
            root,
            options,
            routes: Vec::new(),
            not_found: None,
            generic_hooks: RouteHooks::new(),
            current: None,
            dirty: false,
            waiting: VecDeque::new(),
            draining: false,
            destroyed: false,
            pop_state_listener: None,
            freeze_listening: false,
            last_outcome: None,
            platform,
            #[cfg(feature = "cache")]
            cache: MatchCache::new(),
        }
    }

    fn routes_changed(&mut self) {
        #[cfg(feature = "cache")]
        self.cache.invalidate();
    }

    /// Register a route
    pub(crate) fn add_route(&mut self, route: Rc<Route>) {
        debug_log!("Registering route '{}' ({:?})", route.name(), route.path());
        self.routes.push(route);
        self.routes_changed();
    }

    /// Remove every route selected by `target`. Returns how many went.
    pub(crate) fn remove_routes(&mut self, target: &RouteTarget) -> usize {
        let before = self.routes.len();
        let root = self.root.clone();
        self.routes.retain(|route| !target.matches(route, &root));
        let removed = before - self.routes.len();
        if removed > 0 {
            self.routes_changed();
        }
        removed
    }

    /// Drop all routes
    pub(crate) fn clear_routes(&mut self) {
        self.routes.clear();
        self.routes_changed();
    }

    pub(crate) fn find_route(&self, lookup: &RouteLookup) -> Option<Rc<Route>> {
        let found = match lookup {
            RouteLookup::Name(name) => {
                let composed = crate::path::compose_with_root(&self.root, name);
                self.routes
                    .iter()
                    .find(|r| r.name() == name)
                    .or_else(|| self.routes.iter().find(|r| r.name() == composed))
            }
            RouteLookup::Handler(handler) => {
                self.routes.iter().find(|r| r.handler().same_as(handler))
            }
            RouteLookup::Route(route) => return Some(Rc::clone(route)),
        };
        found.cloned()
    }

    /// Run the matcher over the route table
    ///
    /// Results are cached only while no custom matcher is registered; a
    /// custom closure may answer differently for the same location.
    pub(crate) fn match_routes(&mut self, path: &str, to: &str, strategy: Strategy) -> Vec<Match> {
        #[cfg(feature = "cache")]
        let cacheable = !self.routes.iter().any(|r| r.path().is_custom());
        #[cfg(feature = "cache")]
        if cacheable {
            if let Some(matches) = self.cache.get(path, to, strategy) {
                return matches;
            }
        }

        let location = Location {
            path,
            to,
            root: &self.root,
        };
        let matches = match_routes(&self.routes, location, strategy);
        trace_log!("'{}' matched {} route(s)", path, matches.len());

        #[cfg(feature = "cache")]
        if cacheable {
            self.cache.insert(path, to, strategy, matches.clone());
        }

        matches
    }

    /// Synthetic match of the not-found route for a location
    pub(crate) fn not_found_match(&self, path: &str, to: &str) -> Option<Match> {
        let route = self.not_found.as_ref()?;
        let (url, query_string) = extract_get_parameters(clean(path));

        Some(Match {
            url: clean(strip_root(url, &self.root)).to_string(),
            query_string: query_string.to_string(),
            hash_string: extract_hash(to).to_string(),
            route: Rc::clone(route),
            data: None,
            params: (!query_string.is_empty()).then(|| QueryParams::from_query_string(query_string)),
        })
    }

    // ------------------------------------------------------------------------
    // Re-entrancy guard
    // ------------------------------------------------------------------------

    /// Mark the router dirty. Returns `false` when a run is already active.
    pub(crate) fn try_acquire(&mut self) -> bool {
        if self.dirty {
            false
        } else {
            self.dirty = true;
            true
        }
    }

    /// Park a request until the active run ends
    pub(crate) fn enqueue(&mut self, deferred: Deferred) {
        self.waiting.push_back(deferred);
        trace_log!("{} navigation(s) waiting", self.waiting.len());
    }

    /// Mark the router clean. Returns `true` when the caller becomes the
    /// one draining the queue; a release nested inside a replayed request
    /// returns `false` and leaves the queue to the outer one.
    pub(crate) fn release(&mut self) -> bool {
        self.dirty = false;
        if self.draining {
            return false;
        }
        self.draining = true;
        true
    }

    /// Oldest parked request, unless a replayed run is still in flight
    pub(crate) fn next_deferred(&mut self) -> Option<Deferred> {
        if self.dirty {
            return None;
        }
        self.waiting.pop_front()
    }

    pub(crate) fn stop_draining(&mut self) {
        self.draining = false;
    }

    /// Number of parked requests
    pub(crate) fn waiting_len(&self) -> usize {
        self.waiting.len()
    }
}

impl fmt::Debug for RouterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterState")
            .field("root", &self.root)
            .field("options", &self.options)
            .field("routes", &self.routes.len())
            .field("not_found", &self.not_found.is_some())
            .field("current", &self.current)
            .field("dirty", &self.dirty)
            .field("waiting", &self.waiting.len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
