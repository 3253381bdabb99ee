//! Public router handle
//!
//! [`Router`] is a cheap, cloneable handle to one router. Clones share the
//! route table, the current matches and the navigation queue.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use wayfinder::Router;
//!
//! let router = Router::new("/");
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let log = Rc::clone(&seen);
//! router.on("/users/:id", move |m| {
//!     let id = m.data.as_ref().and_then(|d| d.get("id")).unwrap_or_default();
//!     log.borrow_mut().push(id.to_string());
//! });
//!
//! router.navigate("/users/42", None);
//! assert_eq!(*seen.borrow(), vec!["42".to_string()]);
//! assert_eq!(router.last_resolved().unwrap()[0].url, "users/42");
//! ```

use crate::config::{
    GenerateOptions, HistoryMethod, NavigateOptions, ResolveOptions, RouterOptions, Strategy,
};
use crate::context::{NavigationContext, Phase};
use crate::error::{NavigationOutcome, RouterError};
use crate::history::{NoPlatform, Platform, PopStateListener};
use crate::lifecycle::{Done, HookHandle, HookId, HookPhase, RouteHooks};
use crate::links::{link_location, ClickModifiers, LinkElement};
use crate::matcher::{match_route, Location};
use crate::middleware::{navigate_steps, resolve_steps, resolved_matches};
use crate::params::{QueryParams, RouteParams};
use crate::path::{
    clean, compose_with_root, extract_get_parameters, extract_hash, location_for_matching,
    strip_root, target_with_root,
};
use crate::pipeline::{Outcome, Pipeline, Step};
use crate::route::{
    validate_route_path, Handler, Route, RouteLookup, RoutePath, RouteSpec, RouteTarget,
    NOT_FOUND_ROUTE_NAME,
};
use crate::state::{Deferred, RouterState};
use crate::{debug_log, trace_log, warn_log, Match};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[cfg(feature = "cache")]
use crate::cache::CacheStats;

/// Client-side router
///
/// Not `Send`: a router lives on the thread that drives it. Handlers and
/// hooks may call back into the router; navigations started while a run is
/// active are queued and replayed in order once it ends.
#[derive(Clone, Debug)]
pub struct Router {
    state: Rc<RefCell<RouterState>>,
}

impl Router {
    /// Router rooted at `root` without a platform: nothing is read from or
    /// written to a URL bar.
    pub fn new(root: &str) -> Self {
        Self::with_options(root, RouterOptions::default(), Rc::new(NoPlatform))
    }

    /// Router rooted at `root` backed by `platform`
    pub fn with_platform(root: &str, platform: Rc<dyn Platform>) -> Self {
        Self::with_options(root, RouterOptions::default(), platform)
    }

    /// Router with explicit default resolve options
    pub fn with_options(root: &str, options: RouterOptions, platform: Rc<dyn Platform>) -> Self {
        if root.is_empty() {
            warn_log!("A root path is required. If not provided \"/\" is used as default.");
        }
        Self {
            state: Rc::new(RefCell::new(RouterState::new(
                clean(root).to_string(),
                options,
                platform,
            ))),
        }
    }

    /// Router root, `"/"` when the router is not mounted under a prefix
    pub fn root(&self) -> String {
        let state = self.state.borrow();
        if state.root.is_empty() {
            "/".to_string()
        } else {
            state.root.clone()
        }
    }

    /// Cleaned root, empty when the router is mounted at `/`
    pub fn root_prefix(&self) -> String {
        self.state.borrow().root.clone()
    }

    /// Default resolve options
    pub fn options(&self) -> RouterOptions {
        self.state.borrow().options.clone()
    }

    pub(crate) fn platform(&self) -> Rc<dyn Platform> {
        Rc::clone(&self.state.borrow().platform)
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register `handler` for `path`
    pub fn on<F>(&self, path: &str, handler: F) -> &Self
    where
        F: Fn(&Match) + 'static,
    {
        self.on_pattern(path, handler, RouteHooks::new(), None);
        self
    }

    /// Register `handler` for `path` with route hooks
    pub fn on_with<F>(&self, path: &str, handler: F, hooks: RouteHooks) -> &Self
    where
        F: Fn(&Match) + 'static,
    {
        self.on_pattern(path, handler, hooks, None);
        self
    }

    /// Register `handler` for `path` under `name`
    pub fn on_named<F>(&self, path: &str, handler: F, hooks: RouteHooks, name: &str) -> &Self
    where
        F: Fn(&Match) + 'static,
    {
        self.on_pattern(path, handler, hooks, Some(name.to_string()));
        self
    }

    /// Register a route of any path kind and return it.
    ///
    /// Pattern paths are composed with the root. The name defaults to the
    /// cleaned path string. Generic hooks are placed in front of `hooks`.
    pub fn on_pattern(
        &self,
        path: impl Into<RoutePath>,
        handler: impl Into<Handler>,
        hooks: RouteHooks,
        name: Option<String>,
    ) -> Rc<Route> {
        let mut state = self.state.borrow_mut();
        let path = path.into().with_root(&state.root);
        let name = name.unwrap_or_else(|| clean(path.as_str()).to_string());
        let hooks = RouteHooks::accumulate(&state.generic_hooks, &hooks);

        let route = Rc::new(Route::new(name, path, handler.into(), hooks));
        state.add_route(Rc::clone(&route));
        route
    }

    /// Like [`on_with`](Router::on_with) but rejects malformed paths
    pub fn try_on<F>(&self, path: &str, handler: F, hooks: RouteHooks) -> Result<Rc<Route>, RouterError>
    where
        F: Fn(&Match) + 'static,
    {
        validate_route_path(path)?;
        Ok(self.on_pattern(path, handler, hooks, None))
    }

    /// Register every `(path, spec)` entry in order
    ///
    /// ```
    /// use wayfinder::{Router, RouteSpec};
    ///
    /// let router = Router::new("/");
    /// router.on_map(vec![
    ///     ("/about", RouteSpec::new(|_| {})),
    ///     ("/users/:id", RouteSpec::new(|_| {}).name("user")),
    /// ]);
    /// assert_eq!(router.generate("user", None, Default::default()).as_deref(), Some("/users/:id"));
    /// ```
    pub fn on_map(&self, routes: Vec<(&str, RouteSpec)>) -> &Self {
        for (path, spec) in routes {
            self.on_pattern(path, spec.handler, spec.hooks, spec.name);
        }
        self
    }

    /// Register `handler` for the root path
    pub fn on_root<F>(&self, handler: F) -> &Self
    where
        F: Fn(&Match) + 'static,
    {
        self.on_pattern("", handler, RouteHooks::new(), None);
        self
    }

    /// Handler used when nothing matches
    pub fn not_found<F>(&self, handler: F) -> &Self
    where
        F: Fn(&Match) + 'static,
    {
        self.not_found_with(handler, RouteHooks::new())
    }

    /// Not-found handler with hooks
    pub fn not_found_with<F>(&self, handler: F, hooks: RouteHooks) -> &Self
    where
        F: Fn(&Match) + 'static,
    {
        let mut state = self.state.borrow_mut();
        let path = RoutePath::pattern("*").with_root(&state.root);
        let hooks = RouteHooks::accumulate(&state.generic_hooks, &hooks);
        state.not_found = Some(Rc::new(Route::new(
            NOT_FOUND_ROUTE_NAME,
            path,
            Handler::new(handler),
            hooks,
        )));
        self
    }

    /// Remove routes by path string or handler
    pub fn off(&self, target: impl Into<RouteTarget>) -> &Self {
        let target = target.into();
        let removed = self.state.borrow_mut().remove_routes(&target);
        debug_log!("Removed {} route(s) for {:?}", removed, target);
        self
    }

    /// Set the router-wide hooks placed in front of every route registered
    /// afterwards
    pub fn hooks(&self, hooks: RouteHooks) -> &Self {
        self.state.borrow_mut().generic_hooks = hooks;
        self
    }

    // ========================================================================
    // Hooks
    // ========================================================================

    /// Append a `before` hook to a registered route
    pub fn add_before_hook<F>(&self, route: impl Into<RouteLookup>, hook: F) -> HookHandle
    where
        F: Fn(Done, &Match) + 'static,
    {
        self.add_hook(route.into(), HookPhase::Before, |hooks| {
            hooks.push_before(Rc::new(hook))
        })
    }

    /// Append an `after` hook to a registered route
    pub fn add_after_hook<F>(&self, route: impl Into<RouteLookup>, hook: F) -> HookHandle
    where
        F: Fn(&Match) + 'static,
    {
        self.add_hook(route.into(), HookPhase::After, |hooks| {
            hooks.push_after(Rc::new(hook))
        })
    }

    /// Append an `already` hook to a registered route
    pub fn add_already_hook<F>(&self, route: impl Into<RouteLookup>, hook: F) -> HookHandle
    where
        F: Fn(&Match) + 'static,
    {
        self.add_hook(route.into(), HookPhase::Already, |hooks| {
            hooks.push_already(Rc::new(hook))
        })
    }

    /// Append a `leave` hook to a registered route
    pub fn add_leave_hook<F>(&self, route: impl Into<RouteLookup>, hook: F) -> HookHandle
    where
        F: Fn(Done, &[Match]) + 'static,
    {
        self.add_hook(route.into(), HookPhase::Leave, |hooks| {
            hooks.push_leave(Rc::new(hook))
        })
    }

    fn add_hook<P>(&self, lookup: RouteLookup, phase: HookPhase, push: P) -> HookHandle
    where
        P: FnOnce(&mut RouteHooks) -> HookId,
    {
        let Some(route) = self.state.borrow().find_route(&lookup) else {
            warn_log!("Route doesn't exist: {}", lookup);
            return HookHandle::inert();
        };
        let id = push(&mut *route.hooks_mut());
        trace_log!("Added {} hook to '{}'", phase, route.name());
        HookHandle::new(&route, phase, id)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Find a route by name (exact, then root-composed) or handler
    pub fn get_route(&self, lookup: impl Into<RouteLookup>) -> Option<Rc<Route>> {
        self.state.borrow().find_route(&lookup.into())
    }

    /// Build the URL of the first route named exactly `name`.
    ///
    /// `:key` placeholders are replaced from `data`. The result starts with
    /// `/`; with `include_root = false` the `/<root>` prefix is removed.
    ///
    /// ```
    /// use wayfinder::{GenerateOptions, RouteHooks, RouteParams, Router};
    ///
    /// let router = Router::new("/");
    /// router.on_named("users/:id", |_| {}, RouteHooks::new(), "user");
    ///
    /// let data = RouteParams::new().with("id", 7);
    /// assert_eq!(router.generate("user", Some(&data), GenerateOptions::default()).as_deref(), Some("/users/7"));
    /// assert_eq!(router.generate("user", Some(&data), GenerateOptions::without_root()).as_deref(), Some("users/7"));
    /// assert!(router.generate("nobody", None, GenerateOptions::default()).is_none());
    /// ```
    pub fn generate(&self, name: &str, data: Option<&RouteParams>, options: GenerateOptions) -> Option<String> {
        let (route, root) = {
            let state = self.state.borrow();
            let route = state.routes.iter().find(|r| r.name() == name).cloned()?;
            (route, state.root.clone())
        };

        let mut result = route.path().as_str().to_string();
        if let Some(data) = data {
            for (key, value) in data.iter() {
                result = result.replacen(&format!(":{}", key), value, 1);
            }
        }
        if !result.starts_with('/') {
            result.insert(0, '/');
        }

        if !options.include_root {
            let prefix = format!("/{}", root);
            if let Some(rest) = result.strip_prefix(&prefix) {
                result = rest.to_string();
            }
        }
        Some(result)
    }

    /// Navigate to the route named `name`. Returns `false` when no route
    /// has that name.
    pub fn navigate_by_name(
        &self,
        name: &str,
        data: Option<&RouteParams>,
        options: Option<NavigateOptions>,
    ) -> bool {
        let Some(url) = self.generate(name, data, GenerateOptions::default()) else {
            return false;
        };
        let root = self.root_prefix();
        let relative = url.strip_prefix('/').unwrap_or(&url);
        let relative = relative.strip_prefix(root.as_str()).unwrap_or(relative);
        self.navigate(relative, options);
        true
    }

    /// Href for `path` under the root
    pub fn link(&self, path: &str) -> String {
        format!("/{}", compose_with_root(&self.root_prefix(), path))
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigate to `to` (relative to the root).
    ///
    /// Runs the full lifecycle and writes the URL to the platform. When a
    /// run is already active the call is queued and replayed after it.
    pub fn navigate(&self, to: &str, options: Option<NavigateOptions>) {
        let options = options.unwrap_or_default();
        if !self.acquire(to, |router| {
            let to = to.to_string();
            let options = options.clone();
            Box::new(move || router.navigate(&to, Some(options)))
        }) {
            return;
        }

        let target = target_with_root(&self.root_prefix(), to);
        debug_log!("navigate '{}'", target);
        let resolve_options = options
            .resolve_options
            .clone()
            .unwrap_or_else(|| self.options());
        let context = NavigationContext::navigate(
            self.clone(),
            target,
            options,
            resolve_options,
            self.last_resolved(),
        );
        self.run(navigate_steps(), context, |_| {});
    }

    /// Resolve `to`, or the platform location when `to` is `None`.
    ///
    /// Runs handlers and hooks but never writes the URL. Returns the
    /// matches when the run finished synchronously, also when a hook
    /// vetoed; `None` when nothing matched, a hook deferred, or the call
    /// was queued.
    pub fn resolve(&self, to: Option<&str>, options: Option<ResolveOptions>) -> Option<Vec<Match>> {
        if !self.acquire(to.unwrap_or_default(), |router| {
            let to = to.map(str::to_string);
            let options = options.clone();
            Box::new(move || {
                router.resolve(to.as_deref(), options);
            })
        }) {
            return None;
        }

        let root = self.root_prefix();
        let to = to.map(|to| target_with_root(&root, to));
        debug_log!("resolve {:?}", to);
        let options = options.unwrap_or_else(|| self.options());
        let context = NavigationContext::resolve(self.clone(), to, options, self.last_resolved());

        let resolved = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&resolved);
        self.run(resolve_steps(), context, move |ctx| {
            *sink.borrow_mut() = resolved_matches(ctx);
        });
        resolved.take()
    }

    /// Mark the router dirty, or queue the request built by `defer` when a
    /// run is active. Returns whether the caller may start a run.
    fn acquire<D>(&self, path: &str, defer: D) -> bool
    where
        D: FnOnce(Router) -> Deferred,
    {
        let mut state = self.state.borrow_mut();
        if state.try_acquire() {
            return true;
        }
        debug_log!("Router busy, queueing '{}'", path);
        state.enqueue(defer(self.clone()));
        state.last_outcome = Some(NavigationOutcome::Queued {
            path: path.to_string(),
        });
        false
    }

    fn run<F>(&self, steps: Vec<Step<NavigationContext>>, context: NavigationContext, on_done: F)
    where
        F: FnOnce(&NavigationContext) + 'static,
    {
        let router = self.clone();
        Pipeline::run(steps, context, move |ctx, outcome| {
            let outcome = navigation_outcome(&ctx, outcome);
            debug_log!("Run finished: {:?}", outcome);
            on_done(&ctx);
            drop(ctx);
            router.release(outcome);
        });
    }

    /// Mark the router clean and replay queued requests.
    ///
    /// Only the outermost release drains the queue, one request at a time,
    /// and stops when a replayed run is still waiting on a hook. Releases of
    /// the replayed runs themselves return straight away, so the stack does
    /// not grow with the queue.
    fn release(&self, outcome: NavigationOutcome) {
        {
            let mut state = self.state.borrow_mut();
            state.last_outcome = Some(outcome);
            if !state.release() {
                return;
            }
        }

        let _draining = DrainGuard(&self.state);
        loop {
            let Some(deferred) = self.state.borrow_mut().next_deferred() else {
                break;
            };
            deferred();
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Match `path` against the routes without running any lifecycle
    pub fn match_path(&self, path: &str) -> Option<Vec<Match>> {
        let strategy = self.state.borrow().options.strategy;
        let matches = self.match_with_fallback(path, path, strategy);
        (!matches.is_empty()).then_some(matches)
    }

    /// Match one ad-hoc `path` pattern against `location` (the platform
    /// location when `None`). With `annotate_with_root` both are composed
    /// with the root first.
    pub fn match_location(&self, path: &str, location: Option<&str>, annotate_with_root: bool) -> Option<Match> {
        let (root, hash) = {
            let state = self.state.borrow();
            (state.root.clone(), state.options.hash)
        };

        let to = match location {
            Some(location) if annotate_with_root => compose_with_root(&root, location),
            Some(location) => location.to_string(),
            None => self.platform().current_url().unwrap_or_else(|| root.clone()),
        };
        let current = location_for_matching(&to, hash);

        let pattern = if annotate_with_root {
            compose_with_root(&root, path)
        } else {
            path.to_string()
        };
        let route = Rc::new(Route::new(
            pattern.clone(),
            RoutePath::pattern(&pattern),
            Handler::noop(),
            RouteHooks::new(),
        ));

        match_route(
            &route,
            Location {
                path: &current,
                to: &to,
                root: &root,
            },
        )
    }

    /// Platform location as a match object of an ad-hoc route
    pub fn get_current_location(&self) -> Match {
        let (root, generic_hooks) = {
            let state = self.state.borrow();
            (state.root.clone(), state.generic_hooks.clone())
        };
        let location = self.platform().current_url().unwrap_or_else(|| root.clone());

        let path = clean(strip_root(clean(&location), &root)).to_string();
        let without_hash = location_for_matching(&path, false);
        let (url, query_string) = extract_get_parameters(&without_hash);
        let (url, query_string) = (url.to_string(), query_string.to_string());

        let route = Rc::new(Route::new(
            url.clone(),
            RoutePath::pattern(&compose_with_root(&root, &url)),
            Handler::noop(),
            generic_hooks,
        ));
        Match {
            params: (!query_string.is_empty()).then(|| QueryParams::from_query_string(&query_string)),
            hash_string: extract_hash(&path).to_string(),
            url,
            query_string,
            route,
            data: None,
        }
    }

    /// Matches committed by the last completed run
    pub fn last_resolved(&self) -> Option<Vec<Match>> {
        self.state.borrow().current.clone()
    }

    /// How the most recent `navigate`/`resolve` call ended
    pub fn last_outcome(&self) -> Option<NavigationOutcome> {
        self.state.borrow().last_outcome.clone()
    }

    /// Number of queued navigation requests
    pub fn pending(&self) -> usize {
        self.state.borrow().waiting_len()
    }

    /// Whether a run is active
    pub fn is_busy(&self) -> bool {
        self.state.borrow().dirty
    }

    /// Matcher cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.state.borrow().cache.stats().clone()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Resolve whenever the platform reports a history traversal
    pub fn listen(&self) {
        let platform = self.platform();
        if !platform.push_state_available() {
            return;
        }

        let previous = self.state.borrow_mut().pop_state_listener.take();
        if let Some(previous) = previous {
            platform.unsubscribe_pop_state(previous);
        }

        let weak: Weak<RefCell<RouterState>> = Rc::downgrade(&self.state);
        let listener: PopStateListener = Rc::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let router = Router { state };
            let ignore = {
                let state = router.state.borrow();
                state.freeze_listening || state.destroyed
            };
            if !ignore {
                trace_log!("pop-state");
                router.resolve(None, None);
            }
        });

        let id = platform.subscribe_pop_state(listener);
        self.state.borrow_mut().pop_state_listener = id;
    }

    /// Drop all routes and stop listening
    pub fn destroy(&self) {
        let (platform, listener) = {
            let mut state = self.state.borrow_mut();
            state.clear_routes();
            state.destroyed = true;
            (Rc::clone(&state.platform), state.pop_state_listener.take())
        };
        if let Some(id) = listener {
            platform.unsubscribe_pop_state(id);
        }
        debug_log!("Router destroyed");
    }

    /// Whether [`destroy`](Router::destroy) was called
    pub fn is_destroyed(&self) -> bool {
        self.state.borrow().destroyed
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Link elements selected by the configured links selector
    pub fn find_links(&self) -> Vec<LinkElement> {
        let selector = self.state.borrow().options.links_selector.clone();
        self.platform().query_links(&selector)
    }

    /// Links whose clicks the router handles
    pub fn update_page_links(&self) -> Vec<LinkElement> {
        self.find_links()
            .into_iter()
            .filter(LinkElement::is_routable)
            .collect()
    }

    /// Handle a click on `link`. Returns `true` when the router navigated
    /// and the platform's default action should be suppressed.
    pub fn handle_link_click(&self, link: &LinkElement, modifiers: ClickModifiers) -> bool {
        if !link.is_routable() {
            return false;
        }
        if modifiers.opens_new_tab() && link.tag_name.eq_ignore_ascii_case("a") {
            return false;
        }
        let Some(href) = link.href.as_deref() else {
            return false;
        };
        if self.is_destroyed() {
            return false;
        }

        let location = link_location(href);
        self.navigate(clean(&location), Some(link.navigate_options()));
        true
    }

    // ========================================================================
    // Pipeline support
    // ========================================================================

    /// Matcher result with the not-found fallback applied
    pub(crate) fn match_with_fallback(&self, path: &str, to: &str, strategy: Strategy) -> Vec<Match> {
        let mut state = self.state.borrow_mut();
        let matches = state.match_routes(path, to, strategy);
        if matches.is_empty() {
            state.not_found_match(path, to).into_iter().collect()
        } else {
            matches
        }
    }

    pub(crate) fn set_current(&self, current: Option<Vec<Match>>) {
        self.state.borrow_mut().current = current;
    }

    /// Write `url` to the platform history. Pop-state events are ignored
    /// while the write happens.
    pub(crate) fn write_browser_url(&self, url: &str, options: &NavigateOptions) {
        let platform = self.platform();
        self.state.borrow_mut().freeze_listening = true;

        let state = options.state.as_deref();
        let title = options.title.as_deref();
        if platform.push_state_available() {
            debug_log!("{:?} '{}'", options.history_method, url);
            match options.history_method {
                HistoryMethod::Push => platform.push_state(state, title, url),
                HistoryMethod::Replace => platform.replace_state(state, title, url),
            }
        } else {
            debug_log!("set location '{}'", url);
            platform.set_location(url);
        }

        self.state.borrow_mut().freeze_listening = false;
    }
}

/// Ends a drain even when a replayed request unwinds.
struct DrainGuard<'a>(&'a Rc<RefCell<RouterState>>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.0.try_borrow_mut() {
            state.stop_draining();
        }
    }
}

fn navigation_outcome(ctx: &NavigationContext, outcome: Outcome) -> NavigationOutcome {
    let path = ctx.current_location_path.clone();
    match outcome {
        Outcome::Panicked => NavigationOutcome::Panicked { path },
        Outcome::Halted => NavigationOutcome::Vetoed { path },
        Outcome::Completed if ctx.phase == Phase::NoOp => NavigationOutcome::NoOp { path },
        Outcome::Completed if ctx.matches.is_empty() => NavigationOutcome::NotFound { path },
        Outcome::Completed => NavigationOutcome::Completed { path },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<usize>>, impl Fn(&Match) + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move |_: &Match| inner.set(inner.get() + 1))
    }

    #[test]
    fn test_root_is_cleaned() {
        assert_eq!(Router::new("/").root(), "/");
        assert_eq!(Router::new("").root(), "/");
        assert_eq!(Router::new("/app/").root(), "app");
        assert_eq!(Router::new("/app/").root_prefix(), "app");
    }

    #[test]
    fn test_routes_are_composed_with_root() {
        let router = Router::new("/app");
        router.on("/users/:id", |_| {});
        router.on_root(|_| {});

        let route = router.get_route("users/:id").unwrap();
        assert_eq!(route.name(), "app/users/:id");
        assert_eq!(route.path().as_str(), "app/users/:id");
        assert!(router.get_route("app").is_some());
    }

    #[test]
    fn test_navigate_runs_handler_and_commits() {
        let router = Router::new("/app");
        let (calls, handler) = counter();
        router.on("/users/:id", handler);

        router.navigate("/users/5?tab=posts", None);

        assert_eq!(calls.get(), 1);
        let current = router.last_resolved().unwrap();
        assert_eq!(current[0].url, "users/5");
        assert_eq!(current[0].query_string, "tab=posts");
        assert_eq!(current[0].data.as_ref().unwrap().get("id"), Some("5"));
        assert!(router.last_outcome().unwrap().is_completed());
        assert!(!router.is_busy());
    }

    #[test]
    fn test_match_path_and_strategy() {
        let router = Router::with_options(
            "/",
            RouterOptions::default().strategy(Strategy::All),
            Rc::new(NoPlatform),
        );
        router.on("/a/:x", |_| {});
        router.on("/a/*", |_| {});

        assert_eq!(router.match_path("/a/1").unwrap().len(), 2);
        assert!(router.match_path("/b").is_none());
    }

    #[test]
    fn test_not_found_route_handles_unmatched() {
        let router = Router::new("/");
        let (calls, handler) = counter();
        router.on("/a", |_| {});
        router.not_found(handler);

        router.navigate("/missing", None);
        assert_eq!(calls.get(), 1);
        let current = router.last_resolved().unwrap();
        assert_eq!(current[0].route.name(), NOT_FOUND_ROUTE_NAME);
        assert_eq!(current[0].url, "missing");
    }

    #[test]
    fn test_off_removes_by_path_and_handler() {
        let router = Router::new("/");
        let handler = Handler::new(|_| {});
        router.on_pattern("/a", handler.clone(), RouteHooks::new(), None);
        router.on_pattern("/b", handler.clone(), RouteHooks::new(), None);
        router.on("/c", |_| {});

        router.off("/c");
        assert!(router.match_path("c").is_none());
        router.off(&handler);
        assert!(router.match_path("a").is_none());
        assert!(router.match_path("b").is_none());
    }

    #[test]
    fn test_try_on_rejects_invalid_paths() {
        let router = Router::new("/");
        assert!(router.try_on("/users/:id", |_| {}, RouteHooks::new()).is_ok());
        let err = router.try_on("/users//x", |_| {}, RouteHooks::new()).unwrap_err();
        assert!(matches!(err, RouterError::InvalidPath { .. }));
    }

    #[test]
    fn test_generate_with_root() {
        let router = Router::new("/app");
        router.on_named("users/:id", |_| {}, RouteHooks::new(), "user");
        let data = RouteParams::new().with("id", 7);

        assert_eq!(
            router.generate("user", Some(&data), GenerateOptions::default()).as_deref(),
            Some("/app/users/7")
        );
        assert_eq!(
            router.generate("user", Some(&data), GenerateOptions::without_root()).as_deref(),
            Some("/users/7")
        );
    }

    #[test]
    fn test_navigate_by_name() {
        let router = Router::new("/app");
        let (calls, handler) = counter();
        router.on_named("users/:id", handler, RouteHooks::new(), "user");

        let data = RouteParams::new().with("id", 3);
        assert!(router.navigate_by_name("user", Some(&data), None));
        assert!(!router.navigate_by_name("nobody", None, None));
        assert_eq!(calls.get(), 1);
        assert_eq!(router.last_resolved().unwrap()[0].url, "users/3");
    }

    #[test]
    fn test_generic_hooks_run_before_route_hooks() {
        let router = Router::new("/");
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        router.hooks(RouteHooks::new().before(move |done, _| {
            log.borrow_mut().push("generic");
            done.proceed();
        }));
        let log = Rc::clone(&order);
        router.on_with(
            "/a",
            |_| {},
            RouteHooks::new().before(move |done, _| {
                log.borrow_mut().push("route");
                done.proceed();
            }),
        );

        router.navigate("/a", None);
        assert_eq!(*order.borrow(), vec!["generic", "route"]);
    }

    #[test]
    fn test_add_hook_to_unknown_route_is_inert() {
        let router = Router::new("/");
        let handle = router.add_after_hook("missing", |_| {});
        assert!(!handle.is_active());
        assert!(!handle.remove());
    }

    #[test]
    fn test_hook_handle_removes_hook() {
        let router = Router::new("/");
        let (calls, _) = counter();
        router.on("/a", |_| {});

        let inner = Rc::clone(&calls);
        let handle = router.add_after_hook("a", move |_| inner.set(inner.get() + 1));
        router.navigate("/a", Some(NavigateOptions::default().force(true)));
        assert_eq!(calls.get(), 1);

        assert!(handle.remove());
        router.navigate("/a", Some(NavigateOptions::default().force(true)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_reentrant_navigate_is_queued() {
        let router = Router::new("/");
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        let inner = router.clone();
        router.on("/a", move |_| {
            log.borrow_mut().push("a");
            inner.navigate("/b", None);
            log.borrow_mut().push("a-end");
        });
        let log = Rc::clone(&order);
        router.on("/b", move |_| log.borrow_mut().push("b"));

        router.navigate("/a", None);
        assert_eq!(*order.borrow(), vec!["a", "a-end", "b"]);
        assert_eq!(router.last_resolved().unwrap()[0].url, "b");
        assert_eq!(router.pending(), 0);
    }

    #[test]
    fn test_navigate_writes_history() {
        let history = Rc::new(MemoryHistory::new("/"));
        let router = Router::with_platform("/app", history.clone());
        router.on("/users/:id", |_| {});

        router.navigate("/users/1", None);
        assert_eq!(history.current_entry().url, "/app/users/1");

        let options = NavigateOptions::default()
            .history_method(HistoryMethod::Replace)
            .title("User 2");
        router.navigate("/users/2", Some(options));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_entry().title.as_deref(), Some("User 2"));

        router.navigate("/users/3", Some(NavigateOptions::default().update_browser_url(false)));
        assert_eq!(history.current_entry().url, "/app/users/2");
    }

    #[test]
    fn test_resolve_reads_platform_location() {
        let history = Rc::new(MemoryHistory::new("/app/users/9"));
        let router = Router::with_platform("/app", history.clone());
        router.on("/users/:id", |_| {});

        let matches = router.resolve(None, None).unwrap();
        assert_eq!(matches[0].url, "users/9");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_match_location() {
        let router = Router::new("/app");
        let m = router.match_location("/users/:id", Some("/users/4"), true).unwrap();
        assert_eq!(m.url, "users/4");
        assert_eq!(m.data.unwrap().get("id"), Some("4"));

        assert!(router.match_location("/users/:id", Some("/posts/4"), true).is_none());
        let m = router.match_location("users/:id", Some("users/4"), false).unwrap();
        assert_eq!(m.data.unwrap().get("id"), Some("4"));
    }

    #[test]
    fn test_get_current_location() {
        let history = Rc::new(MemoryHistory::new("/app/search?q=rust#top"));
        let router = Router::with_platform("/app", history);

        let location = router.get_current_location();
        assert_eq!(location.url, "search");
        assert_eq!(location.query_string, "q=rust");
        assert_eq!(location.hash_string, "top");
        assert_eq!(location.params.unwrap().get("q"), Some("rust"));
        assert!(location.data.is_none());
    }

    #[cfg(feature = "cache")]
    #[test]
    fn test_repeated_matching_hits_cache() {
        let router = Router::new("/");
        router.on("/a", |_| {});

        assert!(router.match_path("/a").is_some());
        assert!(router.match_path("/a").is_some());
        assert_eq!(router.cache_stats().hits, 1);

        router.on("/b", |_| {});
        assert!(router.match_path("/a").is_some());
        assert_eq!(router.cache_stats().hits, 1);
    }

    #[test]
    fn test_link() {
        assert_eq!(Router::new("/").link("/about"), "/about");
        assert_eq!(Router::new("/app").link("about/"), "/app/about");
    }

    #[test]
    fn test_destroy() {
        let history = Rc::new(MemoryHistory::new("/"));
        let router = Router::with_platform("/", history.clone());
        router.on("/a", |_| {});
        router.listen();
        assert_eq!(history.listener_count(), 1);

        router.destroy();
        assert!(router.is_destroyed());
        assert_eq!(history.listener_count(), 0);
        assert!(router.match_path("a").is_none());
        assert!(!router.handle_link_click(&LinkElement::anchor("/a"), ClickModifiers::default()));
    }
}
