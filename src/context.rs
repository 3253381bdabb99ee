//! Navigation context
//!
//! One [`NavigationContext`] is created per `navigate`/`resolve` run and
//! threaded through every pipeline step. It is never shared between runs.

use crate::config::{NavigateOptions, ResolveOptions};
use crate::path::{clean, extract_get_parameters, location_for_matching, strip_root};
use crate::router::Router;
use crate::Match;
use std::fmt;

/// Which public call started the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Navigate,
    Resolve,
}

/// Last lifecycle phase a run entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Matching,
    BeforeHooks,
    Handler,
    AfterHooks,
    LeaveHooks,
    /// Nothing matched and no not-found route exists
    NotFound,
    Committing,
    UpdatingUrl,
    /// The target already was the current location
    NoOp,
}

/// Per-run record threaded through the pipeline
pub struct NavigationContext {
    /// Router the run belongs to
    pub router: Router,
    pub kind: RunKind,
    /// Target with the root prepended; `None` until the location is read
    /// from the platform
    pub to: Option<String>,
    /// Part of `to` that is matched (fragment handled per hash mode)
    pub current_location_path: String,
    pub resolve_options: ResolveOptions,
    pub navigate_options: NavigateOptions,
    /// Matches of this run, empty until matching ran
    pub matches: Vec<Match>,
    /// The router's current matches when the run started
    pub previous: Option<Vec<Match>>,
    pub phase: Phase,
    /// Whether the run wrote its matches to the router
    pub committed: bool,
}

impl NavigationContext {
    /// Context for a `navigate` run
    pub(crate) fn navigate(
        router: Router,
        to: String,
        navigate_options: NavigateOptions,
        resolve_options: ResolveOptions,
        previous: Option<Vec<Match>>,
    ) -> Self {
        let mut context = Self::new(router, RunKind::Navigate, Some(to), navigate_options, resolve_options, previous);
        context.locate();
        context
    }

    /// Context for a `resolve` run; the location is filled in by the
    /// `set_location_path` step
    pub(crate) fn resolve(
        router: Router,
        to: Option<String>,
        resolve_options: ResolveOptions,
        previous: Option<Vec<Match>>,
    ) -> Self {
        Self::new(
            router,
            RunKind::Resolve,
            to,
            NavigateOptions::default(),
            resolve_options,
            previous,
        )
    }

    fn new(
        router: Router,
        kind: RunKind,
        to: Option<String>,
        navigate_options: NavigateOptions,
        resolve_options: ResolveOptions,
        previous: Option<Vec<Match>>,
    ) -> Self {
        Self {
            router,
            kind,
            to,
            current_location_path: String::new(),
            resolve_options,
            navigate_options,
            matches: Vec::new(),
            previous,
            phase: Phase::Idle,
            committed: false,
        }
    }

    /// Derive `current_location_path` from `to` and the hash mode.
    pub(crate) fn locate(&mut self) {
        let to = self.to.as_deref().unwrap_or_default();
        self.current_location_path = location_for_matching(to, self.resolve_options.hash).into_owned();
    }

    /// Navigation target (empty before it is known)
    pub fn target(&self) -> &str {
        self.to.as_deref().unwrap_or_default()
    }

    /// Target url (root stripped) and query string, as a match would carry
    /// them
    pub fn target_url_and_query(&self) -> (String, String) {
        let (url, query) = extract_get_parameters(clean(&self.current_location_path));
        let root = self.router.root_prefix();
        (clean(strip_root(url, &root)).to_string(), query.to_string())
    }
}

impl fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationContext")
            .field("kind", &self.kind)
            .field("to", &self.to)
            .field("current_location_path", &self.current_location_path)
            .field("matches", &self.matches.len())
            .field("phase", &self.phase)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_context_locates_target() {
        let router = Router::new("/");
        let context = NavigationContext::navigate(
            router,
            "/users?tab=1#top".to_string(),
            NavigateOptions::default(),
            ResolveOptions::default(),
            None,
        );

        assert_eq!(context.kind, RunKind::Navigate);
        assert_eq!(context.current_location_path, "/users?tab=1");
        assert_eq!(
            context.target_url_and_query(),
            ("users".to_string(), "tab=1".to_string())
        );
        assert_eq!(context.phase, Phase::Idle);
    }

    #[test]
    fn test_hash_mode_locates_fragment() {
        let router = Router::new("/");
        let context = NavigationContext::navigate(
            router,
            "/#/users/1".to_string(),
            NavigateOptions::default(),
            ResolveOptions::default().hash(true),
            None,
        );
        assert_eq!(context.current_location_path, "/users/1");
    }

    #[test]
    fn test_resolve_context_waits_for_location() {
        let router = Router::new("/");
        let context = NavigationContext::resolve(router, None, ResolveOptions::default(), None);
        assert_eq!(context.target(), "");
        assert_eq!(context.current_location_path, "");
    }

    #[test]
    fn test_root_is_stripped_from_target() {
        let router = Router::new("/app");
        let context = NavigationContext::navigate(
            router,
            "app/users".to_string(),
            NavigateOptions::default(),
            ResolveOptions::default(),
            None,
        );
        assert_eq!(context.target_url_and_query().0, "users");
    }
}
