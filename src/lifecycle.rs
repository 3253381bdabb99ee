//! Route lifecycle hooks
//!
//! Four hook phases surround a transition:
//!
//! - `before`: runs before the handler; receives a [`Done`] and may veto.
//! - `after`: runs after the handler.
//! - `already`: runs instead of the lifecycle when the location is
//!   already the current one.
//! - `leave`: runs on the previously active route when the router moves
//!   away from it; receives a [`Done`] and may veto.
//!
//! Hooks registered router-wide ([`Router::hooks`](crate::Router::hooks))
//! are placed in front of the route's own hooks when a route is registered.
//!
//! # Example
//!
//! ```
//! use wayfinder::{Router, RouteHooks};
//!
//! let router = Router::new("/");
//! router.on_with(
//!     "/admin",
//!     |_| {},
//!     RouteHooks::new().before(|done, m| {
//!         if m.url == "admin" {
//!             done.veto();
//!         } else {
//!             done.proceed();
//!         }
//!     }),
//! );
//! ```

use crate::context::NavigationContext;
use crate::pipeline::Next;
use crate::route::Route;
use crate::Match;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Hook that may hold or veto a transition.
pub type BeforeHook = Rc<dyn Fn(Done, &Match)>;
/// Hook notified after the handler ran.
pub type AfterHook = Rc<dyn Fn(&Match)>;
/// Hook notified when the location is already active.
pub type AlreadyHook = Rc<dyn Fn(&Match)>;
/// Hook run when leaving a route; receives the new matches.
pub type LeaveHook = Rc<dyn Fn(Done, &[Match])>;

/// Lifecycle phase a hook belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    Before,
    After,
    Already,
    Leave,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPhase::Before => "before",
            HookPhase::After => "after",
            HookPhase::Already => "already",
            HookPhase::Leave => "leave",
        };
        f.write_str(name)
    }
}

/// Identity of a registered hook, used for deregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

impl HookId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        HookId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ============================================================================
// Done
// ============================================================================

/// Continuation handed to `before` and `leave` hooks.
///
/// Call [`proceed`](Done::proceed) to let the transition continue or
/// [`veto`](Done::veto) to stop it. The hook may keep the `Done` and call it
/// later, which holds the navigation (and every navigation queued behind
/// it) until then. Dropping a `Done` without calling it counts as a veto.
pub struct Done {
    next: Next<NavigationContext>,
}

impl Done {
    pub(crate) fn new(next: Next<NavigationContext>) -> Self {
        Self { next }
    }

    /// Continue the transition.
    pub fn proceed(self) {
        self.next.proceed();
    }

    /// Stop the transition. The router is released and queued navigations run.
    pub fn veto(self) {
        self.next.halt();
    }

    /// `resolve(false)` vetoes, `resolve(true)` proceeds.
    pub fn resolve(self, proceed: bool) {
        if proceed {
            self.proceed();
        } else {
            self.veto();
        }
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done").finish_non_exhaustive()
    }
}

// ============================================================================
// RouteHooks
// ============================================================================

#[derive(Clone)]
pub(crate) struct Registered<H> {
    pub(crate) id: HookId,
    pub(crate) hook: H,
}

/// Hook lists for one route, one list per phase.
#[derive(Clone, Default)]
pub struct RouteHooks {
    pub(crate) before: Vec<Registered<BeforeHook>>,
    pub(crate) after: Vec<Registered<AfterHook>>,
    pub(crate) already: Vec<Registered<AlreadyHook>>,
    pub(crate) leave: Vec<Registered<LeaveHook>>,
}

impl RouteHooks {
    /// Create an empty hook set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `before` hook
    pub fn before<F>(mut self, hook: F) -> Self
    where
        F: Fn(Done, &Match) + 'static,
    {
        self.push_before(Rc::new(hook));
        self
    }

    /// Add an `after` hook
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Match) + 'static,
    {
        self.push_after(Rc::new(hook));
        self
    }

    /// Add an `already` hook
    pub fn already<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Match) + 'static,
    {
        self.push_already(Rc::new(hook));
        self
    }

    /// Add a `leave` hook
    pub fn leave<F>(mut self, hook: F) -> Self
    where
        F: Fn(Done, &[Match]) + 'static,
    {
        self.push_leave(Rc::new(hook));
        self
    }

    pub(crate) fn push_before(&mut self, hook: BeforeHook) -> HookId {
        let id = HookId::next();
        self.before.push(Registered { id, hook });
        id
    }

    pub(crate) fn push_after(&mut self, hook: AfterHook) -> HookId {
        let id = HookId::next();
        self.after.push(Registered { id, hook });
        id
    }

    pub(crate) fn push_already(&mut self, hook: AlreadyHook) -> HookId {
        let id = HookId::next();
        self.already.push(Registered { id, hook });
        id
    }

    pub(crate) fn push_leave(&mut self, hook: LeaveHook) -> HookId {
        let id = HookId::next();
        self.leave.push(Registered { id, hook });
        id
    }

    /// Remove a hook by identity. Returns whether it was present.
    pub(crate) fn remove(&mut self, phase: HookPhase, id: HookId) -> bool {
        fn retain<H>(list: &mut Vec<Registered<H>>, id: HookId) -> bool {
            let before = list.len();
            list.retain(|r| r.id != id);
            list.len() != before
        }

        match phase {
            HookPhase::Before => retain(&mut self.before, id),
            HookPhase::After => retain(&mut self.after, id),
            HookPhase::Already => retain(&mut self.already, id),
            HookPhase::Leave => retain(&mut self.leave, id),
        }
    }

    /// Concatenate two hook sets, `first` in front, per phase.
    pub(crate) fn accumulate(first: &RouteHooks, second: &RouteHooks) -> RouteHooks {
        fn concat<H: Clone>(a: &[Registered<H>], b: &[Registered<H>]) -> Vec<Registered<H>> {
            a.iter().chain(b).cloned().collect()
        }

        RouteHooks {
            before: concat(&first.before, &second.before),
            after: concat(&first.after, &second.after),
            already: concat(&first.already, &second.already),
            leave: concat(&first.leave, &second.leave),
        }
    }

    pub(crate) fn before_hooks(&self) -> Vec<BeforeHook> {
        self.before.iter().map(|r| Rc::clone(&r.hook)).collect()
    }

    pub(crate) fn after_hooks(&self) -> Vec<AfterHook> {
        self.after.iter().map(|r| Rc::clone(&r.hook)).collect()
    }

    pub(crate) fn already_hooks(&self) -> Vec<AlreadyHook> {
        self.already.iter().map(|r| Rc::clone(&r.hook)).collect()
    }

    pub(crate) fn leave_hooks(&self) -> Vec<LeaveHook> {
        self.leave.iter().map(|r| Rc::clone(&r.hook)).collect()
    }

    /// Number of hooks registered for a phase
    pub fn count(&self, phase: HookPhase) -> usize {
        match phase {
            HookPhase::Before => self.before.len(),
            HookPhase::After => self.after.len(),
            HookPhase::Already => self.already.len(),
            HookPhase::Leave => self.leave.len(),
        }
    }

    /// Check if no hooks are registered at all
    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
            && self.after.is_empty()
            && self.already.is_empty()
            && self.leave.is_empty()
    }
}

impl fmt::Debug for RouteHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHooks")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .field("already", &self.already.len())
            .field("leave", &self.leave.len())
            .finish()
    }
}

// ============================================================================
// HookHandle
// ============================================================================

/// Deregistration capability returned by the `add_*_hook` methods.
///
/// The handle does not keep the route alive. Removing a hook from a route
/// that no longer exists, or through an inert handle (route not found at
/// registration time), does nothing.
#[derive(Debug, Clone)]
pub struct HookHandle {
    target: Option<(Weak<Route>, HookPhase, HookId)>,
}

impl HookHandle {
    pub(crate) fn new(route: &Rc<Route>, phase: HookPhase, id: HookId) -> Self {
        Self {
            target: Some((Rc::downgrade(route), phase, id)),
        }
    }

    pub(crate) fn inert() -> Self {
        Self { target: None }
    }

    /// Whether this handle refers to a registered hook
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    /// Remove the hook. Returns whether anything was removed.
    pub fn remove(self) -> bool {
        let Some((route, phase, id)) = self.target else {
            return false;
        };
        match route.upgrade() {
            Some(route) => route.hooks_mut().remove(phase, id),
            None => false,
        }
    }
}
