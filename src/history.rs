//! Platform history integration
//!
//! The router never talks to a browser directly. Everything it needs from
//! the environment goes through the [`Platform`] trait:
//! - reading the current URL
//! - writing history entries (push/replace)
//! - pop-state notifications (back/forward)
//! - discovering router links
//!
//! [`NoPlatform`] is the inert default. [`MemoryHistory`] keeps a history
//! stack in memory with back/forward support, which is what tests and
//! non-browser hosts use.

use crate::links::LinkElement;
use crate::trace_log;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifier of a pop-state subscription
pub type ListenerId = u64;

/// Callback fired when the platform location changes through history
/// traversal.
pub type PopStateListener = Rc<dyn Fn()>;

/// Environment the router runs in
///
/// Every method has an inert default, so an implementation only provides
/// what its environment supports.
pub trait Platform {
    /// Full current URL (path, query, fragment), if the platform has one
    fn current_url(&self) -> Option<String> {
        None
    }

    /// Whether [`push_state`](Platform::push_state) and
    /// [`replace_state`](Platform::replace_state) are supported
    fn push_state_available(&self) -> bool {
        false
    }

    /// Add a history entry
    fn push_state(&self, _state: Option<&str>, _title: Option<&str>, _url: &str) {}

    /// Overwrite the current history entry
    fn replace_state(&self, _state: Option<&str>, _title: Option<&str>, _url: &str) {}

    /// Hard location change, used when push state is unavailable
    fn set_location(&self, _url: &str) {}

    /// Subscribe to pop-state events; `None` when unsupported
    fn subscribe_pop_state(&self, _listener: PopStateListener) -> Option<ListenerId> {
        None
    }

    /// Remove a pop-state subscription
    fn unsubscribe_pop_state(&self, _id: ListenerId) {}

    /// Link elements matching `selector`
    fn query_links(&self, _selector: &str) -> Vec<LinkElement> {
        Vec::new()
    }
}

/// Platform without a URL bar: nothing is read or written
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlatform;

impl Platform for NoPlatform {}

// ============================================================================
// History stack
// ============================================================================

/// Navigation history entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// URL for this history entry
    pub url: String,
    /// State object passed with the entry
    pub state: Option<String>,
    /// Title passed with the entry
    pub title: Option<String>,
}

impl HistoryEntry {
    /// Create a new history entry
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: None,
            title: None,
        }
    }
}

/// Navigation history stack
#[derive(Debug, Clone)]
struct History {
    entries: Vec<HistoryEntry>,
    current: usize,
    /// Maximum history size (0 = unlimited)
    max_size: usize,
}

impl History {
    fn new(initial: HistoryEntry, max_size: usize) -> Self {
        Self {
            entries: vec![initial],
            current: 0,
            max_size,
        }
    }

    fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    /// Truncates any forward history and adds the new entry
    fn push(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.current + 1);
        self.entries.push(entry);
        self.current += 1;
        self.enforce_size_limit();
    }

    fn replace(&mut self, entry: HistoryEntry) {
        self.entries[self.current] = entry;
    }

    fn back(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    fn forward(&mut self) -> bool {
        if self.current + 1 < self.entries.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            // Remove oldest entries, keeping the current entry reachable
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

/// Resolve a written URL against the current one. Fragment-only URLs keep
/// the current path.
fn resolve_url(current: &str, url: &str) -> String {
    if url.starts_with('#') {
        let base = current.split('#').next().unwrap_or_default();
        format!("{}{}", base, url)
    } else if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{}", url)
    }
}

// ============================================================================
// MemoryHistory
// ============================================================================

/// In-memory platform with a history stack
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use wayfinder::{MemoryHistory, Platform};
///
/// let history = Rc::new(MemoryHistory::new("/"));
/// history.push_state(None, None, "/users");
/// history.push_state(None, None, "#/settings");
/// assert_eq!(history.current_url().as_deref(), Some("/users#/settings"));
///
/// assert!(history.back());
/// assert_eq!(history.current_url().as_deref(), Some("/users"));
/// ```
pub struct MemoryHistory {
    history: RefCell<History>,
    push_state: bool,
    listeners: RefCell<Vec<(ListenerId, PopStateListener)>>,
    next_listener: Cell<ListenerId>,
    links: RefCell<Vec<LinkElement>>,
}

const DEFAULT_MAX_SIZE: usize = 1000;

impl MemoryHistory {
    /// History starting at `initial_url`
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self::build(initial_url.into(), true, DEFAULT_MAX_SIZE)
    }

    /// History capped at `max_size` entries (0 = unlimited)
    pub fn with_max_size(initial_url: impl Into<String>, max_size: usize) -> Self {
        Self::build(initial_url.into(), true, max_size)
    }

    /// History of an environment without the push-state API; the router
    /// falls back to [`Platform::set_location`]
    pub fn without_push_state(initial_url: impl Into<String>) -> Self {
        Self::build(initial_url.into(), false, DEFAULT_MAX_SIZE)
    }

    fn build(initial_url: String, push_state: bool, max_size: usize) -> Self {
        Self {
            history: RefCell::new(History::new(HistoryEntry::new(initial_url), max_size)),
            push_state,
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            links: RefCell::new(Vec::new()),
        }
    }

    /// Go back one entry and emit pop-state. Returns whether it moved.
    pub fn back(&self) -> bool {
        let moved = self.history.borrow_mut().back();
        if moved {
            self.emit_pop_state();
        }
        moved
    }

    /// Go forward one entry and emit pop-state. Returns whether it moved.
    pub fn forward(&self) -> bool {
        let moved = self.history.borrow_mut().forward();
        if moved {
            self.emit_pop_state();
        }
        moved
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.history.borrow().current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        let history = self.history.borrow();
        history.current + 1 < history.entries.len()
    }

    /// Current entry
    pub fn current_entry(&self) -> HistoryEntry {
        self.history.borrow().current_entry().clone()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.history.borrow().entries.clone()
    }

    /// Get history length
    pub fn len(&self) -> usize {
        self.history.borrow().entries.len()
    }

    /// Always false: the stack keeps at least its current entry
    pub fn is_empty(&self) -> bool {
        self.history.borrow().entries.is_empty()
    }

    /// Number of pop-state subscribers
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Set the link elements returned by [`Platform::query_links`]
    pub fn set_links(&self, links: Vec<LinkElement>) {
        *self.links.borrow_mut() = links;
    }

    fn write(&self, state: Option<&str>, title: Option<&str>, url: &str, replace: bool) {
        let mut history = self.history.borrow_mut();
        let entry = HistoryEntry {
            url: resolve_url(&history.current_entry().url, url),
            state: state.map(str::to_string),
            title: title.map(str::to_string),
        };
        trace_log!(
            "memory history {} '{}'",
            if replace { "replace" } else { "push" },
            entry.url
        );
        if replace {
            history.replace(entry);
        } else {
            history.push(entry);
        }
    }

    fn emit_pop_state(&self) {
        // Listeners may re-enter (resolve reads current_url), so no borrow
        // is held while they run.
        let listeners: Vec<PopStateListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl Platform for MemoryHistory {
    fn current_url(&self) -> Option<String> {
        Some(self.history.borrow().current_entry().url.clone())
    }

    fn push_state_available(&self) -> bool {
        self.push_state
    }

    fn push_state(&self, state: Option<&str>, title: Option<&str>, url: &str) {
        self.write(state, title, url, false);
    }

    fn replace_state(&self, state: Option<&str>, title: Option<&str>, url: &str) {
        self.write(state, title, url, true);
    }

    fn set_location(&self, url: &str) {
        self.write(None, None, url, false);
    }

    fn subscribe_pop_state(&self, listener: PopStateListener) -> Option<ListenerId> {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));
        Some(id)
    }

    fn unsubscribe_pop_state(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }

    fn query_links(&self, _selector: &str) -> Vec<LinkElement> {
        self.links.borrow().clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("history", &*self.history.borrow())
            .field("push_state", &self.push_state)
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
