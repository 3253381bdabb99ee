//! Error handling for the router
//!
//! Routing itself never fails: an unmatched location resolves to the
//! not-found route or to nothing, and configuration problems are logged as
//! warnings. [`RouterError`] is only returned by the fallible builders and
//! parsers. [`NavigationOutcome`] records how each pipeline run ended.

use thiserror::Error;

/// Errors returned by fallible router APIs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Route path pattern failed validation
    #[error("Invalid route path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// No route registered under the given name or handler
    #[error("Route doesn't exist: {name}")]
    RouteNotFound { name: String },

    /// Regular expression route pattern failed to compile
    #[error("Invalid route pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Navigate option string could not be parsed
    #[error("Invalid navigate option '{option}'")]
    InvalidOption { option: String },

    /// Link target is not a valid absolute URL
    #[error("Invalid URL '{href}': {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

/// How a navigation or resolution run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Routes matched and the lifecycle ran to completion
    Completed { path: String },
    /// The location already was the current one; only `already` hooks ran
    NoOp { path: String },
    /// Nothing matched and no not-found route is registered
    NotFound { path: String },
    /// A `before` or `leave` hook vetoed the transition
    Vetoed { path: String },
    /// The router was busy; the request waits in the queue
    Queued { path: String },
    /// A step panicked; the router was released before the panic resumed
    Panicked { path: String },
}

impl NavigationOutcome {
    /// Location this outcome refers to
    pub fn path(&self) -> &str {
        match self {
            NavigationOutcome::Completed { path }
            | NavigationOutcome::NoOp { path }
            | NavigationOutcome::NotFound { path }
            | NavigationOutcome::Vetoed { path }
            | NavigationOutcome::Queued { path }
            | NavigationOutcome::Panicked { path } => path,
        }
    }

    /// Check if the run completed a transition
    pub fn is_completed(&self) -> bool {
        matches!(self, NavigationOutcome::Completed { .. })
    }

    /// Check if the run was vetoed by a hook
    pub fn is_vetoed(&self) -> bool {
        matches!(self, NavigationOutcome::Vetoed { .. })
    }

    /// Check if the location was unmatched
    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationOutcome::NotFound { .. })
    }

    /// Check if the run was a no-op
    pub fn is_noop(&self) -> bool {
        matches!(self, NavigationOutcome::NoOp { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
