//! Router configuration
//!
//! [`ResolveOptions`] control how a location is matched, [`NavigateOptions`]
//! control which side effects a navigation has, and [`GenerateOptions`]
//! control URL generation. Every option has a default, so callers only set
//! what they need:
//!
//! ```
//! use wayfinder::{NavigateOptions, ResolveOptions, Strategy};
//!
//! let resolve = ResolveOptions::default().strategy(Strategy::All).hash(true);
//! let navigate = NavigateOptions::default()
//!     .call_handler(false)
//!     .resolve_options(resolve);
//! assert!(!navigate.call_handler);
//! ```
//!
//! With the `serde` feature all option types (de)serialize with camelCase
//! keys, and [`NavigateOptions`] also parses from the compact link
//! attribute form (`"callHandler:false,updateBrowserURL:false"`).

use crate::error::RouterError;
use crate::warn_log;
use std::str::FromStr;

/// Default CSS selector for links the router handles.
pub const DEFAULT_LINKS_SELECTOR: &str = "[data-navigo]";

/// How many routes a resolution may match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "UPPERCASE")
)]
pub enum Strategy {
    /// Stop at the first route in registration order
    #[default]
    One,
    /// Collect every matching route in registration order
    All,
}

/// History API method used when the browser URL is updated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HistoryMethod {
    /// Add a new history entry
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "pushState"))]
    Push,
    /// Overwrite the current history entry
    #[cfg_attr(feature = "serde", serde(rename = "replaceState"))]
    Replace,
}

impl FromStr for HistoryMethod {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pushState" => Ok(HistoryMethod::Push),
            "replaceState" => Ok(HistoryMethod::Replace),
            other => Err(RouterError::InvalidOption {
                option: format!("historyAPIMethod:{}", other),
            }),
        }
    }
}

// ============================================================================
// ResolveOptions
// ============================================================================

/// Options that control matching
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct ResolveOptions {
    /// Match cardinality
    pub strategy: Strategy,
    /// Read the route from the hash fragment instead of the path
    pub hash: bool,
    /// Silence the warning logged when nothing matches
    pub no_match_warning: bool,
    /// Selector used to find router links
    pub links_selector: String,
}

/// Router-wide defaults are the resolve options every call starts from.
pub type RouterOptions = ResolveOptions;

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::One,
            hash: false,
            no_match_warning: false,
            links_selector: DEFAULT_LINKS_SELECTOR.to_string(),
        }
    }
}

impl ResolveOptions {
    /// Set the match strategy
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable hash-based routing
    pub fn hash(mut self, hash: bool) -> Self {
        self.hash = hash;
        self
    }

    /// Silence the no-match warning
    pub fn no_match_warning(mut self, silence: bool) -> Self {
        self.no_match_warning = silence;
        self
    }

    /// Set the links selector
    pub fn links_selector(mut self, selector: impl Into<String>) -> Self {
        self.links_selector = selector.into();
        self
    }
}

// ============================================================================
// NavigateOptions
// ============================================================================

/// Options that control the side effects of a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct NavigateOptions {
    /// Title passed to the history API
    pub title: Option<String>,
    /// State object passed to the history API
    #[cfg_attr(feature = "serde", serde(rename = "stateObj"))]
    pub state: Option<String>,
    /// Push or replace the history entry
    #[cfg_attr(feature = "serde", serde(rename = "historyAPIMethod"))]
    pub history_method: HistoryMethod,
    /// Write the new location to the platform history
    #[cfg_attr(feature = "serde", serde(rename = "updateBrowserURL"))]
    pub update_browser_url: bool,
    /// Invoke the matched route handler
    pub call_handler: bool,
    /// Run before/after/already/leave hooks
    pub call_hooks: bool,
    /// Commit the matches as the router's current state
    pub update_state: bool,
    /// Run the lifecycle even when the target is already current
    pub force: bool,
    /// Resolve options for this navigation (router defaults when `None`)
    pub resolve_options: Option<ResolveOptions>,
    /// Deprecated: use `call_handler`/`call_hooks`
    pub silent: Option<bool>,
    /// Deprecated: use `call_handler`/`call_hooks`
    pub should_resolve: Option<bool>,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            title: None,
            state: None,
            history_method: HistoryMethod::Push,
            update_browser_url: true,
            call_handler: true,
            call_hooks: true,
            update_state: true,
            force: false,
            resolve_options: None,
            silent: None,
            should_resolve: None,
        }
    }
}

impl NavigateOptions {
    /// Set the history title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the history state object
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Set the history method
    pub fn history_method(mut self, method: HistoryMethod) -> Self {
        self.history_method = method;
        self
    }

    /// Enable or disable the browser URL update
    pub fn update_browser_url(mut self, update: bool) -> Self {
        self.update_browser_url = update;
        self
    }

    /// Enable or disable the handler call
    pub fn call_handler(mut self, call: bool) -> Self {
        self.call_handler = call;
        self
    }

    /// Enable or disable hooks
    pub fn call_hooks(mut self, call: bool) -> Self {
        self.call_hooks = call;
        self
    }

    /// Enable or disable committing the router state
    pub fn update_state(mut self, update: bool) -> Self {
        self.update_state = update;
        self
    }

    /// Force the lifecycle even for the current location
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Override the router's resolve options
    pub fn resolve_options(mut self, options: ResolveOptions) -> Self {
        self.resolve_options = Some(options);
        self
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, RouterError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(RouterError::InvalidOption {
            option: format!("{}:{}", key, value),
        }),
    }
}

impl FromStr for NavigateOptions {
    type Err = RouterError;

    /// Parse the compact `key:value,key:value` form used in link attributes.
    ///
    /// Unknown keys and malformed values are skipped one pair at a time.
    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut options = NavigateOptions::default();

        for pair in source.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Err(e) = options.apply_pair(pair) {
                warn_log!("Skipping navigate option: {}", e);
            }
        }

        Ok(options)
    }
}

impl NavigateOptions {
    fn apply_pair(&mut self, pair: &str) -> Result<(), RouterError> {
        let (key, value) = pair.split_once(':').unwrap_or((pair, ""));
        match key {
            "title" => self.title = Some(value.to_string()),
            "stateObj" => self.state = Some(value.to_string()),
            "historyAPIMethod" => self.history_method = value.parse()?,
            "updateBrowserURL" => self.update_browser_url = parse_flag(key, value)?,
            "callHandler" => self.call_handler = parse_flag(key, value)?,
            "callHooks" => self.call_hooks = parse_flag(key, value)?,
            "updateState" => self.update_state = parse_flag(key, value)?,
            "force" => self.force = parse_flag(key, value)?,
            _ => {
                return Err(RouterError::InvalidOption {
                    option: pair.to_string(),
                })
            }
        }
        Ok(())
    }
}

// ============================================================================
// GenerateOptions
// ============================================================================

/// Options for URL generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct GenerateOptions {
    /// Keep the router root at the start of the generated URL
    pub include_root: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { include_root: true }
    }
}

impl GenerateOptions {
    /// Generate URLs relative to the router root
    pub fn without_root() -> Self {
        Self {
            include_root: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let options = ResolveOptions::default();
        assert_eq!(options.strategy, Strategy::One);
        assert!(!options.hash);
        assert!(!options.no_match_warning);
        assert_eq!(options.links_selector, "[data-navigo]");
    }

    #[test]
    fn test_navigate_defaults() {
        let options = NavigateOptions::default();
        assert!(options.update_browser_url);
        assert!(options.call_handler);
        assert!(options.call_hooks);
        assert!(options.update_state);
        assert!(!options.force);
        assert_eq!(options.history_method, HistoryMethod::Push);
    }

    #[test]
    fn test_parse_link_options() {
        let options: NavigateOptions =
            "callHandler:false, updateBrowserURL:false, historyAPIMethod:replaceState, title:Docs"
                .parse()
                .unwrap();

        assert!(!options.call_handler);
        assert!(!options.update_browser_url);
        assert!(options.call_hooks);
        assert_eq!(options.history_method, HistoryMethod::Replace);
        assert_eq!(options.title.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_parse_empty_options() {
        let options: NavigateOptions = "".parse().unwrap();
        assert_eq!(options, NavigateOptions::default());
    }

    #[test]
    fn test_parse_skips_invalid_pairs() {
        let options: NavigateOptions = "unknown:true, callHandler:false, force:maybe, historyAPIMethod:go"
            .parse()
            .unwrap();

        assert!(!options.call_handler);
        assert!(!options.force);
        assert_eq!(options.history_method, HistoryMethod::Push);
        assert!(options.call_hooks);
    }

    #[test]
    fn test_generate_options() {
        assert!(GenerateOptions::default().include_root);
        assert!(!GenerateOptions::without_root().include_root);
    }
}
