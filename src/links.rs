//! Router links
//!
//! A router link is an element (usually `<a>`) that the platform reports
//! through [`Platform::query_links`](crate::Platform::query_links). Clicking
//! it navigates through the router instead of loading a new page.
//!
//! Attributes that change the behavior:
//! - `data-navigo="false"` or `target="_blank"`: not handled by the router
//! - `data-navigo-options`: [`NavigateOptions`] in compact form
//!   (`"callHandler:false,updateBrowserURL:false"`)

use crate::config::NavigateOptions;
use crate::error::RouterError;
use crate::trace_log;
use url::Url;

/// Attributes of a link element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkElement {
    /// Lowercase tag name (`"a"` for anchors)
    pub tag_name: String,
    /// `href` attribute
    pub href: Option<String>,
    /// `target` attribute
    pub target: Option<String>,
    /// `data-navigo` attribute
    pub navigo: Option<String>,
    /// `data-navigo-options` attribute
    pub options: Option<String>,
}

impl LinkElement {
    /// Anchor pointing at `href`
    pub fn anchor(href: impl Into<String>) -> Self {
        Self {
            tag_name: "a".to_string(),
            href: Some(href.into()),
            ..Self::default()
        }
    }

    /// Set the `target` attribute
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the `data-navigo` attribute
    pub fn navigo(mut self, value: impl Into<String>) -> Self {
        self.navigo = Some(value.into());
        self
    }

    /// Set the `data-navigo-options` attribute
    pub fn options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Whether the router handles clicks on this link
    pub fn is_routable(&self) -> bool {
        self.navigo.as_deref() != Some("false") && self.target.as_deref() != Some("_blank")
    }

    /// Navigate options from `data-navigo-options`; defaults when the
    /// attribute is absent or malformed
    pub fn navigate_options(&self) -> NavigateOptions {
        match self.options.as_deref() {
            None => NavigateOptions::default(),
            Some(raw) => raw.parse().unwrap_or_default(),
        }
    }
}

/// Keyboard modifiers held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl ClickModifiers {
    /// Ctrl/Cmd-click opens a new tab and is left to the platform
    pub fn opens_new_tab(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Reduce an absolute `http(s)` URL to its path and query.
///
/// # Example
///
/// ```
/// use wayfinder::links::absolute_to_path;
///
/// let path = absolute_to_path("https://example.com/users/7?tab=posts#top").unwrap();
/// assert_eq!(path, "/users/7?tab=posts");
/// ```
pub fn absolute_to_path(href: &str) -> Result<String, RouterError> {
    let url = Url::parse(href).map_err(|source| RouterError::InvalidUrl {
        href: href.to_string(),
        source,
    })?;

    Ok(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}

/// Location a link navigates to. Absolute URLs are reduced to path and
/// query; anything unparsable is used as written.
pub fn link_location(href: &str) -> String {
    if !href.starts_with("http") {
        return href.to_string();
    }

    absolute_to_path(href).unwrap_or_else(|e| {
        trace_log!("link href kept as written: {}", e);
        href.to_string()
    })
}
