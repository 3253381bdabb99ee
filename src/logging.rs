//! Logging abstraction layer
//!
//! The router logs through these macros so the backend can be chosen at
//! compile time without touching call sites.
//!
//! # Features
//!
//! - `log` (default) - Uses the standard `log` crate
//! - `tracing` - Uses the `tracing` crate for structured logging
//!
//! Choose one feature at compile time. They are mutually exclusive.
//! Every record is emitted under the [`TARGET`] target, so
//! `RUST_LOG=wayfinder=debug` shows the navigation pipeline.
//!
//! # Usage
//!
//! ```ignore
//! use wayfinder::{debug_log, warn_log};
//!
//! debug_log!("navigate '{}'", to);
//! warn_log!("'{}' didn't match any of the registered routes", path);
//! ```

/// Log target shared by every record the router emits.
pub const TARGET: &str = "wayfinder";

/// Trace-level logging
///
/// Pipeline step transitions and matcher internals.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!(target: $crate::logging::TARGET, $($arg)*);
    };
}

/// Debug-level logging
///
/// Navigation start, queueing, commits and URL updates.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!(target: $crate::logging::TARGET, $($arg)*);
    };
}

/// Info-level logging
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::info!(target: $crate::logging::TARGET, $($arg)*);
    };
}

/// Warn-level logging
///
/// Configuration warnings: missing root, unknown route in an add-hook call,
/// unmatched locations, deprecated options.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!(target: $crate::logging::TARGET, $($arg)*);
    };
}

/// Error-level logging
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(feature = "log")]
        ::log::error!(target: $crate::logging::TARGET, $($arg)*);
    };
}
