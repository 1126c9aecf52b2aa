//! Error types for browser testing operations.
//!
//! The hierarchy separates the ways a browser test can go wrong: the browser
//! never started, a navigation failed, a locator did not resolve the way the
//! operation needed, or an auto-retrying assertion ran out of time. Each
//! variant carries enough context (selector, URL, last observed value) to
//! tell failures apart without re-running the test.

use std::time::Duration;
use thiserror::Error;

/// The main error type for all browser testing operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch the browser process.
    ///
    /// This typically occurs when Chrome/Chromium is not installed,
    /// or when there are permission issues with the executable.
    #[error("failed to launch browser: {reason}")]
    LaunchFailed {
        /// Human-readable reason for the launch failure
        reason: String,
        /// Optional underlying error that caused the failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to establish or use the Chrome DevTools Protocol connection.
    #[error("CDP connection failed: {0}")]
    ConnectionFailed(String),

    /// Navigation to a URL failed or timed out.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed {
        /// The URL that failed to load
        url: String,
        /// Reason for the navigation failure
        reason: String,
    },

    /// A wait condition was not satisfied within the timeout.
    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    WaitTimeout {
        /// Description of the condition that timed out
        condition: String,
        /// How long we waited before timing out
        timeout: Duration,
    },

    /// An auto-retrying assertion never held within its timeout.
    ///
    /// `last_observed` is the value seen on the final poll, which is usually
    /// the fastest way to understand why the assertion failed.
    #[error("expected {assertion} within {timeout:?}, last observed: {last_observed}")]
    ExpectationFailed {
        /// What was asserted, e.g. `".rt-td" to have texts ["a", "b"]`
        assertion: String,
        /// Time spent retrying
        timeout: Duration,
        /// Debug rendering of the last observed value
        last_observed: String,
    },

    /// No element matched a locator that an action needed.
    #[error("no element matches {selector} after {timeout:?}")]
    ElementNotFound {
        /// Rendered locator chain
        selector: String,
        /// How long we waited for it to attach
        timeout: Duration,
    },

    /// A single-element operation resolved to several elements.
    #[error("strict mode violation: {selector} resolved to {count} elements")]
    StrictModeViolation {
        /// Rendered locator chain
        selector: String,
        /// Number of matching elements
        count: usize,
    },

    /// `select_option` found no option with the requested value or label.
    #[error("{selector} has no option matching '{value}'")]
    NoMatchingOption {
        /// Rendered locator chain
        selector: String,
        /// Requested option value
        value: String,
    },

    /// An action was attempted on an element that cannot take it
    /// (e.g. `select_option` on something that is not a `<select>`).
    #[error("cannot {action} {selector}: {reason}")]
    ActionFailed {
        /// The attempted action
        action: &'static str,
        /// Rendered locator chain
        selector: String,
        /// Why the page refused it
        reason: String,
    },

    /// JavaScript execution in the page context failed.
    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// An operation was attempted on a closed browser instance.
    #[error("browser instance is already closed")]
    AlreadyClosed,

    /// Wraps errors from the chromiumoxide library.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    /// Generic I/O errors (file access, network, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    /// Whether polling again could change the outcome.
    ///
    /// Strictness and option mismatches describe the query or the page
    /// structure, and a closed browser stays closed, so waits stop on them
    /// instead of running out the clock.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        !matches!(
            self,
            BrowserError::StrictModeViolation { .. }
                | BrowserError::NoMatchingOption { .. }
                | BrowserError::AlreadyClosed
        )
    }
}

/// A specialized Result type for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;
