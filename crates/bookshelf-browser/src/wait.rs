//! Polling primitives for browser conditions.
//!
//! Every wait in this crate is a bounded poll: a condition is re-evaluated at
//! `poll_interval` until it holds or `timeout` elapses. Nothing retries
//! forever.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Default timeout for wait operations (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default poll interval for checking conditions (100ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default timeout for locator actions and `expect` assertions (5 seconds).
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for wait operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,

    /// How often to check if the condition is satisfied.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a new wait configuration.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Creates a config with custom timeout and default poll interval.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, DEFAULT_POLL_INTERVAL)
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// Waits for a condition to become true, with timeout.
///
/// # Errors
///
/// Returns `WaitTimeout` if the condition is still false when the timeout
/// expires.
pub async fn wait_for<F, Fut>(condition: F, config: WaitConfig, description: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();

    loop {
        if condition().await {
            return Ok(());
        }

        if start.elapsed() >= config.timeout {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Waits for a condition that returns a `Result<bool>`.
///
/// Errors from the condition are treated as "not yet": the page may be
/// mid-navigation and the execution context briefly gone.
///
/// # Errors
///
/// Returns `WaitTimeout` if the condition never returns `Ok(true)`.
pub async fn wait_for_result<F, Fut>(
    condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();

    loop {
        if let Ok(true) = condition().await {
            return Ok(());
        }

        if start.elapsed() >= config.timeout {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}

/// Outcome of [`poll_value`].
#[derive(Debug)]
pub enum Polled<T> {
    /// A value the predicate accepted.
    Accepted(T),
    /// Timed out.
    Expired {
        /// Last successfully read value, if any.
        last: Option<T>,
        /// Error from the most recent read, if the last attempt failed.
        error: Option<BrowserError>,
    },
    /// A read failed in a way polling cannot fix
    /// (see [`BrowserError::is_transient`]).
    Failed(BrowserError),
}

/// Repeatedly reads a value until `accept` holds for it or the timeout
/// expires.
///
/// Unlike [`wait_for_result`], the caller gets the observed value back in
/// every outcome, which is what assertion messages need. Transient read
/// errors count as "not yet"; any other error ends the poll at once.
pub async fn poll_value<T, F, Fut, P>(read: F, accept: P, config: WaitConfig) -> Polled<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let start = Instant::now();
    let mut last = None;
    let mut error = None;

    loop {
        match read().await {
            Ok(value) if accept(&value) => return Polled::Accepted(value),
            Ok(value) => {
                last = Some(value);
                error = None;
            }
            Err(e) if !e.is_transient() => return Polled::Failed(e),
            Err(e) => error = Some(e),
        }

        if start.elapsed() >= config.timeout {
            return Polled::Expired { last, error };
        }

        sleep(config.poll_interval).await;
    }
}
