//! Auto-retrying assertions over locators and pages.
//!
//! `expect(&locator).to_have_texts(..)` keeps re-reading the DOM until the
//! assertion holds or its timeout (5 s by default) expires. Only expiry is a
//! failure, and the error carries the last value observed.

use crate::error::{BrowserError, Result};
use crate::locator::Locator;
use crate::page::Page;
use crate::wait::{poll_value, Polled, WaitConfig, DEFAULT_EXPECT_TIMEOUT, DEFAULT_POLL_INTERVAL};
use regex::Regex;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

/// Starts an assertion on a locator.
#[must_use]
pub fn expect(locator: &Locator) -> LocatorAssertions {
    LocatorAssertions {
        locator: locator.clone(),
        timeout: DEFAULT_EXPECT_TIMEOUT,
        negated: false,
    }
}

/// Starts an assertion on a page.
#[must_use]
pub fn expect_page(page: &Page) -> PageAssertions {
    PageAssertions {
        page: page.clone(),
        timeout: DEFAULT_EXPECT_TIMEOUT,
    }
}

/// Collapses runs of whitespace and trims, the way rendered text compares.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `actual` matches `expected` element by element after whitespace
/// normalization.
#[must_use]
pub fn texts_match<S: AsRef<str>>(actual: &[String], expected: &[S]) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| normalize_whitespace(a) == normalize_whitespace(e.as_ref()))
}

async fn retry<T, F, Fut, P>(
    read: F,
    accept: P,
    timeout: Duration,
    assertion: impl FnOnce() -> String,
) -> Result<()>
where
    T: Debug,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    match poll_value(read, accept, WaitConfig::new(timeout, DEFAULT_POLL_INTERVAL)).await {
        Polled::Accepted(_) => Ok(()),
        Polled::Failed(err) => Err(err),
        Polled::Expired { last, error } => Err(BrowserError::ExpectationFailed {
            assertion: assertion(),
            timeout,
            last_observed: match (last, error) {
                (_, Some(err)) => format!("error: {err}"),
                (Some(value), None) => format!("{value:?}"),
                (None, None) => "nothing".to_string(),
            },
        }),
    }
}

/// Assertions bound to a [`Locator`].
#[derive(Debug, Clone)]
pub struct LocatorAssertions {
    locator: Locator,
    timeout: Duration,
    negated: bool,
}

impl LocatorAssertions {
    /// Overrides the retry timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Inverts the next assertion.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    fn describe(&self, what: &str) -> String {
        let not = if self.negated { "not " } else { "" };
        format!("{} {not}{what}", self.locator)
    }

    /// Asserts the single match is (or is not) visible.
    ///
    /// # Errors
    ///
    /// `ExpectationFailed` when the timeout expires first,
    /// `StrictModeViolation` as soon as several elements match.
    pub async fn to_be_visible(&self) -> Result<()> {
        let negated = self.negated;
        let locator = &self.locator;
        retry(
            move || locator.is_visible(),
            move |visible: &bool| *visible != negated,
            self.timeout,
            || self.describe("to be visible"),
        )
        .await
    }

    /// Asserts the matches' texts equal `expected` in order and count.
    ///
    /// # Errors
    ///
    /// `ExpectationFailed` when the timeout expires first.
    pub async fn to_have_texts<S>(&self, expected: &[S]) -> Result<()>
    where
        S: AsRef<str> + Debug,
    {
        let negated = self.negated;
        let locator = &self.locator;
        retry(
            move || locator.all_text_contents(),
            move |actual: &Vec<String>| texts_match(actual, expected) != negated,
            self.timeout,
            || self.describe(&format!("to have texts {expected:?}")),
        )
        .await
    }

    /// Asserts the number of matches.
    ///
    /// # Errors
    ///
    /// `ExpectationFailed` when the timeout expires first.
    pub async fn to_have_count(&self, expected: usize) -> Result<()> {
        let negated = self.negated;
        let locator = &self.locator;
        retry(
            move || locator.count(),
            move |count: &usize| (*count == expected) != negated,
            self.timeout,
            || self.describe(&format!("to have count {expected}")),
        )
        .await
    }
}

/// Assertions bound to a [`Page`].
#[derive(Debug, Clone)]
pub struct PageAssertions {
    page: Page,
    timeout: Duration,
}

impl PageAssertions {
    /// Overrides the retry timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Asserts the page URL matches `pattern`.
    ///
    /// # Errors
    ///
    /// `ExpectationFailed` (carrying the last URL seen) when the timeout
    /// expires first.
    pub async fn to_have_url(&self, pattern: &Regex) -> Result<()> {
        let page = &self.page;
        retry(
            move || page.url(),
            |url: &String| pattern.is_match(url),
            self.timeout,
            || format!("page to have URL matching /{pattern}/"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(normalize_whitespace("  Git \n Pocket\tGuide "), "Git Pocket Guide");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn texts_match_requires_same_order_and_count() {
        let actual = vec!["Git Pocket Guide".to_string(), " Speaking JavaScript ".to_string()];

        assert!(texts_match(&actual, &["Git Pocket Guide", "Speaking JavaScript"]));
        assert!(!texts_match(&actual, &["Speaking JavaScript", "Git Pocket Guide"]));
        assert!(!texts_match(&actual, &["Git Pocket Guide"]));
    }

    #[tokio::test]
    async fn strict_mode_violation_is_reported_as_is() {
        let result = retry(
            || async {
                Err::<bool, _>(BrowserError::StrictModeViolation {
                    selector: ".rt-td".into(),
                    count: 10,
                })
            },
            |visible: &bool| *visible,
            Duration::from_millis(200),
            || "\".rt-td\" to be visible".to_string(),
        )
        .await;

        assert!(
            matches!(result, Err(BrowserError::StrictModeViolation { count: 10, .. })),
            "{result:?}"
        );
    }

    #[tokio::test]
    async fn expiry_after_errors_names_the_error() {
        let result = retry(
            || async { Err::<String, _>(BrowserError::ScriptExecutionFailed("context gone".into())) },
            |url: &String| url.contains("books"),
            Duration::from_millis(50),
            || "page to have URL matching /books/".to_string(),
        )
        .await;

        match result {
            Err(BrowserError::ExpectationFailed { last_observed, .. }) => {
                assert!(last_observed.contains("context gone"), "{last_observed}");
            }
            other => panic!("expected ExpectationFailed, got {other:?}"),
        }
    }

    #[test]
    fn blank_cells_compare_equal_after_normalization() {
        let actual = vec!["\u{a0}".to_string(), String::new()];
        assert!(texts_match(&actual, &["", " "]));
    }
}
