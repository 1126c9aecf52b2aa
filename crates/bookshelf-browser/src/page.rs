//! Page-level browser operations and navigation.
//!
//! This module provides the Page type, which represents a browser tab/page
//! and exposes navigation, script execution, URL waits and locator factories.

use crate::error::{BrowserError, Result};
use crate::locator::Locator;
use crate::query::{Query, Role, Selector};
use crate::wait::{wait_for_result, WaitConfig, DEFAULT_EXPECT_TIMEOUT};
use chromiumoxide::page::Page as ChromePage;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Represents a browser page (tab) with testing capabilities.
///
/// Cloning is cheap and every clone drives the same tab. Locators created
/// from a page keep a clone, which is why they can be handed around freely.
#[derive(Debug, Clone)]
pub struct Page {
    inner: Arc<ChromePage>,
    action_timeout: Duration,
}

impl Page {
    /// Wraps a chromiumoxide page. Called by `TestBrowser::new_page`.
    pub(crate) fn new(page: ChromePage) -> Self {
        Self {
            inner: Arc::new(page),
            action_timeout: DEFAULT_EXPECT_TIMEOUT,
        }
    }

    /// Sets how long locators created from this page auto-wait for their
    /// elements before failing.
    #[must_use]
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// The auto-wait bound used by locators from this page.
    #[must_use]
    pub fn action_timeout(&self) -> Duration {
        self.action_timeout
    }

    /// Navigates to an absolute URL and waits for the document to finish
    /// loading.
    ///
    /// # Errors
    ///
    /// Returns `NavigationFailed` if the page fails to load or times out.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        self.inner
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.wait_for_load(WaitConfig::default()).await
    }

    /// Waits for `document.readyState` to reach `"complete"`.
    ///
    /// Called by `navigate()`. Call it yourself after navigation triggered
    /// from inside the page.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the document never completes.
    pub async fn wait_for_load(&self, config: WaitConfig) -> Result<()> {
        let page = self;
        wait_for_result(
            move || async move {
                let state: String = page.evaluate("document.readyState").await?;
                Ok(state == "complete")
            },
            config,
            "document ready",
        )
        .await
    }

    /// Waits until the current URL matches `pattern`.
    ///
    /// Start this before the action that navigates (e.g. with
    /// `tokio::try_join!`) and the navigation cannot slip past unobserved:
    /// the poll only ever looks at the live URL.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimeout` if the URL never matches.
    pub async fn wait_for_url(&self, pattern: &Regex, config: WaitConfig) -> Result<()> {
        let page = self;
        wait_for_result(
            move || async move { Ok(pattern.is_match(&page.url().await?)) },
            config,
            &format!("URL matching /{pattern}/"),
        )
        .await
    }

    /// Executes a JavaScript expression in the page and deserializes the
    /// result.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails or the result cannot be
    /// deserialized.
    pub async fn evaluate<T>(&self, script: impl Into<String>) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let script: String = script.into();
        let result = self
            .inner
            .evaluate_expression(script)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    /// Returns the current page URL.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails.
    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    /// Returns the page title.
    ///
    /// # Errors
    ///
    /// Returns an error if script execution fails.
    pub async fn title(&self) -> Result<String> {
        self.evaluate("document.title").await
    }

    /// Takes a screenshot of the page and returns PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if screenshot capture fails.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.inner
            .screenshot(chromiumoxide::page::ScreenshotParams::default())
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))
    }

    /// Locates elements by CSS selector.
    #[must_use]
    pub fn locator(&self, css: &str) -> Locator {
        self.query(Query::new(Selector::Css(css.to_string())))
    }

    /// Locates elements by ARIA role and accessible name.
    #[must_use]
    pub fn get_by_role(&self, role: Role, name: &str) -> Locator {
        self.query(Query::new(Selector::Role {
            role,
            name: Some(name.to_string()),
        }))
    }

    /// Locates inputs by placeholder text.
    #[must_use]
    pub fn get_by_placeholder(&self, text: &str) -> Locator {
        self.query(Query::new(Selector::Placeholder(text.to_string())))
    }

    fn query(&self, query: Query) -> Locator {
        Locator::new(self.clone(), query, self.action_timeout)
    }
}
