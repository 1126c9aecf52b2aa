//! Browser lifecycle management and process control.
//!
//! `TestBrowser` launches Chrome, drives the CDP handler and hands out pages.
//! Every launch gets its own temporary user-data directory, so two browsers
//! never share cookies, storage or cache.
//!
//! # Resource Safety
//!
//! Dropping a `TestBrowser` kills the process through chromiumoxide's own
//! Drop and removes the profile directory. Call `close()` at the end of a
//! test for a graceful shutdown.

use crate::error::{BrowserError, Result};
use crate::page::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Configuration for launching a test browser.
#[derive(Debug, Clone)]
pub struct TestBrowserConfig {
    /// Run in headless mode (default: true, unless the `visible` feature is on).
    pub headless: bool,

    /// Browser window size (default: 1920x1080).
    pub window_size: (u32, u32),

    /// Additional Chrome arguments.
    pub args: Vec<String>,

    /// Chrome executable path (None = auto-detect).
    pub chrome_path: Option<String>,

    /// Auto-wait bound for locators on pages from this browser.
    pub action_timeout: Duration,
}

impl TestBrowserConfig {
    /// Creates a new config with defaults for headless testing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables visible mode for debugging.
    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Sets headless mode explicitly.
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Sets a custom window size.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Uses a specific Chrome executable.
    #[must_use]
    pub fn with_chrome_path(mut self, path: Option<String>) -> Self {
        self.chrome_path = path;
        self
    }

    /// Sets the locator auto-wait bound.
    #[must_use]
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Chrome command-line arguments for this config, excluding the
    /// per-launch profile directory.
    #[must_use]
    pub fn chrome_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 2);
        if self.headless {
            args.push("--headless".to_string());
        }
        args.push(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));
        args.extend(self.args.iter().cloned());
        args
    }

    fn to_browser_config(&self, profile: &Path) -> Result<BrowserConfig> {
        let mut config = BrowserConfig::builder();
        if !self.headless {
            // The builder launches headless unless told otherwise.
            config = config.with_head();
        }

        for arg in self.chrome_args() {
            config = config.arg(arg);
        }
        config = config.arg(format!("--user-data-dir={}", profile.display()));

        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path.clone());
        }

        config.build().map_err(|e| BrowserError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for TestBrowserConfig {
    fn default() -> Self {
        Self {
            headless: !cfg!(feature = "visible"),
            window_size: (1920, 1080),
            args: vec![
                // Containers without user namespaces need this. Test content only.
                "--no-sandbox".to_string(),
                // Prevents /dev/shm exhaustion in containerized environments
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
            action_timeout: crate::wait::DEFAULT_EXPECT_TIMEOUT,
        }
    }
}

/// A managed browser instance for testing.
///
/// ```ignore
/// let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
/// let page = browser.new_page().await?;
/// page.navigate("https://example.com").await?;
/// browser.close().await?;
/// ```
pub struct TestBrowser {
    inner: Arc<Mutex<Option<Browser>>>,
    // Declared after `inner` so the process dies before its profile goes.
    profile: TempDir,
    action_timeout: Duration,
}

/// Fresh profile directory for one launch, removed when dropped.
fn create_profile() -> Result<TempDir> {
    Ok(tempfile::Builder::new()
        .prefix("bookshelf-browser-")
        .tempdir()?)
}

impl TestBrowser {
    /// Launches a new browser instance with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `LaunchFailed` if Chrome is not installed, not executable,
    /// or fails to start.
    pub async fn launch(config: TestBrowserConfig) -> Result<Self> {
        debug!("Launching browser with config: {:?}", config);

        let profile = create_profile()?;
        let browser_config = config.to_browser_config(profile.path())?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only processes CDP events while the handler is polled
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("Browser handler error: {}", e);
                }
            }
        });

        debug!("Browser launched successfully");

        Ok(Self {
            inner: Arc::new(Mutex::new(Some(browser))),
            profile,
            action_timeout: config.action_timeout,
        })
    }

    /// Creates a new browser page (tab).
    ///
    /// # Errors
    ///
    /// Returns `AlreadyClosed` if the browser has been closed.
    pub async fn new_page(&self) -> Result<Page> {
        let browser = self.inner.lock().await;

        let browser = browser.as_ref().ok_or(BrowserError::AlreadyClosed)?;

        let chrome_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        Ok(Page::new(chrome_page).with_action_timeout(self.action_timeout))
    }

    /// The user-data directory this browser runs with.
    #[must_use]
    pub fn profile_dir(&self) -> &Path {
        self.profile.path()
    }

    /// Closes the browser, waits for the Chrome process to exit and deletes
    /// its profile directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser fails to close gracefully or the
    /// profile directory cannot be removed.
    pub async fn close(self) -> Result<()> {
        let Self { inner, profile, .. } = self;

        if let Some(mut browser) = inner.lock().await.take() {
            debug!("Closing browser gracefully");
            browser
                .close()
                .await
                .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;
            // Chrome keeps writing to the profile until it exits.
            if let Err(e) = browser.wait().await {
                warn!("Browser did not exit cleanly: {}", e);
            }
        }

        debug!(profile = %profile.path().display(), "Removing browser profile");
        profile.close()?;
        Ok(())
    }

    /// Returns true if the browser has been closed.
    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }
}
