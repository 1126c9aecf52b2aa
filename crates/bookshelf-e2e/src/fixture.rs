//! Per-test fixtures.
//!
//! Every scenario gets its own browser (and so its own profile), wrapped in
//! a fresh [`BooksPage`]. Nothing is pooled or reused between tests or
//! between retries of the same test.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bookshelf_browser::{BrowserError, TestBrowser};
use tracing::{info, warn};

use crate::books::BooksPage;
use crate::config::E2eConfig;
use crate::error::{BooksError, Result};

pub struct BooksFixture {
    browser: TestBrowser,
    books: BooksPage,
}

impl BooksFixture {
    /// Launches an isolated browser and opens a blank page bound to a new
    /// page object.
    pub async fn setup(config: Arc<E2eConfig>) -> Result<Self> {
        let browser = TestBrowser::launch(config.browser_config()).await?;
        let page = browser.new_page().await?;
        Ok(Self {
            books: BooksPage::new(page, config),
            browser,
        })
    }

    pub fn books_page(&self) -> &BooksPage {
        &self.books
    }

    pub async fn teardown(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

/// File name for a failure screenshot: the test name reduced to
/// `[a-z0-9-]`, plus the attempt number.
pub fn screenshot_path(dir: &Path, test_name: &str, attempt: u32) -> PathBuf {
    let slug: String = test_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    dir.join(format!("{}-{attempt}.png", slug.trim_matches('-')))
}

/// Runs `scenario` against a fresh fixture, retrying failures up to
/// `config.retries` times, each attempt on a brand-new fixture and bounded
/// by `config.test_timeout()`.
///
/// Configuration problems fail immediately, before any browser launches,
/// and are not retried.
pub async fn run_books_test<F, Fut>(name: &str, config: E2eConfig, scenario: F) -> Result<()>
where
    F: Fn(BooksPage) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    config.base_url()?;
    let config = Arc::new(config);
    let attempts = config.retries.saturating_add(1);

    let mut attempt = 1;
    loop {
        info!(test = name, attempt, "running");
        let fixture = BooksFixture::setup(Arc::clone(&config)).await?;

        let outcome =
            match tokio::time::timeout(config.test_timeout(), scenario(fixture.books_page().clone()))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(BooksError::TestTimeout {
                    name: name.to_string(),
                    timeout: config.test_timeout(),
                }),
            };

        if let Err(err) = &outcome {
            warn!(test = name, attempt, error = %err, "attempt failed");
            if config.screenshot_on_failure {
                capture_failure(&fixture, &config.artifacts_dir, name, attempt).await;
            }
        }

        if let Err(err) = fixture.teardown().await {
            warn!(test = name, error = %err, "teardown failed");
        }

        match outcome {
            Ok(()) => return Ok(()),
            Err(err @ BooksError::Config(_)) => return Err(err),
            Err(err) if attempt >= attempts => return Err(err),
            Err(_) => attempt += 1,
        }
    }
}

async fn capture_failure(fixture: &BooksFixture, dir: &Path, name: &str, attempt: u32) {
    let path = screenshot_path(dir, name, attempt);
    let result = async {
        let png = fixture.books_page().page().screenshot().await?;
        tokio::fs::create_dir_all(dir).await.map_err(BrowserError::from)?;
        tokio::fs::write(&path, png).await.map_err(BrowserError::from)?;
        Ok::<_, BrowserError>(())
    }
    .await;

    match result {
        Ok(()) => info!(path = %path.display(), "saved failure screenshot"),
        Err(err) => warn!(error = %err, "could not save failure screenshot"),
    }
}
