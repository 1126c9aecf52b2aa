//! The book-catalog page object.
//!
//! Each public operation performs its DOM interactions in order and then
//! checks its own success criteria, returning an error on the first
//! violation. Row content is never cached: every check re-reads the live
//! table.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use bookshelf_browser::wait::{poll_value, Polled};
use bookshelf_browser::{expect, expect_page, BrowserError, Locator, Page, WaitConfig};
use tracing::{debug, info};

use crate::books::checks;
use crate::books::locators::{BookColumn, BookTable};
use crate::books::navigation::{book_id_from_href, book_url_pattern, detail_url_pattern};
use crate::config::E2eConfig;
use crate::error::{BooksError, Result};

/// Title expected in the unfiltered listing.
pub const KNOWN_TITLE: &str = "Learning JavaScript Design Patterns";

/// Bound for the title column to change after next/previous.
pub const PAGINATION_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Page object for the catalog page. Cheap to clone; clones drive the same
/// tab.
#[derive(Debug, Clone)]
pub struct BooksPage {
    page: Page,
    table: BookTable,
    config: Arc<E2eConfig>,
}

impl BooksPage {
    pub fn new(page: Page, config: Arc<E2eConfig>) -> Self {
        Self {
            table: BookTable::new(page.clone()),
            page,
            config,
        }
    }

    /// The underlying page, for steps outside this object's vocabulary.
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn table(&self) -> &BookTable {
        &self.table
    }

    pub fn config(&self) -> &E2eConfig {
        &self.config
    }

    /// Goes to the configured catalog page. The base URL is validated
    /// before the browser is touched.
    pub async fn open(&self) -> Result<()> {
        let url = self.config.base_url()?;
        self.page.navigate(url.as_str()).await?;
        Ok(())
    }

    /// Selects `count` in the rows-per-page control.
    pub async fn set_rows_per_page(&self, count: impl Display) -> Result<()> {
        let value = count.to_string();
        debug!(rows = %value, "setting rows per page");
        self.table
            .rows_per_page_control()
            .select_option(&value)
            .await?;
        Ok(())
    }

    /// Opens the catalog, filters by `term` and checks every rendered row
    /// against it.
    pub async fn search_books(&self, term: &str) -> Result<()> {
        info!(term, "search books");
        self.open().await?;
        self.table.search_input().fill(term).await?;

        expect(&self.table.titles().first())
            .with_timeout(self.config.expect_timeout())
            .to_be_visible()
            .await?;

        let titles = self.table.titles().all_text_contents().await?;
        let titled_rows = checks::check_titles_match(term, &titles)?;

        let authors = self.table.authors().all_text_contents().await?;
        checks::check_has_content(BookColumn::Author.label(), &authors)?;

        let publishers = self.table.publishers().all_text_contents().await?;
        checks::check_has_content(BookColumn::Publisher.label(), &publishers)?;

        let thumbnails = self.table.thumbnails();
        let count = thumbnails.count().await?;
        checks::check_thumbnails_match_titles(count, titled_rows)?;
        self.check_thumbnails(&thumbnails, count).await
    }

    /// Opens the catalog, filters by `term` and expects no titled rows.
    pub async fn assert_no_search_results(&self, term: &str) -> Result<()> {
        info!(term, "expect no search results");
        self.open().await?;
        self.table.search_input().fill(term).await?;

        let titles = &self.table.titles();
        let settled = poll_value(
            move || titles.all_text_contents(),
            |texts: &Vec<String>| checks::non_blank(texts).is_empty(),
            WaitConfig::with_timeout(self.config.expect_timeout()),
        )
        .await;

        match settled {
            Polled::Accepted(_) => Ok(()),
            Polled::Expired { last: Some(last), .. } => checks::check_no_titles(term, &last),
            Polled::Failed(err) | Polled::Expired { error: Some(err), .. } => Err(err.into()),
            Polled::Expired { .. } => Err(BooksError::assertion(format!(
                "titles never read after searching '{term}'"
            ))),
        }
    }

    /// Opens the catalog with `limit` rows per page and checks each column
    /// stays within it.
    pub async fn book_search_with_row_limit(&self, limit: usize) -> Result<()> {
        info!(limit, "book search with row limit");
        self.open().await?;
        self.set_rows_per_page(limit).await?;

        let titles = self.column_within_limit(BookColumn::Title, limit).await?;
        if !checks::contains_title(&titles, KNOWN_TITLE) {
            return Err(BooksError::assertion(format!(
                "'{KNOWN_TITLE}' missing from {titles:?}"
            )));
        }

        self.column_within_limit(BookColumn::Author, limit).await?;
        self.column_within_limit(BookColumn::Publisher, limit).await?;

        let thumbnails = self.table.thumbnails();
        let count = thumbnails.count().await?;
        checks::check_within_limit(BookColumn::Thumbnail.label(), count, limit)?;
        self.check_thumbnails(&thumbnails, count).await
    }

    /// Whether the next-page control is showing. Never fails on absence.
    pub async fn is_next_button_visible(&self) -> Result<bool> {
        Ok(self.table.next_control().is_visible().await?)
    }

    /// Whether the next-page control accepts clicks.
    pub async fn is_next_button_enabled(&self) -> Result<bool> {
        Ok(self.table.next_control().is_enabled().await?)
    }

    /// Clicks next when it is visible and enabled; reports whether it did.
    pub async fn click_next_page_if_available(&self) -> Result<bool> {
        click_if_available(&self.table.next_control()).await
    }

    /// Clicks previous when it is visible and enabled; reports whether it
    /// did.
    pub async fn click_previous_page_if_available(&self) -> Result<bool> {
        click_if_available(&self.table.previous_control()).await
    }

    /// Next then previous must move the title column away from its snapshot
    /// and back to it exactly. A click alone proves nothing; only changed
    /// text counts as a page turn.
    pub async fn assert_pagination_works(&self) -> Result<()> {
        info!("assert pagination works");
        let titles = self.table.title_cells();
        let before = titles.all_text_contents().await?;

        if !self.click_next_page_if_available().await? {
            return Err(BooksError::ControlUnavailable(
                "Next button was not available or enabled".to_string(),
            ));
        }

        expect(&titles)
            .not()
            .with_timeout(PAGINATION_TIMEOUT)
            .to_have_texts(before.as_slice())
            .await?;

        let after_next = titles.all_text_contents().await?;
        if after_next == before {
            return Err(BooksError::assertion(
                "titles did not change after clicking Next",
            ));
        }

        if !self.click_previous_page_if_available().await? {
            return Err(BooksError::ControlUnavailable(
                "Previous button was not available or enabled after going forward".to_string(),
            ));
        }

        expect(&titles)
            .with_timeout(PAGINATION_TIMEOUT)
            .to_have_texts(before.as_slice())
            .await?;

        let after_previous = titles.all_text_contents().await?;
        if after_previous != before {
            return Err(BooksError::assertion(format!(
                "titles after Previous {after_previous:?} differ from the original {before:?}"
            )));
        }
        Ok(())
    }

    /// Clicks the first title link and checks the detail page carries the
    /// book id the link pointed at. Returns that id.
    pub async fn click_first_book_and_verify_navigation_by_url(&self) -> Result<String> {
        info!("click first book");
        let link = self.table.first_title_link();

        expect(&link)
            .with_timeout(self.config.expect_timeout())
            .to_be_visible()
            .await?;

        let href = link.get_attribute("href").await?.ok_or(BooksError::MissingHref)?;
        let current = self.page.url().await?;
        let book_id = book_id_from_href(&href, &current)?;
        debug!(%href, %book_id, "following title link");

        // The URL wait must be polling before the click can navigate.
        let detail = detail_url_pattern()?;
        tokio::try_join!(
            self.page
                .wait_for_url(&detail, WaitConfig::with_timeout(self.config.expect_timeout())),
            link.click(),
        )?;

        match expect_page(&self.page)
            .with_timeout(self.config.expect_timeout())
            .to_have_url(&book_url_pattern(&book_id)?)
            .await
        {
            Ok(()) => Ok(book_id),
            Err(BrowserError::ExpectationFailed { .. }) => Err(BooksError::NavigationMismatch {
                url: self.page.url().await?,
                book_id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn column_within_limit(&self, column: BookColumn, limit: usize) -> Result<Vec<String>> {
        let texts = self.table.column(column).all_text_contents().await?;
        checks::check_within_limit(column.label(), texts.len(), limit)?;
        Ok(texts)
    }

    async fn check_thumbnails(&self, thumbnails: &Locator, count: usize) -> Result<()> {
        for i in 0..count {
            let thumbnail = thumbnails.nth(i);
            expect(&thumbnail)
                .with_timeout(self.config.expect_timeout())
                .to_be_visible()
                .await?;
            let src = thumbnail.get_attribute("src").await?;
            checks::check_thumbnail_src(i, src.as_deref())?;
        }
        Ok(())
    }
}

async fn click_if_available(control: &Locator) -> Result<bool> {
    if control.is_visible().await? && control.is_enabled().await? {
        control.click().await?;
        return Ok(true);
    }
    Ok(false)
}
