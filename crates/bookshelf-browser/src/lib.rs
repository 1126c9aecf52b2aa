//! # bookshelf-browser
//!
//! Browser primitives for page-object tests, built on chromiumoxide.
//!
//! - **TestBrowser**: launches an isolated headless Chrome and opens pages
//! - **Page**: navigation, script evaluation, URL waits, screenshots
//! - **Locator**: lazy element queries by CSS, role or placeholder,
//!   re-resolved against the live DOM on every use
//! - **expect**: auto-retrying assertions with a bounded timeout
//! - **WaitConfig**: polling configuration shared by every wait
//!
//! ```ignore
//! use bookshelf_browser::{expect, Role, TestBrowser, TestBrowserConfig};
//!
//! let browser = TestBrowser::launch(TestBrowserConfig::default()).await?;
//! let page = browser.new_page().await?;
//! page.navigate("http://localhost:3000/books").await?;
//!
//! page.get_by_placeholder("Type to search").fill("Git").await?;
//! expect(&page.locator(".rt-tbody .rt-td:nth-child(2)").first())
//!     .to_be_visible()
//!     .await?;
//! page.get_by_role(Role::Button, "Next").click().await?;
//!
//! browser.close().await?;
//! ```
//!
//! Browser-backed tests need Chrome and are `#[ignore]`d; run them with
//! `cargo test -- --ignored`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod browser;
pub mod error;
pub mod expect;
pub mod locator;
pub mod page;
pub mod query;
pub mod wait;

pub use browser::{TestBrowser, TestBrowserConfig};
pub use error::{BrowserError, Result};
pub use expect::{expect, expect_page, LocatorAssertions, PageAssertions};
pub use locator::Locator;
pub use page::Page;
pub use query::{Nth, Query, Role, Selector};
pub use wait::{WaitConfig, DEFAULT_EXPECT_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
