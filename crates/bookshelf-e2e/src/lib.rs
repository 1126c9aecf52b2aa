//! # bookshelf-e2e
//!
//! End-to-end tests for the book-catalog page, written against a page
//! object.
//!
//! - [`books::locators`] maps columns and controls to lazy locators
//! - [`books::BooksPage`] exposes search, row limits, pagination and
//!   detail navigation, each with its own success checks
//! - [`fixture`] gives every scenario a fresh isolated browser, with a
//!   per-test timeout, retries and failure screenshots
//! - [`config`] layers defaults, `bookshelf.toml` and the environment
//!   (`BASE_URL`, `BOOKSHELF_*`)
//!
//! ```ignore
//! use bookshelf_e2e::{run_books_test, E2eConfig};
//!
//! #[tokio::test]
//! #[ignore]
//! async fn search_feature() -> bookshelf_e2e::Result<()> {
//!     run_books_test("search feature", E2eConfig::load()?, |books| async move {
//!         books.search_books("JavaScript").await?;
//!         books.assert_no_search_results("#$%").await
//!     })
//!     .await
//! }
//! ```
//!
//! Scenarios need Chrome and a reachable catalog, so they are `#[ignore]`d;
//! run them with `BASE_URL=... cargo test -- --ignored`.

pub mod books;
pub mod config;
pub mod error;
pub mod fixture;
pub mod logger;

pub use books::{BookColumn, BookTable, BooksPage, KNOWN_TITLE};
pub use config::E2eConfig;
pub use error::{BooksError, ConfigError, Result};
pub use fixture::{run_books_test, BooksFixture};
