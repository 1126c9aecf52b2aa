//! Error types for configuration and book-catalog scenarios.

use std::time::Duration;

use bookshelf_browser::BrowserError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BooksError>;

/// Problems with the test configuration. Always raised before the browser
/// is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BASE_URL is not set")]
    MissingBaseUrl,

    #[error("BASE_URL '{value}' is not an absolute URL: {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

/// Failure of a page-object operation or scenario.
#[derive(Debug, Error)]
pub enum BooksError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// Rendered content broke an expectation of the operation.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// A control the operation needed was absent or disabled.
    #[error("{0}")]
    ControlUnavailable(String),

    #[error("book link does not have an href attribute")]
    MissingHref,

    #[error("book id not found in href '{href}'")]
    MissingBookId { href: String },

    #[error("expected to land on book '{book_id}', but the page is at '{url}'")]
    NavigationMismatch { book_id: String, url: String },

    #[error("invalid URL pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("test '{name}' exceeded its {timeout:?} timeout")]
    TestTimeout { name: String, timeout: Duration },
}

impl BooksError {
    pub fn assertion(message: impl Into<String>) -> Self {
        BooksError::Assertion(message.into())
    }
}
