//! Book identifiers in title links and detail-page URLs.
//!
//! A title links to `books?book=<id>`. The id read from the link before the
//! click must be the id in the URL after it.

use regex::Regex;
use url::Url;

use crate::error::{BooksError, Result};

/// Query parameter carrying the book id.
pub const BOOK_PARAM: &str = "book";

/// Resolves `href` against the page URL and pulls out the `book` parameter.
pub fn book_id_from_href(href: &str, page_url: &str) -> Result<String> {
    let base = Url::parse(page_url).map_err(|_| BooksError::MissingBookId {
        href: href.to_string(),
    })?;
    let target = base.join(href).map_err(|_| BooksError::MissingBookId {
        href: href.to_string(),
    })?;

    target
        .query_pairs()
        .find(|(key, _)| key == BOOK_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BooksError::MissingBookId {
            href: href.to_string(),
        })
}

/// Any book detail page: `books?book=<digits>` at the end of the URL.
pub fn detail_url_pattern() -> Result<Regex> {
    Ok(Regex::new(r"books\?book=\d+$")?)
}

/// The detail page of one specific book.
pub fn book_url_pattern(book_id: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(r"\?book={}$", regex::escape(book_id)))?)
}
