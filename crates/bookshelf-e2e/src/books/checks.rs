//! Content rules for rendered catalog rows.
//!
//! These take text already read from the page and decide whether it is
//! acceptable, so they run without a browser. A row whose title is blank is
//! a filler row: it is counted in raw row counts but skipped by content
//! checks.

use crate::error::{BooksError, Result};

/// Titles (or any cells) with non-whitespace text, trimmed.
pub fn non_blank(texts: &[String]) -> Vec<&str> {
    texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Every non-blank title must contain `term`, ignoring case, and at least
/// one must exist. Returns the number of non-blank titles.
pub fn check_titles_match(term: &str, titles: &[String]) -> Result<usize> {
    if titles.is_empty() {
        return Err(BooksError::assertion(format!(
            "no title cells rendered for search '{term}'"
        )));
    }

    let matching = non_blank(titles);
    if matching.is_empty() {
        return Err(BooksError::assertion(format!(
            "search '{term}' rendered only blank titles"
        )));
    }

    let needle = term.to_lowercase();
    if let Some(stray) = matching
        .iter()
        .find(|t| !t.to_lowercase().contains(&needle))
    {
        return Err(BooksError::assertion(format!(
            "title '{stray}' does not contain '{term}'"
        )));
    }

    Ok(matching.len())
}

/// At least one cell of the column has text.
pub fn check_has_content(label: &str, texts: &[String]) -> Result<()> {
    if non_blank(texts).is_empty() {
        return Err(BooksError::assertion(format!("{label} column is empty")));
    }
    Ok(())
}

/// The column renders no more rows than the configured limit.
pub fn check_within_limit(label: &str, rendered: usize, limit: usize) -> Result<()> {
    if rendered > limit {
        return Err(BooksError::assertion(format!(
            "{label} column rendered {rendered} rows, limit is {limit}"
        )));
    }
    Ok(())
}

/// One thumbnail per real (non-filler) row.
pub fn check_thumbnails_match_titles(thumbnails: usize, non_blank_titles: usize) -> Result<()> {
    if thumbnails != non_blank_titles {
        return Err(BooksError::assertion(format!(
            "{thumbnails} thumbnails for {non_blank_titles} titled rows"
        )));
    }
    Ok(())
}

/// A thumbnail must point somewhere.
pub fn check_thumbnail_src(index: usize, src: Option<&str>) -> Result<()> {
    match src {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BooksError::assertion(format!(
            "thumbnail {index} has no image source"
        ))),
    }
}

/// A search with no matches leaves only blank titles behind.
pub fn check_no_titles(term: &str, titles: &[String]) -> Result<()> {
    let found = non_blank(titles);
    if !found.is_empty() {
        return Err(BooksError::assertion(format!(
            "search '{term}' should match nothing, found {found:?}"
        )));
    }
    Ok(())
}

/// Exact (trimmed) title lookup.
pub fn contains_title(titles: &[String], wanted: &str) -> bool {
    titles.iter().any(|t| t.trim() == wanted)
}
