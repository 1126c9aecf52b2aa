//! Book-catalog page object and the pieces it is built from.

pub mod checks;
pub mod locators;
pub mod navigation;
pub mod page;

pub use locators::{BookColumn, BookTable};
pub use page::{BooksPage, KNOWN_TITLE, PAGINATION_TIMEOUT};
