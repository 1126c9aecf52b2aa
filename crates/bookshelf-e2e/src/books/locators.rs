//! Where things live on the catalog page.
//!
//! The catalog renders a react-table: body rows are `.rt-tr-group` elements
//! inside `.rt-tbody`, and cells come in a fixed order (thumbnail, title,
//! author, publisher). Everything here is a pure mapping from a semantic name
//! to a lazy [`Locator`]; nothing touches the DOM until an operation runs.

use bookshelf_browser::{Locator, Page, Role};

const BODY_ROWS: &str = ".rt-tbody .rt-tr-group";

/// Placeholder of the filter text field.
pub const SEARCH_PLACEHOLDER: &str = "Type to search";
/// Accessible name of the rows-per-page selector.
pub const ROWS_PER_PAGE_NAME: &str = "rows per page";
/// Accessible name of the next-page button.
pub const NEXT_BUTTON_NAME: &str = "Next";
/// The previous-page button has no stable name; it lives in this region.
pub const PREVIOUS_REGION: &str = "div.-previous";

/// Columns of the catalog table, in rendered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookColumn {
    Thumbnail,
    Title,
    Author,
    Publisher,
}

impl BookColumn {
    pub const ALL: [BookColumn; 4] = [
        BookColumn::Thumbnail,
        BookColumn::Title,
        BookColumn::Author,
        BookColumn::Publisher,
    ];

    /// 1-based position, as used by `:nth-child`.
    pub fn position(self) -> usize {
        match self {
            BookColumn::Thumbnail => 1,
            BookColumn::Title => 2,
            BookColumn::Author => 3,
            BookColumn::Publisher => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BookColumn::Thumbnail => "Thumbnail",
            BookColumn::Title => "Title",
            BookColumn::Author => "Author",
            BookColumn::Publisher => "Publisher",
        }
    }

    /// CSS for this column across all body rows. Thumbnails resolve to the
    /// `<img>` itself, since filler rows have an empty first cell.
    pub fn selector(self) -> String {
        let cell = format!("{BODY_ROWS} .rt-td:nth-child({})", self.position());
        match self {
            BookColumn::Thumbnail => format!("{cell} img"),
            _ => cell,
        }
    }
}

/// Title cells anywhere in the table, the column pagination watches.
pub const TITLE_CELLS: &str = ".rt-td:nth-child(2)";
/// Links inside title cells.
pub const TITLE_LINK: &str = "a";

/// Locator factory bound to one page.
#[derive(Debug, Clone)]
pub struct BookTable {
    page: Page,
}

impl BookTable {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn column(&self, column: BookColumn) -> Locator {
        self.page.locator(&column.selector())
    }

    pub fn thumbnails(&self) -> Locator {
        self.column(BookColumn::Thumbnail)
    }

    pub fn titles(&self) -> Locator {
        self.column(BookColumn::Title)
    }

    pub fn authors(&self) -> Locator {
        self.column(BookColumn::Author)
    }

    pub fn publishers(&self) -> Locator {
        self.column(BookColumn::Publisher)
    }

    pub fn title_cells(&self) -> Locator {
        self.page.locator(TITLE_CELLS)
    }

    pub fn first_title_link(&self) -> Locator {
        self.title_cells().locator(TITLE_LINK).first()
    }

    pub fn next_control(&self) -> Locator {
        self.page.get_by_role(Role::Button, NEXT_BUTTON_NAME)
    }

    pub fn previous_control(&self) -> Locator {
        self.page.locator(PREVIOUS_REGION).locator("button")
    }

    pub fn search_input(&self) -> Locator {
        self.page.get_by_placeholder(SEARCH_PLACEHOLDER)
    }

    pub fn rows_per_page_control(&self) -> Locator {
        self.page.get_by_role(Role::Combobox, ROWS_PER_PAGE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_map_to_fixed_cell_positions() {
        assert_eq!(
            BookColumn::Title.selector(),
            ".rt-tbody .rt-tr-group .rt-td:nth-child(2)"
        );
        assert_eq!(
            BookColumn::Publisher.selector(),
            ".rt-tbody .rt-tr-group .rt-td:nth-child(4)"
        );
    }

    #[test]
    fn thumbnails_target_the_image() {
        assert_eq!(
            BookColumn::Thumbnail.selector(),
            ".rt-tbody .rt-tr-group .rt-td:nth-child(1) img"
        );
    }

    #[test]
    fn positions_follow_rendered_order() {
        let positions: Vec<_> = BookColumn::ALL.iter().map(|c| c.position()).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }
}
