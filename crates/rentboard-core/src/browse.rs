//! Page selection owned by one listing grid.

use crate::filter::FilterState;
use crate::listing::Listing;
use crate::paginate::{paginate, ListingPage, DEFAULT_PAGE_SIZE};

/// Current filters plus the selected page for a single grid.
///
/// A filter snapshot that differs from the stored one sends the grid back to
/// page 1; page requests never touch the filters.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseState {
    page_size: usize,
    filters: FilterState,
    page: usize,
}

impl BrowseState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            filters: FilterState::default(),
            page: 1,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn apply_filters(&mut self, filters: FilterState) {
        if filters != self.filters {
            self.filters = filters;
            self.page = 1;
        }
    }

    /// Stores the request as-is; `view` clamps it against the current result set.
    pub fn select_page(&mut self, requested: i64) {
        self.page = requested.max(1).try_into().unwrap_or(usize::MAX);
    }

    pub fn view<'a>(&mut self, listings: &'a [Listing]) -> ListingPage<'a> {
        let requested = i64::try_from(self.page).unwrap_or(i64::MAX);
        let page = paginate(listings, &self.filters, self.page_size, requested);
        self.page = page.page;
        page
    }
}

impl Default for BrowseState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
