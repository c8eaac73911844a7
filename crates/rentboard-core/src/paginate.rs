//! Filter/paginate engine feeding the listing grid, plus the page-button
//! window the pagination control renders.

use serde::Serialize;

use crate::filter::FilterState;
use crate::listing::Listing;

/// Cards per page on the public grid.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// One evaluated page of the filtered listing set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage<'a> {
    /// Listings that passed the filter, across all pages.
    pub total_count: usize,
    /// Zero only when nothing matched.
    pub total_pages: usize,
    /// Clamped page number, always >= 1.
    pub page: usize,
    pub page_size: usize,
    pub items: Vec<&'a Listing>,
}

impl ListingPage<'_> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn window(&self) -> PageWindow {
        page_window(self.page, self.total_pages)
    }
}

pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Pulls any requested page (zero and negatives included) into `[1, max(1, total_pages)]`.
pub fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let upper = i64::try_from(total_pages.max(1)).unwrap_or(i64::MAX);
    requested.clamp(1, upper) as usize
}

/// Filters in source order, then slices out the requested page.
pub fn paginate<'a>(
    listings: &'a [Listing],
    filters: &FilterState,
    page_size: usize,
    requested_page: i64,
) -> ListingPage<'a> {
    let page_size = page_size.max(1);
    let filtered = listings
        .iter()
        .filter(|listing| filters.matches(listing))
        .collect::<Vec<_>>();

    let total_count = filtered.len();
    let total_pages = total_pages(total_count, page_size);
    let page = clamp_page(requested_page, total_pages);
    let start = (page - 1) * page_size;
    let items = filtered
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect::<Vec<_>>();

    ListingPage {
        total_count,
        total_pages,
        page,
        page_size,
        items,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageLink {
    Page { number: usize, current: bool },
    Gap,
}

impl PageLink {
    pub fn is_gap(&self) -> bool {
        matches!(self, PageLink::Gap)
    }

    pub fn number(&self) -> Option<usize> {
        match self {
            PageLink::Page { number, .. } => Some(*number),
            PageLink::Gap => None,
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, PageLink::Page { current: true, .. })
    }
}

/// Buttons for the pagination control: first, last, and up to five
/// neighbours of the current page, with gaps where pages are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub links: Vec<PageLink>,
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

pub fn page_window(current: usize, total_pages: usize) -> PageWindow {
    let cur = current as i64;
    let total = total_pages as i64;
    let start = (cur - 3).min(total - 5).max(0);
    let end = (cur + 2).max(5).min(total);

    let page = |number: usize| PageLink::Page {
        number,
        current: number == current,
    };

    let middle = ((start + 1)..=end).map(|n| n as usize).collect::<Vec<_>>();
    let mut links = Vec::with_capacity(middle.len() + 4);

    if let (Some(&first), Some(&last)) = (middle.first(), middle.last()) {
        if first > 1 {
            links.push(page(1));
            if first > 2 {
                links.push(PageLink::Gap);
            }
        }
        links.extend(middle.iter().copied().map(page));
        if last < total_pages {
            if last + 1 < total_pages {
                links.push(PageLink::Gap);
            }
            links.push(page(total_pages));
        }
    }

    PageWindow {
        links,
        previous: (current > 1).then(|| current - 1),
        next: (current < total_pages).then(|| current + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PriceRange;

    fn priced_listings() -> Vec<Listing> {
        (0..50)
            .map(|i| Listing {
                id: format!("room-{i}"),
                name: format!("Room {i}"),
                price: 1500.0 + 100.0 * i as f64,
                location: "San Francisco, CA".into(),
                images: vec![],
                amenities: vec![],
                room_size: None,
                property_type: None,
            })
            .collect()
    }

    fn numbers(window: &PageWindow) -> Vec<Option<usize>> {
        window.links.iter().map(PageLink::number).collect()
    }

    #[test]
    fn first_page_of_unfiltered_set_keeps_source_order() {
        let listings = priced_listings();
        let page = paginate(&listings, &FilterState::default(), 12, 1);
        assert_eq!(page.total_count, 50);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.page, 1);
        let ids = page.items.iter().map(|l| l.id.as_str()).collect::<Vec<_>>();
        let expected = (0..12).map(|i| format!("room-{i}")).collect::<Vec<_>>();
        assert_eq!(ids, expected);
    }

    #[test]
    fn narrow_price_range_leaves_one_listing() {
        let listings = priced_listings();
        let filters = FilterState::default().with_price_range(PriceRange::new(0.0, 1500.0));
        let page = paginate(&listings, &filters, 12, 1);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].price, 1500.0);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let listings = priced_listings();
        let filters = FilterState::default();

        let last = paginate(&listings, &filters, 12, 99);
        assert_eq!(last.page, 5);
        assert_eq!(last.items.len(), 2);
        assert_eq!(last.items[0].id, "room-48");

        for requested in [0, -3, i64::MIN] {
            let first = paginate(&listings, &filters, 12, requested);
            assert_eq!(first.page, 1);
            assert_eq!(first.items.len(), 12);
        }
    }

    #[test]
    fn empty_result_has_zero_pages_and_page_one() {
        let listings = priced_listings();
        let filters = FilterState::default().with_location("Reykjavik");
        let page = paginate(&listings, &filters, 12, 7);
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.is_empty());
        assert!(!page.has_next());
    }

    #[test]
    fn filtered_output_is_a_subsequence_of_input() {
        let listings = priced_listings();
        let filters = FilterState::default().with_price_range(PriceRange::new(2000.0, 4000.0));
        let page = paginate(&listings, &filters, 100, 1);
        let positions = page
            .items
            .iter()
            .map(|item| listings.iter().position(|l| l.id == item.id).unwrap())
            .collect::<Vec<_>>();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(page.total_count, 21);
    }

    #[test]
    fn rerunning_is_idempotent() {
        let listings = priced_listings();
        let filters = FilterState::default().with_price_range(PriceRange::new(1800.0, 5000.0));
        let a = paginate(&listings, &filters, 9, 3);
        let b = paginate(&listings, &filters, 9, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let listings = priced_listings();
        let page = paginate(&listings, &FilterState::default(), 0, 2);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.total_pages, 50);
        assert_eq!(page.items[0].id, "room-1");
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 9), 0);
        assert_eq!(total_pages(9, 9), 1);
        assert_eq!(total_pages(10, 9), 2);
    }

    #[test]
    fn window_near_start_shows_last_page_after_gap() {
        let w = page_window(1, 10);
        assert_eq!(
            numbers(&w),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(10)]
        );
        assert!(w.links[0].is_current());
        assert_eq!(w.previous, None);
        assert_eq!(w.next, Some(2));
    }

    #[test]
    fn window_in_the_middle_has_gaps_on_both_sides() {
        let w = page_window(5, 10);
        assert_eq!(
            numbers(&w),
            vec![Some(1), None, Some(3), Some(4), Some(5), Some(6), Some(7), None, Some(10)]
        );
    }

    #[test]
    fn window_at_end_and_small_totals() {
        let w = page_window(10, 10);
        assert_eq!(
            numbers(&w),
            vec![Some(1), None, Some(6), Some(7), Some(8), Some(9), Some(10)]
        );
        assert_eq!(w.next, None);

        let w = page_window(2, 3);
        assert_eq!(numbers(&w), vec![Some(1), Some(2), Some(3)]);

        let w = page_window(1, 0);
        assert!(w.links.is_empty());
    }

    #[test]
    fn adjacent_first_page_needs_no_gap() {
        // window 2..=6 starts right after page 1
        let w = page_window(4, 6);
        assert_eq!(
            numbers(&w),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]
        );
    }
}
