//! Page arithmetic for post listings.
//!
//! Handlers read the raw `page` query parameter, ask the [`Paginator`] for a
//! [`PageWindow`] given the total row count, then fetch exactly that window
//! from storage and wrap it in a [`Page`] for the templates.

use serde::{Deserialize, Serialize};

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: usize = 10;

/// The `?page=` query of every listing route. Kept as a string so that
/// non-numeric input falls back to the first page instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: usize,
}

/// Where a page starts and how many rows it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// Resolve `raw` against `count` rows.
    ///
    /// Missing or non-numeric input selects page 1. Numbers below 1 or past the
    /// end select the last page. An empty listing still has one empty page.
    pub fn window(&self, count: usize, raw: Option<&str>) -> PageWindow {
        let num_pages = count.div_ceil(self.per_page).max(1);
        let number = match raw.map(str::trim).map(str::parse::<i64>) {
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n < 1 || n as u64 > num_pages as u64 => num_pages,
            Some(Ok(n)) => n as usize,
        };
        let offset = (number - 1) * self.per_page;
        PageWindow {
            number,
            num_pages,
            count,
            offset,
            limit: self.per_page.min(count.saturating_sub(offset)),
        }
    }

    /// Slice an in-memory sequence.
    pub fn paginate<T: Clone>(&self, items: &[T], raw: Option<&str>) -> Page<T> {
        let window = self.window(items.len(), raw);
        let slice = &items[window.offset..window.offset + window.limit];
        Page::new(slice.to_vec(), window)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(POSTS_PER_PAGE)
    }
}

/// One page of results, serialized into templates as `page_obj`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub has_other_pages: bool,
    pub next_page_number: Option<usize>,
    pub previous_page_number: Option<usize>,
    pub page_range: Vec<usize>,
    /// 1-based position of the first and last item shown, both 0 when empty.
    pub start_index: usize,
    pub end_index: usize,
}

impl<T> Page<T> {
    pub fn new(object_list: Vec<T>, window: PageWindow) -> Self {
        let has_next = window.number < window.num_pages;
        let has_previous = window.number > 1;
        Self {
            object_list,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next,
            has_previous,
            has_other_pages: has_next || has_previous,
            next_page_number: has_next.then_some(window.number + 1),
            previous_page_number: has_previous.then_some(window.number - 1),
            page_range: (1..=window.num_pages).collect(),
            start_index: if window.limit == 0 { 0 } else { window.offset + 1 },
            end_index: window.offset + window.limit,
        }
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}
