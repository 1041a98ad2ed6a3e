use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 15;
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [15, 25, 50, 100];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
    pub total: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

/// What the pagination bar renders between Prev and Next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageItem {
    /// Zero-based page index.
    Page(usize),
    Ellipsis,
}

/// A navigation request for the host. The controller never fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: usize,
    pub page_size: usize,
}

impl PaginationState {
    pub fn new(page_index: usize, page_size: usize, total: usize) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
            total,
        }
    }

    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }

    pub fn can_previous_page(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        let count = self.page_count();
        count > 0 && self.page_index < count - 1
    }

    pub fn first_row_index(&self) -> usize {
        self.page_index * self.page_size
    }

    /// Row range of the current page within `len` locally held rows.
    pub fn slice_range(&self, len: usize) -> Range<usize> {
        let start = self.first_row_index().min(len);
        let end = (start + self.page_size).min(len);
        start..end
    }

    /// One-based "showing X to Y of Z" bounds, or `None` when empty.
    pub fn row_range_label(&self) -> Option<(usize, usize, usize)> {
        if self.first_row_index() >= self.total {
            return None;
        }
        let start = self.first_row_index() + 1;
        let end = (self.first_row_index() + self.page_size).min(self.total);
        Some((start, end, self.total))
    }

    /// Resolves an `onPaginationChange` call. A page size change always goes
    /// back to the first page.
    pub fn request(&self, page_index: usize, page_size: usize) -> PageRequest {
        let page_size = page_size.max(1);
        if page_size != self.page_size {
            return PageRequest {
                page_index: 0,
                page_size,
            };
        }
        PageRequest {
            page_index,
            page_size,
        }
    }

    pub fn next_page(&self) -> Option<PageRequest> {
        self.can_next_page()
            .then(|| self.request(self.page_index + 1, self.page_size))
    }

    pub fn previous_page(&self) -> Option<PageRequest> {
        self.can_previous_page()
            .then(|| self.request(self.page_index - 1, self.page_size))
    }

    pub fn go_to(&self, page_index: usize) -> Option<PageRequest> {
        (page_index < self.page_count() && page_index != self.page_index)
            .then(|| self.request(page_index, self.page_size))
    }

    pub fn apply(&mut self, request: PageRequest) {
        self.page_index = request.page_index;
        self.page_size = request.page_size;
    }

    pub fn page_items(&self) -> Vec<PageItem> {
        page_items(self.page_count(), self.page_index)
    }
}

/// First and last page, the current page and its neighbours, with each
/// gap collapsed into one ellipsis.
pub fn page_items(page_count: usize, current: usize) -> Vec<PageItem> {
    if page_count == 0 {
        return Vec::new();
    }
    let last = page_count - 1;
    let current = current.min(last);

    let mut pages = vec![0, last, current];
    if current > 0 {
        pages.push(current - 1);
    }
    if current < last {
        pages.push(current + 1);
    }
    pages.sort_unstable();
    pages.dedup();

    let mut items = Vec::with_capacity(pages.len() * 2);
    let mut previous: Option<usize> = None;
    for page in pages {
        if let Some(prev) = previous {
            if page > prev + 1 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.push(PageItem::Page(page));
        previous = Some(page);
    }
    items
}
