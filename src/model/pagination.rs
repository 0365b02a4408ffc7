//! Pagination state and page-control layout

use serde::{Deserialize, Serialize};

/// Page size choices offered by the pagination bar
pub const PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];

/// Pagination bar style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationTheme {
    /// Previous / Next only
    Simple,
    /// Numbered pages with ellipsis collapsing
    #[default]
    Numbered,
}

/// One entry of the numbered page control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// 0-based page index
    Page(usize),
    Ellipsis,
}

/// Notification emitted to the table owner on navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    PageChanged { page_index: usize, page_size: usize },
    PageSizeChanged { page_size: usize, page_index: usize },
}

/// `max(1, ceil(count / page_size))`
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

/// Layout of the numbered control: first page, a window of
/// `current-1 ..= current+1`, last page, ellipsis where the window does
/// not abut either end.
pub fn page_items(current: usize, total: usize) -> Vec<PageItem> {
    let total = total.max(1);
    let current = current.min(total - 1);
    let mut items = vec![PageItem::Page(0)];

    if total > 2 {
        let start = current.saturating_sub(1).max(1);
        let end = (current + 1).min(total - 2);

        if start > 1 {
            items.push(PageItem::Ellipsis);
        }
        for page in start..=end {
            items.push(PageItem::Page(page));
        }
        if end < total - 2 {
            items.push(PageItem::Ellipsis);
        }
    }

    if total > 1 {
        items.push(PageItem::Page(total - 1));
    }
    items
}

/// Current page and page size (page index is 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 10,
        }
    }
}

impl PaginationState {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self, total: usize) -> bool {
        self.page_index + 1 < total
    }

    /// Keep the index within `[0, total-1]`
    pub fn clamp(&mut self, total: usize) {
        self.page_index = self.page_index.min(total.max(1) - 1);
    }

    pub fn next(&mut self, total: usize) -> Option<PageEvent> {
        if !self.can_next(total) {
            return None;
        }
        self.page_index += 1;
        Some(self.changed())
    }

    pub fn previous(&mut self) -> Option<PageEvent> {
        if !self.can_previous() {
            return None;
        }
        self.page_index -= 1;
        Some(self.changed())
    }

    /// Jump to a page; out-of-range targets are clamped
    pub fn go_to(&mut self, page_index: usize, total: usize) -> Option<PageEvent> {
        let target = page_index.min(total.max(1) - 1);
        if target == self.page_index {
            return None;
        }
        self.page_index = target;
        Some(self.changed())
    }

    /// Change the page size, keeping the index when it is still valid.
    ///
    /// `row_count` is the number of rows the new size applies to; pass
    /// `None` when the total is only known to the server.
    pub fn set_page_size(&mut self, page_size: usize, row_count: Option<usize>) -> Option<PageEvent> {
        let page_size = page_size.max(1);
        if page_size == self.page_size {
            return None;
        }
        self.page_size = page_size;
        if let Some(count) = row_count {
            self.clamp(total_pages(count, page_size));
        }
        Some(PageEvent::PageSizeChanged {
            page_size: self.page_size,
            page_index: self.page_index,
        })
    }

    /// Row range `[start, end)` of the current page within `len` rows
    pub fn slice_bounds(&self, len: usize) -> (usize, usize) {
        let start = (self.page_index * self.page_size).min(len);
        let end = (start + self.page_size).min(len);
        (start, end)
    }

    fn changed(&self) -> PageEvent {
        PageEvent::PageChanged {
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}

/// Next larger page size choice, wrapping around
pub fn next_page_size(current: usize) -> usize {
    PAGE_SIZES
        .iter()
        .copied()
        .find(|s| *s > current)
        .unwrap_or(PAGE_SIZES[0])
}
