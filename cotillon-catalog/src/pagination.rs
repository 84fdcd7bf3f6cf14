//! Pagination Reconciler
//!
//! Tracks the requested page against what the last resolved result can
//! actually show. Totals come from the catalog service on success, or from
//! the local fallback list after a failure; either way the displayed page is
//! clamped to `[1, total_pages]`.

use serde::{Deserialize, Serialize};
use shared::page::total_pages;
use tracing::debug;

/// Load phase of the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPhase {
    Idle,
    Loading,
    /// Last remote fetch failed; `fallback_active` when the local dataset is shown
    Error { fallback_active: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationReconciler {
    phase: LoadPhase,
    requested_page: u32,
    page_size: u32,
    total_items: u64,
    total_pages: u32,
}

impl PaginationReconciler {
    pub fn new(page_size: u32) -> Self {
        Self {
            phase: LoadPhase::Idle,
            requested_page: 1,
            page_size: page_size.max(1),
            total_items: 0,
            total_pages: 1,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn is_fallback_active(&self) -> bool {
        matches!(self.phase, LoadPhase::Error { fallback_active: true })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn requested_page(&self) -> u32 {
        self.requested_page
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Resolved page count, never below 1
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Page to render, always within `[1, total_pages]`
    pub fn displayed_page(&self) -> u32 {
        self.requested_page.clamp(1, self.total_pages)
    }

    /// A filter changed and a fetch is about to start
    ///
    /// Anything but a page navigation restarts from page 1.
    pub fn begin(&mut self, requested_page: u32, page_size: u32, is_navigation: bool) {
        self.page_size = page_size.max(1);
        self.requested_page = if is_navigation {
            requested_page.max(1)
        } else {
            1
        };
        self.phase = LoadPhase::Loading;
        debug!(page = self.requested_page, page_size = self.page_size, "Listing loading");
    }

    /// Remote fetch resolved
    ///
    /// `reported_pages` wins when the service sends a positive value;
    /// otherwise pages are derived from `total` and the page size.
    pub fn on_remote_success(&mut self, total: u64, reported_pages: Option<u32>) -> u32 {
        self.total_items = total;
        self.total_pages = reported_pages
            .filter(|p| *p > 0)
            .unwrap_or_else(|| total_pages(total, self.page_size));
        self.phase = LoadPhase::Idle;
        self.settle()
    }

    /// Remote fetch failed; pagination is recomputed over the local list
    pub fn on_remote_failure(&mut self, local_total: usize) -> u32 {
        self.total_items = local_total as u64;
        self.total_pages = total_pages(self.total_items, self.page_size);
        self.phase = LoadPhase::Error {
            fallback_active: true,
        };
        self.settle()
    }

    /// Navigate within the resolved bounds, returning the page landed on
    pub fn go_to(&mut self, page: u32) -> u32 {
        self.requested_page = page.clamp(1, self.total_pages);
        self.requested_page
    }

    pub fn next(&mut self) -> u32 {
        self.go_to(self.displayed_page().saturating_add(1))
    }

    pub fn previous(&mut self) -> u32 {
        self.go_to(self.displayed_page().saturating_sub(1))
    }

    /// 1-based inclusive range of items shown, `None` when nothing matched
    pub fn visible_range(&self, items_on_page: usize) -> Option<(u64, u64)> {
        if self.total_items == 0 || items_on_page == 0 {
            return None;
        }
        let start = u64::from(self.displayed_page() - 1) * u64::from(self.page_size) + 1;
        Some((start, start + items_on_page as u64 - 1))
    }

    /// Pull the requested page back inside the new bounds
    fn settle(&mut self) -> u32 {
        let displayed = self.displayed_page();
        if displayed != self.requested_page {
            debug!(
                requested = self.requested_page,
                displayed,
                total_pages = self.total_pages,
                "Requested page out of range, clamped"
            );
            self.requested_page = displayed;
        }
        displayed
    }
}

/// Slice of `items` shown on `page` (1-based) at `page_size`
pub fn page_slice<T>(items: &[T], page: u32, page_size: u32) -> &[T] {
    let size = page_size.max(1) as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// One entry in the pager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

const MAX_BUTTONS: u32 = 11;
const SIDE: u32 = 2;

/// Pager entries: every page when they fit, else first, `current±2`, last
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageItem> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);
    if total <= MAX_BUTTONS {
        return (1..=total).map(PageItem::Page).collect();
    }

    let start = current.saturating_sub(SIDE).max(2);
    let end = current.saturating_add(SIDE).min(total - 1);

    let mut items = vec![PageItem::Page(1)];
    if start > 2 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total - 1 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(total));
    items
}
