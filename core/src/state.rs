//! The list state and its synchronous transitions.
//!
//! # Design
//! `ToDoListState` is plain data plus mutators that each perform one atomic
//! transition and never touch the network. `TodoStore` owns one instance
//! and is the only writer; views read clones of it.

use crate::types::{FilterSpec, Page, SortSpec, Stats, TodoItem, PAGE_SIZE};

/// In-flight flag for the whole list. Outcomes of finished operations are
/// recorded in `error`, never in the status, so it always settles to `Idle`.
///
/// There is no `Failed` variant: a failed request is `Idle` with `error` set,
/// and the switch back happens in the same locked transition that records the
/// error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Zero-based.
    pub current_page: u32,
    pub page_size: usize,
    pub total_pages: u32,
    pub is_last: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 0,
            page_size: PAGE_SIZE,
            total_pages: 0,
            is_last: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToDoListState {
    /// Items of the current page, in display order.
    pub items: Vec<TodoItem>,
    pub total_count: u64,
    pub stats: Option<Stats>,
    pub status: RequestStatus,
    pub error: Option<String>,
    pub pagination: Pagination,
    pub sort_by: SortSpec,
    pub filter_by: Option<FilterSpec>,
}

impl ToDoListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.status == RequestStatus::Idle
    }

    /// Callers trigger the fetch separately.
    pub fn set_current_page(&mut self, page: u32) {
        self.pagination.current_page = page;
    }

    pub fn set_sort_field(&mut self, field: &str) {
        self.sort_by.toggle(field);
    }

    /// An all-empty filter is stored as no filter.
    pub fn set_filter(&mut self, filter: Option<FilterSpec>) {
        self.filter_by = filter.filter(|f| !f.is_empty());
    }

    /// Replace a matching item in place, or put a new one at the front of
    /// the page.
    ///
    /// A new item that pushes the page past `page_size` evicts the last
    /// entry and leaves `total_count` alone; otherwise the count grows and
    /// there is at least one page.
    pub fn upsert_item(&mut self, item: TodoItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            *existing = item;
            return;
        }

        self.items.insert(0, item);
        if self.items.len() > self.pagination.page_size {
            self.items.pop();
        } else {
            self.total_count += 1;
            self.pagination.total_pages = self.pagination.total_pages.max(1);
        }
    }

    /// Drop the item with `id`. `total_count` goes down by one even when the
    /// id is not on the current page; the next fetch corrects it.
    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
        self.total_count = self.total_count.saturating_sub(1);
    }

    pub fn set_stats(&mut self, raw: impl Into<Stats>) {
        self.stats = Some(raw.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Apply a successful list fetch. The current page is clamped into the
    /// reported range.
    pub(crate) fn apply_page(&mut self, page: Page<TodoItem>) {
        self.items = page.content;
        self.total_count = page.total_elements;

        let pagination = &mut self.pagination;
        pagination.total_pages = page.total_pages;
        if page.total_pages > 0 && pagination.current_page >= page.total_pages {
            pagination.current_page = page.total_pages - 1;
        }
        pagination.is_last = page.last
            || page.total_pages == 0
            || pagination.current_page + 1 >= page.total_pages;
    }
}
