//! Pagination cursor and filters for the NEO list.
//!
//! Owned by one `NeoListPage`; lives only as long as that view.

use crate::client::NeoQuery;
use crate::model::NeoRecord;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub current_page: u32,
    pub page_size: u32,
    /// Server-side filter; `None` lists both.
    pub danger_filter: Option<bool>,
    /// Client-side, case-insensitive substring match on the name.
    pub name_filter: Option<String>,
    /// Size of the last batch, drives `has_next`.
    pub last_batch_len: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 0,
            page_size: page_size.max(1),
            danger_filter: None,
            name_filter: None,
            last_batch_len: 0,
        }
    }

    pub fn query(&self) -> NeoQuery {
        NeoQuery {
            page: self.current_page,
            size: self.page_size,
            dangerous: self.danger_filter,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 0
    }

    /// A short batch means this was the last page; total count is unknown.
    pub fn has_next(&self) -> bool {
        self.last_batch_len >= self.page_size as usize
    }

    /// Returns false when already on the first page.
    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.current_page -= 1;
        true
    }

    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current_page += 1;
        true
    }

    /// Replaces all filters and rewinds to the first page.
    pub fn apply_filters(&mut self, danger: Option<bool>, name: Option<String>, page_size: u32) {
        self.danger_filter = danger;
        self.name_filter = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        self.page_size = page_size.max(1);
        self.current_page = 0;
    }

    pub fn clear_filters(&mut self) {
        self.apply_filters(None, None, DEFAULT_PAGE_SIZE);
    }

    pub fn record_batch(&mut self, len: usize) {
        self.last_batch_len = len;
    }

    pub fn matches_name(&self, record: &NeoRecord) -> bool {
        match &self.name_filter {
            Some(filter) => record.name.to_lowercase().contains(&filter.to_lowercase()),
            None => true,
        }
    }

    pub fn visible<'a>(&self, records: &'a [NeoRecord]) -> Vec<&'a NeoRecord> {
        records.iter().filter(|r| self.matches_name(r)).collect()
    }
}
