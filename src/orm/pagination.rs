//! Offset pagination results

use serde::Serialize;

/// Information about one page of a list query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Are there rows after this page?
    pub has_next_page: bool,
    /// Are there rows before this page?
    pub has_previous_page: bool,
    /// Total rows matching the filters, ignoring pagination
    pub total_count: i64,
}

/// A page of records plus its [`PageInfo`]
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page_info: PageInfo::default(),
        }
    }

    /// Build a page from the rows fetched at `offset` and the unpaginated total
    pub fn from_items(items: Vec<T>, offset: u64, total_count: i64) -> Self {
        let end = i64::try_from(offset)
            .unwrap_or(i64::MAX)
            .saturating_add(i64::try_from(items.len()).unwrap_or(i64::MAX));
        Self {
            page_info: PageInfo {
                has_next_page: end < total_count,
                has_previous_page: offset > 0,
                total_count,
            },
            items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }
}
