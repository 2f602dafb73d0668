// Paging value types shared by queries and repositories.

use serde::{Deserialize, Serialize};

/// A 1-based page request. Lower bounds are enforced by request validators,
/// not here.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    pub number: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(number: i64, size: i64) -> Self {
        Self { number, size }
    }

    /// Rows to skip before this page starts.
    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }
}

/// One page of items plus the metadata needed to reconstruct the full result
/// set across pages. `total_count` reflects the filtered query, not the
/// unfiltered table.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_number: i64,
    pub page_size: i64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: i64, page: PageRequest) -> Self {
        Self {
            items,
            total_count,
            page_number: page.number,
            page_size: page.size,
        }
    }

    /// Maps the materialized items to a projection type, keeping the page
    /// metadata intact.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_from_one_based_pages() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn map_keeps_page_metadata() {
        let page = PagedResult::new(vec![1, 2, 3], 7, PageRequest::new(2, 3));
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.items, vec!["1", "2", "3"]);
        assert_eq!(mapped.total_count, 7);
        assert_eq!(mapped.page_number, 2);
        assert_eq!(mapped.page_size, 3);
    }
}
