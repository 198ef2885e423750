// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Page arithmetic over the API's opaque `next`/`previous` cursors

use serde::{Deserialize, Serialize};

/// Page size the API uses for every list endpoint
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page number of the first `page=<digits>` in a cursor
#[must_use]
pub fn extract_page(url: Option<&str>) -> Option<u32> {
    let url = url?;
    url.match_indices("page=").find_map(|(start, marker)| {
        let digits: String = url[start + marker.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    })
}

/// Page the cursors surround: one before `next`, else one after `previous`, else 1
#[must_use]
pub fn current_page(next: Option<&str>, previous: Option<&str>) -> u32 {
    if next.is_some() {
        return extract_page(next).map_or(1, |page| page.saturating_sub(1).max(1));
    }
    if previous.is_some() {
        return extract_page(previous).map_or(1, |page| page.saturating_add(1));
    }
    1
}

/// Number of pages needed for `count` results
#[must_use]
pub fn total_pages(count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(u64::from(page_size))
}

/// Pagination summary of one list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Page being shown
    pub current_page: u32,
    /// Page count
    pub total_pages: u64,
    /// A later page exists
    pub has_next: bool,
    /// An earlier page exists
    pub has_previous: bool,
    /// Results across all pages
    pub total_count: u64,
}

impl PaginationInfo {
    /// Summarize a response
    #[must_use]
    pub fn new(count: u64, next: Option<&str>, previous: Option<&str>, page_size: u32) -> Self {
        Self {
            current_page: current_page(next, previous),
            total_pages: total_pages(count, page_size),
            has_next: next.is_some(),
            has_previous: previous.is_some(),
            total_count: count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_page() {
        assert_eq!(extract_page(Some("https://swapi.py4e.com/api/people/?page=3")), Some(3));
        assert_eq!(extract_page(Some("/api/people/?search=sky&page=12")), Some(12));
        assert_eq!(extract_page(Some("/api/people/?search=sky")), None);
        assert_eq!(extract_page(Some("/api/people/?page=")), None);
        assert_eq!(extract_page(None), None);
    }

    #[test]
    fn test_extract_page_skips_empty_match() {
        assert_eq!(extract_page(Some("/api/people/?xpage=&page=3")), Some(3));
        assert_eq!(extract_page(Some("/api/people/?page=abc&page=4")), Some(4));
    }

    #[test]
    fn test_current_page_from_next() {
        assert_eq!(current_page(Some(".../?page=3"), None), 2);
        assert_eq!(current_page(Some(".../?page=2"), Some(".../")), 1);
    }

    #[test]
    fn test_current_page_from_previous() {
        assert_eq!(current_page(None, Some(".../?page=2")), 3);
    }

    #[test]
    fn test_current_page_fallbacks() {
        assert_eq!(current_page(None, None), 1);
        assert_eq!(current_page(Some(".../?search=x"), None), 1);
        assert_eq!(current_page(None, Some(".../?search=x")), 1);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(82, 10), 9);
        assert_eq!(total_pages(80, 10), 8);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_pagination_info() {
        let info = PaginationInfo::new(82, Some("?page=4"), Some("?page=2"), DEFAULT_PAGE_SIZE);
        assert_eq!(info.current_page, 3);
        assert_eq!(info.total_pages, 9);
        assert!(info.has_next && info.has_previous);
    }
}
