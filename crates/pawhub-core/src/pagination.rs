// ABOUTME: Offset pagination for public listings and admin tables
// ABOUTME: Clamps client-supplied page sizes and wraps results with totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 PawHub Marketplace

use serde::{Deserialize, Serialize};

use crate::constants::limits::DEFAULT_PAGE_SIZE;

/// Page request after clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl PageParams {
    /// Build from optional query values, clamping to `1..=max_per_page`
    #[must_use]
    pub fn new(page: Option<u32>, per_page: Option<u32>, max_per_page: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, max_per_page.max(1)),
        }
    }

    /// SQL `LIMIT`
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// SQL `OFFSET`
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results with totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// 1-based page number
    pub page: u32,
    /// Requested page size
    pub per_page: u32,
    /// Total matching items across all pages
    pub total: u64,
    /// Number of pages
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Wrap a page of items
    #[must_use]
    pub fn new(items: Vec<T>, params: PageParams, total: u64) -> Self {
        let per_page = u64::from(params.per_page);
        Self {
            items,
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }

    /// Convert the items, keeping the paging metadata
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_clamp() {
        let params = PageParams::new(Some(0), Some(500), 50);
        assert_eq!(params, PageParams { page: 1, per_page: 50 });
        assert_eq!(params.offset(), 0);

        let params = PageParams::new(Some(3), Some(10), 50);
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);

        assert_eq!(PageParams::new(None, None, 50), PageParams::default());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], PageParams::new(Some(1), Some(2), 50), 5);
        assert_eq!(page.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], PageParams::default(), 0);
        assert_eq!(empty.total_pages, 0);
    }
}
