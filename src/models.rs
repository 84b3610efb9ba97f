// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared API data models.
//!
//! Pagination follows the frontend's existing contract: 0-based `page`,
//! `size` capped server-side, responses carrying totals alongside content.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Default page size when the client does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on requested page size.
pub const MAX_PAGE_SIZE: usize = 200;

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PageParams {
    /// 0-based page index.
    #[serde(default)]
    pub page: usize,
    /// Page size (default 20, capped at 200).
    #[serde(default = "default_size")]
    pub size: usize,
}

fn default_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageParams {
    /// Effective page size after clamping.
    pub fn clamped_size(&self) -> usize {
        self.size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// 0-based page index.
    pub page: usize,
    /// Requested page size.
    pub size: usize,
    /// Total matching items across all pages.
    pub total_elements: usize,
    /// Total number of pages.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice a fully sorted result set into one page.
    pub fn from_sorted(items: Vec<T>, params: &PageParams) -> Self {
        let size = params.clamped_size();
        let total_elements = items.len();
        let total_pages = total_elements.div_ceil(size);
        let content = items
            .into_iter()
            .skip(params.page * size)
            .take(size)
            .collect();

        Self {
            content,
            page: params.page,
            size,
            total_elements,
            total_pages,
        }
    }

    /// Map page content while preserving paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
