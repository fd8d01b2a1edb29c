//! Page-number pagination for device listings.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Fixed number of devices per page.
pub const PAGE_SIZE: i64 = 15;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// 1-indexed page number (defaults to 1)
    #[serde(default)]
    pub page: Option<i64>,
}

impl SearchQuery {
    /// The search term, or None when it is missing or whitespace-only.
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn page(&self) -> Result<i64> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::BadRequest(format!(
                "Page must be 1 or greater (got {})",
                page
            )));
        }
        Ok(page)
    }
}

/// Row offset for a 1-indexed page.
pub fn offset_for(page: i64) -> i64 {
    (page - 1).saturating_mul(PAGE_SIZE)
}

/// Number of pages needed to show `total` items.
pub fn total_pages(total: i64) -> i64 {
    (total + PAGE_SIZE - 1) / PAGE_SIZE
}

/// One page of results. `page` echoes the request and is never clamped,
/// so a page past the end comes back with no items.
#[derive(Debug, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, page: i64, total_items: i64) -> Self {
        Self {
            items,
            page,
            total_pages: total_pages(total_items),
            total_items,
        }
    }
}
