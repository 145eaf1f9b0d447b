/**
 * Pagination
 *
 * `limit`/`page` query parameters and the page envelope returned by
 * listing endpoints.
 */
use serde::Serialize;

use crate::shared::error::SharedError;

/// Page size used when the client does not send one
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a client may request
pub const MAX_LIMIT: i64 = 100;

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: i64,
    page: i64,
}

impl PageRequest {
    /// Build a page request, applying defaults for missing values
    ///
    /// # Errors
    /// `ValidationError` when `limit` is outside `1..=MAX_LIMIT`, or
    /// `page` is below 1 or too large for its offset to fit in `i64`
    pub fn new(limit: Option<i64>, page: Option<i64>) -> Result<Self, SharedError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        let page = page.unwrap_or(1);

        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(SharedError::validation(
                "limit",
                format!("limit must be between 1 and {}", MAX_LIMIT),
            ));
        }
        if page < 1 {
            return Err(SharedError::validation("page", "page must be at least 1"));
        }
        if (page - 1).checked_mul(limit).is_none() {
            return Err(SharedError::validation("page", "page is too large"));
        }
        Ok(Self { limit, page })
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    /// Number of records before this page
    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: 1,
        }
    }
}

/// One page of results plus the total number of matching records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_documents: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_documents: i64) -> Self {
        Self {
            items,
            page: request.page(),
            limit: request.limit(),
            total_documents,
        }
    }

    /// Convert every item, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_documents: self.total_documents,
        }
    }
}
