//! Pagination query parameters.

use serde::Deserialize;

/// Page-based pagination, as sent by the web client (`?page=1&limit=20`).
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: usize,

    /// Items per page.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationQuery {
    /// Offset for store queries.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.limit
    }
}
