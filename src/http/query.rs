//! Query-string pagination parameters.

use crate::config::DEFAULT_ROWS;
use crate::pagination::PaginationRequest;
use serde::Deserialize;

/// `?page=&rows=` as sent by the client; both optional.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub rows: Option<i64>,
}

/// Fills in what the client left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub rows: i64,
}

impl PageDefaults {
    pub fn new(rows: i64) -> Self {
        Self { rows }
    }

    /// Build the engine request.
    ///
    /// A missing or non-positive `page` becomes 1. `rows` is passed through
    /// as given so the paginator alone decides whether it is in range.
    pub fn request(&self, query: PageQuery) -> PaginationRequest {
        let page = query.page.filter(|p| *p >= 1).unwrap_or(1);
        let rows = query.rows.unwrap_or(self.rows);
        PaginationRequest::new(rows, page)
    }
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS)
    }
}
