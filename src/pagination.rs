//! Pagination query engine.
//!
//! [`Paginator::paginate`] turns a filtered but unbounded query into one page
//! of rows plus metadata describing the whole result space:
//!
//! 1. count pass: `SELECT COUNT(*) FROM (<base>) AS wrapper` with the same arguments
//! 2. clamp the requested page into `[1, total_pages]`
//! 3. bounded pass: `<base> LIMIT <rows> OFFSET <offset>`
//! 4. fill in [`Pagination`] and re-check it
//!
//! The base query is treated as opaque text. Callers must not put `LIMIT` or
//! `OFFSET` in it. The engine performs no writes and never commits or rolls
//! back; that stays with whoever owns the executor.

use crate::config::{DEFAULT_MAX_ROWS, DEFAULT_QUERY_TIMEOUT_SECS};
use crate::db::{QueryParam, Record, Runnable};
use crate::error::{DbError, DbResult, QueryPass};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Caller input, with defaults already applied by the request layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationRequest {
    /// Page size
    pub rows: i64,
    /// 1-based requested page
    pub page: i64,
}

impl PaginationRequest {
    pub fn new(rows: i64, page: i64) -> Self {
        Self { rows, page }
    }
}

/// Pagination metadata for one page of a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Effective page size
    pub rows: i64,
    /// Effective page after clamping
    pub page: i64,
    /// Rows matching the filter, ignoring bounds
    pub total_count: i64,
    /// `[1..=total_pages]`, empty when nothing matched
    pub pages: Vec<i64>,
}

impl From<PaginationRequest> for Pagination {
    fn from(request: PaginationRequest) -> Self {
        Self {
            rows: request.rows,
            page: request.page,
            total_count: 0,
            pages: Vec::new(),
        }
    }
}

impl Pagination {
    pub fn total_pages(&self) -> i64 {
        self.pages.len() as i64
    }

    /// Check the invariants the engine guarantees after a successful call.
    pub fn validate(&self, max_rows: i64) -> DbResult<()> {
        if self.rows < 1 || self.rows > max_rows {
            return Err(DbError::rows_out_of_range(self.rows, max_rows));
        }
        let last = self.total_pages().max(1);
        if self.page < 1 || self.page > last {
            return Err(DbError::InvalidPage {
                page: self.page,
                last,
            });
        }
        Ok(())
    }
}

/// One page of rows with its metadata, as returned to HTTP clients.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Runs paginated queries with a fixed row cap and per-pass timeout.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    max_rows: i64,
    query_timeout: Duration,
}

impl Paginator {
    pub fn new(max_rows: i64, query_timeout: Duration) -> Self {
        Self {
            max_rows,
            query_timeout,
        }
    }

    pub fn max_rows(&self) -> i64 {
        self.max_rows
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Fill `dest` with the requested page of `base_sql` and `pagination` with
    /// its metadata.
    ///
    /// `pagination.rows` and `pagination.page` are read as the request and
    /// overwritten with the effective values. `dest` is replaced.
    pub async fn paginate<T: Record>(
        &self,
        runnable: &mut Runnable<'_>,
        dest: &mut Vec<T>,
        base_sql: &str,
        args: &[QueryParam],
        pagination: &mut Pagination,
    ) -> DbResult<()> {
        let rows = pagination.rows;
        if rows < 1 || rows > self.max_rows {
            return Err(DbError::rows_out_of_range(rows, self.max_rows));
        }

        let base_sql = trim_statement(base_sql);
        let count_sql = count_query(base_sql);
        let total_count = runnable
            .fetch_count(&count_sql, args, self.query_timeout)
            .await
            .map_err(|e| DbError::query(QueryPass::Count, e))?;

        let total_pages = total_pages(total_count, rows);
        let page = clamp_page(pagination.page, total_pages);
        let offset = (page - 1) * rows;
        debug!(
            total_count,
            total_pages,
            requested_page = pagination.page,
            page,
            rows,
            "Count pass complete"
        );

        let bounded_sql = bounded_query(base_sql, rows, offset);
        *dest = runnable
            .fetch_all(&bounded_sql, args, self.query_timeout)
            .await
            .map_err(|e| DbError::query(QueryPass::Bounded, e))?;

        pagination.rows = rows;
        pagination.page = page;
        pagination.total_count = total_count;
        pagination.pages = (1..=total_pages).collect();

        pagination.validate(self.max_rows)
    }

    /// Convenience wrapper around [`paginate`](Self::paginate) returning a [`Page`].
    pub async fn fetch_page<T: Record>(
        &self,
        runnable: &mut Runnable<'_>,
        base_sql: &str,
        args: &[QueryParam],
        request: PaginationRequest,
    ) -> DbResult<Page<T>> {
        let mut data = Vec::new();
        let mut pagination = Pagination::from(request);
        self.paginate(runnable, &mut data, base_sql, args, &mut pagination)
            .await?;
        Ok(Page { data, pagination })
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ROWS,
            Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
        )
    }
}

/// `ceil(total_count / rows)`; `rows` must be positive.
pub fn total_pages(total_count: i64, rows: i64) -> i64 {
    if total_count <= 0 {
        return 0;
    }
    (total_count + rows - 1) / rows
}

/// Pull `page` into `[1, max(1, total_pages)]`.
pub fn clamp_page(page: i64, total_pages: i64) -> i64 {
    let page = if page > total_pages { total_pages } else { page };
    page.max(1)
}

fn trim_statement(sql: &str) -> &str {
    sql.trim_end().trim_end_matches(';').trim_end()
}

fn count_query(base_sql: &str) -> String {
    format!("SELECT COUNT(*) FROM ({}) AS wrapper", base_sql)
}

fn bounded_query(base_sql: &str, rows: i64, offset: i64) -> String {
    format!("{} LIMIT {} OFFSET {}", base_sql, rows, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(7, 3), 3);
        for total in 0..50 {
            for rows in 1..12 {
                let expected = (total as f64 / rows as f64).ceil() as i64;
                assert_eq!(total_pages(total, rows), expected);
            }
        }
    }

    #[test]
    fn test_clamp_page_bounds() {
        assert_eq!(clamp_page(10, 3), 3);
        assert_eq!(clamp_page(2, 3), 2);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(-4, 3), 1);
        assert_eq!(clamp_page(1, 0), 1);
        assert_eq!(clamp_page(7, 0), 1);
        for total in 0..6 {
            for page in -3..10 {
                let clamped = clamp_page(page, total);
                assert!(clamped >= 1 && clamped <= total.max(1));
            }
        }
    }

    #[test]
    fn test_count_query_wraps_base() {
        assert_eq!(
            count_query("SELECT id FROM organizations WHERE name LIKE ?"),
            "SELECT COUNT(*) FROM (SELECT id FROM organizations WHERE name LIKE ?) AS wrapper"
        );
    }

    #[test]
    fn test_bounded_query_appends_limit_offset() {
        assert_eq!(
            bounded_query("SELECT id FROM categories ORDER BY name", 3, 6),
            "SELECT id FROM categories ORDER BY name LIMIT 3 OFFSET 6"
        );
    }

    #[test]
    fn test_trailing_semicolon_stripped() {
        assert_eq!(trim_statement("SELECT 1;  \n"), "SELECT 1");
        assert_eq!(trim_statement("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_pagination_validate() {
        let ok = Pagination {
            rows: 10,
            page: 1,
            total_count: 0,
            pages: vec![],
        };
        assert!(ok.validate(100).is_ok());

        let too_many = Pagination {
            rows: 101,
            ..ok.clone()
        };
        assert!(matches!(
            too_many.validate(100),
            Err(DbError::RowsOutOfRange { rows: 101, max: 100 })
        ));

        let zero_page = Pagination {
            page: 0,
            ..ok.clone()
        };
        assert!(matches!(
            zero_page.validate(100),
            Err(DbError::InvalidPage { page: 0, last: 1 })
        ));

        let past_end = Pagination {
            page: 3,
            total_count: 15,
            pages: vec![1, 2],
            ..ok.clone()
        };
        assert!(matches!(
            past_end.validate(100),
            Err(DbError::InvalidPage { page: 3, last: 2 })
        ));

        let second_of_empty = Pagination { page: 2, ..ok };
        assert!(matches!(
            second_of_empty.validate(100),
            Err(DbError::InvalidPage { page: 2, last: 1 })
        ));
    }

    #[test]
    fn test_pagination_from_request() {
        let p = Pagination::from(PaginationRequest::new(25, 4));
        assert_eq!(p.rows, 25);
        assert_eq!(p.page, 4);
        assert_eq!(p.total_count, 0);
        assert!(p.pages.is_empty());
    }
}
