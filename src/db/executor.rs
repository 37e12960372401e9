//! Query execution against a runnable handle.
//!
//! A [`Runnable`] is what [`extract_runnable`](super::extract_runnable) hands
//! out: either the shared pool (auto-commit) or a live transaction. The
//! methods here bind [`QueryParam`]s for the right backend, run the statement
//! under a timeout and map driver errors into [`DbError`].
//!
//! Rows are decoded into any type implementing [`Record`], which is every
//! `#[derive(sqlx::FromRow)]` struct whose fields decode on all three backends.

use crate::db::context::DbTransaction;
use crate::db::params::{QueryParam, mysql_arguments, pg_arguments, sqlite_arguments};
use crate::db::pool::{DatabaseType, DbPool};
use crate::error::{DbError, DbResult};
use sqlx::FromRow;
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// A row type decodable from every supported backend.
pub trait Record:
    for<'r> FromRow<'r, PgRow>
    + for<'r> FromRow<'r, MySqlRow>
    + for<'r> FromRow<'r, SqliteRow>
    + Send
    + Unpin
{
}

impl<T> Record for T where
    T: for<'r> FromRow<'r, PgRow>
        + for<'r> FromRow<'r, MySqlRow>
        + for<'r> FromRow<'r, SqliteRow>
        + Send
        + Unpin
{
}

/// Handle a query can run against.
#[derive(Debug)]
pub enum Runnable<'a> {
    /// Auto-commit: each statement checks a connection out of the pool.
    Pool(&'a DbPool),
    /// Statements run inside the borrowed transaction.
    Transaction(&'a mut DbTransaction),
}

/// Expand `$body` once per backend with `$exec` bound to a sqlx executor and
/// `$args` to the matching argument buffer.
macro_rules! dispatch {
    ($runnable:expr, $params:expr, |$exec:ident, $args:ident| $body:expr) => {
        match $runnable {
            Runnable::Pool(DbPool::MySql($exec)) => {
                let $args = mysql_arguments($params)?;
                $body
            }
            Runnable::Pool(DbPool::Postgres($exec)) => {
                let $args = pg_arguments($params)?;
                $body
            }
            Runnable::Pool(DbPool::SQLite($exec)) => {
                let $args = sqlite_arguments($params)?;
                $body
            }
            Runnable::Transaction(DbTransaction::MySql(tx)) => {
                let $exec = &mut **tx;
                let $args = mysql_arguments($params)?;
                $body
            }
            Runnable::Transaction(DbTransaction::Postgres(tx)) => {
                let $exec = &mut **tx;
                let $args = pg_arguments($params)?;
                $body
            }
            Runnable::Transaction(DbTransaction::SQLite(tx)) => {
                let $exec = &mut **tx;
                let $args = sqlite_arguments($params)?;
                $body
            }
        }
    };
}

impl Runnable<'_> {
    /// Backend this handle talks to, for dialect-specific SQL.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            Runnable::Pool(pool) => pool.db_type(),
            Runnable::Transaction(tx) => tx.db_type(),
        }
    }

    pub fn is_transaction(&self) -> bool {
        matches!(self, Runnable::Transaction(_))
    }

    /// Fetch every row the statement returns.
    pub async fn fetch_all<T: Record>(
        &mut self,
        sql: &str,
        params: &[QueryParam],
        query_timeout: Duration,
    ) -> DbResult<Vec<T>> {
        debug!(sql = %sql, params = params.len(), "Fetching rows");
        let rows = with_timeout("query execution", query_timeout, async move {
            dispatch!(self, params, |exec, args| {
                sqlx::query_as_with::<_, T, _>(sql, args)
                    .fetch_all(exec)
                    .await
                    .map_err(DbError::from)
            })
        })
        .await?;
        debug!(row_count = rows.len(), "Rows fetched");
        Ok(rows)
    }

    /// Fetch at most one row.
    pub async fn fetch_optional<T: Record>(
        &mut self,
        sql: &str,
        params: &[QueryParam],
        query_timeout: Duration,
    ) -> DbResult<Option<T>> {
        debug!(sql = %sql, params = params.len(), "Fetching optional row");
        with_timeout("query execution", query_timeout, async move {
            dispatch!(self, params, |exec, args| {
                sqlx::query_as_with::<_, T, _>(sql, args)
                    .fetch_optional(exec)
                    .await
                    .map_err(DbError::from)
            })
        })
        .await
    }

    /// Run a statement whose single column of its single row is an integer count.
    pub async fn fetch_count(
        &mut self,
        sql: &str,
        params: &[QueryParam],
        query_timeout: Duration,
    ) -> DbResult<i64> {
        debug!(sql = %sql, params = params.len(), "Fetching count");
        with_timeout("count query", query_timeout, async move {
            dispatch!(self, params, |exec, args| {
                sqlx::query_scalar_with::<_, i64, _>(sql, args)
                    .fetch_one(exec)
                    .await
                    .map_err(DbError::from)
            })
        })
        .await
    }

    /// Execute a write statement and return the number of affected rows.
    pub async fn execute(
        &mut self,
        sql: &str,
        params: &[QueryParam],
        query_timeout: Duration,
    ) -> DbResult<u64> {
        debug!(
            sql = %sql,
            params = params.len(),
            in_transaction = self.is_transaction(),
            "Executing write operation"
        );
        with_timeout("write operation", query_timeout, async move {
            dispatch!(self, params, |exec, args| {
                sqlx::query_with(sql, args)
                    .execute(exec)
                    .await
                    .map(|r| r.rows_affected())
                    .map_err(DbError::from)
            })
        })
        .await
    }
}

/// Run `future` under `limit`, turning an elapsed deadline into [`DbError::Timeout`].
///
/// Dropping the future on timeout cancels the in-flight statement. An open
/// transaction is left for its owner to roll back.
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, future: F) -> DbResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    match timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(DbError::timeout(operation, limit)),
    }
}
