//! Repositories for the service's entities.
//!
//! Every function takes an [`Executor`](crate::db::Executor) so the caller
//! decides whether the work runs auto-commit or inside a transaction. Filters
//! are turned into SQL with [`SqlBuilder`], which emits the placeholder style
//! of the backend behind the runnable handle.

pub mod capture_pages;
pub mod categories;
pub mod click_trackers;
pub mod organizations;

use crate::db::{DatabaseType, Executor, QueryParam, Record, Runnable, Transaction};
use crate::error::{DbError, DbResult};
use chrono::{DateTime, SubsecRound, Utc};
use std::time::Duration;

/// Incrementally built statement with positional arguments.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    db_type: DatabaseType,
    sql: String,
    args: Vec<QueryParam>,
    has_where: bool,
}

impl SqlBuilder {
    pub fn new(db_type: DatabaseType, base: &str) -> Self {
        Self {
            db_type,
            sql: base.to_string(),
            args: Vec::new(),
            has_where: false,
        }
    }

    /// Append raw SQL.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a placeholder and bind `value` to it.
    pub fn bind(&mut self, value: impl Into<QueryParam>) -> &mut Self {
        self.args.push(value.into());
        let placeholder = self.db_type.placeholder(self.args.len());
        self.sql.push_str(&placeholder);
        self
    }

    /// Append `WHERE`/`AND` followed by `clause`, e.g. `"organization_id = "`,
    /// and bind `value` after it.
    pub fn and_where(&mut self, clause: &str, value: impl Into<QueryParam>) -> &mut Self {
        self.push(if self.has_where { " AND " } else { " WHERE " });
        self.has_where = true;
        self.push(clause);
        self.bind(value)
    }

    /// Case-insensitive substring match on `column`.
    ///
    /// Both sides are lowered by the store so its own case folding applies to
    /// each. `%` and `_` in `needle` match literally.
    pub fn and_contains(&mut self, column: &str, needle: &str) -> &mut Self {
        let pattern = format!("%{}%", escape_like(needle.trim()));
        self.and_where(&format!("LOWER({}) LIKE LOWER(", column), pattern)
            .push(&format!(") ESCAPE '{}'", LIKE_ESCAPE))
    }

    pub fn finish(self) -> (String, Vec<QueryParam>) {
        (self.sql, self.args)
    }
}

/// Commit on success, then roll back unconditionally.
///
/// The rollback is a no-op once the commit went through, so the same cleanup
/// path serves both outcomes.
pub async fn finish<T>(mut tx: Transaction, result: DbResult<T>) -> DbResult<T> {
    let outcome = match result {
        Ok(value) => tx.commit().await.map(|()| value),
        Err(e) => Err(e),
    };
    tx.rollback().await;
    outcome
}

/// Ensure a row with `id` exists in `table`.
async fn require_exists(
    runnable: &mut Runnable<'_>,
    table: &str,
    entity: &str,
    id: &str,
    query_timeout: Duration,
) -> DbResult<()> {
    let mut sql = SqlBuilder::new(
        runnable.db_type(),
        &format!("SELECT COUNT(*) FROM {}", table),
    );
    sql.and_where("id = ", id);
    let (sql, args) = sql.finish();
    if runnable.fetch_count(&sql, &args, query_timeout).await? == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(())
}

/// Ensure `category_id` exists and belongs to `organization_id`.
async fn require_category_in(
    runnable: &mut Runnable<'_>,
    organization_id: &str,
    category_id: &str,
    query_timeout: Duration,
) -> DbResult<()> {
    let mut sql = SqlBuilder::new(runnable.db_type(), "SELECT COUNT(*) FROM categories");
    sql.and_where("id = ", category_id)
        .and_where("organization_id = ", organization_id);
    let (sql, args) = sql.finish();
    if runnable.fetch_count(&sql, &args, query_timeout).await? == 0 {
        return Err(DbError::invalid_input(format!(
            "category {} does not belong to organization {}",
            category_id, organization_id
        )));
    }
    Ok(())
}

/// Run an `UPDATE <table> SET ... WHERE id = ?` for the given column values.
///
/// Returns `false` when `sets` is empty (nothing to do) and
/// [`DbError::NotFound`] when no row matched.
async fn update_columns(
    runnable: &mut Runnable<'_>,
    table: &str,
    entity: &str,
    id: &str,
    sets: Vec<(&str, QueryParam)>,
    query_timeout: Duration,
) -> DbResult<bool> {
    if sets.is_empty() {
        return Ok(false);
    }
    let mut sql = SqlBuilder::new(runnable.db_type(), &format!("UPDATE {} SET ", table));
    for (i, (column, value)) in sets.into_iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push(column).push(" = ").bind(value);
    }
    sql.and_where("id = ", id);
    let (sql, args) = sql.finish();
    if runnable.execute(&sql, &args, query_timeout).await? == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(true)
}

/// Delete by id, mapping zero affected rows to [`DbError::NotFound`].
async fn delete_by_id(
    runnable: &mut Runnable<'_>,
    table: &str,
    entity: &str,
    id: &str,
    query_timeout: Duration,
) -> DbResult<()> {
    let mut sql = SqlBuilder::new(runnable.db_type(), &format!("DELETE FROM {}", table));
    sql.and_where("id = ", id);
    let (sql, args) = sql.finish();
    if runnable.execute(&sql, &args, query_timeout).await? == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(())
}

/// Fetch a single row by id or fail with [`DbError::NotFound`].
async fn get_by_id<T: Record>(
    runnable: &mut Runnable<'_>,
    select: &str,
    entity: &str,
    id: &str,
    query_timeout: Duration,
) -> DbResult<T> {
    let mut sql = SqlBuilder::new(runnable.db_type(), select);
    sql.and_where("id = ", id);
    let (sql, args) = sql.finish();
    runnable
        .fetch_optional(&sql, &args, query_timeout)
        .await?
        .ok_or_else(|| DbError::not_found(entity, id))
}

/// Map a validation message to [`DbError::InvalidInput`].
fn validated(result: Result<(), String>) -> DbResult<()> {
    result.map_err(DbError::invalid_input)
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Escape character for `LIKE` patterns. A backslash would itself need
/// escaping inside MySQL string literals.
const LIKE_ESCAPE: char = '!';

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Current time at microsecond precision, the finest every backend stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sqlite_placeholders() {
        let mut sql = SqlBuilder::new(DatabaseType::SQLite, "SELECT * FROM t");
        sql.and_where("a = ", 1i64).and_contains("name", " Acme ");
        let (sql, args) = sql.finish();
        assert_eq!(
            sql,
            "SELECT * FROM t WHERE a = ? AND LOWER(name) LIKE LOWER(?) ESCAPE '!'"
        );
        assert_eq!(
            args,
            vec![QueryParam::Int(1), QueryParam::Text("%Acme%".to_string())]
        );
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%"), "100!%");
        assert_eq!(escape_like("a_b"), "a!_b");
        assert_eq!(escape_like("wow!"), "wow!!");
        assert_eq!(escape_like("Ärzte"), "Ärzte");
    }

    #[test]
    fn test_builder_postgres_placeholders() {
        let mut sql = SqlBuilder::new(DatabaseType::PostgreSQL, "SELECT * FROM t");
        sql.and_where("a = ", "x").and_where("b = ", "y");
        sql.push(" ORDER BY a");
        let (sql, args) = sql.finish();
        assert_eq!(sql, "SELECT * FROM t WHERE a = $1 AND b = $2 ORDER BY a");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_builder_without_filters() {
        let (sql, args) = SqlBuilder::new(DatabaseType::MySQL, "SELECT 1").finish();
        assert_eq!(sql, "SELECT 1");
        assert!(args.is_empty());
    }

    #[test]
    fn test_now_has_microsecond_precision() {
        assert_eq!(now().timestamp_subsec_nanos() % 1_000, 0);
    }
}
