//! Role-typed execution contexts.
//!
//! A [`Controller`] owns the pooled store handle and is the only thing created
//! at startup. Units of work ask it for either a [`Connection`] (auto-commit,
//! borrows the pool) or a [`Transaction`] (one live driver transaction). All
//! three implement [`Executor`], but only the spawned roles hand out a
//! [`Runnable`] handle: a controller can never be queried directly.
//!
//! ```ignore
//! let mut tx = controller.as_transaction().await?;
//! let result = async {
//!     let mut runnable = extract_runnable(&mut tx)?;
//!     runnable.execute(sql, &params, timeout).await?;
//!     tx.commit().await
//! }
//! .await;
//! tx.rollback().await; // no-op after a successful commit
//! result
//! ```

use crate::config::PoolOptions;
use crate::db::executor::Runnable;
use crate::db::pool::{DatabaseType, DbPool, mask_connection_string};
use crate::error::{DbError, DbResult};
use serde::Serialize;
use sqlx::{MySql, Postgres, Sqlite};
use std::future::Future;
use tracing::{debug, info, warn};

/// What an execution context is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Factory owning the pool. Never queryable.
    Controller,
    /// Auto-commit executor borrowing the pool.
    Connection,
    /// Explicit-commit executor wrapping one live transaction.
    Transaction,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Controller => write!(f, "controller"),
            Self::Connection => write!(f, "connection"),
            Self::Transaction => write!(f, "transaction"),
        }
    }
}

/// Capability shared by every execution context.
///
/// Implementations outside this module that do not override [`runnable`]
/// are rejected with [`DbError::TypeMismatch`] when a caller tries to run a
/// query through them.
///
/// [`runnable`]: Executor::runnable
pub trait Executor: Send {
    fn role(&self) -> Role;

    /// Borrow a handle queries can run against.
    fn runnable(&mut self) -> DbResult<Runnable<'_>> {
        Err(DbError::type_mismatch(std::any::type_name::<Self>()))
    }

    /// Make the unit of work durable.
    fn commit(&mut self) -> impl Future<Output = DbResult<()>> + Send;

    /// Abandon the unit of work. Never fails; problems are logged.
    fn rollback(&mut self) -> impl Future<Output = ()> + Send;
}

/// Obtain the handle a query can actually run against.
///
/// This is the one entry point application code uses; it fails with
/// [`DbError::RoleViolation`] for a [`Controller`] and with
/// [`DbError::TypeMismatch`] for executors this crate does not know.
pub fn extract_runnable<E: Executor>(executor: &mut E) -> DbResult<Runnable<'_>> {
    executor.runnable()
}

/// Owner of the pooled store handle.
///
/// Created once per pool and shared (usually behind an `Arc`) for the life of
/// the process. Spawns per-request executors; never runs queries itself.
#[derive(Debug)]
pub struct Controller {
    pool: DbPool,
}

impl Controller {
    /// Wrap an already-built pool, verifying that the store answers.
    pub async fn new(pool: DbPool) -> DbResult<Self> {
        if let Err(e) = pool.ping().await {
            warn!(db_type = %pool.db_type(), error = %e, "Liveness check failed");
            return Err(DbError::unreachable(e.to_string()));
        }
        info!(db_type = %pool.db_type(), "Controller ready");
        Ok(Self { pool })
    }

    /// Build a pool from `connection_string` and wrap it.
    pub async fn connect(connection_string: &str, pool_opts: &PoolOptions) -> DbResult<Self> {
        let pool = DbPool::connect(connection_string, pool_opts)
            .await
            .map_err(|e| match e {
                DbError::InvalidInput { .. } => e,
                other => DbError::unreachable(format!(
                    "{} ({})",
                    other,
                    mask_connection_string(connection_string)
                )),
            })?;
        Self::new(pool).await
    }

    /// Spawn an auto-commit executor.
    pub fn as_connection(&self) -> Connection<'_> {
        Connection { pool: &self.pool }
    }

    /// Begin a transaction and spawn an executor for it.
    pub async fn as_transaction(&self) -> DbResult<Transaction> {
        let tx = match &self.pool {
            DbPool::MySql(p) => p.begin().await.map(DbTransaction::MySql),
            DbPool::Postgres(p) => p.begin().await.map(DbTransaction::Postgres),
            DbPool::SQLite(p) => p.begin().await.map(DbTransaction::SQLite),
        }
        .map_err(|e| DbError::begin_failed(DbError::from(e).to_string()))?;

        let id = generate_transaction_id();
        info!(transaction_id = %id, db_type = %tx.db_type(), "Transaction started");
        Ok(Transaction { id, tx: Some(tx) })
    }

    pub fn db_type(&self) -> DatabaseType {
        self.pool.db_type()
    }

    /// Close the underlying pool. Spawned executors fail afterwards.
    pub async fn close(&self) {
        info!(db_type = %self.pool.db_type(), "Closing database pool");
        self.pool.close().await;
    }
}

impl Executor for Controller {
    fn role(&self) -> Role {
        Role::Controller
    }

    fn runnable(&mut self) -> DbResult<Runnable<'_>> {
        Err(DbError::role_violation(Role::Controller, "extract_runnable"))
    }

    async fn commit(&mut self) -> DbResult<()> {
        Err(DbError::role_violation(Role::Controller, "commit"))
    }

    async fn rollback(&mut self) {
        warn!("Rollback called on controller; nothing to roll back");
    }
}

/// Auto-commit executor. Every statement commits on its own.
#[derive(Debug)]
pub struct Connection<'c> {
    pool: &'c DbPool,
}

impl Executor for Connection<'_> {
    fn role(&self) -> Role {
        Role::Connection
    }

    fn runnable(&mut self) -> DbResult<Runnable<'_>> {
        Ok(Runnable::Pool(self.pool))
    }

    async fn commit(&mut self) -> DbResult<()> {
        Err(DbError::invalid_on_connection("commit"))
    }

    /// No-op so cleanup paths can roll back without checking the role.
    async fn rollback(&mut self) {}
}

/// Database-specific transaction wrapper.
pub enum DbTransaction {
    /// MySQL transaction
    MySql(sqlx::Transaction<'static, MySql>),
    /// PostgreSQL transaction
    Postgres(sqlx::Transaction<'static, Postgres>),
    /// SQLite transaction
    SQLite(sqlx::Transaction<'static, Sqlite>),
}

impl DbTransaction {
    /// Get the database type for this transaction.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbTransaction::MySql(_) => DatabaseType::MySQL,
            DbTransaction::Postgres(_) => DatabaseType::PostgreSQL,
            DbTransaction::SQLite(_) => DatabaseType::SQLite,
        }
    }

    async fn commit(self) -> DbResult<()> {
        impl_tx_dispatch!(self, tx => tx.commit().await.map_err(DbError::from))
    }

    async fn rollback(self) -> DbResult<()> {
        impl_tx_dispatch!(self, tx => tx.rollback().await.map_err(DbError::from))
    }
}

impl std::fmt::Debug for DbTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DbTransaction").field(&self.db_type()).finish()
    }
}

/// Explicit-commit executor.
///
/// Once committed or rolled back the transaction is finished: a second
/// `commit` fails with [`DbError::TransactionFinished`], a second `rollback`
/// is a silent no-op.
#[derive(Debug)]
pub struct Transaction {
    id: String,
    tx: Option<DbTransaction>,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True until `commit` or `rollback` has been called.
    pub fn is_active(&self) -> bool {
        self.tx.is_some()
    }
}

impl Executor for Transaction {
    fn role(&self) -> Role {
        Role::Transaction
    }

    fn runnable(&mut self) -> DbResult<Runnable<'_>> {
        match self.tx.as_mut() {
            Some(tx) => Ok(Runnable::Transaction(tx)),
            None => Err(DbError::transaction_finished("extract_runnable")),
        }
    }

    async fn commit(&mut self) -> DbResult<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| DbError::transaction_finished("commit"))?;
        tx.commit().await?;
        info!(transaction_id = %self.id, "Transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) {
        let Some(tx) = self.tx.take() else {
            debug!(transaction_id = %self.id, "Rollback skipped; transaction already finished");
            return;
        };
        let outcome = tx.rollback().await;
        report_rollback(&self.id, outcome);
    }
}

/// Log how a rollback ended. A failure is logged, never returned.
fn report_rollback(transaction_id: &str, outcome: DbResult<()>) -> bool {
    match outcome {
        Ok(()) => {
            info!(transaction_id = %transaction_id, "Transaction rolled back");
            true
        }
        Err(e) => {
            warn!(transaction_id = %transaction_id, error = %e, "Rollback failed");
            false
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.tx.is_some() {
            // sqlx rolls the transaction back when the inner handle drops
            warn!(
                transaction_id = %self.id,
                "Transaction dropped without commit or rollback"
            );
        }
    }
}

/// Generate a unique transaction ID.
fn generate_transaction_id() -> String {
    format!("tx_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_controller() -> Controller {
        let pool = DbPool::connect("sqlite::memory:", &PoolOptions::default())
            .await
            .unwrap();
        Controller::new(pool).await.unwrap()
    }

    struct Foreign;

    impl Executor for Foreign {
        fn role(&self) -> Role {
            Role::Connection
        }

        async fn commit(&mut self) -> DbResult<()> {
            Ok(())
        }

        async fn rollback(&mut self) {}
    }

    #[test]
    fn test_rollback_failure_is_reported_not_raised() {
        let failed = DbError::connection("connection reset", "Check the server");
        assert!(!report_rollback("tx_failed", Err(failed)));
        assert!(report_rollback("tx_ok", Ok(())));
    }

    #[test]
    fn test_transaction_id_format() {
        let id = generate_transaction_id();
        assert!(id.starts_with("tx_"));
        assert_eq!(id.len(), 3 + 32); // "tx_" + 32 hex chars
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Controller.to_string(), "controller");
        assert_eq!(Role::Connection.to_string(), "connection");
        assert_eq!(Role::Transaction.to_string(), "transaction");
    }

    #[tokio::test]
    async fn test_controller_is_never_runnable() {
        let mut controller = memory_controller().await;
        assert_eq!(controller.role(), Role::Controller);
        let err = extract_runnable(&mut controller).unwrap_err();
        assert!(matches!(
            err,
            DbError::RoleViolation {
                role: Role::Controller,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_controller_commit_is_role_violation() {
        let mut controller = memory_controller().await;
        assert!(matches!(
            controller.commit().await,
            Err(DbError::RoleViolation { .. })
        ));
        // rollback only logs
        controller.rollback().await;
    }

    #[tokio::test]
    async fn test_connection_runnable() {
        let controller = memory_controller().await;
        let mut conn = controller.as_connection();
        assert_eq!(conn.role(), Role::Connection);
        let runnable = extract_runnable(&mut conn).unwrap();
        assert_eq!(runnable.db_type(), DatabaseType::SQLite);
    }

    #[tokio::test]
    async fn test_connection_commit_is_invalid() {
        let controller = memory_controller().await;
        let mut conn = controller.as_connection();
        assert!(matches!(
            conn.commit().await,
            Err(DbError::InvalidOnConnection { .. })
        ));
    }

    #[tokio::test]
    async fn test_foreign_executor_is_type_mismatch() {
        let mut foreign = Foreign;
        let err = extract_runnable(&mut foreign).unwrap_err();
        match err {
            DbError::TypeMismatch { type_name } => assert!(type_name.contains("Foreign")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transaction_lifecycle() {
        let controller = memory_controller().await;
        let mut tx = controller.as_transaction().await.unwrap();
        assert_eq!(tx.role(), Role::Transaction);
        assert!(tx.is_active());
        assert!(extract_runnable(&mut tx).is_ok());

        tx.commit().await.unwrap();
        assert!(!tx.is_active());
        assert!(matches!(
            extract_runnable(&mut tx),
            Err(DbError::TransactionFinished { .. })
        ));
    }

    #[tokio::test]
    async fn test_begin_on_closed_pool_fails() {
        let controller = memory_controller().await;
        controller.close().await;
        assert!(matches!(
            controller.as_transaction().await,
            Err(DbError::BeginFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_new_on_closed_pool_is_unreachable() {
        let pool = DbPool::connect("sqlite::memory:", &PoolOptions::default())
            .await
            .unwrap();
        pool.close().await;
        assert!(matches!(
            Controller::new(pool).await,
            Err(DbError::Unreachable { .. })
        ));
    }
}
