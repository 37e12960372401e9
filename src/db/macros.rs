//! Database dispatch macros for reducing code duplication.
//!
//! These macros generate the per-backend match arms for [`DbPool`](super::DbPool)
//! and [`DbTransaction`](super::DbTransaction) so that every backend gets the
//! same body without hand-writing three arms each time. They are visible to
//! the modules declared after `macros` in `db/mod.rs`.

/// Run the same expression against whichever pool variant is present.
///
/// # Example
///
/// ```ignore
/// impl_db_dispatch!(pool, p => p.close().await)
/// ```
macro_rules! impl_db_dispatch {
    ($pool:expr, $p:ident => $body:expr) => {
        match $pool {
            $crate::db::pool::DbPool::MySql($p) => $body,
            $crate::db::pool::DbPool::Postgres($p) => $body,
            $crate::db::pool::DbPool::SQLite($p) => $body,
        }
    };
}

/// Same as [`impl_db_dispatch!`] for live transactions.
macro_rules! impl_tx_dispatch {
    ($tx:expr, $t:ident => $body:expr) => {
        match $tx {
            $crate::db::context::DbTransaction::MySql($t) => $body,
            $crate::db::context::DbTransaction::Postgres($t) => $body,
            $crate::db::context::DbTransaction::SQLite($t) => $body,
        }
    };
}
