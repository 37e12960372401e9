//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection pool management
//! - Role-typed execution contexts (controller, connection, transaction)
//! - Query execution against a runnable handle
//! - Backend-neutral query parameters
//! - Database dispatch macros for reducing code duplication

#[macro_use]
pub mod macros;
pub mod context;
pub mod executor;
pub mod params;
pub mod pool;

pub use context::{
    Connection, Controller, DbTransaction, Executor, Role, Transaction, extract_runnable,
};
pub use executor::{Record, Runnable, with_timeout};
pub use params::QueryParam;
pub use pool::{DatabaseType, DbPool};
