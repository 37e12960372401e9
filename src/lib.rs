//! Capture Service Library
//!
//! An HTTP CRUD service for organizations, categories, click trackers and
//! capture pages over PostgreSQL, MySQL or SQLite. The core pieces are the
//! role-typed execution contexts in [`db`] and the two-pass pagination
//! engine in [`pagination`].

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod pagination;
pub mod store;

pub use config::Config;
pub use db::{Connection, Controller, Executor, Transaction, extract_runnable};
pub use error::{DbError, DbResult};
pub use pagination::{Page, Pagination, PaginationRequest, Paginator};
