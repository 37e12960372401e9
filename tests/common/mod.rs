//! Shared fixtures for integration tests.
#![allow(dead_code)]

use capture_service::config::PoolOptions;
use capture_service::db::{Controller, DbPool, QueryParam, extract_runnable};
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

pub const TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &[&str] = &[
    "CREATE TABLE organizations (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE categories (
        id TEXT PRIMARY KEY,
        organization_id TEXT NOT NULL REFERENCES organizations(id),
        name TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE click_trackers (
        id TEXT PRIMARY KEY,
        organization_id TEXT NOT NULL REFERENCES organizations(id),
        category_id TEXT REFERENCES categories(id),
        name TEXT NOT NULL,
        target_url TEXT NOT NULL,
        clicks INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE capture_pages (
        id TEXT PRIMARY KEY,
        organization_id TEXT NOT NULL REFERENCES organizations(id),
        category_id TEXT REFERENCES categories(id),
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        headline TEXT,
        published BOOLEAN NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE items (
        id INTEGER PRIMARY KEY,
        label TEXT NOT NULL
    )",
];

/// A SQLite database in a temp file; the file lives as long as this value.
pub struct TestDb {
    pub controller: Controller,
    _file: NamedTempFile,
}

impl TestDb {
    pub async fn new() -> Self {
        let file = NamedTempFile::new().unwrap();
        let url = format!("sqlite:{}", file.path().display());
        let pool = DbPool::connect(&url, &PoolOptions::default())
            .await
            .unwrap();
        let controller = Controller::new(pool).await.unwrap();

        let db = Self {
            controller,
            _file: file,
        };
        for statement in SCHEMA {
            db.execute(statement, &[]).await;
        }
        db
    }

    /// Hand the controller to shared state; keep the file alive alongside it.
    pub fn into_shared(self) -> (Arc<Controller>, NamedTempFile) {
        (Arc::new(self.controller), self._file)
    }

    /// Run one statement auto-commit, panicking on failure.
    pub async fn execute(&self, sql: &str, params: &[QueryParam]) -> u64 {
        let mut conn = self.controller.as_connection();
        extract_runnable(&mut conn)
            .unwrap()
            .execute(sql, params, TIMEOUT)
            .await
            .unwrap()
    }

    pub async fn count(&self, sql: &str, params: &[QueryParam]) -> i64 {
        let mut conn = self.controller.as_connection();
        extract_runnable(&mut conn)
            .unwrap()
            .fetch_count(sql, params, TIMEOUT)
            .await
            .unwrap()
    }

    /// Insert `items` rows labelled `item-1` .. `item-n`.
    pub async fn seed_items(&self, n: i64) {
        for i in 1..=n {
            self.execute(
                "INSERT INTO items (id, label) VALUES (?, ?)",
                &[QueryParam::Int(i), QueryParam::from(format!("item-{}", i))],
            )
            .await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub label: String,
}
