//! Integration tests for the role-typed execution contexts.

mod common;

use capture_service::config::PoolOptions;
use capture_service::db::{Controller, Executor, QueryParam, Role, Transaction, extract_runnable};
use capture_service::error::{DbError, DbResult};
use capture_service::store;
use common::{TIMEOUT, TestDb};

const INSERT: &str = "INSERT INTO items (id, label) VALUES (?, ?)";

fn item(id: i64) -> [QueryParam; 2] {
    [QueryParam::Int(id), QueryParam::from(format!("item-{}", id))]
}

#[tokio::test]
async fn test_commit_persists() {
    let db = TestDb::new().await;

    let mut tx = db.controller.as_transaction().await.unwrap();
    assert_eq!(tx.role(), Role::Transaction);
    extract_runnable(&mut tx)
        .unwrap()
        .execute(INSERT, &item(1), TIMEOUT)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert!(!tx.is_active());

    assert_eq!(db.count("SELECT COUNT(*) FROM items", &[]).await, 1);
}

#[tokio::test]
async fn test_rollback_discards() {
    let db = TestDb::new().await;

    let mut tx = db.controller.as_transaction().await.unwrap();
    extract_runnable(&mut tx)
        .unwrap()
        .execute(INSERT, &item(1), TIMEOUT)
        .await
        .unwrap();
    tx.rollback().await;

    assert_eq!(db.count("SELECT COUNT(*) FROM items", &[]).await, 0);
}

#[tokio::test]
async fn test_finished_transaction() {
    let db = TestDb::new().await;

    let mut tx = db.controller.as_transaction().await.unwrap();
    tx.commit().await.unwrap();

    assert!(matches!(
        tx.commit().await,
        Err(DbError::TransactionFinished { .. })
    ));
    assert!(matches!(
        extract_runnable(&mut tx),
        Err(DbError::TransactionFinished { .. })
    ));
    // Rolling back after commit is the normal cleanup path and must be quiet.
    tx.rollback().await;
    tx.rollback().await;
}

#[tokio::test]
async fn test_failed_rollback_still_finishes_transaction() {
    let db = TestDb::new().await;

    let mut tx = db.controller.as_transaction().await.unwrap();
    let mut runnable = extract_runnable(&mut tx).unwrap();
    runnable.execute(INSERT, &item(1), TIMEOUT).await.unwrap();
    // End the store-side transaction behind the handle's back so the
    // handle's own ROLLBACK finds nothing to undo.
    runnable.execute("COMMIT", &[], TIMEOUT).await.unwrap();

    tx.rollback().await;
    assert!(!tx.is_active());
    assert!(matches!(
        tx.commit().await,
        Err(DbError::TransactionFinished { .. })
    ));
}

#[tokio::test]
async fn test_dropped_transaction_rolls_back() {
    let db = TestDb::new().await;

    {
        let mut tx = db.controller.as_transaction().await.unwrap();
        extract_runnable(&mut tx)
            .unwrap()
            .execute(INSERT, &item(1), TIMEOUT)
            .await
            .unwrap();
    }

    assert_eq!(db.count("SELECT COUNT(*) FROM items", &[]).await, 0);
}

#[tokio::test]
async fn test_connection_auto_commits() {
    let db = TestDb::new().await;

    let mut conn = db.controller.as_connection();
    assert_eq!(conn.role(), Role::Connection);
    let mut runnable = extract_runnable(&mut conn).unwrap();
    assert!(!runnable.is_transaction());
    runnable.execute(INSERT, &item(1), TIMEOUT).await.unwrap();
    conn.rollback().await;

    assert_eq!(db.count("SELECT COUNT(*) FROM items", &[]).await, 1);
}

#[tokio::test]
async fn test_connection_rollback_never_touches_store() {
    let db = TestDb::new().await;
    db.controller.close().await;

    let mut conn = db.controller.as_connection();
    conn.rollback().await;
}

#[tokio::test]
async fn test_connect_rejects_unknown_scheme() {
    let result = Controller::connect("redis://localhost", &PoolOptions::default()).await;
    assert!(matches!(result, Err(DbError::InvalidInput { .. })));
}

async fn insert_item(tx: &mut Transaction, fail: bool) -> DbResult<()> {
    extract_runnable(tx)?
        .execute(INSERT, &item(1), TIMEOUT)
        .await?;
    if fail {
        return Err(DbError::invalid_input("abort"));
    }
    Ok(())
}

async fn insert_then(db: &TestDb, fail: bool) -> DbResult<()> {
    let mut tx = db.controller.as_transaction().await?;
    let result = insert_item(&mut tx, fail).await;
    store::finish(tx, result).await
}

#[tokio::test]
async fn test_finish_commits_on_success() {
    let db = TestDb::new().await;
    insert_then(&db, false).await.unwrap();
    assert_eq!(db.count("SELECT COUNT(*) FROM items", &[]).await, 1);
}

#[tokio::test]
async fn test_finish_rolls_back_on_error() {
    let db = TestDb::new().await;
    let result = insert_then(&db, true).await;
    assert!(matches!(result, Err(DbError::InvalidInput { .. })));
    assert_eq!(db.count("SELECT COUNT(*) FROM items", &[]).await, 0);
}
