//! Demo database seeding tests.

use super::database_config;
use db_sqlgate::db::{seed_demo_database, DatabaseClient, SqliteClient};
use db_sqlgate::error::SqlGateError;
use db_sqlgate::safety::{SafetyPolicy, StatementValidator};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_seed_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    std::fs::write(&path, b"not a database").unwrap();

    let err = seed_demo_database(&path, false).await.unwrap_err();

    assert!(matches!(err, SqlGateError::Config(_)));
    assert_eq!(std::fs::read(&path).unwrap(), b"not a database");
}

#[tokio::test]
async fn test_seed_force_replaces_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    std::fs::write(&path, b"not a database").unwrap();

    seed_demo_database(&path, true).await.unwrap();

    let client = SqliteClient::new(&database_config(&path));
    let schema = client.introspect_schema().await.unwrap();
    assert_eq!(schema.tables.len(), 9);
}

#[tokio::test]
async fn test_paid_orders_have_payments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.db");
    seed_demo_database(&path, false).await.unwrap();

    let client = SqliteClient::new(&database_config(&path));
    let policy = SafetyPolicy::default();
    let statement = StatementValidator::new(&client, &policy)
        .validate(
            "SELECT COUNT(*) AS unpaid FROM orders AS o \
             WHERE o.payment_status = 'paid' \
             AND NOT EXISTS (SELECT 1 FROM payments AS p WHERE p.order_id = o.id)",
        )
        .await
        .unwrap();
    let result = client.execute_query(statement).await.unwrap();

    assert_eq!(
        result.rows[0].get("unpaid"),
        Some(&db_sqlgate::db::Value::Int(0))
    );
}
