//! Statement validation against a real database.
//!
//! Every rejected statement must leave the database exactly as it was.

use super::seeded_client;
use db_sqlgate::db::{DatabaseClient, SqliteClient, Value};
use db_sqlgate::error::SqlGateError;
use db_sqlgate::safety::{SafetyPolicy, StatementValidator};
use pretty_assertions::assert_eq;

async fn order_count(client: &SqliteClient) -> Value {
    let policy = SafetyPolicy::default();
    let statement = StatementValidator::new(client, &policy)
        .validate("SELECT COUNT(*) AS n FROM orders")
        .await
        .unwrap();
    let result = client.execute_query(statement).await.unwrap();
    result.rows[0].get("n").cloned().unwrap()
}

#[tokio::test]
async fn test_rejected_statements_never_run() {
    let (_dir, client) = seeded_client().await;
    let before = order_count(&client).await;
    let policy = SafetyPolicy::default();
    let validator = StatementValidator::new(&client, &policy);

    let attempts = [
        "DELETE FROM orders",
        "delete from orders where 1 = 1",
        "UPDATE orders SET status = 'canceled'",
        "INSERT INTO orders (customer_id) VALUES (1)",
        "DROP TABLE orders",
        "SELECT id FROM orders; DROP TABLE orders",
        "SELECT id FROM orders; DELETE FROM orders;",
        "PRAGMA journal_mode = DELETE",
        "ATTACH DATABASE 'x.db' AS x",
        "WITH doomed AS (SELECT id FROM orders) DELETE FROM orders",
        "",
        "   ;",
    ];

    for sql in attempts {
        let result = validator.validate(sql).await;
        assert!(result.is_err(), "accepted: {sql:?}");
    }

    assert_eq!(order_count(&client).await, before);
    assert_eq!(before, Value::Int(5));
}

#[tokio::test]
async fn test_policy_error_names_the_verb() {
    let (_dir, client) = seeded_client().await;
    let policy = SafetyPolicy::default();

    let err = StatementValidator::new(&client, &policy)
        .validate("DROP TABLE orders")
        .await
        .unwrap_err();

    assert!(matches!(err, SqlGateError::PolicyViolation(_)));
    assert_eq!(
        err.to_string(),
        "Policy violation: Only SELECT, PRAGMA statements are allowed, got DROP"
    );
}

#[tokio::test]
async fn test_missing_from_is_malformed() {
    let (_dir, client) = seeded_client().await;
    let policy = SafetyPolicy::default();

    let err = StatementValidator::new(&client, &policy)
        .validate("SELECT 1")
        .await
        .unwrap_err();

    assert!(matches!(err, SqlGateError::MalformedStatement(_)));
}

#[tokio::test]
async fn test_narrower_policy() {
    let (_dir, client) = seeded_client().await;
    let policy = SafetyPolicy::new(["SELECT"]);

    let err = StatementValidator::new(&client, &policy)
        .validate("PRAGMA table_info(orders)")
        .await
        .unwrap_err();

    assert!(matches!(err, SqlGateError::PolicyViolation(_)));
}

#[tokio::test]
async fn test_wildcard_expands_against_live_schema() {
    let (_dir, client) = seeded_client().await;
    let policy = SafetyPolicy::default();

    let statement = StatementValidator::new(&client, &policy)
        .validate("SELECT * FROM categories WHERE parent_id IS NULL;")
        .await
        .unwrap();

    assert_eq!(
        statement.as_str(),
        "SELECT id, name, parent_id FROM categories WHERE parent_id IS NULL"
    );
}

#[tokio::test]
async fn test_wildcard_on_unknown_table_is_left_for_the_store() {
    let (_dir, client) = seeded_client().await;
    let policy = SafetyPolicy::default();

    let statement = StatementValidator::new(&client, &policy)
        .validate("SELECT * FROM missing_table")
        .await
        .unwrap();
    assert_eq!(statement.as_str(), "SELECT * FROM missing_table");

    let err = client.execute_query(statement).await.unwrap_err();
    assert!(matches!(err, SqlGateError::Execution(_)));
    assert!(err.to_string().contains("no such table"));
}
