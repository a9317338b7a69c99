//! Query execution integration tests.
//!
//! Statements go through the validator first, exactly as in production,
//! since only validated statements can reach the store.

use super::{fixture_client, seeded_client};
use db_sqlgate::db::{DatabaseClient, QueryResult, SqliteClient, Value};
use db_sqlgate::error::{Result, SqlGateError};
use db_sqlgate::render::render_result;
use db_sqlgate::safety::{SafetyPolicy, StatementValidator};
use pretty_assertions::assert_eq;

async fn run(client: &SqliteClient, sql: &str) -> Result<QueryResult> {
    let policy = SafetyPolicy::default();
    let statement = StatementValidator::new(client, &policy).validate(sql).await?;
    client.execute_query(statement).await
}

#[tokio::test]
async fn test_count_customers() {
    let (_dir, client) = seeded_client().await;

    let result = run(&client, "SELECT COUNT(*) AS n FROM customers").await.unwrap();

    assert_eq!(result.column_names(), vec!["n"]);
    assert_eq!(result.rows[0].get("n"), Some(&Value::Int(3)));
}

#[tokio::test]
async fn test_wildcard_matches_schema_columns() {
    let (_dir, client) = seeded_client().await;

    let result = run(&client, "SELECT * FROM products ORDER BY id").await.unwrap();
    let schema = client.introspect_schema().await.unwrap();

    assert_eq!(
        result.column_names(),
        schema
            .columns_of("products")
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
    );
    assert_eq!(result.row_count, 4);
    assert_eq!(
        result.rows[0].get("name"),
        Some(&Value::from("Premium Laptop"))
    );
}

#[tokio::test]
async fn test_timestamp_columns_are_decoded() {
    let (_dir, client) = seeded_client().await;

    let result = run(&client, "SELECT id, order_date FROM orders ORDER BY id")
        .await
        .unwrap();

    assert_eq!(result.row_count, 5);
    assert_eq!(result.temporal_decode_failures, 0);
    for row in &result.rows {
        assert!(row.get("order_date").unwrap().as_timestamp().is_some());
    }
    let first = result.rows[0].get("order_date").unwrap().as_timestamp().unwrap();
    let last = result.rows[4].get("order_date").unwrap().as_timestamp().unwrap();
    assert!(first < last);
}

#[tokio::test]
async fn test_join_with_duplicate_column_names() {
    let (_dir, client) = seeded_client().await;

    let result = run(
        &client,
        "SELECT c.id, o.id FROM customers AS c JOIN orders AS o ON c.id = o.customer_id ORDER BY o.id LIMIT 1",
    )
    .await
    .unwrap();

    assert_eq!(result.column_names(), vec!["id", "id"]);
    assert_eq!(result.rows[0].value_at(0), Some(&Value::Int(1)));
    assert_eq!(result.rows[0].value_at(1), Some(&Value::Int(1)));
    result.check_shape().unwrap();
}

#[tokio::test]
async fn test_empty_result_renders_placeholder() {
    let (_dir, client) = seeded_client().await;

    let result = run(&client, "SELECT name FROM products WHERE price > 100000")
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.column_names(), vec!["name"]);
    let html = render_result(&result);
    assert!(html.contains("<th>name</th>"));
    assert!(html.contains("No results found"));
}

#[tokio::test]
async fn test_pragma_table_info() {
    let (_dir, client) = seeded_client().await;

    let result = run(&client, "PRAGMA table_info(categories)").await.unwrap();

    assert_eq!(result.row_count, 3);
    assert!(result.column_names().contains(&"name".to_string()));
}

#[tokio::test]
async fn test_unknown_column_is_execution_error() {
    let (_dir, client) = seeded_client().await;

    let err = run(&client, "SELECT nope FROM products").await.unwrap_err();

    assert!(matches!(err, SqlGateError::Execution(_)));
    assert!(err.to_string().contains("no such column"));
    assert!(err.is_caller_error());
}

#[tokio::test]
async fn test_stored_markup_is_escaped() {
    let (_dir, client) = fixture_client(&[
        "CREATE TABLE notes (body TEXT)",
        "INSERT INTO notes VALUES ('<script>alert(1)</script>')",
    ])
    .await;

    let result = run(&client, "SELECT body FROM notes").await.unwrap();
    let html = render_result(&result);

    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_bad_timestamp_text_is_kept() {
    let (_dir, client) = fixture_client(&[
        "CREATE TABLE events (id INTEGER, happened_at TIMESTAMP)",
        "INSERT INTO events VALUES (1, '2024-01-15 10:30:00')",
        "INSERT INTO events VALUES (2, 'last tuesday')",
    ])
    .await;

    let result = run(&client, "SELECT * FROM events ORDER BY id").await.unwrap();

    assert_eq!(result.row_count, 2);
    assert_eq!(result.temporal_decode_failures, 1);
    assert!(result.rows[0].get("happened_at").unwrap().as_timestamp().is_some());
    assert_eq!(
        result.rows[1].get("happened_at"),
        Some(&Value::from("last tuesday"))
    );
}
