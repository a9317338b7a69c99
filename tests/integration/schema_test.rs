//! Schema introspection integration tests.

use super::{fixture_client, seeded_client, write_statements};
use db_sqlgate::db::DatabaseClient;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_demo_schema_tables() {
    let (_dir, client) = seeded_client().await;

    let schema = client.introspect_schema().await.unwrap();

    assert_eq!(
        schema.table_names(),
        vec![
            "categories",
            "customers",
            "inventory",
            "order_details",
            "orders",
            "payments",
            "products",
            "reviews",
            "suppliers",
        ]
    );
}

#[tokio::test]
async fn test_columns_in_declaration_order() {
    let (_dir, client) = seeded_client().await;

    let schema = client.introspect_schema().await.unwrap();

    assert_eq!(
        schema.columns_of("orders").unwrap(),
        vec![
            "id",
            "customer_id",
            "order_date",
            "total_amount",
            "status",
            "payment_status",
        ]
    );
    let orders = schema.table("orders").unwrap();
    assert_eq!(orders.primary_key, vec!["id".to_string()]);
}

#[tokio::test]
async fn test_summary_lines() {
    let (_dir, client) = seeded_client().await;

    let summary = client.introspect_schema().await.unwrap().summary();

    assert!(summary.contains("categories (id, name, parent_id)\n"));
    assert!(summary.contains("inventory (id, product_id, quantity, location, last_restocked)\n"));
    assert_eq!(summary.lines().count(), 9);
}

#[tokio::test]
async fn test_empty_database_has_empty_summary() {
    let (_dir, client) = fixture_client(&[]).await;

    let schema = client.introspect_schema().await.unwrap();

    assert!(schema.is_empty());
    assert_eq!(schema.summary(), "");
}

#[tokio::test]
async fn test_schema_changes_are_seen_immediately() {
    let (_dir, client) = fixture_client(&["CREATE TABLE a (x INTEGER)"]).await;
    assert_eq!(client.introspect_schema().await.unwrap().table_names(), vec!["a"]);

    write_statements(
        client.path(),
        &["CREATE TABLE b (y TEXT, z REAL)", "ALTER TABLE a ADD COLUMN w TEXT"],
        false,
    )
    .await;

    let schema = client.introspect_schema().await.unwrap();
    assert_eq!(schema.table_names(), vec!["a", "b"]);
    assert_eq!(schema.columns_of("a").unwrap(), vec!["x", "w"]);
    assert_eq!(schema.summary(), "a (x, w)\nb (y, z)\n");
}

#[tokio::test]
async fn test_sqlite_internal_tables_are_hidden() {
    let (_dir, client) = fixture_client(&[
        "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT)",
        "INSERT INTO items (name) VALUES ('x')",
    ])
    .await;

    let schema = client.introspect_schema().await.unwrap();

    assert_eq!(schema.table_names(), vec!["items"]);
}
