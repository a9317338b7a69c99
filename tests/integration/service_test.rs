//! End-to-end pipeline tests: question in, rendered table out.

use std::sync::Arc;

use super::seeded_client;
use db_sqlgate::error::SqlGateError;
use db_sqlgate::llm::{LlmClient, MockLlmClient};
use db_sqlgate::safety::SafetyPolicy;
use db_sqlgate::service::QueryService;
use pretty_assertions::assert_eq;

async fn service_with(llm: MockLlmClient) -> (tempfile::TempDir, QueryService) {
    let (dir, client) = seeded_client().await;
    let llm: Box<dyn LlmClient> = Box::new(llm);
    let service = QueryService::new(llm, Arc::new(client), SafetyPolicy::default(), 500);
    (dir, service)
}

#[tokio::test]
async fn test_products_question() {
    let (_dir, service) = service_with(MockLlmClient::new()).await;

    let response = service.handle_query("Show me the products").await.unwrap();

    assert_eq!(
        response.sql,
        "SELECT id, name, description, sku, price, category_id, supplier_id, stock_quantity, created_at, updated_at FROM products LIMIT 10"
    );
    assert_eq!(response.row_count, 4);
    assert_eq!(response.columns.len(), 10);
    assert_eq!(response.skipped_rows, 0);
    assert!(response.html.starts_with(r#"<div class="table-container">"#));
    assert!(response.html.contains("<td>Ergonomic Chair</td>"));
}

#[tokio::test]
async fn test_join_question() {
    let (_dir, service) = service_with(MockLlmClient::new()).await;

    let response = service
        .handle_query("recent orders with customer names")
        .await
        .unwrap();

    assert_eq!(
        response.columns,
        vec!["first_name", "last_name", "order_date", "total_amount"]
    );
    assert_eq!(response.row_count, 5);
    assert_eq!(response.temporal_decode_failures, 0);
}

#[tokio::test]
async fn test_prompt_carries_live_schema() {
    let llm = MockLlmClient::new();
    let (_dir, service) = service_with(llm.clone()).await;

    service.handle_query("count customers").await.unwrap();

    let messages = llm.last_messages();
    assert!(messages[0]
        .content
        .contains("categories (id, name, parent_id)"));
    assert!(messages[0].content.contains("SELECT, PRAGMA"));
    assert_eq!(messages[1].content, "Query: count customers\nSQL:");
}

#[tokio::test]
async fn test_generated_delete_is_blocked() {
    let (_dir, service) = service_with(MockLlmClient::new()).await;

    let err = service.handle_query("delete all orders").await.unwrap_err();
    assert!(matches!(err, SqlGateError::PolicyViolation(_)));

    let response = service
        .run_sql("SELECT COUNT(*) AS n FROM orders")
        .await
        .unwrap();
    assert!(response.html.contains("<td>5</td>"));
}

#[tokio::test]
async fn test_generated_stacked_statement_is_blocked() {
    let llm = MockLlmClient::new().with_response(
        "sneaky",
        r#"{"sql": "SELECT id FROM customers; DROP TABLE customers"}"#,
    );
    let (_dir, service) = service_with(llm).await;

    let err = service.handle_query("something sneaky").await.unwrap_err();
    assert!(matches!(err, SqlGateError::PolicyViolation(_)));

    let schema = service.schema().await.unwrap();
    assert!(schema.table("customers").is_some());
}

#[tokio::test]
async fn test_code_fenced_response() {
    let llm = MockLlmClient::new().with_response(
        "suppliers",
        "Here you go:\n```sql\nSELECT company_name FROM suppliers ORDER BY company_name\n```",
    );
    let (_dir, service) = service_with(llm).await;

    let response = service.handle_query("list suppliers").await.unwrap();

    assert_eq!(response.columns, vec!["company_name"]);
    assert_eq!(response.row_count, 3);
    assert_eq!(response.explanation.as_deref(), Some("Here you go:"));
}

#[tokio::test]
async fn test_store_error_is_reported() {
    let llm = MockLlmClient::new().with_response(
        "ghost",
        r#"{"sql": "SELECT ghost_column FROM products"}"#,
    );
    let (_dir, service) = service_with(llm).await;

    let err = service.handle_query("ghost data").await.unwrap_err();

    assert!(matches!(err, SqlGateError::Execution(_)));
    assert!(err.public_message().contains("no such column"));
}

#[tokio::test]
async fn test_empty_question_is_rejected() {
    let (_dir, service) = service_with(MockLlmClient::new()).await;

    let err = service.handle_query("").await.unwrap_err();

    assert!(matches!(err, SqlGateError::InvalidInput(_)));
}
