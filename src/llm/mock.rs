//! Mock LLM client for testing.
//!
//! Provides deterministic responses based on input patterns.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{Result, SqlGateError};
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Patterns are matched case-insensitively against the last user message.
/// Custom responses are checked before the built-in ones, which target the
/// demo e-commerce database.
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    custom_responses: Vec<(String, String)>,
    failure: Option<String>,
    last_messages: Arc<Mutex<Vec<Message>>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the input contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Makes every completion fail with an LLM error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// The messages passed to the most recent completion.
    pub fn last_messages(&self) -> Vec<Message> {
        self.last_messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        if input_lower.contains("count") && input_lower.contains("customers") {
            return json_response(
                "SELECT COUNT(*) AS customer_count FROM customers",
                "Counts all customers.",
            );
        }

        if input_lower.contains("orders") && input_lower.contains("customer") {
            return json_response(
                "SELECT c.first_name, c.last_name, o.order_date, o.total_amount FROM customers AS c JOIN orders AS o ON c.id = o.customer_id ORDER BY o.order_date DESC LIMIT 10",
                "Most recent orders with the customer who placed them.",
            );
        }

        if input_lower.contains("products") {
            return json_response(
                "SELECT * FROM products LIMIT 10",
                "The first ten products.",
            );
        }

        if input_lower.contains("delete") {
            return json_response("DELETE FROM orders", "Deletes all orders.");
        }

        json_response("", "I don't understand that question.")
    }

    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

fn json_response(sql: &str, explanation: &str) -> String {
    serde_json::json!({ "sql": sql, "explanation": explanation }).to_string()
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        if let Ok(mut last) = self.last_messages.lock() {
            *last = messages.to_vec();
        }

        if let Some(message) = &self.failure {
            return Err(SqlGateError::llm(message.clone()));
        }

        let input = Self::extract_user_input(messages);
        Ok(self.mock_response(&input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::parse_llm_response;

    #[tokio::test]
    async fn test_default_products_response() {
        let client = MockLlmClient::new();
        let response = client
            .complete(&[Message::user("Query: show me products\nSQL:")])
            .await
            .unwrap();

        let parsed = parse_llm_response(&response);
        assert_eq!(parsed.sql.as_deref(), Some("SELECT * FROM products LIMIT 10"));
    }

    #[tokio::test]
    async fn test_custom_response_takes_precedence() {
        let client = MockLlmClient::new().with_response("PRODUCTS", "SELECT 1 FROM products");
        let response = client
            .complete(&[Message::user("all products")])
            .await
            .unwrap();
        assert_eq!(response, "SELECT 1 FROM products");
    }

    #[tokio::test]
    async fn test_unknown_question_yields_empty_sql() {
        let client = MockLlmClient::new();
        let response = client.complete(&[Message::user("weather?")]).await.unwrap();
        assert_eq!(parse_llm_response(&response).sql, None);
    }

    #[tokio::test]
    async fn test_records_last_messages() {
        let client = MockLlmClient::new();
        let messages = vec![Message::system("rules"), Message::user("products")];
        client.complete(&messages).await.unwrap();
        assert_eq!(client.last_messages(), messages);
    }

    #[tokio::test]
    async fn test_failing_client() {
        let client = MockLlmClient::failing("service unavailable");
        let err = client.complete(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, SqlGateError::Llm(_)));
        assert_eq!(client.last_messages().len(), 1);
    }
}
