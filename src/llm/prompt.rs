//! Prompt construction for LLM requests.
//!
//! Builds the system prompt from the live schema summary and the allow-list.

use crate::llm::types::Message;
use crate::safety::SafetyPolicy;

/// System prompt template for the SQLite assistant.
const SYSTEM_PROMPT_TEMPLATE: &str = r#"You are a SQLite expert. Convert natural language questions to SQL following these rules.

DATABASE SCHEMA:
{schema}

SQLITE REQUIREMENTS:
1. Use SQLite date functions (DATE(), STRFTIME())
2. No stored procedures or user-defined functions
3. Table names are case-sensitive
4. Use LIMIT instead of TOP
5. Always qualify column names with table aliases
6. Use explicit JOIN syntax
7. Include only tables and columns that exist in the schema
8. Never include semicolons
9. Return exactly one statement starting with one of: {allowed}

EXAMPLE:
SELECT c.first_name, o.order_date
FROM customers AS c
JOIN orders AS o ON c.id = o.customer_id
WHERE o.total_amount > 100
ORDER BY o.order_date DESC
LIMIT 10

OUTPUT FORMAT:
Respond with a JSON object: {"sql": "<statement>", "explanation": "<one sentence>"}"#;

/// Shown in place of the schema when the store has no user tables.
const EMPTY_SCHEMA_TEXT: &str = "(no tables)";

/// Builds the system prompt with the schema summary and allow-list injected.
pub fn build_system_prompt(schema_summary: &str, policy: &SafetyPolicy) -> String {
    let schema_text = match schema_summary.trim_end() {
        "" => EMPTY_SCHEMA_TEXT,
        text => text,
    };
    SYSTEM_PROMPT_TEMPLATE
        .replace("{schema}", schema_text)
        .replace("{allowed}", &policy.describe())
}

/// Formats the user's question.
pub fn build_user_message(question: &str) -> String {
    format!("Query: {}\nSQL:", question)
}

/// Builds the complete message list for one translation request.
pub fn build_messages(schema_summary: &str, policy: &SafetyPolicy, question: &str) -> Vec<Message> {
    vec![
        Message::system(build_system_prompt(schema_summary, policy)),
        Message::user(build_user_message(question)),
    ]
}
