//! The question-to-table pipeline.
//!
//! [`QueryService`] wires the completion service, the statement validator,
//! the store and the renderer together. It is built once per process and
//! holds no per-request state.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::{DatabaseClient, QueryResult, Schema};
use crate::error::{Result, SqlGateError};
use crate::llm::{build_messages, parse_llm_response, LlmClient};
use crate::render::render_result;
use crate::safety::{SafetyPolicy, StatementValidator, ValidatedStatement};

/// Response to one handled query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    /// The statement that was executed, after wildcard expansion.
    pub sql: String,
    /// Rendered table markup.
    pub html: String,
    /// Column names in projection order.
    pub columns: Vec<String>,
    /// Number of rows rendered.
    pub row_count: usize,
    /// Rows dropped because a value could not be decoded.
    pub skipped_rows: usize,
    /// Temporal cells that could not be decoded and were kept as text.
    pub temporal_decode_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QueryResponse {
    fn from_result(sql: String, result: &QueryResult, explanation: Option<String>) -> Self {
        Self {
            sql,
            html: render_result(result),
            columns: result.column_names(),
            row_count: result.rows.len(),
            skipped_rows: result.skipped_rows,
            temporal_decode_failures: result.temporal_decode_failures,
            explanation,
        }
    }
}

/// Turns natural-language questions into rendered result tables.
pub struct QueryService {
    llm: Box<dyn LlmClient>,
    db: Arc<dyn DatabaseClient>,
    policy: SafetyPolicy,
    max_question_length: usize,
}

impl QueryService {
    pub fn new(
        llm: Box<dyn LlmClient>,
        db: Arc<dyn DatabaseClient>,
        policy: SafetyPolicy,
        max_question_length: usize,
    ) -> Self {
        Self {
            llm,
            db,
            policy,
            max_question_length,
        }
    }

    /// Builds a service using the `[safety]` section of `config`.
    pub fn from_config(
        llm: Box<dyn LlmClient>,
        db: Arc<dyn DatabaseClient>,
        config: &Config,
    ) -> Self {
        Self::new(
            llm,
            db,
            SafetyPolicy::from_config(&config.safety),
            config.safety.max_question_length,
        )
    }

    pub fn policy(&self) -> &SafetyPolicy {
        &self.policy
    }

    /// Answers a natural-language question with a rendered table.
    ///
    /// The schema is read once per call and used both for the prompt and
    /// for wildcard expansion.
    pub async fn handle_query(&self, question: &str) -> Result<QueryResponse> {
        let question = self.check_question(question)?;
        let start = Instant::now();

        let schema = self.db.introspect_schema().await?;
        let messages = build_messages(&schema.summary(), &self.policy, question);

        let raw = self.llm.complete(&messages).await?;
        debug!("Completion response: {}", raw);

        let parsed = parse_llm_response(&raw);
        let candidate = parsed
            .sql
            .ok_or_else(|| SqlGateError::invalid_input("Could not turn the question into SQL"))?;

        let statement = match StatementValidator::new(self.db.as_ref(), &self.policy)
            .validate_with_schema(&candidate, &schema)
        {
            Ok(statement) => statement,
            Err(e) => {
                warn!(category = e.category(), "Rejected generated statement: {}", e);
                return Err(e);
            }
        };

        let response = self.execute(statement, parsed.explanation).await?;
        info!(
            rows = response.row_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Answered question"
        );
        Ok(response)
    }

    /// Runs a hand-written statement through validation, execution and
    /// rendering. The completion service is not involved.
    pub async fn run_sql(&self, candidate: &str) -> Result<QueryResponse> {
        let statement = StatementValidator::new(self.db.as_ref(), &self.policy)
            .validate(candidate)
            .await?;
        self.execute(statement, None).await
    }

    /// Reads the current schema.
    pub async fn schema(&self) -> Result<Schema> {
        self.db.introspect_schema().await
    }

    fn check_question<'q>(&self, question: &'q str) -> Result<&'q str> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SqlGateError::invalid_input("Question must not be empty"));
        }
        let length = question.chars().count();
        if length > self.max_question_length {
            return Err(SqlGateError::invalid_input(format!(
                "Question is {} characters long; the limit is {}",
                length, self.max_question_length
            )));
        }
        Ok(question)
    }

    async fn execute(
        &self,
        statement: ValidatedStatement,
        explanation: Option<String>,
    ) -> Result<QueryResponse> {
        let sql = statement.as_str().to_string();
        info!(verb = statement.verb(), "Executing: {}", sql);

        let result = self.db.execute_query(statement).await?;
        result.check_shape()?;

        if result.skipped_rows > 0 {
            warn!(
                skipped = result.skipped_rows,
                "Some rows could not be decoded and were left out"
            );
        }

        Ok(QueryResponse::from_result(sql, &result, explanation))
    }
}
