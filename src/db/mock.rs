//! Mock database clients for testing.
//!
//! Provides in-memory implementations so the pipeline can be exercised
//! without a database file.

use super::{ColumnInfo, DatabaseClient, QueryResult, Row, Schema, Value};
use crate::error::{Result, SqlGateError};
use crate::safety::ValidatedStatement;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A mock database client that returns predefined results.
///
/// Records every statement it is asked to execute and counts schema reads.
#[derive(Default)]
pub struct MockDatabaseClient {
    schema: Schema,
    results: Vec<(String, QueryResult)>,
    executed: Mutex<Vec<String>>,
    introspections: AtomicUsize,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new mock database client with the given schema.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Returns `result` for any statement containing `pattern` (case-insensitive).
    ///
    /// Patterns are checked in registration order.
    pub fn with_result(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.results.push((pattern.into().to_lowercase(), result));
        self
    }

    /// Returns the statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Returns how many times the schema has been read.
    pub fn introspection_count(&self) -> usize {
        self.introspections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        self.introspections.fetch_add(1, Ordering::SeqCst);
        Ok(self.schema.clone())
    }

    async fn execute_query(&self, statement: ValidatedStatement) -> Result<QueryResult> {
        let sql = statement.into_sql();
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(sql.clone());
        }

        let lowered = sql.to_lowercase();
        if let Some((_, result)) = self
            .results
            .iter()
            .find(|(pattern, _)| lowered.contains(pattern.as_str()))
        {
            return Ok(result.clone());
        }

        // Default: a single row echoing the statement.
        let columns = vec![ColumnInfo::new("result", "TEXT")];
        let mut row = Row::with_capacity(1);
        row.push("result", Value::String(format!("Mock result for: {sql}")));

        Ok(QueryResult::with_data(columns, vec![row]).with_execution_time(Duration::from_millis(1)))
    }
}

/// A database client whose every call fails.
///
/// Used to exercise error paths in the pipeline.
pub struct FailingDatabaseClient {
    message: String,
}

impl FailingDatabaseClient {
    /// Creates a client that fails with the given store message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        Err(SqlGateError::connection(self.message.clone()))
    }

    async fn execute_query(&self, _statement: ValidatedStatement) -> Result<QueryResult> {
        Err(SqlGateError::execution(self.message.clone()))
    }
}
