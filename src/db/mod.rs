//! Database abstraction layer for sqlgate.
//!
//! Provides a trait-based interface for the two things the pipeline asks of
//! a store: reading its schema and running one validated statement.

mod mock;
mod schema;
mod seed;
mod sqlite;
pub mod temporal;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use schema::{Column, Schema, Table};
pub use seed::seed_demo_database;
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::error::Result;
use crate::safety::ValidatedStatement;
use async_trait::async_trait;

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with SqlGateError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Reads the current schema from the store's catalog.
    ///
    /// Never cached: every call observes the schema as it is now.
    async fn introspect_schema(&self) -> Result<Schema>;

    /// Executes a validated statement and returns its results.
    ///
    /// The statement is consumed; it cannot be run twice.
    async fn execute_query(&self, statement: ValidatedStatement) -> Result<QueryResult>;
}
