//! SQLite database client implementation.
//!
//! Provides the `SqliteClient` struct that implements the `DatabaseClient`
//! trait using sqlx. Every call opens its own read-only connection and closes
//! it before returning; nothing is pooled between requests.

use crate::config::DatabaseConfig;
use crate::db::temporal::{decode_temporal, is_temporal_type};
use crate::db::{Column, ColumnInfo, DatabaseClient, QueryResult, Row, Schema, Table, Value};
use crate::error::{Result, SqlGateError};
use crate::safety::ValidatedStatement;
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{
    Column as SqlxColumn, ConnectOptions, Connection, Executor, Row as SqlxRow, Statement,
    TypeInfo, ValueRef,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// SQLite database client.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    path: PathBuf,
    busy_timeout: Duration,
    query_timeout: Duration,
}

impl SqliteClient {
    /// Creates a client for the database file named in the configuration.
    ///
    /// No connection is opened until the first call.
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            path: config.path.clone(),
            busy_timeout: Duration::from_secs(config.busy_timeout_secs),
            query_timeout: Duration::from_secs(config.query_timeout_secs),
        }
    }

    /// Returns the path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh read-only connection.
    async fn open(&self) -> Result<SqliteConnection> {
        if !self.path.exists() {
            return Err(SqlGateError::connection(format!(
                "Database file not found: {}",
                self.path.display()
            )));
        }

        debug!("Opening {}", self.path.display());

        SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true)
            .busy_timeout(self.busy_timeout)
            .connect()
            .await
            .map_err(|e| {
                SqlGateError::connection(format!(
                    "Cannot open {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    async fn introspect_schema(&self) -> Result<Schema> {
        let mut conn = self.open().await?;
        let tables = fetch_tables(&mut conn).await;
        close_connection(conn).await;

        Ok(Schema::with_tables(tables?))
    }

    async fn execute_query(&self, statement: ValidatedStatement) -> Result<QueryResult> {
        let start = Instant::now();
        let sql = statement.into_sql();
        let mut conn = self.open().await?;

        debug!("Executing: {}", sql);

        match tokio::time::timeout(self.query_timeout, run_statement(&mut conn, &sql)).await {
            Ok(result) => {
                close_connection(conn).await;
                Ok(result?.with_execution_time(start.elapsed()))
            }
            Err(_) => {
                // The worker may still be stepping the statement; dropping the
                // connection releases it once the step returns.
                warn!(
                    "Statement exceeded {}s, abandoning connection",
                    self.query_timeout.as_secs()
                );
                drop(conn);
                Err(SqlGateError::execution(format!(
                    "Statement timed out after {} seconds",
                    self.query_timeout.as_secs()
                )))
            }
        }
    }
}

async fn close_connection(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection: {}", e);
    }
}

/// Prepares and runs a statement, materializing every row it produces.
///
/// Rows that cannot be converted are skipped and counted. Temporal cells that
/// match no accepted encoding are kept as text and counted.
async fn run_statement(conn: &mut SqliteConnection, sql: &str) -> Result<QueryResult> {
    let statement = (&mut *conn)
        .prepare(sql)
        .await
        .map_err(map_statement_error)?;

    let columns: Vec<ColumnInfo> = statement
        .columns()
        .iter()
        .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
        .collect();

    if columns.is_empty() {
        // Nothing to project; run it for completeness and report no data.
        (&mut *conn)
            .execute(statement.query())
            .await
            .map_err(map_statement_error)?;
        return Ok(QueryResult::new());
    }

    let temporal: Vec<bool> = columns
        .iter()
        .map(|c| is_temporal_type(&c.data_type))
        .collect();

    let mut rows = Vec::new();
    let mut skipped_rows = 0;
    let mut temporal_decode_failures = 0;

    let mut stream = statement.query().fetch(&mut *conn);
    while let Some(row) = stream.try_next().await.map_err(map_statement_error)? {
        match convert_row(&row, &columns, &temporal, &mut temporal_decode_failures) {
            Ok(converted) => rows.push(converted),
            Err(e) => {
                skipped_rows += 1;
                warn!("Skipping row {} that could not be read: {}", rows.len() + skipped_rows, e);
            }
        }
    }
    drop(stream);

    let mut result = QueryResult::with_data(columns, rows);
    result.skipped_rows = skipped_rows;
    result.temporal_decode_failures = temporal_decode_failures;
    Ok(result)
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(
    row: &SqliteRow,
    columns: &[ColumnInfo],
    temporal: &[bool],
    temporal_decode_failures: &mut usize,
) -> std::result::Result<Row, sqlx::Error> {
    let mut converted = Row::with_capacity(columns.len());

    for (index, column) in columns.iter().enumerate() {
        let is_temporal = temporal.get(index).copied().unwrap_or(false);
        let value = convert_value(row, index, is_temporal, temporal_decode_failures)?;
        converted.push(column.name.clone(), value);
    }

    Ok(converted)
}

/// Converts a single cell according to its storage class.
///
/// SQLite is dynamically typed, so the storage class of the value decides
/// the conversion; the declared column type only marks temporal columns.
fn convert_value(
    row: &SqliteRow,
    index: usize,
    is_temporal: bool,
    temporal_decode_failures: &mut usize,
) -> std::result::Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let type_info = raw.type_info();
    let value = match type_info.name() {
        "INTEGER" | "BOOLEAN" => Value::Int(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" | "NUMERIC" => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => Value::Bytes(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        _ => {
            let text: String = row.try_get_unchecked(index)?;
            if is_temporal {
                match decode_temporal(&text) {
                    Ok(ts) => Value::Timestamp(ts),
                    Err(e) => {
                        warn!("{}; keeping the stored text", e);
                        *temporal_decode_failures += 1;
                        Value::String(text)
                    }
                }
            } else {
                Value::String(text)
            }
        }
    };

    Ok(value)
}

/// Fetches all user tables and their columns.
async fn fetch_tables(conn: &mut SqliteConnection) -> Result<Vec<Table>> {
    let table_names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
        ORDER BY name
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| SqlGateError::connection(format!("Failed to fetch tables: {e}")))?;

    let mut tables = Vec::with_capacity(table_names.len());

    for table_name in table_names {
        let rows: Vec<(String, String, i64, Option<String>, i64)> = sqlx::query_as(
            r#"
            SELECT name, type, "notnull", dflt_value, pk
            FROM pragma_table_info(?1)
            ORDER BY cid
            "#,
        )
        .bind(&table_name)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            SqlGateError::connection(format!("Failed to fetch columns for {table_name}: {e}"))
        })?;

        let mut primary_key: Vec<(i64, String)> = rows
            .iter()
            .filter(|(_, _, _, _, pk)| *pk > 0)
            .map(|(name, _, _, _, pk)| (*pk, name.clone()))
            .collect();
        primary_key.sort();

        let columns = rows
            .into_iter()
            .map(|(name, data_type, not_null, default, _)| Column {
                name,
                data_type,
                is_nullable: not_null == 0,
                default,
            })
            .collect();

        tables.push(Table {
            name: table_name,
            columns,
            primary_key: primary_key.into_iter().map(|(_, name)| name).collect(),
        });
    }

    Ok(tables)
}

/// Maps a failure inside the store to an execution error carrying the
/// store's own message.
fn map_statement_error(error: sqlx::Error) -> SqlGateError {
    match error.as_database_error() {
        Some(db_error) => SqlGateError::execution(db_error.message().to_string()),
        None => SqlGateError::execution(error.to_string()),
    }
}
