//! Integration tests for sqlgate.

pub mod query_test;
pub mod schema_test;
pub mod seed_test;
pub mod service_test;
pub mod validator_test;

use db_sqlgate::config::DatabaseConfig;
use db_sqlgate::db::{seed_demo_database, SqliteClient};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, Executor};
use tempfile::TempDir;

/// Creates the demo database in a fresh temporary directory.
pub async fn seeded_client() -> (TempDir, SqliteClient) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ecommerce.db");
    seed_demo_database(&path, false).await.unwrap();
    let client = SqliteClient::new(&database_config(&path));
    (dir, client)
}

/// Creates a database from the given statements in a fresh temporary directory.
pub async fn fixture_client(statements: &[&str]) -> (TempDir, SqliteClient) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.db");
    write_statements(&path, statements, true).await;
    let client = SqliteClient::new(&database_config(&path));
    (dir, client)
}

/// Runs statements over a writable connection, as another process would.
pub async fn write_statements(path: &std::path::Path, statements: &[&str], create: bool) {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .connect()
        .await
        .unwrap();
    for sql in statements {
        conn.execute(*sql).await.unwrap();
    }
    conn.close().await.unwrap();
}

pub fn database_config(path: &std::path::Path) -> DatabaseConfig {
    DatabaseConfig {
        path: path.to_path_buf(),
        ..DatabaseConfig::default()
    }
}
