//! Database schema types for sqlgate.
//!
//! Represents the structure of a database as an ordered list of tables and
//! their columns. The schema is re-read from the store on every request and
//! never cached.

use serde::{Deserialize, Serialize};

/// Represents the complete schema of a database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// All user tables, in the order the store reports them.
    pub tables: Vec<Table>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schema from the given tables.
    pub fn with_tables(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Returns true if the database has no user tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns the table names in schema order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Looks up a table by name.
    ///
    /// An exact match wins; otherwise the first table whose name matches
    /// ignoring ASCII case is returned, mirroring how SQLite resolves
    /// unquoted identifiers.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .or_else(|| self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
    }

    /// Returns the column names of a table in declaration order.
    pub fn columns_of(&self, table: &str) -> Option<Vec<&str>> {
        self.table(table).map(Table::column_names)
    }

    /// Formats the schema as the compact summary handed to the LLM.
    ///
    /// One line per table, `table (col1, col2, ...)`, in schema order.
    /// Identical schemas always produce identical text.
    pub fn summary(&self) -> String {
        self.tables
            .iter()
            .map(|table| format!("{} ({})\n", table.name, table.column_names().join(", ")))
            .collect()
    }

    /// Formats the schema for human display, including types and keys.
    pub fn format_for_display(&self) -> String {
        if self.tables.is_empty() {
            return "No tables found.\n".to_string();
        }

        self.tables
            .iter()
            .map(|table| {
                let column_lines = table
                    .columns
                    .iter()
                    .map(|column| format_column_line(table, column))
                    .collect::<String>();
                format!("Table: {}\n{}\n", table.name, column_lines)
            })
            .collect()
    }
}

fn format_column_line(table: &Table, column: &Column) -> String {
    let annotations = [
        table.primary_key.contains(&column.name).then_some("PK"),
        (!column.is_nullable).then_some("NOT NULL"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");

    let data_type = if column.data_type.is_empty() {
        "(untyped)"
    } else {
        column.data_type.as_str()
    };

    match (annotations.is_empty(), &column.default) {
        (false, Some(default)) => format!(
            "  - {}: {} ({}, DEFAULT {})\n",
            column.name, data_type, annotations, default
        ),
        (false, None) => format!("  - {}: {} ({})\n", column.name, data_type, annotations),
        (true, Some(default)) => {
            format!("  - {}: {} (DEFAULT {})\n", column.name, data_type, default)
        }
        (true, None) => format!("  - {}: {}\n", column.name, data_type),
    }
}

/// Represents a database table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Columns in declaration order.
    pub columns: Vec<Column>,

    /// Column names that form the primary key.
    pub primary_key: Vec<String>,
}

impl Table {
    /// Creates a new table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Returns the column names in declaration order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Represents a column in a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Declared type (e.g., "INTEGER", "TIMESTAMP"). Empty when undeclared.
    pub data_type: String,

    /// Whether the column allows NULL values.
    pub is_nullable: bool,

    /// Default value expression, if any.
    pub default: Option<String>,
}

impl Column {
    /// Creates a new column with the given name and data type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            default: None,
        }
    }

    /// Sets whether the column is nullable.
    pub fn nullable(self, nullable: bool) -> Self {
        Self {
            is_nullable: nullable,
            ..self
        }
    }

    /// Sets the default value.
    pub fn with_default(self, default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            ..self
        }
    }
}
