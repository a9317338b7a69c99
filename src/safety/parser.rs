//! SQL parsing backstop for the verb allow-list.
//!
//! Uses sqlparser-rs with the SQLite dialect to confirm that a candidate is
//! exactly one read-only statement.

use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use crate::error::{Result, SqlGateError};

/// What the parser found in a candidate statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// One query, plain PRAGMA, or EXPLAIN of a read.
    SingleRead,
    /// More than one statement.
    Multiple,
    /// One statement that reads and writes or is not a read at all.
    NotRead,
}

/// SQL classifier that parses candidates with the SQLite dialect.
#[derive(Debug)]
pub struct SqlClassifier {
    dialect: SQLiteDialect,
}

impl Default for SqlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlClassifier {
    /// Creates a new SQL classifier.
    pub fn new() -> Self {
        Self {
            dialect: SQLiteDialect {},
        }
    }

    /// Classifies a SQL string, reporting parse failures as errors.
    pub fn try_classify(&self, sql: &str) -> Result<Classification> {
        let statements = Parser::parse_sql(&self.dialect, sql)
            .map_err(|e| SqlGateError::malformed(format!("SQL parse error: {}", e)))?;

        match statements.as_slice() {
            [] => Err(SqlGateError::malformed("Empty SQL statement")),
            [statement] if is_read(statement) => Ok(Classification::SingleRead),
            [_] => Ok(Classification::NotRead),
            _ => Ok(Classification::Multiple),
        }
    }
}

fn is_read(statement: &Statement) -> bool {
    match statement {
        Statement::Query(_) => true,
        // Assignments are caught lexically before parsing; the read form
        // (`PRAGMA table_info(t)`) only reports.
        Statement::Pragma { .. } => true,
        // SQLite's EXPLAIN never runs the statement, but explaining a write
        // is still refused.
        Statement::Explain { statement, .. } => is_read(statement),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(sql: &str) -> Classification {
        SqlClassifier::new().try_classify(sql).unwrap()
    }

    #[test]
    fn test_selects_are_single_reads() {
        for sql in [
            "SELECT * FROM products",
            "select name from products",
            "SELECT c.first_name, o.total_amount FROM customers c JOIN orders o ON c.id = o.customer_id",
            "SELECT * FROM products WHERE id IN (SELECT product_id FROM order_details)",
            "SELECT name, price FROM products ORDER BY price DESC LIMIT 10",
        ] {
            assert_eq!(classify(sql), Classification::SingleRead, "{sql}");
        }
    }

    #[test]
    fn test_pragma_read_is_single_read() {
        assert_eq!(
            classify("PRAGMA table_info(products)"),
            Classification::SingleRead
        );
    }

    #[test]
    fn test_explain_follows_inner_statement() {
        assert_eq!(
            classify("EXPLAIN SELECT * FROM products"),
            Classification::SingleRead
        );
        assert_eq!(
            classify("EXPLAIN DELETE FROM products"),
            Classification::NotRead
        );
    }

    #[test]
    fn test_writes_are_not_reads() {
        for sql in [
            "INSERT INTO products (name, price) VALUES ('Lamp', 19.99)",
            "UPDATE orders SET status = 'canceled' WHERE id = 3",
            "DELETE FROM orders WHERE status = 'canceled'",
            "DROP TABLE IF EXISTS products",
            "ALTER TABLE customers ADD COLUMN nickname TEXT",
            "CREATE INDEX idx_products_sku ON products(sku)",
        ] {
            assert_eq!(classify(sql), Classification::NotRead, "{sql}");
        }
    }

    #[test]
    fn test_stacked_statements_are_multiple() {
        assert_eq!(
            classify("SELECT * FROM products; DELETE FROM orders"),
            Classification::Multiple
        );
        assert_eq!(
            classify("SELECT * FROM products; SELECT COUNT(*) FROM orders"),
            Classification::Multiple
        );
    }

    #[test]
    fn test_trailing_terminator_is_single_statement() {
        assert_eq!(
            classify("SELECT name FROM products;"),
            Classification::SingleRead
        );
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let err = SqlClassifier::new()
            .try_classify("THIS IS NOT VALID SQL AT ALL")
            .unwrap_err();
        assert!(matches!(err, SqlGateError::MalformedStatement(_)));
    }

    #[test]
    fn test_empty_sql_is_reported() {
        let err = SqlClassifier::new().try_classify("   \n\t  ").unwrap_err();
        assert!(matches!(err, SqlGateError::MalformedStatement(_)));
    }
}
