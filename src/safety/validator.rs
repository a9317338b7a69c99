//! Candidate statement checks and wildcard expansion.
//!
//! Each step of validation is a plain function over the statement text so
//! the steps can be tested on their own. `StatementValidator` chains them.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::db::Schema;
use crate::error::{Result, SqlGateError};

use super::{Classification, SafetyPolicy, SqlClassifier};

fn from_keyword() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bFROM\b").expect("valid FROM pattern"))
}

/// A bare `*` that opens a projection (optionally after DISTINCT or ALL) or
/// is an item of its column list. Group 1 is the star itself.
fn unqualified_wildcard() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:\bSELECT\s+(?:(?:DISTINCT|ALL)\s+)?|,\s*)(\*)\s*(?:,|\bFROM\b)")
            .expect("valid wildcard pattern")
    })
}

fn from_table() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\bFROM\s+(?:"([^"]+)"|(\w+))"#).expect("valid table pattern")
    })
}

fn pragma_assignment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)^\s*PRAGMA\s+[^=(]*=").expect("valid pragma pattern")
    })
}

fn simple_identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"))
}

/// Trims whitespace and strips trailing `;` terminators.
///
/// A `;` followed by more SQL is kept for the later checks to judge.
pub fn normalize_candidate(candidate: &str) -> Result<String> {
    let stripped = candidate
        .trim()
        .trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    if stripped.is_empty() {
        return Err(SqlGateError::malformed("Empty statement"));
    }

    Ok(stripped.to_string())
}

/// Returns the statement's first token, upper-cased.
pub fn leading_verb(sql: &str) -> Option<String> {
    let token = sql
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or_default();

    if token.is_empty() {
        None
    } else {
        Some(token.to_uppercase())
    }
}

/// Checks the leading verb against the allow-list and returns it.
pub fn check_policy(sql: &str, policy: &SafetyPolicy) -> Result<String> {
    match leading_verb(sql) {
        Some(verb) if policy.allows(&verb) => Ok(verb),
        Some(verb) => Err(SqlGateError::policy(format!(
            "Only {} statements are allowed, got {}",
            policy.describe(),
            verb
        ))),
        None => Err(SqlGateError::policy(format!(
            "Only {} statements are allowed",
            policy.describe()
        ))),
    }
}

/// A `SELECT` must name a source with a `FROM` keyword.
pub fn require_from_clause(sql: &str) -> Result<()> {
    if from_keyword().is_match(sql) {
        Ok(())
    } else {
        Err(SqlGateError::malformed("Missing FROM clause"))
    }
}

/// Rejects anything other than one read-only statement.
///
/// Statements the SQL parser understands are classified from their syntax
/// tree. Statements it cannot parse (SQLite has syntax the parser lacks) are
/// scanned for a statement separator outside quotes and comments, and are
/// otherwise left for the store to judge.
pub fn check_single_read(sql: &str, verb: &str) -> Result<()> {
    if verb == "PRAGMA" && pragma_assignment().is_match(sql) {
        return Err(SqlGateError::policy("PRAGMA assignments are not allowed"));
    }

    match SqlClassifier::new().try_classify(sql) {
        Ok(Classification::SingleRead) => Ok(()),
        Ok(Classification::Multiple) => Err(SqlGateError::policy(
            "Only a single statement is allowed",
        )),
        Ok(Classification::NotRead) => Err(SqlGateError::policy(
            "Only read-only statements are allowed",
        )),
        Err(e) => {
            debug!("Parser could not classify statement ({}); scanning instead", e);
            if has_trailing_statement(sql) {
                Err(SqlGateError::policy("Only a single statement is allowed"))
            } else {
                Ok(())
            }
        }
    }
}

/// Returns true if a `;` outside quotes or comments is followed by more SQL.
pub fn has_trailing_statement(sql: &str) -> bool {
    let bytes = sql.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => i = skip_past(bytes, i + 1, quote),
            b'[' => i = skip_past(bytes, i + 1, b']'),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_past(bytes, i + 2, b'\n'),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = bytes[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(bytes.len(), |p| i + 2 + p + 2);
            }
            b';' => {
                return !sql[i + 1..]
                    .chars()
                    .all(|c| c.is_whitespace() || c == ';');
            }
            _ => i += 1,
        }
    }

    false
}

fn skip_past(bytes: &[u8], start: usize, close: u8) -> usize {
    bytes
        .get(start..)
        .and_then(|rest| rest.iter().position(|&b| b == close))
        .map_or(bytes.len(), |p| start + p + 1)
}

/// Returns true if the statement projects an unqualified `*`.
pub fn has_unqualified_wildcard(sql: &str) -> bool {
    unqualified_wildcard().is_match(sql)
}

/// Rewrites the first unqualified `*` projection into an explicit column list.
///
/// The source table is the first `FROM <table>` after the wildcard. If there
/// is none, or the schema does not know it, the statement is returned
/// unchanged. Only the first wildcard is rewritten.
pub fn expand_wildcard(sql: &str, schema: &Schema) -> String {
    let Some(star) = unqualified_wildcard()
        .captures(sql)
        .and_then(|caps| caps.get(1))
    else {
        return sql.to_string();
    };

    let tail = &sql[star.end()..];
    let Some(table) = from_table()
        .captures(tail)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
    else {
        return sql.to_string();
    };

    let columns = match schema.columns_of(table.as_str()) {
        Some(columns) if !columns.is_empty() => columns,
        _ => {
            debug!("No schema for '{}'; leaving wildcard in place", table.as_str());
            return sql.to_string();
        }
    };

    let column_list = columns
        .iter()
        .map(|name| quote_identifier(name))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{}{}{}", &sql[..star.start()], column_list, &sql[star.end()..])
}

/// Quotes a column name unless it is a plain identifier.
fn quote_identifier(name: &str) -> String {
    if simple_identifier().is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}
