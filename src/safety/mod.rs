//! Statement safety module.
//!
//! Turns untrusted candidate SQL into a [`ValidatedStatement`]: a single,
//! allow-listed, read-only statement with no ambiguous wildcard projection.
//! The allow-list is the hard boundary; a `sqlparser`-backed classifier backs
//! it up. False rejections are acceptable, false acceptances are not.

mod parser;
mod validator;

pub use parser::{Classification, SqlClassifier};
pub use validator::{
    check_policy, check_single_read, expand_wildcard, has_unqualified_wildcard, leading_verb,
    normalize_candidate, require_from_clause,
};

use crate::config::SafetyConfig;
use crate::db::{DatabaseClient, Schema};
use crate::error::Result;
use std::fmt;
use tracing::debug;

/// The set of leading verbs permitted to reach execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyPolicy {
    allowed_verbs: Vec<String>,
}

impl SafetyPolicy {
    /// Creates a policy from a list of verbs. Verbs are compared ignoring case.
    pub fn new<I, S>(verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_verbs: verbs
                .into_iter()
                .map(|v| v.as_ref().trim().to_uppercase())
                .filter(|v| !v.is_empty())
                .collect(),
        }
    }

    /// Creates the policy described by the `[safety]` config section.
    pub fn from_config(config: &SafetyConfig) -> Self {
        Self::new(&config.allowed_operations)
    }

    /// Returns true if the given (upper-case) verb is allow-listed.
    pub fn allows(&self, verb: &str) -> bool {
        self.allowed_verbs.iter().any(|v| v == verb)
    }

    /// Returns the allow-listed verbs, upper-cased, in configured order.
    pub fn allowed_verbs(&self) -> &[String] {
        &self.allowed_verbs
    }

    /// Human-readable list, e.g. `SELECT, PRAGMA`.
    pub fn describe(&self) -> String {
        self.allowed_verbs.join(", ")
    }
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::new(["SELECT", "PRAGMA"])
    }
}

/// A statement that passed validation.
///
/// Can only be produced by the validator, and is consumed by
/// [`DatabaseClient::execute_query`], so each one is executed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct ValidatedStatement {
    sql: String,
    verb: String,
}

impl ValidatedStatement {
    pub(crate) fn new(sql: impl Into<String>, verb: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            verb: verb.into(),
        }
    }

    /// The statement text that will be executed.
    pub fn as_str(&self) -> &str {
        &self.sql
    }

    /// The allow-listed leading verb, upper-cased.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// Releases the statement text for execution.
    pub(crate) fn into_sql(self) -> String {
        self.sql
    }
}

impl fmt::Display for ValidatedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Validates candidate statements against a policy and the live schema.
pub struct StatementValidator<'a> {
    db: &'a dyn DatabaseClient,
    policy: &'a SafetyPolicy,
}

impl<'a> StatementValidator<'a> {
    /// Creates a validator reading the schema through `db`.
    pub fn new(db: &'a dyn DatabaseClient, policy: &'a SafetyPolicy) -> Self {
        Self { db, policy }
    }

    /// Validates a candidate statement.
    ///
    /// The schema is only read when the statement carries an unqualified
    /// wildcard that needs expanding.
    pub async fn validate(&self, candidate: &str) -> Result<ValidatedStatement> {
        let (sql, verb) = self.check(candidate)?;

        let sql = if has_unqualified_wildcard(&sql) {
            let schema = self.db.introspect_schema().await?;
            expand_wildcard(&sql, &schema)
        } else {
            sql
        };

        debug!("Validated {} statement: {}", verb, sql);
        Ok(ValidatedStatement::new(sql, verb))
    }

    /// Validates a candidate statement against an already-read schema.
    pub fn validate_with_schema(&self, candidate: &str, schema: &Schema) -> Result<ValidatedStatement> {
        let (sql, verb) = self.check(candidate)?;
        let sql = expand_wildcard(&sql, schema);
        Ok(ValidatedStatement::new(sql, verb))
    }

    /// Steps shared by both entry points: normalization, allow-list,
    /// structure, and the single-read-statement gate.
    fn check(&self, candidate: &str) -> Result<(String, String)> {
        let sql = normalize_candidate(candidate)?;
        let verb = check_policy(&sql, self.policy)?;
        if verb == "SELECT" {
            require_from_clause(&sql)?;
        }
        check_single_read(&sql, &verb)?;
        Ok((sql, verb))
    }
}
