//! sqlgate - ask questions of a SQLite database in plain language.
//!
//! Generated SQL is untrusted. It is checked against a verb allow-list and
//! the live schema before it reaches a read-only connection, and results
//! come back as escaped HTML.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod render;
pub mod safety;
pub mod service;
