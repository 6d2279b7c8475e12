//! Connector Layer - the only place SQL text meets a database
//!
//! The record graph builds statements and hands them to a [`Connector`]:
//! - `query` for single-row SELECTs by primary key
//! - `exec` for INSERT/UPDATE/DELETE
//! - `last_insert_id` right after an INSERT on the same connection
//! - `quote_identifier`/`quote_value` for every name and literal

pub mod sqlite;

pub use sqlite::SqliteConnector;

use std::collections::HashMap;
use crate::Result;
use crate::sql;
use crate::value::Value;

/// A single result row, keyed by column name
pub type Row = HashMap<String, Value>;

/// Executes text SQL on behalf of a record graph.
///
/// Failures are reported as [`crate::Error::Statement`] carrying the SQL that
/// was sent. Implementations never retry.
pub trait Connector {
    /// Run a query and return its first row, if any
    fn query(&self, sql: &str) -> Result<Option<Row>>;

    /// Run a statement that returns no rows
    fn exec(&self, sql: &str) -> Result<()>;

    /// Primary key generated by the most recent INSERT on this connection
    fn last_insert_id(&self) -> Result<Value>;

    fn quote_identifier(&self, name: &str) -> String {
        sql::quote_identifier(name)
    }

    fn quote_value(&self, value: &Value) -> String {
        sql::quote_literal(value)
    }

    /// INSERT of a row made only of column defaults
    fn default_row_insert(&self, table: &str) -> String {
        format!("insert into {} default values", self.quote_identifier(table))
    }
}
