//! # dbrecord - Path-addressed record graphs over SQL
//!
//! Describe a graph of rows linked by foreign keys with compact path
//! expressions, then save, fetch or delete the whole graph with the minimal
//! set of correctly ordered statements.
//!
//! dbrecord provides:
//! - A path grammar (`table2[table1.table2_id].title`) resolved into a
//!   de-duplicated graph of records, columns and join edges
//! - Per-column dirty tracking and lazy, minimal SELECTs
//! - Cascading saves (children first, foreign keys filled in) and deletes
//! - A [`Connector`] seam with a SQLite implementation
//!
//! ```no_run
//! use dbrecord::{Record, SqliteConnector};
//!
//! # fn main() -> dbrecord::Result<()> {
//! let db = SqliteConnector::open_in_memory()?;
//! let mut record = Record::new(&db, "table0");
//! record.save([("title", "Title"), ("table1.title", "Title 1")])?;
//! let values = record.fetch(["id", "table1.title"])?;
//! # Ok(())
//! # }
//! ```

pub mod value;
pub mod path;
pub mod sql;
pub mod connector;
pub mod record;
pub mod config;
pub mod output;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use connector::{Connector, Row, SqliteConnector};
pub use path::{ColumnPath, PathSyntaxError, TableSpec};
pub use record::{ColumnId, EdgeId, NodeId, Record};
pub use value::Value;

/// Result type alias for dbrecord operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for dbrecord operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    PathSyntax(#[from] PathSyntaxError),

    #[error("Statement failed: {message} [{sql}]")]
    Statement { sql: String, message: String },

    #[error("No row in `{table}` for {key} (record was deleted outside this graph?) [{sql}]")]
    MissingRow {
        table: String,
        key: String,
        sql: String,
    },

    #[error("Unknown record node: {0}")]
    UnknownNode(u32),

    #[error("Unknown column: {0}")]
    UnknownColumn(u32),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Primary key `{column}` of `{table}` cannot be reset")]
    KeyReset { table: String, column: String },
}

impl Error {
    /// Build a statement error from any driver error
    pub fn statement(sql: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Error::Statement {
            sql: sql.into(),
            message: err.to_string(),
        }
    }

    /// SQL text that caused the failure, if any
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Statement { sql, .. } | Error::MissingRow { sql, .. } => Some(sql),
            _ => None,
        }
    }
}
