//! SQLite connector implementation

use std::path::Path;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use crate::{Error, Result};
use crate::value::Value;
use super::{Connector, Row};

/// SQLite-backed connector
pub struct SqliteConnector {
    conn: Connection,
}

impl SqliteConnector {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| Error::statement(format!("open {}", path.display()), e))?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::statement("open :memory:", e))?;
        Ok(Self { conn })
    }

    /// Run several `;`-separated statements, e.g. schema set-up
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!("batch: {}", sql);
        self.conn
            .execute_batch(sql)
            .map_err(|e| Error::statement(sql, e))
    }

    fn value_from_ref(value: ValueRef<'_>) -> Value {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl Connector for SqliteConnector {
    fn query(&self, sql: &str) -> Result<Option<Row>> {
        tracing::debug!("query: {}", sql);
        let mut stmt = self.conn.prepare(sql).map_err(|e| Error::statement(sql, e))?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let mut rows = stmt.query([]).map_err(|e| Error::statement(sql, e))?;
        let Some(row) = rows.next().map_err(|e| Error::statement(sql, e))? else {
            return Ok(None);
        };

        let mut result = Row::with_capacity(names.len());
        for (i, name) in names.into_iter().enumerate() {
            let value = row.get_ref(i).map_err(|e| Error::statement(sql, e))?;
            result.insert(name, Self::value_from_ref(value));
        }
        Ok(Some(result))
    }

    fn exec(&self, sql: &str) -> Result<()> {
        tracing::debug!("exec: {}", sql);
        self.conn
            .execute(sql, [])
            .map(|_| ())
            .map_err(|e| Error::statement(sql, e))
    }

    fn last_insert_id(&self) -> Result<Value> {
        Ok(Value::Integer(self.conn.last_insert_rowid()))
    }
}
