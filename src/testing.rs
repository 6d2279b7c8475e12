//! Test support: an in-memory SQLite connector that records every statement

use std::cell::RefCell;
use crate::Result;
use crate::connector::{Connector, Row, SqliteConnector};
use crate::value::Value;

/// Tables `t0`..`t3` share one shape so any of them can be joined to any other.
const SCHEMA: &str = r#"
CREATE TABLE t0 (id INTEGER PRIMARY KEY, title TEXT, created_at TEXT, t1_id INTEGER, t2_id INTEGER, t3_id INTEGER, ref TEXT);
CREATE TABLE t1 (id INTEGER PRIMARY KEY, title TEXT, created_at TEXT, t1_id INTEGER, t2_id INTEGER, t3_id INTEGER, ref TEXT);
CREATE TABLE t2 (id INTEGER PRIMARY KEY, title TEXT, created_at TEXT, t1_id INTEGER, t2_id INTEGER, t3_id INTEGER, ref TEXT);
CREATE TABLE t3 (id INTEGER PRIMARY KEY, title TEXT, created_at TEXT, t1_id INTEGER, t2_id INTEGER, t3_id INTEGER, ref TEXT);
"#;

pub(crate) struct RecordingConnector {
    inner: SqliteConnector,
    log: RefCell<Vec<String>>,
}

impl RecordingConnector {
    pub(crate) fn new() -> Self {
        let inner = SqliteConnector::open_in_memory().unwrap();
        inner.execute_batch(SCHEMA).unwrap();
        Self {
            inner,
            log: RefCell::new(Vec::new()),
        }
    }

    /// Run set-up SQL without recording it
    pub(crate) fn seed(&self, sql: &str) {
        self.inner.execute_batch(sql).unwrap();
    }

    /// Statements sent since the last call, oldest first
    pub(crate) fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.borrow_mut())
    }

    /// Read a single value straight from the database
    pub(crate) fn lookup(&self, sql: &str, column: &str) -> Value {
        self.inner
            .query(sql)
            .unwrap()
            .and_then(|mut row| row.remove(column))
            .unwrap_or(Value::Null)
    }
}

impl Connector for RecordingConnector {
    fn query(&self, sql: &str) -> Result<Option<Row>> {
        self.log.borrow_mut().push(sql.to_string());
        self.inner.query(sql)
    }

    fn exec(&self, sql: &str) -> Result<()> {
        self.log.borrow_mut().push(sql.to_string());
        self.inner.exec(sql)
    }

    fn last_insert_id(&self) -> Result<Value> {
        self.inner.last_insert_id()
    }
}
