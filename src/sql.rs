//! SQL statement shaping
//!
//! The record graph only ever needs four statements, all keyed by a single
//! primary key:
//! - `select <cols> from <table> where <pk> = <value>`
//! - `update <table> set <col> = <value>, ... where <pk> = <value>`
//! - `insert into <table>(<cols>) values(<values>)`, or the connector's
//!   blank-row form when nothing is dirty
//! - `delete from <table> where <pk> = <value>`
//!
//! Identifiers and values always go through the connector's quoting.

use crate::connector::Connector;
use crate::value::{Value, DATETIME_FORMAT};

/// Quote an identifier with double quotes, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render a value as an SQL literal
pub fn quote_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) if r.is_finite() => {
            // keep a decimal point so the literal stays a REAL
            if r.fract() == 0.0 {
                format!("{:.1}", r)
            } else {
                r.to_string()
            }
        }
        Value::Real(_) => "NULL".to_string(),
        Value::Text(s) => quote_text(s),
        Value::Blob(b) => {
            let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
            format!("X'{}'", hex)
        }
        Value::DateTime(dt) => quote_text(&dt.format(DATETIME_FORMAT).to_string()),
    }
}

fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn where_key(db: &dyn Connector, pk_name: &str, pk_value: &Value) -> String {
    format!(
        "{} = {}",
        db.quote_identifier(pk_name),
        db.quote_value(pk_value)
    )
}

/// Build a SELECT of `columns` from the row identified by the primary key
pub fn select(
    db: &dyn Connector,
    table: &str,
    pk_name: &str,
    pk_value: &Value,
    columns: &[&str],
) -> String {
    let cols: Vec<String> = columns.iter().map(|c| db.quote_identifier(c)).collect();
    format!(
        "select {} from {} where {}",
        cols.join(", "),
        db.quote_identifier(table),
        where_key(db, pk_name, pk_value)
    )
}

/// Build an UPDATE of the given assignments on the row identified by the primary key
pub fn update(
    db: &dyn Connector,
    table: &str,
    pk_name: &str,
    pk_value: &Value,
    assignments: &[(&str, &Value)],
) -> String {
    let sets: Vec<String> = assignments
        .iter()
        .map(|(name, value)| {
            format!("{} = {}", db.quote_identifier(name), db.quote_value(value))
        })
        .collect();
    format!(
        "update {} set {} where {}",
        db.quote_identifier(table),
        sets.join(", "),
        where_key(db, pk_name, pk_value)
    )
}

/// Build an INSERT; an empty assignment list inserts a row of defaults
pub fn insert(db: &dyn Connector, table: &str, assignments: &[(&str, &Value)]) -> String {
    if assignments.is_empty() {
        return db.default_row_insert(table);
    }
    let (names, values): (Vec<String>, Vec<String>) = assignments
        .iter()
        .map(|(name, value)| (db.quote_identifier(name), db.quote_value(value)))
        .unzip();
    format!(
        "insert into {}({}) values({})",
        db.quote_identifier(table),
        names.join(", "),
        values.join(", ")
    )
}

/// Build a DELETE of the row identified by the primary key
pub fn delete(db: &dyn Connector, table: &str, pk_name: &str, pk_value: &Value) -> String {
    format!(
        "delete from {} where {}",
        db.quote_identifier(table),
        where_key(db, pk_name, pk_value)
    )
}
