//! Save, fetch and delete traversal over the record graph
//!
//! Order of statements:
//! - Save: children first (edge registration order), then the node itself
//! - Fetch: one SELECT of the node's clean columns
//! - Delete: children first, then the node itself
//!
//! A failed statement stops the cascade; nothing is rolled back here.

use crate::{Error, Result};
use crate::sql;
use crate::value::Value;
use super::{ColumnId, NodeId, Record};

impl Record<'_> {
    /// Persist pending changes of `node` and everything joined to it.
    pub fn save_node(&mut self, node: NodeId) -> Result<()> {
        self.check_node(node)?;
        self.save_cascade(node)
    }

    /// Load every clean column of `node` from its row.
    pub fn fetch_node(&mut self, node: NodeId) -> Result<()> {
        self.check_node(node)?;

        if self.is_new(node) {
            // no row yet, clean values stay unknown
            self.nodes[node.index()].updated = true;
            return Ok(());
        }

        let clean: Vec<ColumnId> = self
            .n(node)
            .columns
            .iter()
            .copied()
            .filter(|c| !self.col(*c).is_dirty())
            .collect();

        if !clean.is_empty() {
            let record = self.n(node);
            let pk = self.col(record.primary_key);
            let pk_value = pk.current();
            let names: Vec<&str> = clean.iter().map(|c| self.col(*c).name()).collect();
            let stmt = sql::select(self.db, &record.table, pk.name(), &pk_value, &names);

            let mut row = self.db.query(&stmt)?.ok_or_else(|| Error::MissingRow {
                table: record.table.clone(),
                key: format!("{} = {}", pk.name(), pk_value),
                sql: stmt.clone(),
            })?;

            for id in clean {
                let value = row.remove(self.col(id).name()).unwrap_or_default();
                self.columns[id.index()].set_clean(value);
            }
        }

        self.nodes[node.index()].updated = true;
        Ok(())
    }

    /// Delete the row of `node` after deleting every joined row.
    ///
    /// Returns the number of DELETE statements executed; nodes without a
    /// row are skipped.
    pub fn delete_node(&mut self, node: NodeId) -> Result<usize> {
        self.check_node(node)?;
        self.delete_cascade(node)
    }

    fn save_cascade(&mut self, node: NodeId) -> Result<()> {
        let edges = self.n(node).edges.clone();
        for edge in edges {
            let join = self.edges[edge.index()];
            self.save_cascade(join.child)?;

            // always dirty, so the statement below carries the key
            let key = self.col(self.n(join.child).primary_key).current();
            self.columns[join.foreign_key.index()].set_value(key);
        }

        let dirty: Vec<ColumnId> = self
            .n(node)
            .columns
            .iter()
            .copied()
            .filter(|c| self.col(*c).is_dirty())
            .collect();

        let record = self.n(node);
        let pk_id = record.primary_key;
        let pk = self.col(pk_id);
        let assignments: Vec<(&str, &Value)> = dirty
            .iter()
            .filter_map(|c| {
                let col = self.col(*c);
                col.pending_value().map(|v| (col.name(), v))
            })
            .collect();

        if let Some((name, value)) = assignments.iter().find(|(_, v)| !v.is_writable()) {
            return Err(Error::InvalidValue(format!(
                "`{}` of `{}` cannot be stored as {}",
                name, record.table, value
            )));
        }

        if pk.is_dirty() {
            if dirty.is_empty() {
                return Ok(());
            }
            let stmt = sql::update(self.db, &record.table, pk.name(), &pk.current(), &assignments);
            self.db.exec(&stmt)?;
        } else {
            let stmt = sql::insert(self.db, &record.table, &assignments);
            self.db.exec(&stmt)?;
            let id = self.db.last_insert_id()?;
            tracing::debug!("inserted `{}` with {} = {}", record.table, pk.name(), id);
            self.columns[pk_id.index()].set_value(id);
        }

        let pk_name = self.col(pk_id).name().to_string();
        for id in dirty {
            let written = self.col(id).current();
            // an explicit write to the key column moves the key too
            if self.col(id).name() == pk_name {
                self.columns[pk_id.index()].set_value(written.clone());
            }
            self.columns[id.index()].set_clean(written);
        }

        self.nodes[node.index()].updated = true;
        Ok(())
    }

    fn delete_cascade(&mut self, node: NodeId) -> Result<usize> {
        let mut deleted = 0;
        let edges = self.n(node).edges.clone();
        for edge in edges {
            let child = self.edges[edge.index()].child;
            deleted += self.delete_cascade(child)?;
        }

        let record = self.n(node);
        if self.is_new(node) {
            tracing::warn!("`{}` has no row yet, skipping delete", record.table);
        } else {
            let pk = self.col(record.primary_key);
            let stmt = sql::delete(self.db, &record.table, pk.name(), &pk.current());
            self.db.exec(&stmt)?;
            deleted += 1;
        }

        self.nodes[node.index()].updated = true;
        Ok(deleted)
    }
}
