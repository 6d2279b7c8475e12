//! Record Graph - rows, columns and join edges addressed by paths
//!
//! A [`Record`] owns a graph rooted at one row:
//! - Nodes: one per logical row (table + primary key column)
//! - Columns: named value cells owned by a node
//! - Join edges: parent foreign key → child node
//!
//! Paths are resolved into this graph (see [`crate::path`]) and the graph is
//! then saved, fetched or deleted as a whole.

mod column;
mod join;
mod persist;
mod resolver;

pub use column::Column;
pub use join::JoinEdge;

use std::collections::HashMap;
use std::fmt;
use crate::{Error, Result};
use crate::connector::Connector;
use crate::value::Value;
use join::EdgeKey;

/// Default primary key name
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Identifier of a record node within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Identifier of a column within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(pub u32);

/// Identifier of a join edge within its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl ColumnId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl EdgeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One logical row: table, primary key, columns and outgoing joins.
#[derive(Debug)]
pub struct RecordNode {
    table: String,
    primary_key: ColumnId,
    /// Registration order
    columns: Vec<ColumnId>,
    column_index: HashMap<String, ColumnId>,
    /// Registration order
    edges: Vec<EdgeId>,
    edge_index: HashMap<EdgeKey, EdgeId>,
    /// False while clean columns may not reflect the database
    updated: bool,
}

impl RecordNode {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> ColumnId {
        self.primary_key
    }

    /// Columns in registration order (primary key excluded)
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    /// Outgoing join edges in registration order
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Check if clean column values are up to date
    pub fn is_updated(&self) -> bool {
        self.updated
    }
}

/// A graph of database rows rooted at one record.
///
/// Every id handed out by a `Record` stays valid for the graph's lifetime:
/// registration only ever adds nodes, columns and edges.
pub struct Record<'db> {
    db: &'db dyn Connector,
    root: NodeId,
    nodes: Vec<RecordNode>,
    columns: Vec<Column>,
    edges: Vec<JoinEdge>,
}

impl<'db> Record<'db> {
    /// New record (no row yet) with an `id` primary key
    pub fn new(db: &'db dyn Connector, table: &str) -> Self {
        Self::with_named_key(db, table, DEFAULT_PRIMARY_KEY, Value::Null)
    }

    /// Record for the row whose `id` is `key`
    pub fn with_key(db: &'db dyn Connector, table: &str, key: impl Into<Value>) -> Self {
        Self::with_named_key(db, table, DEFAULT_PRIMARY_KEY, key)
    }

    /// Record with a custom primary key column; a blank key gives a new record
    pub fn with_named_key(
        db: &'db dyn Connector,
        table: &str,
        pk_name: &str,
        key: impl Into<Value>,
    ) -> Self {
        let mut record = Self {
            db,
            root: NodeId(0),
            nodes: Vec::new(),
            columns: Vec::new(),
            edges: Vec::new(),
        };
        record.root = record.add_node(table, pk_name, key.into());
        record
    }

    /// Root node of the graph
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&RecordNode> {
        self.nodes.get(id.index())
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&JoinEdge> {
        self.edges.get(id.index())
    }

    /// Number of nodes in the graph, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a registered column by name without creating it
    pub fn find_column(&self, node: NodeId, name: &str) -> Option<ColumnId> {
        self.node(node)?.column_index.get(name).copied()
    }

    /// Check if the node has no row yet (its primary key was never assigned)
    pub fn is_new(&self, node: NodeId) -> bool {
        self.node(node)
            .and_then(|n| self.column(n.primary_key))
            .is_some_and(|pk| !pk.is_dirty())
    }

    /// Primary key value as currently known (`Null` for new nodes)
    pub fn key(&self, node: NodeId) -> Result<Value> {
        self.check_node(node)?;
        Ok(self.col(self.n(node).primary_key).current())
    }

    /// Read a column value.
    ///
    /// Dirty columns return their pending value. Clean columns on a stale
    /// node trigger a fetch of the whole node first.
    pub fn value(&mut self, column: ColumnId) -> Result<Value> {
        self.check_column(column)?;
        let col = self.col(column);
        if col.is_dirty() {
            return Ok(col.current());
        }

        let node = col.node();
        if !self.n(node).updated {
            tracing::trace!("lazy fetch of `{}` for column `{}`", self.n(node).table, col.name());
            self.fetch_node(node)?;
        }
        Ok(self.col(column).current())
    }

    /// Assign a pending value to a column
    pub fn set_value(&mut self, column: ColumnId, value: impl Into<Value>) -> Result<()> {
        self.check_column(column)?;
        self.columns[column.index()].set_value(value.into());
        Ok(())
    }

    /// Clear a column entirely; its value is unknown until the next fetch.
    ///
    /// The primary key can't be reset: an existing node stays existing.
    pub fn reset_column(&mut self, column: ColumnId) -> Result<()> {
        self.check_column(column)?;
        let node = self.col(column).node();
        if self.n(node).primary_key == column {
            return Err(Error::KeyReset {
                table: self.n(node).table.clone(),
                column: self.col(column).name().to_string(),
            });
        }
        self.columns[column.index()].reset();
        self.nodes[node.index()].updated = false;
        Ok(())
    }

    /// Write operation on the root: resolve every path, assign, then save.
    pub fn save<I, P, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (P, V)>,
        P: AsRef<str>,
        V: Into<Value>,
    {
        self.save_at(self.root, values)
    }

    /// Write operation on any node
    pub fn save_at<I, P, V>(&mut self, node: NodeId, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (P, V)>,
        P: AsRef<str>,
        V: Into<Value>,
    {
        self.check_node(node)?;
        for (path, value) in values {
            let column = self.resolve_column(node, path.as_ref())?;
            self.columns[column.index()].set_value(value.into());
        }
        self.save_node(node)
    }

    /// Read operation on the root: resolve every path, then read each value
    /// in order.
    pub fn fetch<I, P>(&mut self, paths: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.fetch_at(self.root, paths)
    }

    /// Read operation on any node
    pub fn fetch_at<I, P>(&mut self, node: NodeId, paths: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.check_node(node)?;
        // register everything first; a join resolved before a local column
        // may still have fetched its node once for the foreign key
        let columns = paths
            .into_iter()
            .map(|path| self.resolve_column(node, path.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        columns.into_iter().map(|column| self.value(column)).collect()
    }

    /// Delete operation on the root: register the extra table paths as joins,
    /// then delete the root and everything joined to it.
    /// Returns the number of rows deleted.
    pub fn delete<I, P>(&mut self, table_paths: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.delete_at(self.root, table_paths)
    }

    /// Delete operation on any node
    pub fn delete_at<I, P>(&mut self, node: NodeId, table_paths: I) -> Result<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        self.check_node(node)?;
        for path in table_paths {
            self.resolve_table(node, path.as_ref())?;
        }
        self.delete_node(node)
    }

    fn add_node(&mut self, table: &str, pk_name: &str, key: Value) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let primary_key = ColumnId(self.columns.len() as u32);

        let mut pk = Column::new(id, pk_name);
        let existing = !key.is_blank();
        if existing {
            pk.set_value(key);
        }
        self.columns.push(pk);

        self.nodes.push(RecordNode {
            table: table.to_string(),
            primary_key,
            columns: Vec::new(),
            column_index: HashMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
            updated: !existing,
        });
        tracing::debug!("registered record `{}` ({})", table, if existing { "existing" } else { "new" });
        id
    }

    fn check_node(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::UnknownNode(id.0))
        }
    }

    fn check_column(&self, id: ColumnId) -> Result<()> {
        if id.index() < self.columns.len() {
            Ok(())
        } else {
            Err(Error::UnknownColumn(id.0))
        }
    }

    fn n(&self, id: NodeId) -> &RecordNode {
        &self.nodes[id.index()]
    }

    fn col(&self, id: ColumnId) -> &Column {
        &self.columns[id.index()]
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .field("columns", &self.columns)
            .field("edges", &self.edges)
            .finish()
    }
}
