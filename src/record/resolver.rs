//! Path resolution into the record graph
//!
//! Resolution is memoized: columns are keyed by name on their node and join
//! edges by `(table, join column, foreign key name)` on the node that owns the
//! foreign key. Resolving an equivalent path twice yields the same ids.

use crate::Result;
use crate::path::{ColumnPath, TableSpec};
use super::join::EdgeKey;
use super::{Column, ColumnId, EdgeId, JoinEdge, NodeId, Record};

impl Record<'_> {
    /// Resolve a column path relative to `node`, registering whatever is missing.
    pub fn resolve_column(&mut self, node: NodeId, path: &str) -> Result<ColumnId> {
        self.check_node(node)?;
        let parsed = ColumnPath::parse(path)?;
        self.register_column(node, &parsed)
    }

    /// Resolve a table path (`t1`, `t2[t1.t2_id]`, `t1.t2`) relative to `node`
    /// and return the joined node.
    pub fn resolve_table(&mut self, node: NodeId, path: &str) -> Result<NodeId> {
        self.check_node(node)?;
        let specs = TableSpec::parse_path(path)?;
        let mut current = node;
        for spec in &specs {
            current = self.register_table(current, spec)?;
        }
        Ok(current)
    }

    fn register_column(&mut self, node: NodeId, path: &ColumnPath) -> Result<ColumnId> {
        let mut target = node;
        for spec in &path.tables {
            target = self.register_table(target, spec)?;
        }
        Ok(self.add_column(target, &path.column))
    }

    /// The foreign key is resolved first, relative to `node`. The edge hangs off
    /// the node that owns the foreign key, so saving that node fills it in.
    fn register_table(&mut self, node: NodeId, spec: &TableSpec) -> Result<NodeId> {
        let foreign_key = self.register_column(node, &spec.foreign_key())?;
        let parent = self.col(foreign_key).node();
        let key = EdgeKey {
            table: spec.table.clone(),
            child_column: spec.child_column().to_string(),
            foreign_key: self.col(foreign_key).name().to_string(),
        };

        if let Some(&edge) = self.n(parent).edge_index.get(&key) {
            return Ok(self.edges[edge.index()].child);
        }

        // joined row is identified by the foreign key's current value
        let pk_value = self.value(foreign_key)?;
        let child = self.add_node(&spec.table, spec.child_column(), pk_value);

        let edge = EdgeId(self.edges.len() as u32);
        self.edges.push(JoinEdge {
            parent,
            foreign_key,
            child,
        });
        tracing::debug!(
            "joined `{}` to `{}` on {}.{}",
            spec.table,
            self.n(parent).table,
            key.foreign_key,
            key.child_column
        );

        let parent_node = &mut self.nodes[parent.index()];
        parent_node.edges.push(edge);
        parent_node.edge_index.insert(key, edge);
        Ok(child)
    }

    fn add_column(&mut self, node: NodeId, name: &str) -> ColumnId {
        if let Some(&id) = self.n(node).column_index.get(name) {
            return id;
        }

        let id = ColumnId(self.columns.len() as u32);
        self.columns.push(Column::new(node, name));

        let record = &mut self.nodes[node.index()];
        record.columns.push(id);
        record.column_index.insert(name.to_string(), id);
        // value unknown until the next fetch
        record.updated = false;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Value};
    use crate::testing::RecordingConnector;

    fn table_of(record: &Record<'_>, node: NodeId) -> String {
        record.node(node).unwrap().table().to_string()
    }

    #[test]
    fn test_resolving_twice_returns_same_column() {
        let db = RecordingConnector::new();
        let mut record = Record::new(&db, "t0");
        let root = record.root();

        let a = record.resolve_column(root, "title").unwrap();
        let b = record.resolve_column(root, " title ").unwrap();
        assert_eq!(a, b);
        assert_eq!(record.node(root).unwrap().columns().len(), 1);
    }

    #[test]
    fn test_shorthand_and_explicit_join_are_the_same_edge() {
        let db = RecordingConnector::new();
        let mut record = Record::new(&db, "t0");
        let root = record.root();

        let a = record.resolve_column(root, "t1.title").unwrap();
        let b = record.resolve_column(root, "t1[id = t1_id].title").unwrap();
        let c = record.resolve_column(root, "t1[t1_id].title").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);

        let node = record.node(root).unwrap();
        assert_eq!(node.edges().len(), 1);
        let names: Vec<&str> = node
            .columns()
            .iter()
            .map(|c| record.column(*c).unwrap().name())
            .collect();
        assert_eq!(names, vec!["t1_id"]);
    }

    #[test]
    fn test_different_join_column_is_a_different_edge() {
        let db = RecordingConnector::new();
        let mut record = Record::new(&db, "t0");
        let root = record.root();

        let by_id = record.resolve_table(root, "t1").unwrap();
        let by_ref = record.resolve_table(root, "t1[ref = t1_id]").unwrap();
        assert_ne!(by_id, by_ref);
        assert_eq!(record.node(root).unwrap().edges().len(), 2);

        let pk = record.node(by_ref).unwrap().primary_key();
        assert_eq!(record.column(pk).unwrap().name(), "ref");
    }

    #[test]
    fn test_nested_join_hangs_off_the_foreign_key_owner() {
        let db = RecordingConnector::new();
        let mut record = Record::new(&db, "t0");
        let root = record.root();

        let title = record.resolve_column(root, "t2[t1.t2_id].title").unwrap();

        // t0 -> t1 via t0.t1_id
        let root_edges = record.node(root).unwrap().edges().to_vec();
        assert_eq!(root_edges.len(), 1);
        let to_t1 = *record.edge(root_edges[0]).unwrap();
        assert_eq!(table_of(&record, to_t1.child()), "t1");
        assert_eq!(record.column(to_t1.foreign_key()).unwrap().name(), "t1_id");

        // t1 -> t2 via t1.t2_id
        let t1 = to_t1.child();
        let t2_id = record.find_column(t1, "t2_id").unwrap();
        let t1_edges = record.node(t1).unwrap().edges().to_vec();
        assert_eq!(t1_edges.len(), 1);
        let to_t2 = *record.edge(t1_edges[0]).unwrap();
        assert_eq!(to_t2.parent(), t1);
        assert_eq!(to_t2.foreign_key(), t2_id);
        assert_eq!(table_of(&record, to_t2.child()), "t2");

        let join = record.node(to_t2.child()).unwrap().primary_key();
        assert_eq!(record.column(join).unwrap().name(), "id");
        assert_eq!(record.column(title).unwrap().node(), to_t2.child());
    }

    #[test]
    fn test_chained_tables_match_bracket_form() {
        let db = RecordingConnector::new();
        let mut record = Record::new(&db, "t0");
        let root = record.root();

        let a = record.resolve_column(root, "t1.t2.title").unwrap();
        let b = record.resolve_column(root, "t2[t1.t2_id].title").unwrap();
        let c = record.resolve_column(root, "t2[id = t1[id = t1_id].t2_id].title").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(record.node_count(), 3);
    }

    #[test]
    fn test_triple_nesting() {
        let db = RecordingConnector::new();
        let mut record = Record::new(&db, "t0");
        let root = record.root();

        let title = record
            .resolve_column(root, "t3[t2[t1.t2_id].t3_id].title")
            .unwrap();
        let t3 = record.column(title).unwrap().node();
        assert_eq!(table_of(&record, t3), "t3");
        assert_eq!(record.node_count(), 4);

        let again = record.resolve_column(root, "t1.t2.t3.title").unwrap();
        assert_eq!(title, again);
    }

    #[test]
    fn test_child_of_existing_parent_takes_key_from_foreign_key() {
        let db = RecordingConnector::new();
        db.seed("INSERT INTO t0 (id, t1_id) VALUES (5, 7)");
        let mut record = Record::with_key(&db, "t0", 5);

        let t1 = record.resolve_table(record.root(), "t1").unwrap();
        assert!(!record.is_new(t1));
        assert_eq!(record.key(t1).unwrap(), Value::Integer(7));
        assert_eq!(
            db.take(),
            vec![r#"select "t1_id" from "t0" where "id" = 5"#.to_string()]
        );
    }

    #[test]
    fn test_child_with_null_foreign_key_is_new() {
        let db = RecordingConnector::new();
        db.seed("INSERT INTO t0 (id) VALUES (5)");
        let mut record = Record::with_key(&db, "t0", 5);

        let t1 = record.resolve_table(record.root(), "t1").unwrap();
        assert!(record.is_new(t1));
    }

    #[test]
    fn test_registration_marks_node_stale() {
        let db = RecordingConnector::new();
        let mut record = Record::new(&db, "t0");
        let root = record.root();
        assert!(record.node(root).unwrap().is_updated());

        record.resolve_column(root, "title").unwrap();
        assert!(!record.node(root).unwrap().is_updated());
    }

    #[test]
    fn test_syntax_error_leaves_graph_untouched() {
        let db = RecordingConnector::new();
        let mut record = Record::new(&db, "t0");
        let root = record.root();

        let err = record.resolve_column(root, "t1[t1_id.title").unwrap_err();
        assert!(matches!(err, Error::PathSyntax(_)));
        assert_eq!(record.node_count(), 1);
        assert!(record.node(root).unwrap().columns().is_empty());
    }
}
