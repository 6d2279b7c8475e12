//! Join edges - parent foreign key to child record

use super::{ColumnId, NodeId};

/// A directed link from a parent's foreign-key column to a child record.
///
/// The child's primary key column is the join column (`id` unless the path
/// named another one). After the edge is saved the foreign key holds the
/// child's primary key value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinEdge {
    pub(crate) parent: NodeId,
    pub(crate) foreign_key: ColumnId,
    pub(crate) child: NodeId,
}

impl JoinEdge {
    /// Node holding the foreign key
    pub fn parent(&self) -> NodeId {
        self.parent
    }

    /// Foreign-key column on the parent, shared with the parent's column map
    pub fn foreign_key(&self) -> ColumnId {
        self.foreign_key
    }

    /// Joined record, owned by this edge
    pub fn child(&self) -> NodeId {
        self.child
    }
}

/// Identity of an edge on its parent: two registrations with the same key
/// are the same edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EdgeKey {
    pub table: String,
    pub child_column: String,
    pub foreign_key: String,
}
