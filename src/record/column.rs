//! Column cells with dirty/clean state

use crate::value::Value;
use super::NodeId;

/// A named value cell owned by one record node.
///
/// A column is either clean (its value is the last one read from or written
/// to the database, possibly not known yet) or dirty (it holds a pending value
/// that the next save will write).
#[derive(Debug, Clone)]
pub struct Column {
    node: NodeId,
    name: String,
    clean: Option<Value>,
    pending: Value,
    dirty: bool,
}

impl Column {
    pub(crate) fn new(node: NodeId, name: impl Into<String>) -> Self {
        Self {
            node,
            name: name.into(),
            clean: None,
            pending: Value::Null,
            dirty: false,
        }
    }

    /// Node that owns this column
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the column holds a value not yet written
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Last known database value; `None` until fetched or written
    pub fn clean_value(&self) -> Option<&Value> {
        self.clean.as_ref()
    }

    /// Pending value, only while dirty
    pub fn pending_value(&self) -> Option<&Value> {
        self.dirty.then_some(&self.pending)
    }

    /// Value as currently known, without touching the database
    pub fn current(&self) -> Value {
        if self.dirty {
            self.pending.clone()
        } else {
            self.clean.clone().unwrap_or_default()
        }
    }

    /// Assign a pending value; marks the column dirty even if unchanged
    pub(crate) fn set_value(&mut self, value: Value) {
        self.pending = value;
        self.dirty = true;
    }

    /// Record a value known to be in the database and drop any pending one
    pub(crate) fn set_clean(&mut self, value: Value) {
        self.clean = Some(value);
        self.pending = Value::Null;
        self.dirty = false;
    }

    /// Forget everything: no pending value, no known database value
    pub(crate) fn reset(&mut self) {
        self.clean = None;
        self.pending = Value::Null;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_then_clean() {
        let mut col = Column::new(NodeId(0), "title");
        assert!(!col.is_dirty());
        assert_eq!(col.current(), Value::Null);
        assert!(col.clean_value().is_none());

        col.set_value(Value::from("a"));
        assert!(col.is_dirty());
        assert_eq!(col.pending_value(), Some(&Value::from("a")));
        assert_eq!(col.current(), Value::from("a"));

        col.set_clean(Value::from("a"));
        assert!(!col.is_dirty());
        assert!(col.pending_value().is_none());
        assert_eq!(col.clean_value(), Some(&Value::from("a")));
    }

    #[test]
    fn test_reset_forgets_values() {
        let mut col = Column::new(NodeId(0), "title");
        col.set_clean(Value::from("old"));
        col.set_value(Value::from("new"));
        col.reset();
        assert!(!col.is_dirty());
        assert!(col.clean_value().is_none());
        assert_eq!(col.current(), Value::Null);
    }
}
