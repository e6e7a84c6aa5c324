//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`.
//! Nodes live in a `Vec` indexed by id, plus a label index.
//!
//! ## Limitations
//!
//! - **Single writer**: no interior locking. One build session is owned by
//!   one caller.
//! - **Append-only**: there is no delete. Ids are never reused.

use hashbrown::HashMap;

use crate::model::*;
use super::GraphStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// Arena-backed node storage. Ids start at 1 and increase monotonically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Vec<Node>,
    /// label → node ids (in creation order)
    label_index: HashMap<NodeLabel, Vec<NodeId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(id: NodeId) -> Option<usize> {
        usize::try_from(id.0).ok()?.checked_sub(1)
    }
}

impl GraphStore for MemoryStore {
    fn insert(&mut self, data: NodeData, display_name: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u64 + 1);
        let node = Node { id, display_name, data };

        self.label_index.entry(node.label()).or_default().push(id);
        self.nodes.push(node);

        id
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = Self::slot(id)?;
        self.nodes.get_mut(slot)
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = Self::slot(id)?;
        self.nodes.get(slot)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    fn ids_by_label(&self, label: NodeLabel) -> &[NodeId] {
        self.label_index.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ============================================================================
// Tests
// ============================================================================
