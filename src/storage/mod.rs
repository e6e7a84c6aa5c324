//! # Graph Store Trait
//!
//! The contract between the node factory and whatever holds the nodes.
//! Stores are append-only: nodes are never removed during a build session.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | Arena of nodes with a label index |

pub mod memory;

use crate::model::*;
use crate::{Error, Result};

pub use memory::MemoryStore;

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Append-only node storage for one build session.
///
/// Identifiers handed out by `insert` must be unique within the store and
/// stay valid for its whole lifetime.
pub trait GraphStore {
    // ========================================================================
    // Writes
    // ========================================================================

    /// Allocate a fresh id and store the node under it.
    fn insert(&mut self, data: NodeData, display_name: Option<String>) -> NodeId;

    /// Mutable access to a stored node.
    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    // ========================================================================
    // Reads
    // ========================================================================

    fn get(&self, id: NodeId) -> Option<&Node>;

    fn node_count(&self) -> usize;

    /// All nodes in creation order.
    fn nodes(&self) -> impl Iterator<Item = &Node> + '_;

    /// Ids of all nodes with the given label, in creation order.
    fn ids_by_label(&self, label: NodeLabel) -> &[NodeId];

    // ========================================================================
    // Provided
    // ========================================================================

    /// Like `get`, but a missing node is an error.
    fn require(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or_else(|| Error::NotFound(format!("Node {id}")))
    }

    fn require_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.get_mut(id).ok_or_else(|| Error::NotFound(format!("Node {id}")))
    }

    fn count_by_label(&self, label: NodeLabel) -> usize {
        self.ids_by_label(label).len()
    }

    fn nodes_by_label(&self, label: NodeLabel) -> Vec<&Node> {
        self.ids_by_label(label)
            .iter()
            .filter_map(|id| self.get(*id))
            .collect()
    }
}
