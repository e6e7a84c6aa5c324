//! Node in the pathway graph.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{
    Control, Conversion, EntityKind, Interaction, ReferenceKind, VocabularyCategory,
};

/// Opaque node identifier, unique within one build session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse node category, used for the store's label index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    EntityReference,
    Vocabulary,
    ModificationFeature,
    PhysicalEntity,
    Conversion,
    Control,
    Interaction,
}

/// A node in the pathway graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub display_name: Option<String>,
    pub data: NodeData,
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum NodeData {
    EntityReference(EntityReference),
    Vocabulary(VocabularyTerm),
    ModificationFeature(ModificationFeature),
    PhysicalEntity(PhysicalEntity),
    Conversion(Conversion),
    Control(Control),
    Interaction(Interaction),
}

/// Canonical identity of a molecular species, independent of location and
/// modification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityReference {
    pub kind: ReferenceKind,
    /// Modification markers defined on this species, at most one per type.
    pub features: SmallVec<[NodeId; 2]>,
    /// Physical entities carrying this reference, in creation order.
    pub entity_reference_of: SmallVec<[NodeId; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTerm {
    pub category: VocabularyCategory,
    pub term: String,
}

/// A specific modification of a species reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModificationFeature {
    /// Owning species reference.
    pub reference: NodeId,
    /// `SequenceModification` vocabulary term.
    pub modification_type: NodeId,
}

/// Feature carried by a physical entity. Only modification markers exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityFeature {
    Modification(NodeId),
}

impl EntityFeature {
    pub fn node_id(self) -> NodeId {
        match self {
            EntityFeature::Modification(id) => id,
        }
    }
}

/// A located, possibly modified instance of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalEntity {
    pub kind: EntityKind,
    pub reference: Option<NodeId>,
    /// `CellularLocation` vocabulary term.
    pub location: Option<NodeId>,
    pub features: SmallVec<[EntityFeature; 2]>,
}

impl PhysicalEntity {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            reference: None,
            location: None,
            features: SmallVec::new(),
        }
    }
}

impl Node {
    pub fn label(&self) -> NodeLabel {
        match &self.data {
            NodeData::EntityReference(_) => NodeLabel::EntityReference,
            NodeData::Vocabulary(_) => NodeLabel::Vocabulary,
            NodeData::ModificationFeature(_) => NodeLabel::ModificationFeature,
            NodeData::PhysicalEntity(_) => NodeLabel::PhysicalEntity,
            NodeData::Conversion(_) => NodeLabel::Conversion,
            NodeData::Control(_) => NodeLabel::Control,
            NodeData::Interaction(_) => NodeLabel::Interaction,
        }
    }

    pub fn is_relation(&self) -> bool {
        matches!(
            self.label(),
            NodeLabel::Conversion | NodeLabel::Control | NodeLabel::Interaction
        )
    }

    pub fn as_reference(&self) -> Option<&EntityReference> {
        match &self.data {
            NodeData::EntityReference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_vocabulary(&self) -> Option<&VocabularyTerm> {
        match &self.data {
            NodeData::Vocabulary(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_modification(&self) -> Option<&ModificationFeature> {
        match &self.data {
            NodeData::ModificationFeature(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_physical_entity(&self) -> Option<&PhysicalEntity> {
        match &self.data {
            NodeData::PhysicalEntity(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_conversion(&self) -> Option<&Conversion> {
        match &self.data {
            NodeData::Conversion(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_control(&self) -> Option<&Control> {
        match &self.data {
            NodeData::Control(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_interaction(&self) -> Option<&Interaction> {
        match &self.data {
            NodeData::Interaction(i) => Some(i),
            _ => None,
        }
    }
}
