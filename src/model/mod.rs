//! # Pathway Graph Model
//!
//! Plain data types for the pathway graph: node identities, the node
//! payloads (references, vocabularies, features, entities, relations) and
//! the closed enums that classify them.
//!
//! Design rule: no caches, no I/O. Creation lives in `factory`, reuse
//! decisions in `dedup`.

pub mod descriptor;
pub mod kinds;
pub mod node;
pub mod relation;

pub use descriptor::EntityDescriptor;
pub use kinds::{EntityKind, ReferenceKind, VocabularyCategory};
pub use node::{
    EntityFeature, EntityReference, ModificationFeature, Node, NodeData, NodeId,
    NodeLabel, PhysicalEntity, VocabularyTerm,
};
pub use relation::{
    Control, ControlKind, ControlType, Conversion, ConversionDirection, ConversionKind,
    Interaction, InteractionKind,
};
