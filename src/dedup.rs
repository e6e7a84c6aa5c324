//! # Deduplication Store
//!
//! Get-or-create operations for every node kind that has a structural
//! identity. A request that is structurally equivalent to an existing node
//! returns that node; only a miss reaches the factory.
//!
//! | Node | Identity |
//! |------|----------|
//! | Entity reference | (reference kind, name) |
//! | Vocabulary term | (category, term) |
//! | Modification feature | (owning reference, modification type term) |
//! | Physical entity | (reference, location term, set of modification type terms) |
//!
//! Physical entities without a reference are never shared. Display names do
//! not take part in matching.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use tracing::{debug, trace};

use crate::factory::NodeFactory;
use crate::model::*;
use crate::storage::{GraphStore, MemoryStore};
use crate::{Error, Result};

/// The pathway graph of one build session together with its identity
/// caches.
#[derive(Debug, Default)]
pub struct PathwayModel<S: GraphStore = MemoryStore> {
    factory: NodeFactory<S>,
    references: HashMap<(ReferenceKind, String), NodeId>,
    vocabularies: HashMap<(VocabularyCategory, String), NodeId>,
}

impl PathwayModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: GraphStore> PathwayModel<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            factory: NodeFactory::new(store),
            references: HashMap::new(),
            vocabularies: HashMap::new(),
        }
    }

    /// Read access to the whole graph.
    pub fn graph(&self) -> &S {
        self.factory.store()
    }

    /// Direct access to the factory, for relation nodes.
    pub fn factory(&mut self) -> &mut NodeFactory<S> {
        &mut self.factory
    }

    pub fn into_store(self) -> S {
        self.factory.into_store()
    }

    // ========================================================================
    // Get-or-create
    // ========================================================================

    pub fn get_or_create_species_reference(&mut self, kind: ReferenceKind, name: &str) -> NodeId {
        if let Some(id) = self.references.get(&(kind, name.to_owned())) {
            trace!(id = %id, %kind, name, "reused entity reference");
            return *id;
        }

        let id = self.factory.add_entity_reference(kind, Some(name));
        self.references.insert((kind, name.to_owned()), id);
        id
    }

    pub fn get_or_create_vocabulary_term(&mut self, category: VocabularyCategory, term: &str) -> NodeId {
        if let Some(id) = self.vocabularies.get(&(category, term.to_owned())) {
            trace!(id = %id, %category, term, "reused vocabulary term");
            return *id;
        }

        let id = self.factory.add_vocabulary(category, term);
        self.vocabularies.insert((category, term.to_owned()), id);
        id
    }

    /// Convenience for `get_or_create_vocabulary_term(CellularLocation, term)`.
    pub fn get_or_create_cellular_location(&mut self, term: &str) -> NodeId {
        self.get_or_create_vocabulary_term(VocabularyCategory::CellularLocation, term)
    }

    /// Find the reference's marker for `modification_type`, creating and
    /// attaching one on a miss. A reference never holds two markers of the
    /// same type.
    pub fn get_or_create_modification_marker(
        &mut self,
        modification_type: &str,
        reference: NodeId,
    ) -> Result<NodeId> {
        let markers = match self.graph().get(reference).and_then(Node::as_reference) {
            Some(r) => r.features.clone(),
            None => {
                return Err(Error::InvalidArgument(format!(
                    "modification '{modification_type}' requested for node {reference}, which is not an entity reference"
                )));
            }
        };

        if let Some(existing) = markers
            .iter()
            .copied()
            .find(|m| self.modification_term(*m) == Some(modification_type))
        {
            trace!(id = %existing, modification_type, "reused modification feature");
            return Ok(existing);
        }

        let term = self.get_or_create_vocabulary_term(VocabularyCategory::SequenceModification, modification_type);
        self.factory.add_modification_feature(reference, term)
    }

    /// Return an equivalent physical entity or create a new one.
    ///
    /// With a reference, the entities already carrying it are scanned in
    /// creation order and the first one with the same location and exactly
    /// the same set of modification types is returned. Without a reference a
    /// new entity is always created.
    ///
    /// `reference` and `location` are checked before anything is allocated.
    pub fn get_or_create_physical_entity(
        &mut self,
        kind: EntityKind,
        name: Option<&str>,
        location: Option<NodeId>,
        reference: Option<NodeId>,
        modification_types: &BTreeSet<String>,
    ) -> Result<NodeId> {
        match reference {
            Some(reference) => self.factory.check_reference_fits(kind, reference)?,
            None if !modification_types.is_empty() => {
                return Err(Error::InvalidArgument(format!(
                    "modifications {modification_types:?} requested on '{}' without an entity reference",
                    name.unwrap_or(kind.as_str())
                )));
            }
            None => {}
        }
        if let Some(location) = location {
            self.factory.expect_vocabulary(location, VocabularyCategory::CellularLocation)?;
        }

        if let Some(reference) = reference {
            if let Some(existing) = self.find_matching_entity(reference, location, modification_types) {
                debug!(id = %existing, %kind, name = name.unwrap_or(""), "reused physical entity");
                return Ok(existing);
            }
        }

        let entity = self.factory.add_physical_entity(kind, name);
        if let Some(reference) = reference {
            self.factory.set_entity_reference(entity, reference)?;
        }
        if let Some(location) = location {
            self.factory.set_cellular_location(entity, location)?;
        }
        if let Some(reference) = reference {
            for modification_type in modification_types {
                let marker = self.get_or_create_modification_marker(modification_type, reference)?;
                self.factory.add_feature(entity, marker)?;
            }
        }

        Ok(entity)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Term string of a modification marker's type.
    pub fn modification_term(&self, marker: NodeId) -> Option<&str> {
        let graph = self.graph();
        let feature = graph.get(marker)?.as_modification()?;
        let term = graph.get(feature.modification_type)?.as_vocabulary()?;
        Some(term.term.as_str())
    }

    /// Modification type terms carried by a physical entity.
    pub fn modification_terms(&self, entity: NodeId) -> BTreeSet<&str> {
        self.graph()
            .get(entity)
            .and_then(Node::as_physical_entity)
            .map(|pe| {
                pe.features
                    .iter()
                    .filter_map(|f| self.modification_term(f.node_id()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn find_matching_entity(
        &self,
        reference: NodeId,
        location: Option<NodeId>,
        modification_types: &BTreeSet<String>,
    ) -> Option<NodeId> {
        let graph = self.graph();
        let owners = &graph.get(reference)?.as_reference()?.entity_reference_of;

        owners.iter().copied().find(|id| {
            let Some(pe) = graph.get(*id).and_then(Node::as_physical_entity) else {
                return false;
            };
            pe.location == location && self.has_modification_set(pe, modification_types)
        })
    }

    fn has_modification_set(&self, pe: &PhysicalEntity, expected: &BTreeSet<String>) -> bool {
        if pe.features.len() != expected.len() {
            return false;
        }
        let actual: BTreeSet<&str> = pe
            .features
            .iter()
            .filter_map(|f| self.modification_term(f.node_id()))
            .collect();
        actual.len() == expected.len() && expected.iter().all(|t| actual.contains(t.as_str()))
    }
}
