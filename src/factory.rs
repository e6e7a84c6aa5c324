//! Node factory. The only place that allocates nodes or touches their
//! identity fields.
//!
//! No reuse decisions happen here. `dedup` calls into the factory once it has
//! decided a node must be created, and the relation builder calls it
//! directly for relation nodes, which are never shared.

use tracing::debug;

use crate::model::*;
use crate::storage::{GraphStore, MemoryStore};
use crate::{Error, Result};

/// Creates and wires nodes inside a `GraphStore`.
#[derive(Debug, Default)]
pub struct NodeFactory<S: GraphStore = MemoryStore> {
    store: S,
}

impl<S: GraphStore> NodeFactory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn add(&mut self, data: NodeData, name: Option<&str>) -> NodeId {
        let id = self.store.insert(data, name.map(str::to_owned));
        debug!(id = %id, name = name.unwrap_or(""), "created node");
        id
    }

    // ========================================================================
    // Identity nodes
    // ========================================================================

    pub fn add_entity_reference(&mut self, kind: ReferenceKind, name: Option<&str>) -> NodeId {
        let data = NodeData::EntityReference(EntityReference {
            kind,
            features: Default::default(),
            entity_reference_of: Default::default(),
        });
        self.add(data, name)
    }

    pub fn add_vocabulary(&mut self, category: VocabularyCategory, term: &str) -> NodeId {
        let data = NodeData::Vocabulary(VocabularyTerm { category, term: term.to_owned() });
        self.add(data, None)
    }

    /// Create a modification marker and register it on its owning reference.
    pub fn add_modification_feature(
        &mut self,
        reference: NodeId,
        modification_type: NodeId,
    ) -> Result<NodeId> {
        self.expect_reference(reference)?;
        self.expect_vocabulary(modification_type, VocabularyCategory::SequenceModification)?;

        let id = self.add(
            NodeData::ModificationFeature(ModificationFeature { reference, modification_type }),
            None,
        );
        if let NodeData::EntityReference(r) = &mut self.store.require_mut(reference)?.data {
            r.features.push(id);
        }
        Ok(id)
    }

    pub fn add_physical_entity(&mut self, kind: EntityKind, name: Option<&str>) -> NodeId {
        self.add(NodeData::PhysicalEntity(PhysicalEntity::new(kind)), name)
    }

    // ========================================================================
    // Physical entity wiring
    // ========================================================================

    /// Attach a species reference. Only the simple entity family may carry
    /// one, and only a reference of its own kind.
    pub fn set_entity_reference(&mut self, entity: NodeId, reference: NodeId) -> Result<()> {
        let kind = match self.store.get(entity).and_then(Node::as_physical_entity) {
            Some(pe) => pe.kind,
            None => return Err(Error::InvalidArgument(format!("node {entity} is not a physical entity"))),
        };
        self.check_reference_fits(kind, reference)?;

        physical_entity_mut(&mut self.store, entity)?.reference = Some(reference);

        if let NodeData::EntityReference(r) = &mut self.store.require_mut(reference)?.data {
            r.entity_reference_of.push(entity);
        }
        Ok(())
    }

    pub fn set_cellular_location(&mut self, entity: NodeId, location: NodeId) -> Result<()> {
        self.expect_vocabulary(location, VocabularyCategory::CellularLocation)?;
        physical_entity_mut(&mut self.store, entity)?.location = Some(location);
        Ok(())
    }

    /// Add a feature to a physical entity. Anything other than a modification
    /// marker is rejected.
    pub fn add_feature(&mut self, entity: NodeId, feature: NodeId) -> Result<()> {
        if self.store.require(feature)?.as_modification().is_none() {
            return Err(Error::InvariantViolation(format!(
                "node {feature} is not a modification feature; physical entities carry only modification features"
            )));
        }

        let pe = physical_entity_mut(&mut self.store, entity)?;
        let feature = EntityFeature::Modification(feature);
        if !pe.features.contains(&feature) {
            pe.features.push(feature);
        }
        Ok(())
    }

    // ========================================================================
    // Relation nodes
    // ========================================================================

    pub fn add_conversion(
        &mut self,
        kind: ConversionKind,
        left: &[NodeId],
        right: &[NodeId],
        direction: Option<ConversionDirection>,
    ) -> Result<NodeId> {
        for id in left.iter().chain(right) {
            self.expect_physical_entity(*id)?;
        }

        let mut conversion = Conversion::new(kind);
        conversion.left.extend_from_slice(left);
        conversion.right.extend_from_slice(right);
        conversion.direction = direction;
        Ok(self.add(NodeData::Conversion(conversion), None))
    }

    pub fn add_control(
        &mut self,
        kind: ControlKind,
        controller: Option<NodeId>,
        controlled: Option<NodeId>,
        control_type: Option<ControlType>,
    ) -> Result<NodeId> {
        if let Some(id) = controller {
            self.expect_physical_entity(id)?;
        }
        if let Some(id) = controlled {
            let node = self.store.require(id)?;
            if node.as_conversion().is_none() && node.as_control().is_none() {
                return Err(Error::InvalidArgument(format!(
                    "node {id} cannot be controlled: not a conversion or control"
                )));
            }
        }

        let mut control = Control::new(kind);
        control.controllers.extend(controller);
        control.controlled.extend(controlled);
        control.control_type = control_type;
        Ok(self.add(NodeData::Control(control), None))
    }

    pub fn add_interaction(&mut self, kind: InteractionKind, participants: &[NodeId]) -> Result<NodeId> {
        for id in participants {
            self.expect_physical_entity(*id)?;
        }

        let mut interaction = Interaction::new(kind);
        interaction.participants.extend_from_slice(participants);
        Ok(self.add(NodeData::Interaction(interaction), None))
    }

    // ========================================================================
    // Checks
    // ========================================================================

    fn expect_reference(&self, id: NodeId) -> Result<ReferenceKind> {
        match self.store.get(id).and_then(Node::as_reference) {
            Some(r) => Ok(r.kind),
            None => Err(Error::InvalidArgument(format!("node {id} is not an entity reference"))),
        }
    }

    /// `reference` must be a species reference matching `kind`: a protein
    /// carries a protein reference, and so on.
    pub(crate) fn check_reference_fits(&self, kind: EntityKind, reference: NodeId) -> Result<()> {
        let reference_kind = self.expect_reference(reference)?;
        if kind.reference_kind() != Some(reference_kind) {
            return Err(Error::InvariantViolation(format!(
                "a {kind} physical entity cannot carry a {reference_kind}"
            )));
        }
        Ok(())
    }

    pub(crate) fn expect_vocabulary(&self, id: NodeId, category: VocabularyCategory) -> Result<()> {
        match self.store.get(id).and_then(Node::as_vocabulary) {
            Some(v) if v.category == category => Ok(()),
            _ => Err(Error::InvalidArgument(format!("node {id} is not a {category} term"))),
        }
    }

    fn expect_physical_entity(&self, id: NodeId) -> Result<()> {
        match self.store.get(id) {
            Some(node) if node.as_physical_entity().is_some() => Ok(()),
            _ => Err(Error::InvalidArgument(format!("node {id} is not a physical entity"))),
        }
    }
}

fn physical_entity_mut<S: GraphStore>(store: &mut S, id: NodeId) -> Result<&mut PhysicalEntity> {
    match &mut store.require_mut(id)?.data {
        NodeData::PhysicalEntity(pe) => Ok(pe),
        _ => Err(Error::InvalidArgument(format!("node {id} is not a physical entity"))),
    }
}
