//! # Relation Builder
//!
//! One entry point per template type. Each entry point resolves its entity
//! descriptors to (possibly shared) physical entities, then wires fresh
//! relation nodes around them and returns the top-level relation.
//!
//! All descriptors of a call are checked before the first node is created,
//! so a rejected call leaves the graph untouched.
//!
//! "Other interaction" records with a control type pick their topology from
//! the participant kinds:
//!
//! | source | target | topology |
//! |--------|--------|----------|
//! | Protein | Protein | control sequence |
//! | Protein | SmallMolecule | controls production or consumption |
//! | SmallMolecule | Protein | modulation |
//! | SmallMolecule | SmallMolecule | conversion |

use std::borrow::Cow;
use std::collections::BTreeSet;

use tracing::debug;

use crate::dedup::PathwayModel;
use crate::model::*;
use crate::storage::GraphStore;
use crate::{Error, Result};

// ============================================================================
// Dispatch table
// ============================================================================

/// Relation topology for a controlled two-participant "other interaction".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtherInteractionTopology {
    /// The source controls a control exerted by the target.
    ControlSequence,
    /// The source controls a conversion producing or consuming the target.
    ControlsProductionOrConsumption,
    /// The source modulates a catalysis by the target.
    Modulation,
    /// The source is converted into the target, or inhibits its production.
    Conversion,
}

impl OtherInteractionTopology {
    /// Look up the 2×2 table. Any pair outside it is unsupported.
    pub fn select(source: EntityKind, target: EntityKind) -> Result<Self> {
        use EntityKind::{Protein, SmallMolecule};

        match (source, target) {
            (Protein, Protein) => Ok(Self::ControlSequence),
            (Protein, SmallMolecule) => Ok(Self::ControlsProductionOrConsumption),
            (SmallMolecule, Protein) => Ok(Self::Modulation),
            (SmallMolecule, SmallMolecule) => Ok(Self::Conversion),
            _ => Err(Error::UnsupportedCombination { source_kind: source, target_kind: target }),
        }
    }
}

// ============================================================================
// RelationBuilder
// ============================================================================

/// Builds relation topologies into a `PathwayModel`.
pub struct RelationBuilder<'m, S: GraphStore> {
    model: &'m mut PathwayModel<S>,
    link_species_references: bool,
}

impl<'m, S: GraphStore> RelationBuilder<'m, S> {
    pub fn new(model: &'m mut PathwayModel<S>, link_species_references: bool) -> Self {
        Self { model, link_species_references }
    }

    // ========================================================================
    // Template entry points
    // ========================================================================

    /// A controller drives the target from its base state into a modified
    /// state.
    ///
    /// Without a modification both states are the same entity. Without a
    /// control type the control carries none.
    pub fn build_state_control(
        &mut self,
        controller: &EntityDescriptor,
        target: &EntityDescriptor,
        modification: Option<&str>,
        control_type: Option<ControlType>,
    ) -> Result<NodeId> {
        self.check(controller)?;
        self.check(target)?;
        if let Some(modification) = modification {
            if self.reference_kind(target).is_none() {
                return Err(Error::InvalidArgument(format!(
                    "modification '{modification}' on '{}' needs a species reference",
                    target.name
                )));
            }
        }

        let controller_pe = self.resolve(controller, None)?;
        let base = self.resolve(target, None)?;
        let modified = self.resolve(target, modification)?;

        let factory = self.model.factory();
        let conversion = factory.add_conversion(
            ConversionKind::BiochemicalReaction,
            &[base],
            &[modified],
            Some(ConversionDirection::LeftToRight),
        )?;
        let control = factory.add_control(ControlKind::Control, Some(controller_pe), Some(conversion), control_type)?;

        debug!(control = %control, conversion = %conversion, "built state control");
        Ok(control)
    }

    /// A controller regulates synthesis of the target.
    pub fn build_expression_regulation(
        &mut self,
        controller: &EntityDescriptor,
        target: &EntityDescriptor,
        control_type: ControlType,
    ) -> Result<NodeId> {
        self.check(controller)?;
        self.check(target)?;

        let controller_pe = self.resolve(controller, None)?;
        let product = self.resolve(target, None)?;

        let factory = self.model.factory();
        let reaction = factory.add_conversion(
            ConversionKind::TemplateReaction,
            &[],
            &[product],
            Some(ConversionDirection::LeftToRight),
        )?;
        let regulation = factory.add_control(
            ControlKind::TemplateReactionRegulation,
            Some(controller_pe),
            Some(reaction),
            Some(control_type),
        )?;

        debug!(regulation = %regulation, reaction = %reaction, "built expression regulation");
        Ok(regulation)
    }

    /// One undirected interaction among all participants.
    pub fn build_molecular_interaction(&mut self, participants: &[EntityDescriptor]) -> Result<NodeId> {
        self.build_interaction(InteractionKind::MolecularInteraction, participants)
    }

    /// Without a control type this is a plain interaction. With one, exactly
    /// two participants are required and the topology comes from
    /// `OtherInteractionTopology::select`.
    pub fn build_other_interaction(
        &mut self,
        participants: &[EntityDescriptor],
        control_type: Option<ControlType>,
    ) -> Result<NodeId> {
        let Some(control_type) = control_type else {
            return self.build_interaction(InteractionKind::Interaction, participants);
        };

        let [source, target] = participants else {
            return Err(Error::MalformedTemplate(format!(
                "controlled interaction requires exactly two participants, got {}",
                participants.len()
            )));
        };

        match OtherInteractionTopology::select(source.kind, target.kind)? {
            OtherInteractionTopology::ControlSequence => {
                self.build_control_sequence(source, target, control_type)
            }
            OtherInteractionTopology::ControlsProductionOrConsumption => {
                self.build_controls_production_or_consumption(source, target, control_type)
            }
            OtherInteractionTopology::Modulation => self.build_modulation(source, target, control_type),
            OtherInteractionTopology::Conversion => self.build_conversion(source, target, control_type),
        }
    }

    // ========================================================================
    // Controlled topologies
    // ========================================================================

    /// `source` controls a control in which `target` drives an unspecified
    /// biochemical reaction.
    pub fn build_control_sequence(
        &mut self,
        source: &EntityDescriptor,
        target: &EntityDescriptor,
        control_type: ControlType,
    ) -> Result<NodeId> {
        self.check(source)?;
        self.check(target)?;

        let controller = self.resolve(source, None)?;
        let inner_controller = self.resolve(target, None)?;

        let factory = self.model.factory();
        let reaction = factory.add_conversion(ConversionKind::BiochemicalReaction, &[], &[], None)?;
        let inner = factory.add_control(ControlKind::Control, Some(inner_controller), Some(reaction), None)?;
        let outer = factory.add_control(ControlKind::Control, Some(controller), Some(inner), Some(control_type))?;

        debug!(outer = %outer, inner = %inner, "built control sequence");
        Ok(outer)
    }

    /// `source` controls a reaction that produces `target` (activation) or
    /// consumes it (inhibition).
    pub fn build_controls_production_or_consumption(
        &mut self,
        source: &EntityDescriptor,
        target: &EntityDescriptor,
        control_type: ControlType,
    ) -> Result<NodeId> {
        self.check(source)?;
        self.check(target)?;

        let controller = self.resolve(source, None)?;
        let molecule = [self.resolve(target, None)?];

        let (left, right): (&[NodeId], &[NodeId]) = match control_type {
            ControlType::Activation => (&[], &molecule),
            ControlType::Inhibition => (&molecule, &[]),
        };

        let factory = self.model.factory();
        let reaction = factory.add_conversion(
            ConversionKind::BiochemicalReaction,
            left,
            right,
            Some(ConversionDirection::LeftToRight),
        )?;
        let control = factory.add_control(ControlKind::Control, Some(controller), Some(reaction), Some(control_type))?;

        debug!(control = %control, reaction = %reaction, "built production/consumption control");
        Ok(control)
    }

    /// Small molecule `source` modulates a catalysis performed by `target`.
    pub fn build_modulation(
        &mut self,
        source: &EntityDescriptor,
        target: &EntityDescriptor,
        control_type: ControlType,
    ) -> Result<NodeId> {
        self.check(source)?;
        self.check(target)?;

        let modulator = self.resolve(source, None)?;
        let catalyst = self.resolve(target, None)?;

        let factory = self.model.factory();
        let reaction = factory.add_conversion(ConversionKind::BiochemicalReaction, &[], &[], None)?;
        let catalysis = factory.add_control(ControlKind::Catalysis, Some(catalyst), Some(reaction), None)?;
        let modulation = factory.add_control(ControlKind::Modulation, Some(modulator), Some(catalysis), Some(control_type))?;

        debug!(modulation = %modulation, catalysis = %catalysis, "built modulation");
        Ok(modulation)
    }

    /// Activation converts `source` into `target` directly. Inhibition wraps
    /// a reaction producing `target` in a control by `source`.
    pub fn build_conversion(
        &mut self,
        source: &EntityDescriptor,
        target: &EntityDescriptor,
        control_type: ControlType,
    ) -> Result<NodeId> {
        self.check(source)?;
        self.check(target)?;

        let substrate = self.resolve(source, None)?;
        let product = self.resolve(target, None)?;

        let factory = self.model.factory();
        let top = match control_type {
            ControlType::Activation => factory.add_conversion(
                ConversionKind::BiochemicalReaction,
                &[substrate],
                &[product],
                Some(ConversionDirection::LeftToRight),
            )?,
            ControlType::Inhibition => {
                let reaction = factory.add_conversion(
                    ConversionKind::BiochemicalReaction,
                    &[],
                    &[product],
                    Some(ConversionDirection::LeftToRight),
                )?;
                factory.add_control(ControlKind::Control, Some(substrate), Some(reaction), Some(control_type))?
            }
        };

        debug!(top = %top, %control_type, "built conversion");
        Ok(top)
    }

    // ========================================================================
    // Entity resolution
    // ========================================================================

    /// Resolve a descriptor to a physical entity, reusing an equivalent one
    /// when it has a species reference.
    pub fn resolve_entity(&mut self, descriptor: &EntityDescriptor) -> Result<NodeId> {
        self.check(descriptor)?;
        self.resolve(descriptor, None)
    }

    fn build_interaction(&mut self, kind: InteractionKind, participants: &[EntityDescriptor]) -> Result<NodeId> {
        if participants.is_empty() {
            return Err(Error::MalformedTemplate("interaction has no participants".into()));
        }
        for participant in participants {
            self.check(participant)?;
        }

        let mut ids = Vec::with_capacity(participants.len());
        for participant in participants {
            ids.push(self.resolve(participant, None)?);
        }

        let interaction = self.model.factory().add_interaction(kind, &ids)?;
        debug!(interaction = %interaction, participants = ids.len(), "built interaction");
        Ok(interaction)
    }

    fn reference_kind(&self, descriptor: &EntityDescriptor) -> Option<ReferenceKind> {
        if self.link_species_references {
            descriptor.kind.reference_kind()
        } else {
            None
        }
    }

    fn check(&self, descriptor: &EntityDescriptor) -> Result<()> {
        if !descriptor.modifications.is_empty() && self.reference_kind(descriptor).is_none() {
            return Err(Error::InvalidArgument(format!(
                "modifications on '{}' ({}) need a species reference",
                descriptor.name, descriptor.kind
            )));
        }
        Ok(())
    }

    fn resolve(&mut self, descriptor: &EntityDescriptor, extra_modification: Option<&str>) -> Result<NodeId> {
        let reference = self
            .reference_kind(descriptor)
            .map(|kind| self.model.get_or_create_species_reference(kind, &descriptor.name));
        let location = descriptor
            .location
            .as_deref()
            .map(|term| self.model.get_or_create_cellular_location(term));

        let modifications: Cow<'_, BTreeSet<String>> = match extra_modification {
            Some(extra) => {
                let mut all = descriptor.modifications.clone();
                all.insert(extra.to_owned());
                Cow::Owned(all)
            }
            None => Cow::Borrowed(&descriptor.modifications),
        };

        self.model.get_or_create_physical_entity(
            descriptor.kind,
            Some(descriptor.name.as_str()),
            location,
            reference,
            &modifications,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protein(name: &str) -> EntityDescriptor {
        EntityDescriptor::new(EntityKind::Protein, name)
    }

    fn chemical(name: &str) -> EntityDescriptor {
        EntityDescriptor::new(EntityKind::SmallMolecule, name)
    }

    fn control<S: GraphStore>(model: &PathwayModel<S>, id: NodeId) -> Control {
        model.graph().get(id).unwrap().as_control().unwrap().clone()
    }

    fn conversion<S: GraphStore>(model: &PathwayModel<S>, id: NodeId) -> Conversion {
        model.graph().get(id).unwrap().as_conversion().unwrap().clone()
    }

    #[test]
    fn test_dispatch_table() {
        use EntityKind::*;
        use OtherInteractionTopology as T;

        assert_eq!(T::select(Protein, Protein).unwrap(), T::ControlSequence);
        assert_eq!(T::select(Protein, SmallMolecule).unwrap(), T::ControlsProductionOrConsumption);
        assert_eq!(T::select(SmallMolecule, Protein).unwrap(), T::Modulation);
        assert_eq!(T::select(SmallMolecule, SmallMolecule).unwrap(), T::Conversion);
        assert!(matches!(
            T::select(Complex, Protein),
            Err(Error::UnsupportedCombination { source_kind: Complex, target_kind: Protein })
        ));
        assert!(T::select(Dna, Rna).is_err());
    }

    #[test]
    fn test_state_control_topology() {
        let mut model = PathwayModel::new();
        let ctrl = RelationBuilder::new(&mut model, true)
            .build_state_control(
                &protein("MAP2K1"),
                &protein("MAPK1"),
                Some("phosphorylated"),
                Some(ControlType::Activation),
            )
            .unwrap();

        let c = control(&model, ctrl);
        assert_eq!(c.kind, ControlKind::Control);
        assert_eq!(c.control_type, Some(ControlType::Activation));

        let conv = conversion(&model, c.controlled[0]);
        assert_eq!(conv.direction, Some(ConversionDirection::LeftToRight));
        let (base, modified) = (conv.left[0], conv.right[0]);
        assert_ne!(base, modified);
        assert!(model.modification_terms(base).is_empty());
        assert_eq!(model.modification_terms(modified).into_iter().collect::<Vec<_>>(), vec!["phosphorylated"]);

        let base_pe = model.graph().get(base).unwrap().as_physical_entity().unwrap();
        let mod_pe = model.graph().get(modified).unwrap().as_physical_entity().unwrap();
        assert_eq!(base_pe.reference, mod_pe.reference);
        assert!(base_pe.reference.is_some());
    }

    #[test]
    fn test_state_control_without_modification_or_type() {
        let mut model = PathwayModel::new();
        let ctrl = RelationBuilder::new(&mut model, true)
            .build_state_control(&protein("A"), &protein("B"), None, None)
            .unwrap();

        let c = control(&model, ctrl);
        assert_eq!(c.control_type, None);
        let conv = conversion(&model, c.controlled[0]);
        assert_eq!(conv.left, conv.right);
    }

    #[test]
    fn test_state_control_modification_needs_reference() {
        let mut model = PathwayModel::new();
        let err = RelationBuilder::new(&mut model, false)
            .build_state_control(&protein("A"), &protein("B"), Some("phosphorylated"), None)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(model.graph().node_count(), 0);
    }

    #[test]
    fn test_expression_regulation_topology() {
        let mut model = PathwayModel::new();
        let reg = RelationBuilder::new(&mut model, true)
            .build_expression_regulation(&protein("TP53"), &protein("MDM2"), ControlType::Activation)
            .unwrap();

        let c = control(&model, reg);
        assert_eq!(c.kind, ControlKind::TemplateReactionRegulation);
        assert_eq!(c.control_type, Some(ControlType::Activation));
        let reaction = conversion(&model, c.controlled[0]);
        assert_eq!(reaction.kind, ConversionKind::TemplateReaction);
        assert!(reaction.left.is_empty());
        assert_eq!(reaction.right.len(), 1);
    }

    #[test]
    fn test_control_sequence_topology() {
        let mut model = PathwayModel::new();
        let outer = RelationBuilder::new(&mut model, true)
            .build_other_interaction(&[protein("A"), protein("B")], Some(ControlType::Inhibition))
            .unwrap();

        let o = control(&model, outer);
        assert_eq!(o.kind, ControlKind::Control);
        assert_eq!(o.control_type, Some(ControlType::Inhibition));
        let inner = control(&model, o.controlled[0]);
        assert_eq!(inner.kind, ControlKind::Control);
        assert_eq!(inner.control_type, None);
        assert_ne!(inner.controllers[0], o.controllers[0]);
        assert!(model.graph().get(inner.controlled[0]).unwrap().as_conversion().is_some());
    }

    #[test]
    fn test_production_or_consumption_topology() {
        let mut model = PathwayModel::new();
        let mut builder = RelationBuilder::new(&mut model, true);
        let up = builder
            .build_other_interaction(&[protein("HK1"), chemical("G6P")], Some(ControlType::Activation))
            .unwrap();
        let down = builder
            .build_other_interaction(&[protein("HK1"), chemical("G6P")], Some(ControlType::Inhibition))
            .unwrap();

        let produced = conversion(&model, control(&model, up).controlled[0]);
        assert!(produced.left.is_empty());
        assert_eq!(produced.right.len(), 1);

        let consumed = conversion(&model, control(&model, down).controlled[0]);
        assert_eq!(consumed.left.len(), 1);
        assert!(consumed.right.is_empty());
        assert_eq!(produced.right[0], consumed.left[0]);
    }

    #[test]
    fn test_modulation_topology() {
        let mut model = PathwayModel::new();
        let top = RelationBuilder::new(&mut model, true)
            .build_other_interaction(&[chemical("imatinib"), protein("ABL1")], Some(ControlType::Inhibition))
            .unwrap();

        let m = control(&model, top);
        assert_eq!(m.kind, ControlKind::Modulation);
        assert_eq!(m.control_type, Some(ControlType::Inhibition));
        let catalysis = control(&model, m.controlled[0]);
        assert_eq!(catalysis.kind, ControlKind::Catalysis);
    }

    #[test]
    fn test_conversion_topology() {
        let mut model = PathwayModel::new();
        let mut builder = RelationBuilder::new(&mut model, true);
        let activation = builder
            .build_other_interaction(&[chemical("glucose"), chemical("G6P")], Some(ControlType::Activation))
            .unwrap();
        let inhibition = builder
            .build_other_interaction(&[chemical("glucose"), chemical("G6P")], Some(ControlType::Inhibition))
            .unwrap();

        let direct = conversion(&model, activation);
        assert_eq!(direct.left.len(), 1);
        assert_eq!(direct.right.len(), 1);

        let wrapped = control(&model, inhibition);
        assert_eq!(wrapped.control_type, Some(ControlType::Inhibition));
        assert_eq!(wrapped.controllers[0], direct.left[0]);
        assert_eq!(conversion(&model, wrapped.controlled[0]).right[0], direct.right[0]);
    }

    #[test]
    fn test_other_interaction_needs_two_participants() {
        let mut model = PathwayModel::new();
        let err = RelationBuilder::new(&mut model, true)
            .build_other_interaction(&[protein("A"), protein("B"), protein("C")], Some(ControlType::Activation))
            .unwrap_err();

        assert!(matches!(err, Error::MalformedTemplate(_)));
        assert_eq!(model.graph().node_count(), 0);
    }

    #[test]
    fn test_unsupported_combination_creates_nothing() {
        let mut model = PathwayModel::new();
        let complex = EntityDescriptor::new(EntityKind::Complex, "AP-1");
        let err = RelationBuilder::new(&mut model, true)
            .build_other_interaction(&[complex, protein("FOS")], Some(ControlType::Activation))
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedCombination { .. }));
        assert_eq!(model.graph().node_count(), 0);
    }

    #[test]
    fn test_uncontrolled_other_interaction() {
        let mut model = PathwayModel::new();
        let id = RelationBuilder::new(&mut model, true)
            .build_other_interaction(&[protein("A"), protein("B"), chemical("C")], None)
            .unwrap();

        let interaction = model.graph().get(id).unwrap().as_interaction().unwrap();
        assert_eq!(interaction.kind, InteractionKind::Interaction);
        assert_eq!(interaction.participants.len(), 3);
    }

    #[test]
    fn test_resolve_entity_reuses_equivalent_state() {
        let mut model = PathwayModel::new();
        let mut builder = RelationBuilder::new(&mut model, true);
        let phospho = protein("AKT1").with_location("cytoplasm").with_modification("phosphorylated");

        let a = builder.resolve_entity(&phospho).unwrap();
        let b = builder.resolve_entity(&phospho.clone()).unwrap();
        let base = builder.resolve_entity(&protein("AKT1").with_location("cytoplasm")).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, base);
        assert_eq!(model.modification_terms(a).into_iter().collect::<Vec<_>>(), vec!["phosphorylated"]);
    }

    #[test]
    fn test_resolve_entity_modification_without_reference() {
        let mut model = PathwayModel::new();
        let err = RelationBuilder::new(&mut model, false)
            .resolve_entity(&protein("AKT1").with_modification("phosphorylated"))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(model.graph().node_count(), 0);
    }

    #[test]
    fn test_empty_interaction_is_malformed() {
        let mut model = PathwayModel::new();
        let err = RelationBuilder::new(&mut model, true)
            .build_molecular_interaction(&[])
            .unwrap_err();
        assert!(matches!(err, Error::MalformedTemplate(_)));
    }
}
