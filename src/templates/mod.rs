//! # Template Dispatcher
//!
//! Single pass over an ordered sequence of template records:
//!
//! ```text
//! record → Template::from_record() → RelationBuilder entry point → nodes
//! ```
//!
//! Records of unknown type are skipped. A record that matches a known type
//! but cannot be built is rejected and the batch moves on, unless
//! `RecordErrorPolicy::Abort` is configured. Invariant violations always stop
//! the batch.

pub mod record;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{ConverterConfig, RecordErrorPolicy};
use crate::dedup::PathwayModel;
use crate::model::NodeId;
use crate::relations::RelationBuilder;
use crate::storage::GraphStore;
use crate::{Error, Result};

pub use record::{Template, TemplateType};

// ============================================================================
// Report
// ============================================================================

/// A record the dispatcher rejected under `RecordErrorPolicy::Skip`.
#[derive(Debug)]
pub struct RejectedRecord {
    pub index: usize,
    pub error: Error,
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Records that produced relations.
    pub processed: usize,
    /// Records of unknown type.
    pub skipped: usize,
    pub rejected: Vec<RejectedRecord>,
    /// Top-level relation of each processed record, in input order.
    pub relations: Vec<NodeId>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

pub struct Dispatcher<'m, S: GraphStore> {
    builder: RelationBuilder<'m, S>,
    policy: RecordErrorPolicy,
}

impl<'m, S: GraphStore> Dispatcher<'m, S> {
    pub fn new(model: &'m mut PathwayModel<S>, config: &ConverterConfig) -> Self {
        Self {
            builder: RelationBuilder::new(model, config.link_species_references),
            policy: config.on_record_error,
        }
    }

    /// Build one parsed template. Returns its top-level relation.
    pub fn dispatch(&mut self, template: &Template) -> Result<NodeId> {
        match template {
            Template::ProteinControlsState { controller, target, modification, control_type } => self
                .builder
                .build_state_control(controller, target, modification.as_deref(), *control_type),
            Template::ExpressionRegulation { controller, target, control_type } => {
                self.builder.build_expression_regulation(controller, target, *control_type)
            }
            Template::MolecularInteraction { participants } => {
                self.builder.build_molecular_interaction(participants)
            }
            Template::OtherInteraction { participants, control_type } => {
                self.builder.build_other_interaction(participants, *control_type)
            }
        }
    }

    /// Parse and build one raw record. `Ok(None)` when its type is unknown.
    pub fn dispatch_record(&mut self, record: &Value) -> Result<Option<NodeId>> {
        match Template::from_record(record)? {
            Some(template) => self.dispatch(&template).map(Some),
            None => {
                debug!(template_type = ?record.get("type"), "skipping template of unknown type");
                Ok(None)
            }
        }
    }

    /// Run a whole batch in input order.
    pub fn run<'r, I>(&mut self, records: I) -> Result<BuildReport>
    where
        I: IntoIterator<Item = &'r Value>,
    {
        let mut report = BuildReport::default();

        for (index, record) in records.into_iter().enumerate() {
            match self.dispatch_record(record) {
                Ok(Some(relation)) => {
                    report.processed += 1;
                    report.relations.push(relation);
                }
                Ok(None) => report.skipped += 1,
                Err(error) if error.is_fatal() || self.policy == RecordErrorPolicy::Abort => {
                    return Err(Error::Record { index, source: Box::new(error) });
                }
                Err(error) => {
                    warn!(index, %error, "rejected template");
                    report.rejected.push(RejectedRecord { index, error });
                }
            }
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            rejected = report.rejected.len(),
            "template batch complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeData, NodeLabel, ReferenceKind};
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn interaction(a: &str, b: &str) -> Value {
        json!({
            "type": "Molecular Interaction",
            "participants": [{"kind": "Protein", "name": a}, {"kind": "Protein", "name": b}],
        })
    }

    fn regulation_without_control_type() -> Value {
        json!({"type": "Expression Regulation", "controller": {"kind": "Protein", "name": "A"}})
    }

    /// Store that files every species reference as a small molecule
    /// reference, whatever kind was requested.
    #[derive(Debug, Default)]
    struct MislabelledStore(MemoryStore);

    impl GraphStore for MislabelledStore {
        fn insert(&mut self, mut data: NodeData, display_name: Option<String>) -> NodeId {
            if let NodeData::EntityReference(r) = &mut data {
                r.kind = ReferenceKind::SmallMolecule;
            }
            self.0.insert(data, display_name)
        }

        fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
            self.0.get_mut(id)
        }

        fn get(&self, id: NodeId) -> Option<&Node> {
            self.0.get(id)
        }

        fn node_count(&self) -> usize {
            self.0.node_count()
        }

        fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
            self.0.nodes()
        }

        fn ids_by_label(&self, label: NodeLabel) -> &[NodeId] {
            self.0.ids_by_label(label)
        }
    }

    #[test]
    fn test_run_counts() {
        let mut model = PathwayModel::new();
        let records = vec![interaction("A", "B"), json!({"type": "Nonsense"}), interaction("B", "C")];

        let report = Dispatcher::new(&mut model, &ConverterConfig::default()).run(&records).unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.skipped, 1);
        assert!(report.is_clean());
        assert_eq!(report.relations.len(), 2);
    }

    #[test]
    fn test_default_policy_rejects_only_the_bad_record() {
        let mut model = PathwayModel::new();
        let records = vec![interaction("A", "B"), regulation_without_control_type(), interaction("C", "D")];

        let report = Dispatcher::new(&mut model, &ConverterConfig::default()).run(&records).unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 1);
        assert!(matches!(report.rejected[0].error, Error::MalformedTemplate(_)));
        assert_eq!(model.graph().count_by_label(NodeLabel::Interaction), 2);
    }

    #[test]
    fn test_abort_policy_reports_index() {
        let mut model = PathwayModel::new();
        let config = ConverterConfig::default().with_record_error_policy(RecordErrorPolicy::Abort);
        let records = vec![interaction("A", "B"), regulation_without_control_type(), interaction("C", "D")];

        let err = Dispatcher::new(&mut model, &config).run(&records).unwrap_err();

        match err {
            Error::Record { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, Error::MalformedTemplate(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
        // the first record stays applied, the third never ran
        assert_eq!(model.graph().count_by_label(NodeLabel::Interaction), 1);
    }

    #[test]
    fn test_skip_policy_continues() {
        let mut model = PathwayModel::new();
        let config = ConverterConfig::default().with_record_error_policy(RecordErrorPolicy::Skip);
        let records = vec![
            json!({"type": "Other Interaction", "controlType": "activation", "participants": [
                {"kind": "Complex", "name": "AP-1"}, {"kind": "Protein", "name": "FOS"}
            ]}),
            interaction("C", "D"),
        ];

        let report = Dispatcher::new(&mut model, &config).run(&records).unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].index, 0);
        assert!(matches!(report.rejected[0].error, Error::UnsupportedCombination { .. }));
    }

    #[test]
    fn test_invariant_violation_stops_skip_policy() {
        let mut model = PathwayModel::with_store(MislabelledStore::default());
        let config = ConverterConfig::default().with_record_error_policy(RecordErrorPolicy::Skip);
        let records = vec![
            json!({"type": "Molecular Interaction", "participants": [{"kind": "Complex", "name": "AP-1"}]}),
            interaction("A", "B"),
            json!({"type": "Molecular Interaction", "participants": [{"kind": "Complex", "name": "NF-kB"}]}),
        ];

        let err = Dispatcher::new(&mut model, &config).run(&records).unwrap_err();

        match err {
            Error::Record { index, source } => {
                assert_eq!(index, 1);
                assert!(matches!(*source, Error::InvariantViolation(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(model.graph().count_by_label(NodeLabel::Interaction), 1);
        assert_eq!(model.graph().count_by_label(NodeLabel::PhysicalEntity), 1);
    }
}
