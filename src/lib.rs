//! # pathway-rs: Pathway Graphs from Interaction Templates
//!
//! Turns compact template records ("A phosphorylates B", "A regulates
//! expression of B", "A and B interact", ...) into an in-memory pathway
//! graph of species references, physical entities, controlled vocabulary
//! terms, modification features and relations.
//!
//! ## Design Principles
//!
//! 1. **Structural identity**: a species in the same location with the same
//!    modifications is one node, however many templates mention it
//! 2. **Relations are events**: every template record creates fresh
//!    relation nodes
//! 3. **Trait-first storage**: `GraphStore` is the contract between the
//!    builder and the node arena
//! 4. **Loud rejects**: a recognized but malformed record is an error, never
//!    a silently partial graph
//!
//! ## Quick Start
//!
//! ```rust
//! use pathway_rs::{Converter, NodeLabel, storage::GraphStore};
//!
//! # fn example() -> pathway_rs::Result<()> {
//! let mut converter = Converter::new();
//! let report = converter.add_templates_str(r#"[
//!     {"type": "Molecular Interaction",
//!      "participants": [{"kind": "Protein", "name": "A"},
//!                       {"kind": "Protein", "name": "B"}]}
//! ]"#)?;
//!
//! assert_eq!(report.processed, 1);
//! assert_eq!(converter.graph().count_by_label(NodeLabel::PhysicalEntity), 2);
//! assert_eq!(converter.graph().count_by_label(NodeLabel::Interaction), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Template Types
//!
//! | Type | Fields |
//! |------|--------|
//! | Protein Controls State | `controller`, `target`, `modification?`, `controlType?` |
//! | Expression Regulation | `controller`, `target`, `controlType` |
//! | Molecular Interaction | `participants` |
//! | Other Interaction | `participants`, `controlType?` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod factory;
pub mod dedup;
pub mod relations;
pub mod templates;
pub mod export;
pub mod config;

use std::io::{Read, Write};

use serde_json::Value;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Node, NodeId, NodeData, NodeLabel, EntityDescriptor,
    EntityKind, ReferenceKind, VocabularyCategory, ControlType,
};

// ============================================================================
// Re-exports: Building
// ============================================================================

pub use config::{ConverterConfig, RecordErrorPolicy};
pub use dedup::PathwayModel;
pub use export::{GraphExporter, JsonExporter};
pub use relations::{OtherInteractionTopology, RelationBuilder};
pub use storage::{GraphStore, MemoryStore};
pub use templates::{BuildReport, Dispatcher, RejectedRecord, Template, TemplateType};

// ============================================================================
// Top-level Converter handle
// ============================================================================

/// The primary entry point. A `Converter` owns one build session: its
/// configuration and the pathway model that templates are added to.
#[derive(Debug)]
pub struct Converter<S: GraphStore = MemoryStore> {
    config: ConverterConfig,
    model: PathwayModel<S>,
}

impl Converter {
    /// In-memory converter with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    pub fn with_config(config: ConverterConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphStore> Converter<S> {
    pub fn with_store(store: S, config: ConverterConfig) -> Self {
        Self { config, model: PathwayModel::with_store(store) }
    }

    /// Add templates from JSON text holding an array of records.
    pub fn add_templates_str(&mut self, content: &str) -> Result<BuildReport> {
        let value: Value = serde_json::from_str(content)?;
        self.add_templates_value(&value)
    }

    /// Add templates from a reader holding a JSON array of records.
    pub fn add_templates_reader<R: Read>(&mut self, reader: R) -> Result<BuildReport> {
        let value: Value = serde_json::from_reader(reader)?;
        self.add_templates_value(&value)
    }

    /// Add an already parsed JSON array of records.
    pub fn add_templates_value(&mut self, templates: &Value) -> Result<BuildReport> {
        let Some(records) = templates.as_array() else {
            return Err(Error::MalformedTemplate("expected a JSON array of templates".into()));
        };
        self.add_templates(records)
    }

    /// Add records in order. See `Dispatcher::run` for error handling.
    pub fn add_templates(&mut self, records: &[Value]) -> Result<BuildReport> {
        Dispatcher::new(&mut self.model, &self.config).run(records)
    }

    /// Add a single record. `Ok(None)` if its type is unknown.
    pub fn add_template(&mut self, record: &Value) -> Result<Option<NodeId>> {
        Dispatcher::new(&mut self.model, &self.config).dispatch_record(record)
    }

    /// Direct access to the relation builder, bypassing template parsing.
    pub fn builder(&mut self) -> RelationBuilder<'_, S> {
        RelationBuilder::new(&mut self.model, self.config.link_species_references)
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn model(&self) -> &PathwayModel<S> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut PathwayModel<S> {
        &mut self.model
    }

    /// Read access to the built graph.
    pub fn graph(&self) -> &S {
        self.model.graph()
    }

    /// URI of a node under the configured base.
    pub fn uri(&self, id: NodeId) -> Result<String> {
        let node = self.graph().require(id)?;
        Ok(export::node_uri(&self.config.base_uri, node))
    }

    pub fn export<E: GraphExporter>(&self, exporter: &E, writer: &mut dyn Write) -> Result<()> {
        exporter.export(self.graph(), writer)
    }

    pub fn export_to_string<E: GraphExporter>(&self, exporter: &E) -> Result<String> {
        exporter.export_to_string(self.graph())
    }

    /// JSON snapshot of the graph, formatted per `pretty_export`.
    pub fn export_json(&self) -> Result<String> {
        let mut exporter = JsonExporter::new(self.config.base_uri.clone());
        exporter.pretty = self.config.pretty_export;
        self.export_to_string(&exporter)
    }

    pub fn into_model(self) -> PathwayModel<S> {
        self.model
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed template: {0}")]
    MalformedTemplate(String),

    #[error("Unsupported participant combination: {source_kind} -> {target_kind}")]
    UnsupportedCombination { source_kind: EntityKind, target_kind: EntityKind },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Template {index}: {source}")]
    Record { index: usize, source: Box<Error> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Fatal errors stop a batch regardless of `RecordErrorPolicy`.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::InvariantViolation(_) => true,
            Error::Record { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
