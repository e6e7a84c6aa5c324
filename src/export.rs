//! Graph export: hand the built graph to a serializer.
//!
//! `GraphExporter` is the boundary: it gets read access to the whole graph
//! and a writer, and never calls back into the builder.
//!
//! ```text
//! PathwayModel → GraphExporter::export() → text
//! ```
//!
//! `JsonExporter` writes a JSON snapshot of every node, each tagged with its
//! URI under the configured base.

use std::io::Write;

use serde::Serialize;

use crate::model::*;
use crate::storage::GraphStore;
use crate::Result;

/// Serializes a whole graph.
pub trait GraphExporter {
    fn export<S: GraphStore>(&self, graph: &S, writer: &mut dyn Write) -> Result<()>;

    fn export_to_string<S: GraphStore>(&self, graph: &S) -> Result<String> {
        let mut buf = Vec::new();
        self.export(graph, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// URI of a node under `base`, e.g. `http://x#PhysicalEntity_7`.
pub fn node_uri(base: &str, node: &Node) -> String {
    format!("{base}{}_{}", class_name(node), node.id)
}

/// Pathway-model class name of a node.
pub fn class_name(node: &Node) -> &'static str {
    match &node.data {
        NodeData::EntityReference(r) => r.kind.as_str(),
        NodeData::Vocabulary(v) => v.category.as_str(),
        NodeData::ModificationFeature(_) => "ModificationFeature",
        NodeData::PhysicalEntity(pe) => pe.kind.as_str(),
        NodeData::Conversion(c) => match c.kind {
            ConversionKind::BiochemicalReaction => "BiochemicalReaction",
            ConversionKind::TemplateReaction => "TemplateReaction",
        },
        NodeData::Control(c) => match c.kind {
            ControlKind::Control => "Control",
            ControlKind::Catalysis => "Catalysis",
            ControlKind::Modulation => "Modulation",
            ControlKind::TemplateReactionRegulation => "TemplateReactionRegulation",
        },
        NodeData::Interaction(i) => match i.kind {
            InteractionKind::MolecularInteraction => "MolecularInteraction",
            InteractionKind::Interaction => "Interaction",
        },
    }
}

// ============================================================================
// JSON snapshot
// ============================================================================

#[derive(Debug, Clone)]
pub struct JsonExporter {
    pub base_uri: String,
    pub pretty: bool,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    base: &'a str,
    node_count: usize,
    nodes: Vec<NodeRecord<'a>>,
}

#[derive(Serialize)]
struct NodeRecord<'a> {
    uri: String,
    #[serde(flatten)]
    node: &'a Node,
}

impl JsonExporter {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self { base_uri: base_uri.into(), pretty: true }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl GraphExporter for JsonExporter {
    fn export<S: GraphStore>(&self, graph: &S, writer: &mut dyn Write) -> Result<()> {
        let snapshot = Snapshot {
            base: &self.base_uri,
            node_count: graph.node_count(),
            nodes: graph
                .nodes()
                .map(|node| NodeRecord { uri: node_uri(&self.base_uri, node), node })
                .collect(),
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &snapshot)?;
        } else {
            serde_json::to_writer(&mut *writer, &snapshot)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::Value;

    fn seed() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(NodeData::PhysicalEntity(PhysicalEntity::new(EntityKind::Protein)), Some("TP53".into()));
        store.insert(
            NodeData::Vocabulary(VocabularyTerm {
                category: VocabularyCategory::CellularLocation,
                term: "nucleus".into(),
            }),
            None,
        );
        store
    }

    #[test]
    fn test_node_uri() {
        let store = seed();
        let node = store.get(NodeId(1)).unwrap();
        assert_eq!(node_uri("http://x#", node), "http://x#Protein_1");
        assert_eq!(class_name(store.get(NodeId(2)).unwrap()), "CellularLocationVocabulary");
    }

    #[test]
    fn test_json_snapshot() {
        let store = seed();
        let out = JsonExporter::new("http://x#").compact().export_to_string(&store).unwrap();
        let json: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["base"], "http://x#");
        assert_eq!(json["node_count"], 2);
        assert_eq!(json["nodes"][0]["uri"], "http://x#Protein_1");
        assert_eq!(json["nodes"][0]["display_name"], "TP53");
        assert_eq!(json["nodes"][0]["data"]["class"], "PhysicalEntity");
        assert_eq!(json["nodes"][1]["data"]["term"], "nucleus");
    }

    #[test]
    fn test_compact_is_single_line() {
        let out = JsonExporter::new("b#").compact().export_to_string(&seed()).unwrap();
        assert_eq!(out.lines().count(), 1);
    }
}
