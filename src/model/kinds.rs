//! Closed classifications for molecules and vocabularies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::Error;

/// Molecular kind of a physical entity.
///
/// `Protein`, `SmallMolecule`, `Dna` and `Rna` form the "simple" family: only
/// they may carry a species reference. `Complex` and the generic
/// `PhysicalEntity` never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Protein,
    SmallMolecule,
    Dna,
    Rna,
    Complex,
    PhysicalEntity,
}

impl EntityKind {
    pub fn is_simple(self) -> bool {
        self.reference_kind().is_some()
    }

    /// The reference kind that canonically identifies entities of this kind.
    pub fn reference_kind(self) -> Option<ReferenceKind> {
        match self {
            EntityKind::Protein => Some(ReferenceKind::Protein),
            EntityKind::SmallMolecule => Some(ReferenceKind::SmallMolecule),
            EntityKind::Dna => Some(ReferenceKind::Dna),
            EntityKind::Rna => Some(ReferenceKind::Rna),
            EntityKind::Complex | EntityKind::PhysicalEntity => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Protein => "Protein",
            EntityKind::SmallMolecule => "SmallMolecule",
            EntityKind::Dna => "Dna",
            EntityKind::Rna => "Rna",
            EntityKind::Complex => "Complex",
            EntityKind::PhysicalEntity => "PhysicalEntity",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    /// Case-insensitive; spaces, dashes and underscores are ignored, so
    /// `"small molecule"`, `"smallMolecule"` and `"SMALL_MOLECULE"` agree.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "protein" | "ggp" => Ok(EntityKind::Protein),
            "smallmolecule" | "chemical" => Ok(EntityKind::SmallMolecule),
            "dna" => Ok(EntityKind::Dna),
            "rna" => Ok(EntityKind::Rna),
            "complex" => Ok(EntityKind::Complex),
            "physicalentity" | "entity" => Ok(EntityKind::PhysicalEntity),
            _ => Err(Error::MalformedTemplate(format!("unknown entity kind '{s}'"))),
        }
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of canonical species identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceKind {
    Protein,
    SmallMolecule,
    Dna,
    Rna,
}

impl ReferenceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceKind::Protein => "ProteinReference",
            ReferenceKind::SmallMolecule => "SmallMoleculeReference",
            ReferenceKind::Dna => "DnaReference",
            ReferenceKind::Rna => "RnaReference",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Taxonomy a controlled vocabulary term is drawn from. Terms are interned
/// per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VocabularyCategory {
    CellularLocation,
    SequenceModification,
}

impl VocabularyCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            VocabularyCategory::CellularLocation => "CellularLocationVocabulary",
            VocabularyCategory::SequenceModification => "SequenceModificationVocabulary",
        }
    }
}

impl fmt::Display for VocabularyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
