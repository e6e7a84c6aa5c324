//! Relation nodes: conversions, controls and interactions.
//!
//! Relations are never deduplicated. Every template record produces fresh
//! relation nodes, even when their participants are reused.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::NodeId;
use crate::Error;

/// Effect of a control on the process it controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlType {
    Activation,
    Inhibition,
}

impl ControlType {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlType::Activation => "ACTIVATION",
            ControlType::Inhibition => "INHIBITION",
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ACTIVATION") {
            Ok(ControlType::Activation)
        } else if s.eq_ignore_ascii_case("INHIBITION") {
            Ok(ControlType::Inhibition)
        } else {
            Err(Error::MalformedTemplate(format!("unknown control type '{s}'")))
        }
    }
}

/// Direction of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionDirection {
    LeftToRight,
    Reversible,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversionKind {
    BiochemicalReaction,
    /// Synthesis of a product from a template (expression).
    TemplateReaction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Control,
    Catalysis,
    Modulation,
    TemplateReactionRegulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    MolecularInteraction,
    Interaction,
}

/// A process turning `left` participants into `right` participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub kind: ConversionKind,
    pub left: SmallVec<[NodeId; 2]>,
    pub right: SmallVec<[NodeId; 2]>,
    pub direction: Option<ConversionDirection>,
}

impl Conversion {
    pub fn new(kind: ConversionKind) -> Self {
        Self {
            kind,
            left: SmallVec::new(),
            right: SmallVec::new(),
            direction: None,
        }
    }
}

/// A controller acting on a process (a conversion or another control).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub kind: ControlKind,
    pub controllers: SmallVec<[NodeId; 1]>,
    pub controlled: SmallVec<[NodeId; 1]>,
    pub control_type: Option<ControlType>,
}

impl Control {
    pub fn new(kind: ControlKind) -> Self {
        Self {
            kind,
            controllers: SmallVec::new(),
            controlled: SmallVec::new(),
            control_type: None,
        }
    }
}

/// Undirected, symmetric n-ary interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub participants: SmallVec<[NodeId; 4]>,
}

impl Interaction {
    pub fn new(kind: InteractionKind) -> Self {
        Self { kind, participants: SmallVec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_type_parsing() {
        assert_eq!("activation".parse::<ControlType>().unwrap(), ControlType::Activation);
        assert_eq!("INHIBITION".parse::<ControlType>().unwrap(), ControlType::Inhibition);
        assert!(matches!(
            "stimulation".parse::<ControlType>(),
            Err(Error::MalformedTemplate(_))
        ));
    }

    #[test]
    fn test_control_type_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&ControlType::Inhibition).unwrap(),
            "\"INHIBITION\""
        );
        assert_eq!(
            serde_json::to_string(&ConversionDirection::LeftToRight).unwrap(),
            "\"LEFT_TO_RIGHT\""
        );
    }
}
