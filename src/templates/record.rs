//! Typed template records.
//!
//! A record is a JSON object whose `type` field names one of four template
//! types (case-insensitive). This module checks the discriminator and pulls
//! out the typed sub-fields; it creates no nodes.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{ControlType, EntityDescriptor};
use crate::{Error, Result};

/// The four known template types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateType {
    ProteinControlsState,
    ExpressionRegulation,
    MolecularInteraction,
    OtherInteraction,
}

impl TemplateType {
    pub const ALL: [TemplateType; 4] = [
        TemplateType::ProteinControlsState,
        TemplateType::ExpressionRegulation,
        TemplateType::MolecularInteraction,
        TemplateType::OtherInteraction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TemplateType::ProteinControlsState => "Protein Controls State",
            TemplateType::ExpressionRegulation => "Expression Regulation",
            TemplateType::MolecularInteraction => "Molecular Interaction",
            TemplateType::OtherInteraction => "Other Interaction",
        }
    }

    /// Case-insensitive lookup. `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A template record with its fields extracted.
#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    ProteinControlsState {
        controller: EntityDescriptor,
        target: EntityDescriptor,
        modification: Option<String>,
        control_type: Option<ControlType>,
    },
    ExpressionRegulation {
        controller: EntityDescriptor,
        target: EntityDescriptor,
        control_type: ControlType,
    },
    MolecularInteraction {
        participants: Vec<EntityDescriptor>,
    },
    OtherInteraction {
        participants: Vec<EntityDescriptor>,
        control_type: Option<ControlType>,
    },
}

impl Template {
    pub fn template_type(&self) -> TemplateType {
        match self {
            Template::ProteinControlsState { .. } => TemplateType::ProteinControlsState,
            Template::ExpressionRegulation { .. } => TemplateType::ExpressionRegulation,
            Template::MolecularInteraction { .. } => TemplateType::MolecularInteraction,
            Template::OtherInteraction { .. } => TemplateType::OtherInteraction,
        }
    }

    /// Parse one record. `Ok(None)` means the type is not one we know and
    /// the record should be skipped.
    pub fn from_record(record: &Value) -> Result<Option<Self>> {
        let Some(record) = record.as_object() else {
            return Err(Error::MalformedTemplate(format!(
                "template must be a JSON object, got {}",
                json_kind(record)
            )));
        };

        let type_name = optional_str(record, "type")?
            .ok_or_else(|| Error::MalformedTemplate("template has no 'type' field".into()))?;
        let Some(template_type) = TemplateType::from_name(type_name) else {
            return Ok(None);
        };

        let template = match template_type {
            TemplateType::ProteinControlsState => Template::ProteinControlsState {
                controller: descriptor(record, "controller", template_type)?,
                target: descriptor(record, "target", template_type)?,
                modification: optional_str(record, "modification")?.map(str::to_owned),
                control_type: control_type(record)?,
            },
            TemplateType::ExpressionRegulation => Template::ExpressionRegulation {
                controller: descriptor(record, "controller", template_type)?,
                target: descriptor(record, "target", template_type)?,
                control_type: control_type(record)?.ok_or_else(|| missing("controlType", template_type))?,
            },
            TemplateType::MolecularInteraction => Template::MolecularInteraction {
                participants: participants(record, template_type)?,
            },
            TemplateType::OtherInteraction => Template::OtherInteraction {
                participants: participants(record, template_type)?,
                control_type: control_type(record)?,
            },
        };

        Ok(Some(template))
    }
}

// ============================================================================
// Field extraction
// ============================================================================

/// A present, non-null field.
fn field<'r>(record: &'r Map<String, Value>, key: &str) -> Option<&'r Value> {
    record.get(key).filter(|v| !v.is_null())
}

fn missing(key: &str, template_type: TemplateType) -> Error {
    Error::MalformedTemplate(format!("'{template_type}' template is missing '{key}'"))
}

fn optional_str<'r>(record: &'r Map<String, Value>, key: &str) -> Result<Option<&'r str>> {
    match field(record, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::MalformedTemplate(format!(
            "'{key}' must be a string, got {}",
            json_kind(other)
        ))),
    }
}

fn control_type(record: &Map<String, Value>) -> Result<Option<ControlType>> {
    optional_str(record, "controlType")?
        .map(str::parse::<ControlType>)
        .transpose()
}

fn descriptor(record: &Map<String, Value>, key: &str, template_type: TemplateType) -> Result<EntityDescriptor> {
    let value = field(record, key).ok_or_else(|| missing(key, template_type))?;
    EntityDescriptor::deserialize(value)
        .map_err(|e| Error::MalformedTemplate(format!("'{key}' is not a valid entity: {e}")))
}

fn participants(record: &Map<String, Value>, template_type: TemplateType) -> Result<Vec<EntityDescriptor>> {
    let value = field(record, "participants").ok_or_else(|| missing("participants", template_type))?;
    Vec::<EntityDescriptor>::deserialize(value)
        .map_err(|e| Error::MalformedTemplate(format!("'participants' is not a list of entities: {e}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
