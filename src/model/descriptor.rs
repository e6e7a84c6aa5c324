//! Entity descriptors as they appear inside template records.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::EntityKind;

/// A participant of a template: `{kind, name, location?, modifications?}`.
///
/// `type` is accepted for `kind` and `cellularLocation` for `location`.
/// A missing or `null` modification list is the empty set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    #[serde(alias = "type")]
    pub kind: EntityKind,
    pub name: String,
    #[serde(default, alias = "cellularLocation", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "BTreeSet::is_empty")]
    pub modifications: BTreeSet<String>,
}

impl EntityDescriptor {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            location: None,
            modifications: BTreeSet::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_modification(mut self, modification: impl Into<String>) -> Self {
        self.modifications.insert(modification.into());
        self
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}
