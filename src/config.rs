//! Build session configuration.

use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_BASE_URI: &str = "http://pathway-rs.local/model#";

/// What the dispatcher does with a record it has to reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordErrorPolicy {
    /// Stop the batch and return the error. Records before it stay applied.
    Abort,
    /// Log, record the rejection in the report and continue.
    #[default]
    Skip,
}

/// Configuration for one `Converter`.
///
/// Every field has a default, so `{}` is a valid JSON configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Prefix for node URIs in exports.
    pub base_uri: String,
    /// Give simple entities (proteins, small molecules, DNA, RNA) a species
    /// reference keyed by (kind, name). Without references entities are
    /// never deduplicated.
    pub link_species_references: bool,
    pub on_record_error: RecordErrorPolicy,
    /// Pretty-print JSON exports.
    pub pretty_export: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_owned(),
            link_species_references: true,
            on_record_error: RecordErrorPolicy::Skip,
            pretty_export: true,
        }
    }
}

impl ConverterConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    pub fn with_species_references(mut self, enabled: bool) -> Self {
        self.link_species_references = enabled;
        self
    }

    pub fn with_record_error_policy(mut self, policy: RecordErrorPolicy) -> Self {
        self.on_record_error = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = ConverterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ConverterConfig::default());
        assert_eq!(config.on_record_error, RecordErrorPolicy::Skip);
        assert!(config.link_species_references);
    }

    #[test]
    fn test_partial_json() {
        let config = ConverterConfig::from_json_str(
            r#"{"on_record_error": "abort", "link_species_references": false}"#,
        )
        .unwrap();

        assert_eq!(config.on_record_error, RecordErrorPolicy::Abort);
        assert!(!config.link_species_references);
        assert_eq!(config.base_uri, DEFAULT_BASE_URI);
    }

    #[test]
    fn test_bad_policy_is_error() {
        assert!(ConverterConfig::from_json_str(r#"{"on_record_error": "retry"}"#).is_err());
    }
}
