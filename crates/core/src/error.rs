use std::path::PathBuf;

/// All errors that can be returned while loading or building a knowledge base.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A rule violates a catalog invariant (empty conditions, non-positive
    /// boost, duplicate id, unknown disease). Fatal at startup.
    #[error("invalid rule definition '{rule_id}' ({field}): {message}")]
    InvalidRuleDefinition {
        rule_id: String,
        field: &'static str,
        message: String,
    },

    /// A disease entry is malformed or declared twice.
    #[error("invalid disease definition '{disease_id}': {message}")]
    InvalidDiseaseDefinition { disease_id: String, message: String },

    /// A symptom token is not part of the catalog vocabulary.
    #[error("unknown symptom: {symptom}")]
    UnknownSymptom { symptom: String },

    /// The catalog document is not valid JSON or does not match the
    /// expected shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog file could not be read.
    #[error("failed to read catalog '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn rule(rule_id: &str, field: &'static str, message: impl Into<String>) -> Self {
        CatalogError::InvalidRuleDefinition {
            rule_id: rule_id.to_owned(),
            field,
            message: message.into(),
        }
    }

    /// Serialize to the `{"error": ...}` shape used by the front-ends.
    pub fn to_json_value(&self) -> serde_json::Value {
        let kind = match self {
            CatalogError::InvalidRuleDefinition { .. } => "invalid_rule_definition",
            CatalogError::InvalidDiseaseDefinition { .. } => "invalid_disease_definition",
            CatalogError::UnknownSymptom { .. } => "unknown_symptom",
            CatalogError::Parse(_) => "parse",
            CatalogError::Io { .. } => "io",
        };
        serde_json::json!({
            "error": self.to_string(),
            "kind": kind,
        })
    }
}
