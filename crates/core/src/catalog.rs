//! Raw catalog definitions as they appear in catalog JSON documents.
//!
//! These records are unvalidated. [`crate::build_knowledge_base`] checks
//! them and turns them into the frozen [`crate::KnowledgeBase`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::rule::Severity;

/// The catalog shipped with the crate.
pub static BUILTIN_CATALOG: &str = include_str!("../../../data/catalog.json");

/// A whole catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDef {
    pub catalog: String,
    pub version: String,
    #[serde(default)]
    pub diseases: Vec<DiseaseDef>,
    #[serde(default)]
    pub symptoms: Vec<SymptomDef>,
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiseaseDef {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub recommended_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymptomDef {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub id: String,
    pub disease: String,
    pub conditions: Vec<String>,
    pub confidence_boost: f64,
    /// Falls back to the disease's severity when omitted.
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub explanation: String,
}

impl RuleDef {
    pub fn new(id: &str, disease: &str, conditions: &[&str], confidence_boost: f64) -> Self {
        RuleDef {
            id: id.to_string(),
            disease: disease.to_string(),
            conditions: conditions.iter().map(|c| c.to_string()).collect(),
            confidence_boost,
            severity: None,
            explanation: String::new(),
        }
    }
}

/// Parse a catalog document from JSON text.
pub fn parse_catalog(json: &str) -> Result<CatalogDef, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a catalog document from disk.
pub fn load_catalog(path: &Path) -> Result<CatalogDef, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&text)
}

/// The built-in catalog definitions.
pub fn builtin_catalog() -> Result<CatalogDef, CatalogError> {
    parse_catalog(BUILTIN_CATALOG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses() {
        let def = builtin_catalog().unwrap();
        assert_eq!(def.catalog, "fever-triage");
        assert_eq!(def.version, crate::CATALOG_FORMAT_VERSION);
        assert_eq!(def.diseases.len(), 4);
        assert_eq!(def.rules.len(), 75);
        assert_eq!(def.rules[0].id, "R01");
    }

    #[test]
    fn rule_severity_is_optional() {
        let def = parse_catalog(
            r#"{
                "catalog": "mini",
                "version": "1.0",
                "rules": [
                    { "id": "A1", "disease": "flu", "conditions": ["cough"], "confidence_boost": 5 }
                ]
            }"#,
        )
        .unwrap();
        assert!(def.diseases.is_empty());
        assert_eq!(def.rules[0].severity, None);
        assert_eq!(def.rules[0].explanation, "");
        assert_eq!(def.rules[0].confidence_boost, 5.0);
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = parse_catalog(
            r#"{ "catalog": "mini", "version": "1.0", "rules": [], "weights": {} }"#,
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_catalog(Path::new("/nonexistent/catalog.json")).unwrap_err();
        match err {
            CatalogError::Io { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/catalog.json"))
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
