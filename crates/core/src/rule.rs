//! Catalog records: rules, diseases, symptoms and severity levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity attached to a rule or a disease.
///
/// Ordered from least to most severe so that `max()` picks the worst.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single IF-THEN diagnostic rule.
///
/// The rule fires when every symptom in `conditions` is present in the
/// session's facts; it then adds `confidence_boost` to `disease`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub id: String,
    /// Normalized symptom tokens, in catalog order, no duplicates.
    pub conditions: Vec<String>,
    pub disease: String,
    pub confidence_boost: f64,
    pub severity: Severity,
    pub explanation: String,
}

/// Display metadata for a disease the catalog can conclude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseInfo {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub severity: Severity,
    pub recommended_action: String,
}

impl DiseaseInfo {
    /// Minimal metadata: display name only, low severity, no description.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        DiseaseInfo {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            severity: Severity::Low,
            recommended_action: String::new(),
        }
    }
}

/// A symptom token with its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomInfo {
    pub id: String,
    pub label: String,
}

/// Canonical form of a symptom token: trimmed and ASCII-lowercased.
pub fn normalize_symptom(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_low_to_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(
            [Severity::Medium, Severity::Critical, Severity::Low]
                .into_iter()
                .max(),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn severity_round_trips_lowercase() {
        let s: Severity = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(s, Severity::High);
        assert_eq!(serde_json::to_string(&Severity::Low).unwrap(), "\"low\"");
        assert!(serde_json::from_str::<Severity>("\"HIGH\"").is_err());
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_symptom("  High_Fever "), "high_fever");
        assert_eq!(normalize_symptom("rash"), "rash");
    }
}
