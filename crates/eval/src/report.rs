//! Diagnosis report: ranked diseases with normalized confidence.

use triage_core::Severity;

/// One ranked disease in a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub disease: String,
    pub display_name: String,
    /// Accumulated confidence boosts before normalization.
    pub score: f64,
    /// Share of the total score, in percent. Not rounded.
    pub confidence: f64,
    pub severity: Severity,
    pub description: String,
    pub recommended_action: String,
    /// Union of the conditions of every fired rule, sorted.
    pub matched_symptoms: Vec<String>,
    pub rule_count: usize,
}

/// Ranked outcome of one inference run.
///
/// An empty report means no rule fired. That is a valid result, distinct
/// from an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosisReport {
    diagnoses: Vec<Diagnosis>,
    total_score: f64,
}

impl DiagnosisReport {
    pub fn empty() -> Self {
        DiagnosisReport::default()
    }

    /// Rank `diagnoses` by descending confidence, ties broken by
    /// ascending disease id.
    pub(crate) fn ranked(mut diagnoses: Vec<Diagnosis>, total_score: f64) -> Self {
        diagnoses.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.disease.cmp(&b.disease))
        });
        DiagnosisReport {
            diagnoses,
            total_score,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.diagnoses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnoses.len()
    }

    /// Diagnoses, highest confidence first.
    pub fn diagnoses(&self) -> &[Diagnosis] {
        &self.diagnoses
    }

    pub fn top(&self) -> Option<&Diagnosis> {
        self.diagnoses.first()
    }

    pub fn get(&self, disease: &str) -> Option<&Diagnosis> {
        self.diagnoses.iter().find(|d| d.disease == disease)
    }

    /// Confidence for `disease`; 0.0 when it did not score.
    pub fn confidence_for(&self, disease: &str) -> f64 {
        self.get(disease).map_or(0.0, |d| d.confidence)
    }

    pub fn total_score(&self) -> f64 {
        self.total_score
    }

    /// Disease ids in rank order.
    pub fn ranking(&self) -> Vec<&str> {
        self.diagnoses.iter().map(|d| d.disease.as_str()).collect()
    }

    /// Serialize to JSON output format.
    pub fn to_json(&self) -> serde_json::Value {
        let diagnoses: Vec<serde_json::Value> = self
            .diagnoses
            .iter()
            .enumerate()
            .map(|(i, d)| {
                serde_json::json!({
                    "rank": i + 1,
                    "disease": d.disease,
                    "display_name": d.display_name,
                    "score": d.score,
                    "confidence": d.confidence,
                    "severity": d.severity.as_str(),
                    "description": d.description,
                    "recommended_action": d.recommended_action,
                    "matched_symptoms": d.matched_symptoms,
                    "rule_count": d.rule_count,
                })
            })
            .collect();
        serde_json::json!({
            "total_score": self.total_score,
            "diagnoses": diagnoses,
        })
    }
}
