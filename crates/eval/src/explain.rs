//! Explanation traces derived from a fired-rule record.
//!
//! Explanations are read straight off the record of the run that produced
//! the report; nothing is re-matched. The boosts listed for a disease
//! therefore always sum to its pre-normalization score.

use std::collections::BTreeSet;

use triage_core::Severity;

use crate::provenance::FiredRuleRecord;
use crate::report::{Diagnosis, DiagnosisReport};

/// Why one rule contributed to a disease.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationEntry {
    pub rule_id: String,
    /// The rule's full condition set.
    pub conditions: Vec<String>,
    /// Conditions the session's facts satisfied. Equal to `conditions`
    /// under all-or-nothing matching.
    pub satisfied: Vec<String>,
    pub confidence_boost: f64,
    pub severity: Severity,
    pub explanation: String,
}

/// Every entry supporting one disease, in firing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub disease: String,
    pub entries: Vec<ExplanationEntry>,
}

impl Explanation {
    pub fn total_boost(&self) -> f64 {
        self.entries.iter().map(|e| e.confidence_boost).sum()
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.rule_id.as_str()).collect()
    }

    /// Distinct satisfied symptoms across all entries, sorted.
    pub fn contributing_symptoms(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .entries
            .iter()
            .flat_map(|e| e.satisfied.iter().map(String::as_str))
            .collect();
        set.into_iter().collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let entries: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "rule": e.rule_id,
                    "conditions": e.conditions,
                    "satisfied": e.satisfied,
                    "confidence_boost": e.confidence_boost,
                    "severity": e.severity.as_str(),
                    "explanation": e.explanation,
                })
            })
            .collect();
        serde_json::json!({
            "disease": self.disease,
            "total_boost": self.total_boost(),
            "contributing_symptoms": self.contributing_symptoms(),
            "rules": entries,
        })
    }
}

/// Entries for each rule that fired in support of `disease`.
///
/// Empty when the disease did not score in this run.
pub fn explain(disease: &str, fired: &FiredRuleRecord) -> Vec<ExplanationEntry> {
    fired
        .for_disease(disease)
        .map(|f| ExplanationEntry {
            rule_id: f.rule_id.clone(),
            conditions: f.conditions.clone(),
            satisfied: f.matched.clone(),
            confidence_boost: f.confidence_boost,
            severity: f.severity,
            explanation: f.explanation.clone(),
        })
        .collect()
}

/// Explanations for the `n` highest-ranked diseases, in rank order.
pub fn explain_top(report: &DiagnosisReport, fired: &FiredRuleRecord, n: usize) -> Vec<Explanation> {
    report
        .diagnoses()
        .iter()
        .take(n)
        .map(|d| Explanation {
            disease: d.disease.clone(),
            entries: explain(&d.disease, fired),
        })
        .collect()
}

/// One-line rationale for quick display.
pub fn summary_line(diagnosis: &Diagnosis, explanation: &Explanation) -> String {
    format!(
        "{} diagnosed with {:.1}% confidence based on rules {} matching symptoms: {}.",
        diagnosis.display_name,
        diagnosis.confidence,
        explanation.rule_ids().join(", "),
        explanation.contributing_symptoms().join(", ")
    )
}
