//! Fired-rule record: the audit trail of one inference run.
//!
//! Each entry is a snapshot of the rule that fired (not a reference into
//! the knowledge base), so explanations built later always describe the
//! exact run that produced the report.

use triage_core::{Rule, Severity};

/// A rule that fired, with the facts that satisfied it.
#[derive(Debug, Clone, PartialEq)]
pub struct FiredRule {
    pub rule_id: String,
    pub disease: String,
    /// The rule's full condition set.
    pub conditions: Vec<String>,
    /// Conditions satisfied by the session's facts.
    pub matched: Vec<String>,
    pub confidence_boost: f64,
    pub severity: Severity,
    pub explanation: String,
    /// Position of the rule in catalog evaluation order.
    pub position: usize,
}

impl FiredRule {
    pub fn from_rule(rule: &Rule, matched: Vec<String>, position: usize) -> Self {
        FiredRule {
            rule_id: rule.id.clone(),
            disease: rule.disease.clone(),
            conditions: rule.conditions.clone(),
            matched,
            confidence_boost: rule.confidence_boost,
            severity: rule.severity,
            explanation: rule.explanation.clone(),
            position,
        }
    }
}

/// Fired rules in the order they were evaluated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiredRuleRecord(pub Vec<FiredRule>);

impl FiredRuleRecord {
    pub fn new() -> Self {
        FiredRuleRecord(Vec::new())
    }

    pub fn push(&mut self, fired: FiredRule) {
        self.0.push(fired);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FiredRule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fired rules supporting `disease`, in firing order.
    pub fn for_disease<'a>(&'a self, disease: &'a str) -> impl Iterator<Item = &'a FiredRule> + 'a {
        self.0.iter().filter(move |f| f.disease == disease)
    }

    /// Pre-normalization score accumulated by `disease`.
    pub fn score_for(&self, disease: &str) -> f64 {
        self.for_disease(disease).map(|f| f.confidence_boost).sum()
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.rule_id.as_str()).collect()
    }

    /// Serialize to JSON output format.
    pub fn to_json(&self) -> serde_json::Value {
        let fired: Vec<serde_json::Value> = self
            .0
            .iter()
            .map(|f| {
                serde_json::json!({
                    "rule": f.rule_id,
                    "disease": f.disease,
                    "conditions": f.conditions,
                    "matched": f.matched,
                    "confidence_boost": f.confidence_boost,
                    "severity": f.severity.as_str(),
                    "explanation": f.explanation,
                    "position": f.position,
                })
            })
            .collect();
        serde_json::Value::Array(fired)
    }
}

impl<'a> IntoIterator for &'a FiredRuleRecord {
    type Item = &'a FiredRule;
    type IntoIter = std::slice::Iter<'a, FiredRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
