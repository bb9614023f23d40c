//! Forward-chaining inference with additive confidence.
//!
//! One deterministic pass over the catalog in order: a rule fires when
//! every one of its conditions is in working memory, and adds its boost
//! to its disease. Firing never adds facts, so no fixpoint iteration is
//! needed. Scores are then normalized to percentages and ranked.

use std::collections::{BTreeMap, BTreeSet};

use triage_core::{KnowledgeBase, Rule, Severity};

use crate::provenance::{FiredRule, FiredRuleRecord};
use crate::report::{Diagnosis, DiagnosisReport};
use crate::working_memory::WorkingMemory;

/// Report plus the audit trail of the run that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageResult {
    pub report: DiagnosisReport,
    pub fired: FiredRuleRecord,
}

/// Matches a knowledge base against working memory. Holds no session
/// state, so one engine can serve any number of sessions.
#[derive(Debug, Clone, Copy)]
pub struct InferenceEngine<'kb> {
    kb: &'kb KnowledgeBase,
}

#[derive(Default)]
struct Accumulator {
    score: f64,
    severity: Option<Severity>,
    matched: BTreeSet<String>,
    rule_count: usize,
}

impl<'kb> InferenceEngine<'kb> {
    pub fn new(kb: &'kb KnowledgeBase) -> Self {
        InferenceEngine { kb }
    }

    pub fn knowledge_base(&self) -> &'kb KnowledgeBase {
        self.kb
    }

    /// Run one match-fire pass. Neither input is modified.
    pub fn run(&self, wm: &WorkingMemory) -> TriageResult {
        let mut fired = FiredRuleRecord::new();
        let mut scores: BTreeMap<&str, Accumulator> = BTreeMap::new();

        for (position, rule) in self.kb.all_rules().iter().enumerate() {
            let Some(matched) = match_rule(rule, wm) else {
                tracing::trace!(rule = %rule.id, "rule skipped");
                continue;
            };

            tracing::debug!(
                rule = %rule.id,
                disease = %rule.disease,
                boost = rule.confidence_boost,
                "rule fired"
            );

            let acc = scores.entry(rule.disease.as_str()).or_default();
            acc.score += rule.confidence_boost;
            acc.severity = acc.severity.max(Some(rule.severity));
            acc.matched.extend(matched.iter().cloned());
            acc.rule_count += 1;

            fired.push(FiredRule::from_rule(rule, matched, position));
        }

        let report = self.normalize(scores);
        tracing::debug!(
            facts = wm.len(),
            fired = fired.len(),
            diseases = report.len(),
            total_score = report.total_score(),
            "inference complete"
        );

        TriageResult { report, fired }
    }

    fn normalize(&self, scores: BTreeMap<&str, Accumulator>) -> DiagnosisReport {
        let total: f64 = scores.values().map(|a| a.score).sum();
        if total <= 0.0 {
            return DiagnosisReport::empty();
        }

        let diagnoses = scores
            .into_iter()
            .filter(|(_, acc)| acc.score > 0.0)
            .map(|(disease, acc)| {
                let info = self.kb.disease(disease);
                let default_severity = info.map(|d| d.severity).unwrap_or_default();
                Diagnosis {
                    disease: disease.to_string(),
                    display_name: info
                        .map(|d| d.display_name.clone())
                        .unwrap_or_else(|| disease.to_string()),
                    score: acc.score,
                    confidence: 100.0 * acc.score / total,
                    severity: acc
                        .severity
                        .map_or(default_severity, |s| s.max(default_severity)),
                    description: info.map(|d| d.description.clone()).unwrap_or_default(),
                    recommended_action: info
                        .map(|d| d.recommended_action.clone())
                        .unwrap_or_default(),
                    matched_symptoms: acc.matched.into_iter().collect(),
                    rule_count: acc.rule_count,
                }
            })
            .collect();

        DiagnosisReport::ranked(diagnoses, total)
    }
}

/// Conditions satisfied by `wm`, or `None` unless all of them are.
fn match_rule(rule: &Rule, wm: &WorkingMemory) -> Option<Vec<String>> {
    if rule.conditions.iter().all(|c| wm.has_symptom(c)) {
        Some(rule.conditions.clone())
    } else {
        None
    }
}
