//! Triage inference engine -- accepts a knowledge base + symptoms,
//! produces a ranked diagnosis report with an explanation trace.
//!
//! The engine runs a single forward-chaining pass over the catalog,
//! accumulates confidence boosts per disease, normalizes them to
//! percentages and records every rule that fired. Explanations are
//! derived from that record, never by re-running the match.

pub mod engine;
pub mod explain;
pub mod provenance;
pub mod report;
pub mod working_memory;

pub use engine::{InferenceEngine, TriageResult};
pub use explain::{explain, explain_top, summary_line, Explanation, ExplanationEntry};
pub use provenance::{FiredRule, FiredRuleRecord};
pub use report::{Diagnosis, DiagnosisReport};
pub use working_memory::WorkingMemory;

use triage_core::KnowledgeBase;

/// Diagnose one session from a plain list of symptom tokens.
///
/// This is the top-level entry point for front-ends. Unknown tokens are
/// tolerated and simply never satisfy a rule; validate them against
/// [`KnowledgeBase::validate_symptoms`] first if they should be rejected.
pub fn diagnose<I, S>(kb: &KnowledgeBase, symptoms: I) -> TriageResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let wm = WorkingMemory::with_symptoms(symptoms);
    InferenceEngine::new(kb).run(&wm)
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn diagnose_builtin_dengue() {
        let kb = triage_core::builtin_knowledge_base().unwrap();
        let result = diagnose(
            &kb,
            ["high_fever", "severe_headache", "pain_behind_eyes"],
        );
        assert_eq!(result.report.ranking(), vec!["dengue", "malaria", "typhoid"]);
        assert_eq!(
            result.fired.rule_ids(),
            vec!["R07", "R29", "R30", "R31", "R45", "R46"]
        );
        let top = explain_top(&result.report, &result.fired, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].rule_ids(), vec!["R07", "R29", "R45", "R46"]);
        assert_eq!(top[0].total_boost(), 39.0);
    }

    #[test]
    fn diagnose_nothing() {
        let kb = triage_core::builtin_knowledge_base().unwrap();
        let result = diagnose(&kb, Vec::<String>::new());
        assert!(result.report.is_empty());
        assert!(result.fired.is_empty());
    }
}
