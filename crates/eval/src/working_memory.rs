//! Per-session fact store.
//!
//! One `WorkingMemory` holds the symptoms reported for one patient in one
//! diagnostic session. It is never shared between sessions; the engine
//! only reads it.

use std::collections::BTreeSet;

use triage_core::normalize_symptom;

/// The set of symptoms known for the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingMemory {
    symptoms: BTreeSet<String>,
}

impl WorkingMemory {
    pub fn new() -> Self {
        WorkingMemory {
            symptoms: BTreeSet::new(),
        }
    }

    pub fn with_symptoms<I, S>(symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wm = WorkingMemory::new();
        wm.add_symptoms(symptoms);
        wm
    }

    /// Insert a symptom. Returns `false` if it was already present.
    ///
    /// Tokens are normalized; blank tokens are ignored.
    pub fn add_symptom(&mut self, symptom: impl AsRef<str>) -> bool {
        let token = normalize_symptom(symptom.as_ref());
        if token.is_empty() {
            return false;
        }
        self.symptoms.insert(token)
    }

    pub fn add_symptoms<I, S>(&mut self, symptoms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for s in symptoms {
            self.add_symptom(s);
        }
    }

    pub fn remove_symptom(&mut self, symptom: impl AsRef<str>) -> bool {
        self.symptoms.remove(&normalize_symptom(symptom.as_ref()))
    }

    pub fn has_symptom(&self, symptom: &str) -> bool {
        // Catalog conditions are already normalized; skip the allocation.
        self.symptoms.contains(symptom) || self.symptoms.contains(&normalize_symptom(symptom))
    }

    /// Current facts, sorted.
    pub fn symptoms(&self) -> &BTreeSet<String> {
        &self.symptoms
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Forget every symptom, keeping the allocation for the next session.
    pub fn clear(&mut self) {
        self.symptoms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_single_symptom() {
        let mut wm = WorkingMemory::new();
        assert!(wm.add_symptom("rash"));
        assert!(wm.has_symptom("rash"));
        assert!(!wm.has_symptom("cough"));
    }

    #[test]
    fn add_is_idempotent() {
        let mut wm = WorkingMemory::new();
        assert!(wm.add_symptom("rash"));
        assert!(!wm.add_symptom("rash"));
        assert_eq!(wm.len(), 1);
    }

    #[test]
    fn tokens_are_case_insensitive() {
        let mut wm = WorkingMemory::new();
        wm.add_symptom("  HIGH_FEVER ");
        assert!(wm.has_symptom("high_fever"));
        assert!(wm.has_symptom("High_Fever"));
        assert_eq!(wm.len(), 1);
    }

    #[test]
    fn blank_tokens_ignored() {
        let mut wm = WorkingMemory::new();
        assert!(!wm.add_symptom("   "));
        assert!(wm.is_empty());
    }

    #[test]
    fn add_many_and_snapshot_sorted() {
        let wm = WorkingMemory::with_symptoms(["rash", "cough", "chills", "cough"]);
        let snapshot: Vec<&str> = wm.symptoms().iter().map(String::as_str).collect();
        assert_eq!(snapshot, vec!["chills", "cough", "rash"]);
    }

    #[test]
    fn remove_symptom() {
        let mut wm = WorkingMemory::with_symptoms(["rash", "cough"]);
        assert!(wm.remove_symptom("RASH"));
        assert!(!wm.remove_symptom("rash"));
        assert!(!wm.has_symptom("rash"));
        assert_eq!(wm.len(), 1);
    }

    #[test]
    fn clear_resets() {
        let mut wm = WorkingMemory::with_symptoms(["rash", "cough", "chills"]);
        wm.clear();
        assert!(wm.is_empty());
        wm.add_symptom("nausea");
        assert_eq!(wm.len(), 1);
    }
}
