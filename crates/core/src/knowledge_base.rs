//! The frozen rule catalog and its builder.
//!
//! A [`KnowledgeBase`] is produced exactly once per catalog by
//! [`KnowledgeBaseBuilder::build`] (or [`build_knowledge_base`]) and has
//! no mutating methods afterwards. Rule order is the catalog order and is
//! the evaluation order used by the inference engine.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::catalog::{builtin_catalog, CatalogDef, RuleDef, SymptomDef};
use crate::error::CatalogError;
use crate::rule::{normalize_symptom, DiseaseInfo, Rule, SymptomInfo};

/// Immutable catalog of diagnostic rules, diseases and symptoms.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    name: String,
    rules: Vec<Rule>,
    rule_index: HashMap<String, usize>,
    diseases: Vec<DiseaseInfo>,
    symptoms: Vec<SymptomInfo>,
    vocabulary: BTreeSet<String>,
}

impl KnowledgeBase {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every rule in catalog order.
    pub fn all_rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules that support `disease`, in catalog order.
    pub fn rules_for_disease(&self, disease: &str) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.disease == disease).collect()
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rule_index.get(id).map(|&i| &self.rules[i])
    }

    pub fn disease(&self, id: &str) -> Option<&DiseaseInfo> {
        self.diseases.iter().find(|d| d.id == id)
    }

    /// Diseases in declaration order.
    pub fn diseases(&self) -> &[DiseaseInfo] {
        &self.diseases
    }

    /// Symptoms in declaration order, followed by condition tokens that
    /// were never declared (labelled with their own id).
    pub fn symptoms(&self) -> &[SymptomInfo] {
        &self.symptoms
    }

    pub fn is_known_symptom(&self, symptom: &str) -> bool {
        self.vocabulary.contains(&normalize_symptom(symptom))
    }

    /// Normalized tokens from `symptoms` that are outside the vocabulary,
    /// in input order, without repeats.
    pub fn unknown_symptoms<S: AsRef<str>>(&self, symptoms: &[S]) -> Vec<String> {
        let mut unknown: Vec<String> = Vec::new();
        for s in symptoms {
            let token = normalize_symptom(s.as_ref());
            if !self.vocabulary.contains(&token) && !unknown.contains(&token) {
                unknown.push(token);
            }
        }
        unknown
    }

    /// Reject the first token that is not in the vocabulary.
    pub fn validate_symptoms<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<(), CatalogError> {
        match self.unknown_symptoms(symptoms).into_iter().next() {
            Some(symptom) => Err(CatalogError::UnknownSymptom { symptom }),
            None => Ok(()),
        }
    }

    /// Rule count per disease, including diseases with no rules.
    pub fn summary(&self) -> BTreeMap<&str, usize> {
        let mut counts: BTreeMap<&str, usize> =
            self.diseases.iter().map(|d| (d.id.as_str(), 0)).collect();
        for rule in &self.rules {
            *counts.entry(rule.disease.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Accumulates raw definitions and validates them into a [`KnowledgeBase`].
#[derive(Debug, Default)]
pub struct KnowledgeBaseBuilder {
    name: String,
    diseases: Vec<DiseaseInfo>,
    symptoms: Vec<SymptomDef>,
    rules: Vec<RuleDef>,
}

impl KnowledgeBaseBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        KnowledgeBaseBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn disease(mut self, info: DiseaseInfo) -> Self {
        self.diseases.push(info);
        self
    }

    pub fn symptom(mut self, id: &str, label: &str) -> Self {
        self.symptoms.push(SymptomDef {
            id: id.to_string(),
            label: label.to_string(),
        });
        self
    }

    pub fn rule(mut self, def: RuleDef) -> Self {
        self.rules.push(def);
        self
    }

    /// Validate everything and freeze the catalog.
    pub fn build(self) -> Result<KnowledgeBase, CatalogError> {
        let mut disease_ids: HashSet<&str> = HashSet::new();
        for d in &self.diseases {
            if d.id.trim().is_empty() {
                return Err(CatalogError::InvalidDiseaseDefinition {
                    disease_id: d.id.clone(),
                    message: "id must not be empty".to_string(),
                });
            }
            if !disease_ids.insert(d.id.as_str()) {
                return Err(CatalogError::InvalidDiseaseDefinition {
                    disease_id: d.id.clone(),
                    message: "duplicate disease id".to_string(),
                });
            }
        }

        let mut vocabulary: BTreeSet<String> = BTreeSet::new();
        let mut symptoms: Vec<SymptomInfo> = Vec::new();
        for s in &self.symptoms {
            let id = normalize_symptom(&s.id);
            if id.is_empty() || !vocabulary.insert(id.clone()) {
                continue;
            }
            symptoms.push(SymptomInfo {
                id,
                label: s.label.clone(),
            });
        }

        let mut rules: Vec<Rule> = Vec::with_capacity(self.rules.len());
        let mut rule_index: HashMap<String, usize> = HashMap::new();
        for (position, def) in self.rules.into_iter().enumerate() {
            let rule = validate_rule(def, position, &rule_index, &self.diseases)?;
            for c in &rule.conditions {
                if vocabulary.insert(c.clone()) {
                    symptoms.push(SymptomInfo {
                        id: c.clone(),
                        label: c.clone(),
                    });
                }
            }
            rule_index.insert(rule.id.clone(), position);
            rules.push(rule);
        }

        Ok(KnowledgeBase {
            name: self.name,
            rules,
            rule_index,
            diseases: self.diseases,
            symptoms,
            vocabulary,
        })
    }
}

fn validate_rule(
    def: RuleDef,
    position: usize,
    seen: &HashMap<String, usize>,
    diseases: &[DiseaseInfo],
) -> Result<Rule, CatalogError> {
    let id = def.id.trim().to_string();
    if id.is_empty() {
        return Err(CatalogError::rule(
            &def.id,
            "id",
            format!("rule at position {} has an empty id", position),
        ));
    }
    if let Some(first) = seen.get(&id) {
        return Err(CatalogError::rule(
            &id,
            "id",
            format!("duplicate rule id: first declared at position {}", first),
        ));
    }

    if def.conditions.is_empty() {
        return Err(CatalogError::rule(&id, "conditions", "must not be empty"));
    }
    let mut conditions: Vec<String> = Vec::with_capacity(def.conditions.len());
    for raw in &def.conditions {
        let token = normalize_symptom(raw);
        if token.is_empty() {
            return Err(CatalogError::rule(&id, "conditions", "empty symptom token"));
        }
        if conditions.contains(&token) {
            return Err(CatalogError::rule(
                &id,
                "conditions",
                format!("symptom '{}' listed twice", token),
            ));
        }
        conditions.push(token);
    }

    if !def.confidence_boost.is_finite() || def.confidence_boost <= 0.0 {
        return Err(CatalogError::rule(
            &id,
            "confidence_boost",
            format!("must be a positive number; got {}", def.confidence_boost),
        ));
    }

    let disease = diseases
        .iter()
        .find(|d| d.id == def.disease)
        .ok_or_else(|| {
            CatalogError::rule(
                &id,
                "disease",
                format!("unknown disease '{}'", def.disease),
            )
        })?;

    Ok(Rule {
        id,
        conditions,
        disease: def.disease,
        confidence_boost: def.confidence_boost,
        severity: def.severity.unwrap_or(disease.severity),
        explanation: def.explanation,
    })
}

/// Validate raw catalog definitions and freeze them into a knowledge base.
pub fn build_knowledge_base(def: CatalogDef) -> Result<KnowledgeBase, CatalogError> {
    let mut builder = KnowledgeBaseBuilder::new(def.catalog);
    for d in def.diseases {
        builder = builder.disease(DiseaseInfo {
            id: d.id,
            display_name: d.display_name,
            description: d.description,
            severity: d.severity,
            recommended_action: d.recommended_action,
        });
    }
    for s in def.symptoms {
        builder = builder.symptom(&s.id, &s.label);
    }
    for r in def.rules {
        builder = builder.rule(r);
    }
    builder.build()
}

/// The knowledge base built from the catalog shipped with the crate.
pub fn builtin_knowledge_base() -> Result<KnowledgeBase, CatalogError> {
    build_knowledge_base(builtin_catalog()?)
}
