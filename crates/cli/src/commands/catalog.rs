//! Read-only listings of the loaded catalog.

use triage_core::KnowledgeBase;

use crate::{fail, print_json, OutputFormat};

pub(crate) fn cmd_rules(kb: &KnowledgeBase, disease: Option<&str>, output: OutputFormat, quiet: bool) {
    let rules = match disease {
        Some(d) => {
            if kb.disease(d).is_none() {
                fail(&format!("error: unknown disease '{}'", d), output, quiet);
            }
            kb.rules_for_disease(d)
        }
        None => kb.all_rules().iter().collect(),
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "catalog": kb.name(),
                "rules": rules,
            });
            print_json(&json);
        }
        OutputFormat::Text => {
            for rule in &rules {
                println!(
                    "[{}] IF {} THEN {} (+{})",
                    rule.id,
                    rule.conditions.join(" AND "),
                    rule.disease,
                    rule.confidence_boost
                );
            }
            println!();
            println!("{} rule(s)", rules.len());
        }
    }
}

pub(crate) fn cmd_symptoms(kb: &KnowledgeBase, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({ "symptoms": kb.symptoms() });
            print_json(&json);
        }
        OutputFormat::Text => {
            let width = kb.symptoms().iter().map(|s| s.id.len()).max().unwrap_or(0);
            for s in kb.symptoms() {
                println!("{:<width$}  {}", s.id, s.label, width = width);
            }
        }
    }
}

pub(crate) fn cmd_diseases(kb: &KnowledgeBase, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    let counts = kb.summary();
    match output {
        OutputFormat::Json => {
            let diseases: Vec<serde_json::Value> = kb
                .diseases()
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "id": d.id,
                        "display_name": d.display_name,
                        "severity": d.severity.as_str(),
                        "description": d.description,
                        "recommended_action": d.recommended_action,
                        "rule_count": counts.get(d.id.as_str()).copied().unwrap_or(0),
                    })
                })
                .collect();
            print_json(&serde_json::json!({ "diseases": diseases }));
        }
        OutputFormat::Text => {
            for d in kb.diseases() {
                println!(
                    "{:<12} {:<26} {:<8} {} rule(s)",
                    d.id,
                    d.display_name,
                    d.severity.as_str().to_uppercase(),
                    counts.get(d.id.as_str()).copied().unwrap_or(0)
                );
            }
        }
    }
}
