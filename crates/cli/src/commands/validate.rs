use std::path::Path;
use std::process;

use crate::{report_error, OutputFormat};

static CATALOG_SCHEMA_STR: &str = include_str!("../../../../schema/catalog-schema.json");

/// Check a catalog file in two stages: structure against the embedded
/// JSON Schema, then the semantic checks the knowledge base builder runs
/// (duplicate ids, unknown diseases, repeated conditions).
pub(crate) fn cmd_validate(catalog_path: &Path, output: OutputFormat, quiet: bool) {
    let schema: serde_json::Value = match serde_json::from_str(CATALOG_SCHEMA_STR) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("internal error: failed to parse embedded catalog schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let doc_str = match std::fs::read_to_string(catalog_path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", catalog_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let doc: serde_json::Value = match serde_json::from_str(&doc_str) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", catalog_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("internal error: failed to compile schema: {}", e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let mut errors: Vec<String> = validator
        .iter_errors(&doc)
        .map(|e| format!("{}", e))
        .collect();

    // Only a structurally valid document is worth building.
    let mut counts = None;
    if errors.is_empty() {
        match triage_core::parse_catalog(&doc_str).and_then(triage_core::build_knowledge_base) {
            Ok(kb) => counts = Some((kb.len(), kb.diseases().len(), kb.symptoms().len())),
            Err(e) => errors.push(e.to_string()),
        }
    }

    match counts {
        Some((rules, diseases, symptoms)) if errors.is_empty() => {
            tracing::debug!(rules, diseases, symptoms, "catalog validated");
            if !quiet {
                match output {
                    OutputFormat::Text => {
                        println!("valid ({} rules, {} diseases)", rules, diseases);
                    }
                    OutputFormat::Json => {
                        let json = serde_json::json!({
                            "valid": true,
                            "rules": rules,
                            "diseases": diseases,
                            "symptoms": symptoms,
                        });
                        crate::print_json(&json);
                    }
                }
            }
        }
        _ => {
            match output {
                OutputFormat::Text => {
                    if !quiet {
                        eprintln!("invalid catalog");
                        for err in &errors {
                            eprintln!("  - {}", err);
                        }
                    }
                }
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "valid": false,
                        "errors": errors
                    });
                    eprintln!(
                        "{}",
                        serde_json::to_string_pretty(&json).unwrap_or_default()
                    );
                }
            }
            process::exit(1);
        }
    }
}
