use triage_core::KnowledgeBase;
use triage_eval::{explain, Explanation};

use crate::{fail, print_json, render, OutputFormat, ReportFormat};

/// Explain a single disease. A disease that exists but did not fire is
/// reported plainly and is not an error.
pub(crate) fn cmd_explain(
    kb: &KnowledgeBase,
    disease: &str,
    symptoms: &[String],
    format: ReportFormat,
    output: OutputFormat,
    quiet: bool,
) {
    let Some(info) = kb.disease(disease) else {
        let known: Vec<&str> = kb.diseases().iter().map(|d| d.id.as_str()).collect();
        let msg = format!(
            "error: unknown disease '{}'. Known diseases: {}",
            disease,
            known.join(", ")
        );
        fail(&msg, output, quiet);
    };

    let unknown = kb.unknown_symptoms(symptoms);
    if !unknown.is_empty() {
        let msg = format!("error: unknown symptom(s): {}", unknown.join(", "));
        fail(&msg, output, quiet);
    }

    let result = triage_eval::diagnose(kb, symptoms);
    let explanation = Explanation {
        disease: info.id.clone(),
        entries: explain(&info.id, &result.fired),
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "disease": info.id,
                "display_name": info.display_name,
                "diagnosis": result.report.get(&info.id).map(|d| serde_json::json!({
                    "score": d.score,
                    "confidence": d.confidence,
                    "severity": d.severity.as_str(),
                })),
                "explanation": explanation.to_json(),
            });
            print_json(&json);
        }
        OutputFormat::Text => match result.report.get(&info.id) {
            Some(diagnosis) => {
                print!(
                    "{}",
                    render::render_explanation(kb, diagnosis, &explanation, format)
                );
                if !diagnosis.recommended_action.is_empty() {
                    println!();
                    println!("Recommended action: {}", diagnosis.recommended_action);
                }
            }
            None => println!("No rule fired for {}.", info.display_name),
        },
    }
}
