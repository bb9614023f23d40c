use triage_core::KnowledgeBase;
use triage_eval::explain_top;

use crate::{fail, print_json, render, OutputFormat, ReportFormat};

pub(crate) fn cmd_diagnose(
    kb: &KnowledgeBase,
    symptoms: &[String],
    explain_n: usize,
    format: ReportFormat,
    output: OutputFormat,
    quiet: bool,
) {
    let unknown = kb.unknown_symptoms(symptoms);
    if !unknown.is_empty() {
        let msg = format!(
            "error: unknown symptom(s): {}. Run `triage symptoms` for the recognized list.",
            unknown.join(", ")
        );
        fail(&msg, output, quiet);
    }

    let result = triage_eval::diagnose(kb, symptoms);
    let explanations = explain_top(&result.report, &result.fired, explain_n);
    tracing::info!(
        symptoms = symptoms.len(),
        fired = result.fired.len(),
        diseases = result.report.len(),
        "diagnosis complete"
    );

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            print_json(&render::diagnosis_json(symptoms, &result, &explanations));
        }
        OutputFormat::Text => {
            print!(
                "{}",
                render::render_report(kb, &result.report, &explanations, format)
            );
        }
    }
}
