//! Human-readable rendering of diagnosis reports and explanations.
//!
//! Confidence is rounded to one decimal here and only here; the report
//! itself keeps unrounded values so percentages still sum to 100.

use triage_core::KnowledgeBase;
use triage_eval::{summary_line, Diagnosis, DiagnosisReport, Explanation, TriageResult};

use crate::ReportFormat;

/// Width of the likelihood bar in cells (5% per cell).
const BAR_WIDTH: usize = 20;

/// Ranked table, top-diagnosis detail and the requested explanations.
pub(crate) fn render_report(
    kb: &KnowledgeBase,
    report: &DiagnosisReport,
    explanations: &[Explanation],
    format: ReportFormat,
) -> String {
    let mut out = String::new();

    let Some(top) = report.top() else {
        heading(&mut out, format, "NO DIAGNOSIS");
        emit_line(&mut out, "No diagnosis could be made.");
        emit_line(
            &mut out,
            "Too few or unrecognized symptoms were entered. Please consult a doctor directly.",
        );
        return out;
    };

    heading(&mut out, format, "RANKED DIAGNOSES");
    if format == ReportFormat::Markdown {
        emit_line(&mut out, "| Rank | Disease | Confidence | Severity |");
        emit_line(&mut out, "|------|---------|------------|----------|");
    }
    for (i, d) in report.diagnoses().iter().enumerate() {
        match format {
            ReportFormat::Terminal => emit_line(
                &mut out,
                &format!(
                    "  #{:<3} {:<26} {:>6.1}%  {}  {}",
                    i + 1,
                    d.display_name,
                    d.confidence,
                    confidence_bar(d.confidence),
                    d.severity.as_str().to_uppercase()
                ),
            ),
            ReportFormat::Markdown => emit_line(
                &mut out,
                &format!(
                    "| {} | {} | {:.1}% | {} |",
                    i + 1,
                    d.display_name,
                    d.confidence,
                    d.severity.as_str().to_uppercase()
                ),
            ),
        }
    }
    out.push('\n');

    heading(&mut out, format, "TOP DIAGNOSIS");
    emit_line(
        &mut out,
        &format!(
            "{} ({:.1}% confidence)",
            styled_name(format, &top.display_name),
            top.confidence
        ),
    );
    if !top.description.is_empty() {
        emit_line(&mut out, &top.description);
    }
    emit_line(
        &mut out,
        &format!("Severity: {}", top.severity.as_str().to_uppercase()),
    );
    if !top.recommended_action.is_empty() {
        emit_line(
            &mut out,
            &format!("Recommended action: {}", top.recommended_action),
        );
    }

    for explanation in explanations {
        if let Some(d) = report.get(&explanation.disease) {
            out.push('\n');
            out.push_str(&render_explanation(kb, d, explanation, format));
        }
    }

    out
}

/// Why one disease was concluded: every supporting rule in firing order.
pub(crate) fn render_explanation(
    kb: &KnowledgeBase,
    diagnosis: &Diagnosis,
    explanation: &Explanation,
    format: ReportFormat,
) -> String {
    let mut out = String::new();

    heading(
        &mut out,
        format,
        &format!("WHY {}?", diagnosis.display_name.to_uppercase()),
    );
    emit_line(
        &mut out,
        &format!(
            "Confidence: {:.1}%  (score {} of {})",
            diagnosis.confidence,
            diagnosis.score,
            fmt_total(diagnosis, explanation)
        ),
    );
    emit_line(
        &mut out,
        &format!("{} rule(s) fired for this disease.", explanation.entries.len()),
    );
    out.push('\n');

    for (i, entry) in explanation.entries.iter().enumerate() {
        match format {
            ReportFormat::Terminal => {
                emit_line(
                    &mut out,
                    &format!("  Rule {}: [{}]", i + 1, styled_name(format, &entry.rule_id)),
                );
            }
            ReportFormat::Markdown => {
                emit_line(&mut out, &format!("### Rule {}: `{}`", i + 1, entry.rule_id));
            }
        }
        let labels: Vec<String> = entry
            .satisfied
            .iter()
            .map(|s| symptom_label(kb, s))
            .collect();
        emit_item(&mut out, format, "Matched symptoms", &labels.join(", "));
        if !entry.explanation.is_empty() {
            emit_item(&mut out, format, "Reasoning", &entry.explanation);
        }
        emit_item(
            &mut out,
            format,
            "Confidence added",
            &format!("+{}", entry.confidence_boost),
        );
        out.push('\n');
    }

    emit_line(&mut out, &summary_line(diagnosis, explanation));
    out
}

/// JSON body shared by `triage diagnose --output json` and `POST /diagnose`.
pub(crate) fn diagnosis_json(
    symptoms: &[String],
    result: &TriageResult,
    explanations: &[Explanation],
) -> serde_json::Value {
    serde_json::json!({
        "symptoms": symptoms,
        "report": result.report.to_json(),
        "fired_rules": result.fired.to_json(),
        "explanations": explanations.iter().map(|e| e.to_json()).collect::<Vec<_>>(),
    })
}

fn fmt_total(diagnosis: &Diagnosis, explanation: &Explanation) -> String {
    // total = score * 100 / confidence
    if diagnosis.confidence > 0.0 {
        format!("{:.0}", 100.0 * explanation.total_boost() / diagnosis.confidence)
    } else {
        "0".to_string()
    }
}

fn symptom_label(kb: &KnowledgeBase, id: &str) -> String {
    kb.symptoms()
        .iter()
        .find(|s| s.id == id)
        .filter(|s| s.label != s.id)
        .map(|s| format!("{} ({})", s.label, s.id))
        .unwrap_or_else(|| humanize_id(id))
}

fn confidence_bar(confidence: f64) -> String {
    let filled = ((confidence / 5.0) as usize).min(BAR_WIDTH);
    format!(
        "{}{}",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(BAR_WIDTH - filled)
    )
}

// ─── Formatting helpers ──────────────────────────────────────────────────────

fn heading(out: &mut String, format: ReportFormat, title: &str) {
    match format {
        ReportFormat::Terminal => {
            out.push_str(&format!("\x1b[1m{}\x1b[0m\n", title));
            out.push_str(&"\u{2550}".repeat(title.chars().count()));
            out.push('\n');
        }
        ReportFormat::Markdown => {
            out.push_str(&format!("## {}\n\n", title));
        }
    }
}

fn emit_line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn emit_item(out: &mut String, format: ReportFormat, label: &str, value: &str) {
    match format {
        ReportFormat::Terminal => {
            out.push_str(&format!("    {:<17}: {}\n", label, value));
        }
        ReportFormat::Markdown => {
            out.push_str(&format!("- **{}:** {}\n", label, value));
        }
    }
}

fn styled_name(format: ReportFormat, name: &str) -> String {
    match format {
        ReportFormat::Terminal => format!("\x1b[36m{}\x1b[0m", name),
        ReportFormat::Markdown => format!("**{}**", name),
    }
}

fn humanize_id(id: &str) -> String {
    id.replace('_', " ")
}
