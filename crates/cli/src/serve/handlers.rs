//! Route handlers: health, catalog listings, diagnose, explain.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use triage_eval::{explain, explain_top, summary_line, Explanation};

use super::json_error;
use super::state::AppState;
use crate::render;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "catalog": state.kb.name(),
        "catalog_format": triage_core::CATALOG_FORMAT_VERSION,
        "rules": state.kb.len(),
    });
    (StatusCode::OK, Json(response))
}

/// GET /symptoms
pub(crate) async fn handle_symptoms(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = serde_json::json!({ "symptoms": state.kb.symptoms() });
    (StatusCode::OK, Json(response))
}

/// GET /diseases
pub(crate) async fn handle_diseases(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let counts = state.kb.summary();
    let diseases: Vec<serde_json::Value> = state
        .kb
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
    (StatusCode::OK, Json(serde_json::json!({ "diseases": diseases })))
}

/// GET /rules?disease=<id>
pub(crate) async fn handle_rules(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let rules = match params.get("disease") {
        Some(d) => {
            if state.kb.disease(d).is_none() {
                return json_error(StatusCode::NOT_FOUND, &format!("unknown disease '{}'", d))
                    .into_response();
            }
            state.kb.rules_for_disease(d)
        }
        None => state.kb.all_rules().iter().collect(),
    };
    let response = serde_json::json!({
        "catalog": state.kb.name(),
        "rules": rules,
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /diagnose
///
/// Body: `{"symptoms": ["high_fever", ...], "explain_top": 2}`.
/// Unknown symptoms are rejected with 400 and listed under `unknown`.
pub(crate) async fn handle_diagnose(
    State(state): State<Arc<AppState>>,
    Json(parsed): Json<serde_json::Value>,
) -> impl IntoResponse {
    let symptoms = match symptom_list(&parsed) {
        Ok(s) => s,
        Err(msg) => return json_error(StatusCode::BAD_REQUEST, &msg).into_response(),
    };

    let explain_n = match parsed.get("explain_top") {
        None | Some(serde_json::Value::Null) => 0,
        Some(v) => match v.as_u64() {
            Some(n) => n as usize,
            None => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "'explain_top' must be a non-negative integer",
                )
                .into_response()
            }
        },
    };

    if let Some(response) = reject_unknown(&state, &symptoms) {
        return response;
    }

    let result = triage_eval::diagnose(&state.kb, &symptoms);
    let explanations = explain_top(&result.report, &result.fired, explain_n);
    tracing::info!(
        symptoms = symptoms.len(),
        fired = result.fired.len(),
        top = result.report.top().map(|d| d.disease.as_str()),
        "POST /diagnose"
    );

    let response = render::diagnosis_json(&symptoms, &result, &explanations);
    (StatusCode::OK, Json(response)).into_response()
}

/// POST /explain
///
/// Body: `{"disease": "dengue", "symptoms": [...]}`. A known disease that
/// did not fire yields an empty explanation, not an error.
pub(crate) async fn handle_explain(
    State(state): State<Arc<AppState>>,
    Json(parsed): Json<serde_json::Value>,
) -> impl IntoResponse {
    let disease = match parsed.get("disease").and_then(|v| v.as_str()) {
        Some(d) => d.to_string(),
        None => {
            return json_error(StatusCode::BAD_REQUEST, "missing 'disease' field").into_response()
        }
    };
    let symptoms = match symptom_list(&parsed) {
        Ok(s) => s,
        Err(msg) => return json_error(StatusCode::BAD_REQUEST, &msg).into_response(),
    };

    let info = match state.kb.disease(&disease) {
        Some(info) => info,
        None => {
            return json_error(
                StatusCode::NOT_FOUND,
                &format!("unknown disease '{}'", disease),
            )
            .into_response()
        }
    };
    if let Some(response) = reject_unknown(&state, &symptoms) {
        return response;
    }

    let result = triage_eval::diagnose(&state.kb, &symptoms);
    let explanation = Explanation {
        disease: info.id.clone(),
        entries: explain(&info.id, &result.fired),
    };
    let diagnosis = result.report.get(&info.id);

    let response = serde_json::json!({
        "disease": info.id,
        "display_name": info.display_name,
        "fired": diagnosis.is_some(),
        "confidence": diagnosis.map(|d| d.confidence),
        "severity": diagnosis.map(|d| d.severity.as_str()),
        "summary": diagnosis.map(|d| summary_line(d, &explanation)),
        "explanation": explanation.to_json(),
    });
    (StatusCode::OK, Json(response)).into_response()
}

/// Extract the `symptoms` array of strings from a request body.
fn symptom_list(parsed: &serde_json::Value) -> Result<Vec<String>, String> {
    let arr = parsed
        .get("symptoms")
        .and_then(|v| v.as_array())
        .ok_or_else(|| "missing 'symptoms' array".to_string())?;
    arr.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| format!("symptom entries must be strings; got {}", v))
        })
        .collect()
}

fn reject_unknown(state: &AppState, symptoms: &[String]) -> Option<axum::response::Response> {
    let unknown = state.kb.unknown_symptoms(symptoms);
    if unknown.is_empty() {
        return None;
    }
    let first = triage_core::CatalogError::UnknownSymptom {
        symptom: unknown[0].clone(),
    };
    let body = serde_json::json!({
        "error": first.to_string(),
        "unknown": unknown,
    });
    Some((StatusCode::BAD_REQUEST, Json(body)).into_response())
}
