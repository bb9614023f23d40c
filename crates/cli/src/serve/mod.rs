//! `triage serve` -- HTTP JSON API over the inference engine.
//!
//! The knowledge base is built once at startup and shared read-only
//! across request handlers; every request runs its own inference pass
//! with its own working memory.
//!
//! Endpoints:
//! - GET  /health     - Server status (exempt from auth)
//! - GET  /symptoms   - Recognized symptom vocabulary
//! - GET  /diseases   - Concludable diseases with rule counts
//! - GET  /rules      - Rule catalog, optionally `?disease=<id>`
//! - POST /diagnose   - Rank diseases for `{"symptoms": [...]}`
//! - POST /explain    - Explain one disease for a symptom set
//!
//! Optional API key authentication via the TRIAGE_API_KEY env var.
//! All responses use Content-Type: application/json.

mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use triage_core::KnowledgeBase;

use self::handlers::{
    handle_diagnose, handle_diseases, handle_explain, handle_health, handle_not_found,
    handle_rules, handle_symptoms,
};
use self::middleware::auth_middleware;
use self::state::AppState;

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Build the router around a shared knowledge base.
pub(crate) fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/symptoms", get(handle_symptoms))
        .route("/diseases", get(handle_diseases))
        .route("/rules", get(handle_rules))
        .route("/diagnose", post(handle_diagnose))
        .route("/explain", post(handle_explain))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Start the HTTP server on the given port.
///
/// If `TRIAGE_API_KEY` is set, every endpoint except /health requires it.
pub async fn start_server(port: u16, kb: KnowledgeBase) -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("TRIAGE_API_KEY")
        .ok()
        .filter(|k| !k.is_empty());

    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }

    let rules = kb.len();
    let state = Arc::new(AppState::new(kb, api_key));
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, rules, "triage API listening");
    eprintln!("Triage API listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
