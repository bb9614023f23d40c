//! Application state shared across request handlers.

use triage_core::KnowledgeBase;

pub(crate) struct AppState {
    /// Frozen after startup; handlers only read it.
    pub(crate) kb: KnowledgeBase,
    /// API key for authentication (None = no auth required).
    pub(crate) api_key: Option<String>,
}

impl AppState {
    pub(crate) fn new(kb: KnowledgeBase, api_key: Option<String>) -> Self {
        AppState { kb, api_key }
    }
}
