use std::sync::Arc;

use sqlx::PgPool;

use crate::interview::session::SessionRegistry;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Text generator seam. Production wires `LlmClient`; tests substitute
    /// canned or failing generators.
    pub generator: Arc<dyn TextGenerator>,
    /// In-memory registry of active interview sessions, one per user.
    pub sessions: SessionRegistry,
}
