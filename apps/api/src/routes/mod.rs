pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route(
            "/api/v1/auth/session",
            post(auth::handle_create_session).delete(auth::handle_delete_session),
        )
        // Personas (presentational metadata for the selection step)
        .route("/api/v1/personas", get(handlers::handle_list_personas))
        // Active session wizard
        .route(
            "/api/v1/interviews/sessions",
            post(handlers::handle_start_session),
        )
        .route(
            "/api/v1/interviews/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_abandon_session),
        )
        .route(
            "/api/v1/interviews/sessions/:id/recording/start",
            post(handlers::handle_start_recording),
        )
        .route(
            "/api/v1/interviews/sessions/:id/recording/stop",
            post(handlers::handle_stop_recording),
        )
        .route(
            "/api/v1/interviews/sessions/:id/advance",
            post(handlers::handle_advance),
        )
        // Persisted interview records
        .route(
            "/api/v1/interviews",
            get(handlers::handle_list_interviews).post(handlers::handle_create_interview),
        )
        .route("/api/v1/interviews/summary", get(handlers::handle_summary))
        .route("/api/v1/interviews/:id", get(handlers::handle_get_interview))
        .with_state(state)
}
