//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        ChatRequest, ChatResponse, ErrorResponse, FlowMeta, ResetResponse, SessionStatusResponse,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::chat,
        handlers::session_status,
        handlers::reset_session,
        handlers::delete_session,
        handlers::health,
    ),
    components(
        schemas(ChatRequest, ChatResponse, FlowMeta, SessionStatusResponse, ResetResponse, ErrorResponse)
    ),
    tags(
        (name = "Consultation API", description = "Structured question sequencing for consultation sessions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/sessions/{id}/status", get(handlers::session_status))
        .route("/api/sessions/{id}/reset", post(handlers::reset_session))
        .route("/api/sessions/{id}", delete(handlers::delete_session))
        .route("/health", get(handlers::health))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Merge the stateful routes with the stateless Swagger UI routes.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
