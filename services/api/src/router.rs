//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the session REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{CreateSessionPayload, ErrorResponse, InputPayload, SessionResponse, TurnResponse},
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_session,
        handlers::get_session,
        handlers::submit_input,
        handlers::delete_session,
    ),
    components(
        schemas(CreateSessionPayload, InputPayload, SessionResponse, TurnResponse, ErrorResponse)
    ),
    tags(
        (name = "Alma Learn API", description = "Tutoring sessions for Q&A, quizzes and role-play simulations")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/inputs", post(handlers::submit_input))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
