//! Axum Handlers for the REST API
//!
//! Each handler is a thin presentation layer over the `ConversationController`:
//! it loads the session's state from the store, applies one input (plus any
//! automatic follow-up step), and stores the result.
//! It uses `utoipa` doc comments to generate OpenAPI documentation.

use alma_core::{ConversationState, ViewModel};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    models::{CreateSessionPayload, ErrorResponse, InputPayload, SessionResponse, TurnResponse},
    state::AppState,
    store::SessionEntry,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unprocessable(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Unprocessable(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse { message }),
            )
                .into_response(),
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

fn session_response(id: Uuid, entry: &SessionEntry, state: &ConversationState) -> SessionResponse {
    SessionResponse {
        id,
        created_at: entry.created_at,
        view: ViewModel::from(state),
        history: state.history.turns().to_vec(),
    }
}

/// Log in and start a new tutoring session.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionPayload,
    responses(
        (status = 201, description = "Session created successfully", body = SessionResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let login = payload.into_input().map_err(ApiError::BadRequest)?;

    let outcome = state
        .controller
        .run(ConversationState::default(), login)
        .await;
    if let Some(rejection) = outcome.rejection {
        return Err(ApiError::BadRequest(rejection.to_string()));
    }

    let (id, entry) = state.store.insert(outcome.state.clone()).await;
    info!(session_id = %id, "Session created");

    Ok((
        StatusCode::CREATED,
        Json(session_response(id, &entry, &outcome.state)),
    ))
}

/// Get the current view and history of a session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session details", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "A turn is in progress", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let entry = state
        .store
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session with id '{}' not found", id)))?;
    let guard = entry
        .state
        .try_lock()
        .map_err(|_| ApiError::Conflict("A turn is in progress for this session".to_string()))?;

    Ok(Json(session_response(id, &entry, &guard)))
}

/// Submit user input or an action to a session.
#[utoipa::path(
    post,
    path = "/sessions/{id}/inputs",
    request_body = InputPayload,
    responses(
        (status = 200, description = "Input applied", body = TurnResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 409, description = "A turn is already in progress", body = ErrorResponse),
        (status = 422, description = "Input not available in the current phase", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
#[instrument(skip_all, fields(session_id = %id))]
pub async fn submit_input(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InputPayload>,
) -> Result<Json<TurnResponse>, ApiError> {
    let input = payload.into_input().map_err(ApiError::BadRequest)?;
    let entry = state
        .store
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Session with id '{}' not found", id)))?;

    // Only one turn per session at a time; a second request is turned away
    // rather than queued.
    let mut guard = entry.state.try_lock().map_err(|_| {
        ApiError::Conflict("A turn is already in progress for this session".to_string())
    })?;

    // Work on a copy so a dropped request leaves the stored state intact.
    let outcome = state.controller.run(guard.clone(), input).await;
    if let Some(rejection) = outcome.rejection {
        return Err(ApiError::Unprocessable(rejection.to_string()));
    }
    *guard = outcome.state;

    Ok(Json(TurnResponse {
        session: session_response(id, &entry, &guard),
        appended: outcome.appended,
    }))
}

/// End a session and discard its state ("new session").
///
/// Idempotent: deleting an unknown or already-deleted session also succeeds.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    responses(
        (status = 204, description = "Session discarded")
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if state.store.remove(id).await {
        info!(session_id = %id, "Session discarded");
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SessionStore;
    use alma_core::{
        ConversationController, Phase, PromptTemplateSet, rag::ScriptedRagClient,
    };

    fn app_state(rag: ScriptedRagClient) -> Arc<AppState> {
        Arc::new(AppState {
            controller: Arc::new(ConversationController::new(
                Arc::new(rag),
                Arc::new(PromptTemplateSet::default()),
            )),
            store: Arc::new(SessionStore::new()),
        })
    }

    fn login(mode: &str) -> CreateSessionPayload {
        CreateSessionPayload {
            user_name: "Rina".to_string(),
            user_role: "Kasir".to_string(),
            mode: mode.to_string(),
        }
    }

    fn message(text: &str) -> Json<InputPayload> {
        Json(InputPayload::Message {
            text: text.to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_session() {
        let state = app_state(ScriptedRagClient::new());

        let (status, Json(body)) = create_session(State(state.clone()), Json(login("Tanya-Jawab")))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.view.phase, Phase::Qa);
        assert!(body.history.is_empty());
        assert_eq!(state.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_session_rejects_blank_name_and_unknown_mode() {
        let state = app_state(ScriptedRagClient::new());

        let mut blank = login("Simulasi");
        blank.user_name = "  ".to_string();
        let err = create_session(State(state.clone()), Json(blank)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = create_session(State(state.clone()), Json(login("Chat")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_simulation_flow_over_http_handlers() {
        let state = app_state(
            ScriptedRagClient::new()
                .reply("SCENARIO_START\nPelanggan minta refund\nSCENARIO_END\nSaya mau refund!")
                .reply("Baik, saya tunggu.")
                .reply("Evaluasi singkat."),
        );
        let (_, Json(created)) = create_session(State(state.clone()), Json(login("Simulasi")))
            .await
            .unwrap();
        let id = created.id;

        let Json(started) = submit_input(State(state.clone()), Path(id), message("refund"))
            .await
            .unwrap();
        assert_eq!(started.session.view.phase, Phase::SimActive);
        assert_eq!(
            started.session.view.scenario.as_deref(),
            Some("Pelanggan minta refund")
        );

        let Json(replied) = submit_input(State(state.clone()), Path(id), message("Mohon tunggu"))
            .await
            .unwrap();
        assert_eq!(replied.session.history.len(), 4);

        let Json(finished) = submit_input(
            State(state.clone()),
            Path(id),
            Json(InputPayload::FinishSimulation),
        )
        .await
        .unwrap();
        assert_eq!(finished.session.view.phase, Phase::SimFinished);
        assert_eq!(finished.appended.len(), 1);
        assert_eq!(finished.appended[0].content, "Evaluasi singkat.");

        let Json(restarted) = submit_input(
            State(state.clone()),
            Path(id),
            Json(InputPayload::StartNewSimulation),
        )
        .await
        .unwrap();
        assert_eq!(restarted.session.view.phase, Phase::SimNone);
        assert_eq!(restarted.session.history.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_input_is_unprocessable_and_keeps_state() {
        let state = app_state(ScriptedRagClient::new());
        let (_, Json(created)) = create_session(State(state.clone()), Json(login("Kuis Interaktif")))
            .await
            .unwrap();

        let err = submit_input(
            State(state.clone()),
            Path(created.id),
            Json(InputPayload::ChangeTopic),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Unprocessable(_)));

        let Json(current) = get_session(State(state.clone()), Path(created.id))
            .await
            .unwrap();
        assert_eq!(current.view.phase, Phase::QuizIdle);
    }

    #[tokio::test]
    async fn test_busy_session_is_conflict() {
        let state = app_state(ScriptedRagClient::new().reply("jawaban"));
        let (_, Json(created)) = create_session(State(state.clone()), Json(login("Tanya-Jawab")))
            .await
            .unwrap();

        let entry = state.store.get(created.id).await.unwrap();
        let held = entry.state.lock().await;

        let err = submit_input(State(state.clone()), Path(created.id), message("halo"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        drop(held);

        let Json(ok) = submit_input(State(state.clone()), Path(created.id), message("halo"))
            .await
            .unwrap();
        assert_eq!(ok.appended.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let state = app_state(ScriptedRagClient::new());
        let err = get_session(State(state.clone()), Path(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_session_is_idempotent() {
        let state = app_state(ScriptedRagClient::new());
        let (_, Json(created)) = create_session(State(state.clone()), Json(login("Tanya-Jawab")))
            .await
            .unwrap();

        assert_eq!(
            delete_session(State(state.clone()), Path(created.id)).await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            delete_session(State(state.clone()), Path(created.id)).await,
            StatusCode::NO_CONTENT
        );
        assert!(state.store.is_empty().await);
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                ApiError::Unprocessable("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::InternalServerError(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
