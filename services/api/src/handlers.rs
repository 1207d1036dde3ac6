//! Axum Handlers for the REST API
//!
//! Session management endpoints. `utoipa` doc comments generate the OpenAPI
//! documentation served by the router.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use coach_core::{
    assessment::Difficulty, intake::RequestClassifier, session::SessionState,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::{
    models::{
        CreateSessionPayload, ErrorResponse, MessageRole, Session, UpdateSessionStatusPayload,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
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

fn require_user_id(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("x-user-id header is required".to_string()))
}

/// Create a new tutoring session.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = CreateSessionPayload,
    responses(
        (status = 201, description = "Session created successfully", body = Session),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The ID of the user creating the session")
    )
)]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = require_user_id(&headers)?;

    // Difficulty starts at beginner unless the learner's own words say
    // otherwise.
    let starting_difficulty = match payload.request.as_deref() {
        Some(request) => {
            RequestClassifier::default()
                .classify(request)
                .starting_difficulty
        }
        None => Difficulty::Beginner,
    };

    let plan = state.planner.plan(&payload.topic).await?;

    let mut initial_state = SessionState::new(payload.topic.clone(), starting_difficulty);
    initial_state.plan = plan;

    let session = state
        .db
        .create_session(user_id, &payload.topic, &initial_state)
        .await?;

    let first_focus = initial_state
        .plan
        .first()
        .cloned()
        .unwrap_or_else(|| format!("the basics of {}", payload.topic));

    let welcome_message = format!(
        "Hi! Let's work on {} together. We'll start with '{}'. What do you already know about it?",
        payload.topic, first_focus
    );

    state
        .db
        .add_message(session.id, MessageRole::Ai, &welcome_message)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// List all sessions for a user.
#[utoipa::path(
    get,
    path = "/sessions",
    responses(
        (status = 200, description = "List of sessions", body = [Session]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Session>>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let sessions = state.db.list_sessions(user_id).await?;
    Ok(Json(sessions))
}

/// Get a specific session by its ID.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session details", body = Session),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    let user_id = require_user_id(&headers)?;
    let session = state
        .db
        .get_session(id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", id)))?;
    Ok(Json(session))
}

/// Update a session's status (e.g. mark it ended).
#[utoipa::path(
    patch,
    path = "/sessions/{id}/status",
    request_body = UpdateSessionStatusPayload,
    responses(
        (status = 200, description = "Updated session", body = Session),
        (status = 404, description = "Session not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID"),
        ("x-user-id" = String, Header, description = "The ID of the user")
    )
)]
pub async fn update_session_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSessionStatusPayload>,
) -> Result<Json<Session>, ApiError> {
    let user_id = require_user_id(&headers)?;
    // Scope the update to the caller's own session.
    state
        .db
        .get_session(id, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Session {} not found", id)))?;
    let session = state.db.update_session_status(id, payload.status).await?;
    Ok(Json(session))
}
