//! HTTP routes.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use sirius_domain::GameError;

use crate::app::App;
use crate::use_cases::session::{SessionError, SessionView};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/messages", post(send_message))
        .route("/api/sessions/{id}/guide", post(guide_advice))
        .route("/api/sessions/{id}/switch", post(switch_persona))
        .route("/api/sessions/{id}/screen", get(get_screen))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Sessions
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

async fn create_session(State(app): State<Arc<App>>) -> (StatusCode, Json<SessionView>) {
    let session = app.sessions.create();
    (StatusCode::CREATED, Json(session.snapshot().await))
}

async fn get_session(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = app.sessions.get(id)?;
    Ok(Json(session.snapshot().await))
}

async fn delete_session(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn send_message(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let session = app.sessions.get(id)?;
    let view = session.send_user_message(&request.text).await?;
    Ok(Json(view))
}

async fn guide_advice(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = app.sessions.get(id)?;
    Ok(Json(session.guide_advice().await?))
}

async fn switch_persona(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = app.sessions.get(id)?;
    Ok(Json(session.switch_persona().await?))
}

async fn get_screen(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = app.sessions.get(id)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        session.screen().await,
    ))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    /// Another request holds the session, or the move conflicts with its state
    Conflict(String),
    /// The game rules reject the move
    Unprocessable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response()
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => ApiError::NotFound,
            SessionError::Busy => ApiError::Conflict(e.to_string()),
            SessionError::Game(game) => game.into(),
        }
    }
}

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::EmptyInput => ApiError::BadRequest(e.to_string()),
            GameError::AlreadyTransitioned => ApiError::Conflict(e.to_string()),
            GameError::OutOfMoves
            | GameError::GameOver
            | GameError::AutonomousMode
            | GameError::StageIncomplete
            | GameError::NothingToRewind => ApiError::Unprocessable(e.to_string()),
        }
    }
}
