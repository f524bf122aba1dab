use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use postboard_db::DbError;
use postboard_types::api::{AttendRequest, CreateEventRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

pub async fn get_board_events(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let events = state.db.board_events(board_id).map_err(|e| match e {
        DbError::NotFound => ApiError::NotFound("board not found"),
        other => other.into(),
    })?;
    Ok(Json(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(board_id): Path<i64>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("event title is required"));
    }

    let event = state
        .db
        .create_event(board_id, claims.sub, &req)
        .map_err(|e| match e {
            DbError::NotFound => ApiError::NotFound("board not found"),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Toggle the caller onto the going or interested list; the two lists are
/// kept mutually exclusive by the data layer.
pub async fn toggle_attendance(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(event_id): Path<i64>,
    Json(req): Json<AttendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let attendance = state
        .db
        .toggle_attendance(event_id, req.intent, claims.sub)
        .map_err(|e| match e {
            DbError::NotFound => ApiError::NotFound("event not found"),
            other => other.into(),
        })?;

    Ok(Json(attendance))
}
