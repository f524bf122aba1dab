use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use postboard_db::DbError;
use postboard_types::api::{CreatePostRequest, ToggleReactionRequest, UpdatePostRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

pub async fn get_board_posts(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state.db.board_posts(board_id).map_err(not_found_board)?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(board_id): Path<i64>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("post content is required"));
    }

    let post = state
        .db
        .create_post(board_id, claims.sub, &req.content, "post")
        .map_err(not_found_board)?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(post_id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("post content is required"));
    }

    state
        .db
        .update_post(post_id, &req.content)
        .map_err(not_found_post)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_post(post_id).map_err(not_found_post)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Toggle the caller's membership in one reaction set and return the full
/// updated mapping.
pub async fn toggle_reaction(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(post_id): Path<i64>,
    Json(req): Json<ToggleReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.kind.trim().is_empty() {
        return Err(ApiError::BadRequest("reaction kind is required"));
    }

    let reactions = state
        .db
        .toggle_reaction(post_id, req.kind.trim(), claims.sub)
        .map_err(not_found_post)?;

    Ok(Json(reactions))
}

fn not_found_board(err: DbError) -> ApiError {
    match err {
        DbError::NotFound => ApiError::NotFound("board not found"),
        other => other.into(),
    }
}

fn not_found_post(err: DbError) -> ApiError {
    match err {
        DbError::NotFound => ApiError::NotFound("post not found"),
        other => other.into(),
    }
}
