use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use postboard_db::DbError;
use postboard_types::api::AddCommentRequest;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(post_id): Path<i64>,
    Json(req): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("comment text is required"));
    }

    let comment = state
        .db
        .add_comment(post_id, claims.sub, &req.text)
        .map_err(|e| match e {
            DbError::NotFound => ApiError::NotFound("post not found"),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.delete_comment(comment_id).map_err(|e| match e {
        DbError::NotFound => ApiError::NotFound("comment not found"),
        other => other.into(),
    })?;

    Ok(Json(serde_json::json!({ "success": true })))
}
