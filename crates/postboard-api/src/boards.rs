use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use postboard_db::mapper;
use postboard_types::api::{BoardDetailResponse, CreateBoardRequest, UpdateBoardRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::extractors::AuthUser;

pub async fn list_boards(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let boards: Vec<_> = state
        .db
        .list_boards()?
        .into_iter()
        .map(mapper::board_response)
        .collect();
    Ok(Json(boards))
}

/// A board together with its (non-event) posts.
pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let board = state
        .db
        .board_by_id(board_id)?
        .ok_or(ApiError::NotFound("board not found"))?;
    let posts = state.db.board_posts(board_id)?;

    Ok(Json(BoardDetailResponse {
        id: board.id,
        name: board.name,
        description: mapper::text_or_empty(board.description),
        created_at: board.created_at,
        posts,
    }))
}

pub async fn create_board(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("board name is required"));
    }

    let board = state
        .db
        .create_board(req.name.trim(), req.description.as_deref(), claims.sub)?;

    Ok((StatusCode::CREATED, Json(mapper::board_response(board))))
}

pub async fn set_board_visibility(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Path(board_id): Path<i64>,
    Json(req): Json<UpdateBoardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .set_board_hidden(board_id, req.hidden)
        .map_err(|e| match e {
            postboard_db::DbError::NotFound => ApiError::NotFound("board not found"),
            other => other.into(),
        })?;

    Ok(Json(serde_json::json!({ "success": true })))
}
