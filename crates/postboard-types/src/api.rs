use serde::{Deserialize, Serialize};

use crate::models::{AttendIntent, ReactionMap};

// -- JWT Claims --

/// JWT claims shared between token issuance (auth handlers) and validation
/// (the `AuthUser` extractor). Canonical definition lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub course: String,
    pub term: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub course: String,
    pub term: String,
}

// -- Boards --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBoardRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBoardRequest {
    pub hidden: bool,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub post_count: i64,
}

#[derive(Debug, Serialize)]
pub struct BoardDetailResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub posts: Vec<PostResponse>,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub created_at: String,
    pub post_type: String,
    pub content: String,
    pub user_id: Option<i64>,
    pub author: String,
    pub reactions: ReactionMap,
    pub comments: Vec<CommentResponse>,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleReactionRequest {
    pub kind: String,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddCommentRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub created_at: String,
    pub text: String,
    pub user_id: Option<i64>,
    pub author: String,
}

// -- Events --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Events are exposed under the id of their backing post.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub starts_at: String,
    pub event_type: String,
    pub attendance: i64,
    pub going: Vec<i64>,
    pub interested: Vec<i64>,
    pub description: String,
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttendRequest {
    pub intent: AttendIntent,
}
