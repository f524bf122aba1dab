use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::error;

use postboard_db::Database;
use postboard_types::api::{
    AuthResponse, Claims, LoginRequest, ProfileResponse, RegisterRequest, UpdateProfileRequest,
};

use crate::error::ApiError;
use crate::extractors::AuthUser;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "password must be at least 8 characters",
        ));
    }
    if req.display_name.trim().is_empty() {
        return Err(ApiError::BadRequest("display name is required"));
    }

    if state.db.user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Conflict("email already registered".into()));
    }

    // Hash password with Argon2id; plaintext is never stored.
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("password hashing failed: {e}");
            ApiError::Internal
        })?
        .to_string();

    let user = state.db.create_user(
        &req.email,
        &password_hash,
        req.display_name.trim(),
        req.course.as_deref(),
        req.term.as_deref(),
    )?;

    let token = create_token(&state.jwt_secret, user.id, &user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id: user.id,
            email: user.email,
            display_name: user.display_name.unwrap_or_default(),
            course: user.course.unwrap_or_default(),
            term: user.term.unwrap_or_default(),
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .user_by_email(&req.email)?
        .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
        error!("stored credential for user {} is unreadable: {e}", user.id);
        ApiError::Internal
    })?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let token = create_token(&state.jwt_secret, user.id, &user.email)?;

    Ok(Json(AuthResponse {
        user_id: user.id,
        email: user.email,
        display_name: user.display_name.unwrap_or_default(),
        course: user.course.unwrap_or_default(),
        term: user.term.unwrap_or_default(),
        token,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .user_by_id(claims.sub)?
        .ok_or(ApiError::NotFound("user not found"))?;

    Ok(Json(ProfileResponse {
        user_id: user.id,
        email: user.email,
        display_name: user.display_name.unwrap_or_default(),
        course: user.course.unwrap_or_default(),
        term: user.term.unwrap_or_default(),
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.display_name.trim().is_empty() {
        return Err(ApiError::BadRequest("display name is required"));
    }

    state.db.update_profile(
        claims.sub,
        req.display_name.trim(),
        req.course.as_deref(),
        req.term.as_deref(),
    )?;

    Ok(Json(ProfileResponse {
        user_id: claims.sub,
        email: claims.email,
        display_name: req.display_name.trim().to_string(),
        course: req.course.unwrap_or_default(),
        term: req.term.unwrap_or_default(),
    }))
}

fn create_token(secret: &str, user_id: i64, email: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!("token encoding failed: {e}");
        ApiError::Internal
    })
}
