pub mod auth;
pub mod boards;
pub mod comments;
pub mod error;
pub mod events;
pub mod extractors;
pub mod posts;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub use auth::{AppState, AppStateInner};

/// Build the full REST router. Handlers taking an [`extractors::AuthUser`]
/// argument require a valid bearer token; everything else is public.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", put(auth::update_profile))
        .route("/boards", get(boards::list_boards).post(boards::create_board))
        .route(
            "/boards/{board_id}",
            get(boards::get_board).put(boards::set_board_visibility),
        )
        .route(
            "/boards/{board_id}/posts",
            get(posts::get_board_posts).post(posts::create_post),
        )
        .route(
            "/boards/{board_id}/events",
            get(events::get_board_events).post(events::create_event),
        )
        .route(
            "/posts/{post_id}",
            put(posts::update_post).delete(posts::delete_post),
        )
        .route("/posts/{post_id}/reactions", post(posts::toggle_reaction))
        .route("/posts/{post_id}/comments", post(comments::add_comment))
        .route("/comments/{comment_id}", delete(comments::delete_comment))
        .route("/events/{event_id}/attend", post(events::toggle_attendance))
        .with_state(state)
}
