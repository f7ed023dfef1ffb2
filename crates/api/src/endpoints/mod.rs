//! HTTP endpoints.

mod auth;
mod posts;
mod profiles;

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::middleware::AppState;
use crate::response::NotFoundContext;

/// Create the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::index))
        .route("/group/{slug}/", get(posts::group_feed))
        .route("/posts/{id}/", get(posts::post_detail))
        .route("/create/", get(posts::create_form).post(posts::create))
        .route("/posts/{id}/edit", get(posts::edit_form).post(posts::edit))
        .route("/posts/{id}/comment", post(posts::add_comment))
        .route("/follow/", get(posts::follow_feed))
        .route("/profile/{username}/", get(profiles::profile))
        .route("/profile/{username}/follow", post(profiles::follow))
        .route("/profile/{username}/unfollow", post(profiles::unfollow))
        .route("/auth/login/", get(auth::login_form).post(auth::login))
        .route("/auth/signup/", post(auth::signup))
        .route("/auth/logout/", post(auth::logout))
        .fallback(not_found)
}

/// Fallback for unmatched paths.
async fn not_found(uri: Uri) -> Response {
    let context = NotFoundContext {
        path: uri.path().to_string(),
    };
    (StatusCode::NOT_FOUND, Json(context)).into_response()
}
