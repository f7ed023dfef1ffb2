//! Authentication endpoints.

#![allow(missing_docs)]

use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use quill_core::forms::SignupForm;
use serde::Deserialize;

use quill_common::AppResult;

use crate::extractors::AuthUser;
use crate::middleware::AppState;
use crate::response::{ApiResponse, LoginContext, SessionResponse};

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Where to send the user after logging in.
    pub next: Option<String>,
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Login page context; echoes `next` back to the form.
pub async fn login_form(Query(query): Query<LoginQuery>) -> ApiResponse<LoginContext> {
    ApiResponse::ok(LoginContext { next: query.next })
}

/// Password login. Issues a fresh Bearer token, invalidating any
/// previous session.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let (user, token) = state.user_service.login(&form.username, &form.password).await?;

    Ok(ApiResponse::ok(SessionResponse {
        token,
        user: user.into(),
        next: form.next,
    }))
}

/// Register a new account and log it in.
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let (user, token) = state.user_service.signup(form).await?;

    Ok(ApiResponse::ok(SessionResponse {
        token,
        user: user.into(),
        next: None,
    }))
}

/// End the session by discarding the caller's token.
pub async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    state.user_service.logout(&user.id).await?;
    Ok(Redirect::to("/").into_response())
}
