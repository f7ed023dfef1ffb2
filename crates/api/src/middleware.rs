//! Application state and middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use quill_common::PageCache;
use quill_core::{CommentService, FollowService, GroupService, PostService, UserService};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User and session management.
    pub user_service: UserService,
    /// Posts and feeds.
    pub post_service: PostService,
    /// Comments.
    pub comment_service: CommentService,
    /// Follow relationships.
    pub follow_service: FollowService,
    /// Groups.
    pub group_service: GroupService,
    /// Cache for rendered site feed pages.
    pub feed_cache: PageCache,
    /// URL prefix under which stored media is served.
    pub media_url: String,
}

/// Authentication middleware.
///
/// Resolves a Bearer token to its user and stashes the user in request
/// extensions; handlers pick it up through the `AuthUser` extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(Some(user)) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
