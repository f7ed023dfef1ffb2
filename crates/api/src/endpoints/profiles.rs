//! Profile and follow endpoints.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use quill_common::{AppResult, PageQuery};

use crate::extractors::{AuthUser, MaybeAuthUser};
use crate::middleware::AppState;
use crate::response::{ApiResponse, PostView, ProfileContext};

/// An author's profile with their posts.
pub async fn profile(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<ProfileContext>> {
    let (author, feed) = state
        .post_service
        .profile_feed(&username, query.page)
        .await?;

    let followers_count = state.follow_service.count_followers(&author.id).await?;
    let following_count = state.follow_service.count_following(&author.id).await?;

    let following = match &viewer {
        Some(v) if v.id != author.id => {
            Some(state.follow_service.is_following(&v.id, &author.id).await?)
        }
        _ => None,
    };

    let page = feed.map(|item| PostView::from_item(item, &state.media_url));
    let post_count = page.total_items;

    Ok(ApiResponse::ok(ProfileContext {
        author: author.into(),
        page,
        post_count,
        followers_count,
        following_count,
        following,
    }))
}

/// Follow an author, then return to the site feed.
pub async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.follow(&user.id, &username).await?;
    Ok(Redirect::to("/").into_response())
}

/// Unfollow an author, then return to the site feed.
pub async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.unfollow(&user.id, &username).await?;
    Ok(Redirect::to("/").into_response())
}
