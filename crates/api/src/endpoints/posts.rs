//! Post and feed endpoints.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{Uri, header},
    response::{IntoResponse, Redirect, Response},
};
use quill_common::{AppError, AppResult, PageQuery};
use quill_core::forms::{CommentForm, ImageUpload, PostForm};

use crate::extractors::AuthUser;
use crate::middleware::AppState;
use crate::response::{
    ApiResponse, FeedContext, GroupFeedContext, GroupView, PostDetailContext, PostFormContext,
    PostView,
};

/// Site feed. Responses are cached for a short TTL, keyed by the full
/// request URI; within that window the feed may be stale.
pub async fn index(
    State(state): State<AppState>,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let key = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);

    if let Some(body) = state.feed_cache.get(&key) {
        return Ok(json_body(body));
    }

    let feed = state.post_service.site_feed(query.page).await?;
    let page = feed.map(|item| PostView::from_item(item, &state.media_url));

    let body = serde_json::to_string(&ApiResponse::ok(FeedContext { page }))
        .map_err(|e| AppError::Internal(format!("Failed to serialize feed: {e}")))?;
    state.feed_cache.set(&key, body.clone());

    Ok(json_body(body))
}

/// Posts in one group.
pub async fn group_feed(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<GroupFeedContext>> {
    let (group, feed) = state.post_service.group_feed(&slug, query.page).await?;
    let page = feed.map(|item| PostView::from_item(item, &state.media_url));

    Ok(ApiResponse::ok(GroupFeedContext {
        group: group.into(),
        page,
    }))
}

/// Posts by the authors the caller follows.
pub async fn follow_feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<FeedContext>> {
    let feed = state.post_service.follow_feed(&user.id, query.page).await?;
    let page = feed.map(|item| PostView::from_item(item, &state.media_url));

    Ok(ApiResponse::ok(FeedContext { page }))
}

/// One post with all its comments.
pub async fn post_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostDetailContext>> {
    let detail = state.post_service.detail(&id).await?;
    Ok(ApiResponse::ok(PostDetailContext::from_detail(
        detail,
        &state.media_url,
    )))
}

/// Blank post form with the available groups.
pub async fn create_form(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PostFormContext>> {
    let groups = state.group_service.list().await?;
    Ok(ApiResponse::ok(PostFormContext {
        groups: groups.into_iter().map(GroupView::from).collect(),
        post: None,
    }))
}

/// Create a post. The author is always the caller.
pub async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (form, image) = read_post_form(multipart).await?;
    state.post_service.create(&user.id, form, image).await?;

    Ok(Redirect::to(&format!("/profile/{}/", user.username)).into_response())
}

/// Edit form, pre-filled with the post. Non-authors are bounced to the
/// post's detail page without an error.
pub async fn edit_form(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let detail = state.post_service.detail(&id).await?;

    if detail.post.author_id != user.id {
        return Ok(Redirect::to(&format!("/posts/{id}/")).into_response());
    }

    let groups = state.group_service.list().await?;
    let context = PostDetailContext::from_detail(detail, &state.media_url);

    Ok(ApiResponse::ok(PostFormContext {
        groups: groups.into_iter().map(GroupView::from).collect(),
        post: Some(context.post),
    })
    .into_response())
}

/// Apply an edit. A non-author gets the same silent bounce as the form.
pub async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (form, image) = read_post_form(multipart).await?;
    let detail_url = format!("/posts/{id}/");

    match state.post_service.update(&id, &user.id, form, image).await {
        Ok(_) | Err(AppError::Forbidden(_)) => Ok(Redirect::to(&detail_url).into_response()),
        Err(e) => Err(e),
    }
}

/// Add a comment, then return to the post.
pub async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    axum::Form(form): axum::Form<CommentForm>,
) -> AppResult<Response> {
    state.comment_service.add(&user.id, &id, form).await?;
    Ok(Redirect::to(&format!("/posts/{id}/")).into_response())
}

/// Parse the multipart post form: `text`, optional `group`, optional
/// `image` file, optional `clear_image` checkbox.
async fn read_post_form(mut multipart: Multipart) -> AppResult<(PostForm, Option<ImageUpload>)> {
    let mut text = String::new();
    let mut group: Option<String> = None;
    let mut clear_image = false;
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed form body: {e}")))?
    {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("text") => {
                text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed text field: {e}")))?;
            }
            Some("group") => {
                group = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Malformed group field: {e}")))?,
                );
            }
            Some("clear_image") => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Malformed clear_image field: {e}"))
                })?;
                // Checkboxes submit "on"; be tolerant of explicit booleans
                clear_image = matches!(value.as_str(), "on" | "true" | "1");
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(ToString::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed image field: {e}")))?
                    .to_vec();

                // Browsers submit an empty file part when nothing is chosen
                if !data.is_empty() {
                    image = Some(ImageUpload {
                        file_name,
                        content_type,
                        data,
                    });
                }
            }
            _ => {}
        }
    }

    Ok((
        PostForm {
            text,
            group,
            clear_image,
        },
        image,
    ))
}

fn json_body(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
