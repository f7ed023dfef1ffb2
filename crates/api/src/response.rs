//! View contexts and the response envelope.
//!
//! Every page the server renders is a JSON view context: the data a
//! template would receive, without the template.

#![allow(missing_docs)]

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use quill_common::Page;
use quill_core::services::post::{FeedItem, PostDetail};
use quill_db::entities::{comment, group, user};
use serde::Serialize;

/// Standard response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Error payload.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.error.is_some() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::OK
        };
        (status, Json(self)).into_response()
    }
}

/// A user as shown in views.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<user::Model> for UserView {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
        }
    }
}

/// A group as shown in views.
#[derive(Debug, Clone, Serialize)]
pub struct GroupView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<group::Model> for GroupView {
    fn from(g: group::Model) -> Self {
        Self {
            id: g.id,
            title: g.title,
            slug: g.slug,
            description: g.description,
        }
    }
}

/// A post as shown in feeds and detail pages.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub text: String,
    pub author: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl PostView {
    /// Build a view from a feed item, resolving the image key to a URL
    /// under the media prefix.
    #[must_use]
    pub fn from_item(item: FeedItem, media_url: &str) -> Self {
        Self {
            image_url: item
                .post
                .image_key
                .as_deref()
                .map(|key| media_url_for(media_url, key)),
            id: item.post.id,
            text: item.post.text,
            author: item.author.into(),
            group: item.group.map(GroupView::from),
            created_at: item.post.created_at.to_rfc3339(),
            updated_at: item.post.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// A comment as shown on a post's detail page.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub text: String,
    pub author: UserView,
    pub created_at: String,
}

impl From<(comment::Model, user::Model)> for CommentView {
    fn from((c, author): (comment::Model, user::Model)) -> Self {
        Self {
            id: c.id,
            text: c.text,
            author: author.into(),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Site and follow feed context.
#[derive(Debug, Serialize)]
pub struct FeedContext {
    pub page: Page<PostView>,
}

/// Group feed context.
#[derive(Debug, Serialize)]
pub struct GroupFeedContext {
    pub group: GroupView,
    pub page: Page<PostView>,
}

/// Profile page context.
#[derive(Debug, Serialize)]
pub struct ProfileContext {
    pub author: UserView,
    pub page: Page<PostView>,
    /// Total posts by the author.
    pub post_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    /// Whether the viewer follows this author. Absent for anonymous
    /// viewers and on your own profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub following: Option<bool>,
}

/// Post detail context.
#[derive(Debug, Serialize)]
pub struct PostDetailContext {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub author_post_count: u64,
}

impl PostDetailContext {
    /// Build the detail context from service output.
    #[must_use]
    pub fn from_detail(detail: PostDetail, media_url: &str) -> Self {
        let post = PostView::from_item(
            FeedItem {
                post: detail.post,
                author: detail.author,
                group: detail.group,
            },
            media_url,
        );
        Self {
            post,
            comments: detail.comments.into_iter().map(CommentView::from).collect(),
            author_post_count: detail.author_post_count,
        }
    }
}

/// Post form context (create and edit pages).
#[derive(Debug, Serialize)]
pub struct PostFormContext {
    /// Groups offered by the form's group selector.
    pub groups: Vec<GroupView>,
    /// The post being edited; absent on the create page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostView>,
}

/// Login page context.
#[derive(Debug, Serialize)]
pub struct LoginContext {
    /// Where to send the user after a successful login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Successful login or signup.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Context for unmatched paths.
#[derive(Debug, Serialize)]
pub struct NotFoundContext {
    pub path: String,
}

fn media_url_for(media_url: &str, key: &str) -> String {
    format!("{}/{}", media_url.trim_end_matches('/'), key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_post_view_resolves_image_url() {
        let item = FeedItem {
            post: quill_db::entities::post::Model {
                id: "p1".to_string(),
                author_id: "u1".to_string(),
                group_id: None,
                text: "Hello".to_string(),
                image_key: Some("posts/p1.png".to_string()),
                created_at: Utc::now().into(),
                updated_at: None,
            },
            author: user::Model {
                id: "u1".to_string(),
                username: "leo".to_string(),
                username_lower: "leo".to_string(),
                password_hash: String::new(),
                token: None,
                name: None,
                created_at: Utc::now().into(),
                updated_at: None,
            },
            group: None,
        };

        let view = PostView::from_item(item, "/media/");
        assert_eq!(view.image_url.as_deref(), Some("/media/posts/p1.png"));
    }
}
