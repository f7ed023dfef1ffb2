//! Comment service.

use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::{comment, user},
    repositories::{CommentRepository, PostRepository},
};
use sea_orm::Set;
use validator::Validate;

use crate::forms::CommentForm;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(comment_repo: CommentRepository, post_repo: PostRepository) -> Self {
        Self {
            comment_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment to a post.
    ///
    /// The post must exist; that check runs before validation so a
    /// comment on a missing post is a not-found error, not a validation
    /// one.
    pub async fn add(
        &self,
        author_id: &str,
        post_id: &str,
        form: CommentForm,
    ) -> AppResult<comment::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        form.validate()?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            author_id: Set(author_id.to_string()),
            text: Set(form.text),
            ..Default::default()
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %comment.id, post_id = %post_id, "Added comment");

        Ok(comment)
    }

    /// All comments on a post with their authors, oldest first.
    pub async fn list_for_post(
        &self,
        post_id: &str,
    ) -> AppResult<Vec<(comment::Model, user::Model)>> {
        let comments = self
            .comment_repo
            .find_by_post_with_authors(post_id)
            .await?
            .into_iter()
            .filter_map(|(comment, author)| author.map(|a| (comment, a)))
            .collect();
        Ok(comments)
    }

    /// Count comments on a post.
    pub async fn count_for_post(&self, post_id: &str) -> AppResult<u64> {
        self.comment_repo.count_by_post(post_id).await
    }
}
