//! Follow service.
//!
//! Follow and unfollow are idempotent: following yourself, following an
//! author twice, or unfollowing someone you never followed are silent
//! no-ops. Only an unknown username is an error.

use quill_common::{AppResult, IdGenerator};
use quill_db::{
    entities::follow,
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow the author with the given username.
    pub async fn follow(&self, follower_id: &str, username: &str) -> AppResult<()> {
        let author = self.user_repo.get_by_username(username).await?;

        if author.id == follower_id {
            return Ok(());
        }

        if self.follow_repo.is_following(follower_id, &author.id).await? {
            return Ok(());
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            author_id: Set(author.id.clone()),
            ..Default::default()
        };

        self.follow_repo.create(model).await?;
        tracing::debug!(follower_id = %follower_id, author_id = %author.id, "Followed author");

        Ok(())
    }

    /// Unfollow the author with the given username.
    pub async fn unfollow(&self, follower_id: &str, username: &str) -> AppResult<()> {
        let author = self.user_repo.get_by_username(username).await?;
        self.follow_repo
            .delete_by_pair(follower_id, &author.id)
            .await
    }

    /// Check if a user follows an author.
    pub async fn is_following(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, author_id).await
    }

    /// Count followers of an author.
    pub async fn count_followers(&self, author_id: &str) -> AppResult<u64> {
        self.follow_repo.count_followers(author_id).await
    }

    /// Count authors a user follows.
    pub async fn count_following(&self, follower_id: &str) -> AppResult<u64> {
        self.follow_repo.count_following(follower_id).await
    }
}
