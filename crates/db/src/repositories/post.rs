//! Post repository.
//!
//! Feed queries share one pagination scheme: newest first, fixed page
//! size, requested page clamped to the nearest valid page.

use std::sync::Arc;

use crate::entities::{Post, post};
use quill_common::{AppError, AppResult, Page, clamp_page};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Site feed: every post, paginated.
    pub async fn find_page(&self, page: Option<u64>, per_page: u64) -> AppResult<Page<post::Model>> {
        self.paginate(Post::find(), page, per_page).await
    }

    /// Group feed: posts in one group, paginated.
    pub async fn find_page_by_group(
        &self,
        group_id: &str,
        page: Option<u64>,
        per_page: u64,
    ) -> AppResult<Page<post::Model>> {
        self.paginate(
            Post::find().filter(post::Column::GroupId.eq(group_id)),
            page,
            per_page,
        )
        .await
    }

    /// Profile feed: posts by one author, paginated.
    pub async fn find_page_by_author(
        &self,
        author_id: &str,
        page: Option<u64>,
        per_page: u64,
    ) -> AppResult<Page<post::Model>> {
        self.paginate(
            Post::find().filter(post::Column::AuthorId.eq(author_id)),
            page,
            per_page,
        )
        .await
    }

    /// Follow feed: posts by any of the given authors, paginated.
    pub async fn find_page_by_authors(
        &self,
        author_ids: &[String],
        page: Option<u64>,
        per_page: u64,
    ) -> AppResult<Page<post::Model>> {
        if author_ids.is_empty() {
            return Ok(Page::empty(per_page));
        }
        self.paginate(
            Post::find().filter(post::Column::AuthorId.is_in(author_ids.to_vec())),
            page,
            per_page,
        )
        .await
    }

    /// Count posts by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Run a feed query: count, clamp the page number, fetch one page.
    async fn paginate(
        &self,
        query: Select<Post>,
        page: Option<u64>,
        per_page: u64,
    ) -> AppResult<Page<post::Model>> {
        let paginator = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(self.db.as_ref(), per_page);

        let total_items = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let (number, total_pages) = clamp_page(page, total_items, per_page);

        let items = paginator
            .fetch_page(number - 1)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Page::new(items, number, total_pages, total_items, per_page))
    }
}
