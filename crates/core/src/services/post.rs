//! Post service.
//!
//! Assembles feeds and enforces the post lifecycle rules: the author is
//! always the logged-in caller, and only the author may edit or delete.

use std::collections::HashMap;
use std::sync::Arc;

use quill_common::{AppError, AppResult, IdGenerator, Page, StorageBackend};
use quill_db::{
    entities::{comment, group, post, user},
    repositories::{CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use validator::Validate;

use crate::authz::{AuthzDecision, authorize_post_edit};
use crate::forms::{ImageUpload, PostForm};

/// A feed entry: a post with its author and group resolved.
#[derive(Debug, Clone)]
pub struct FeedItem {
    /// The post itself.
    pub post: post::Model,
    /// Post author.
    pub author: user::Model,
    /// Group the post belongs to, if any.
    pub group: Option<group::Model>,
}

/// Everything shown on a post's detail page.
#[derive(Debug, Clone)]
pub struct PostDetail {
    /// The post itself.
    pub post: post::Model,
    /// Post author.
    pub author: user::Model,
    /// Group the post belongs to, if any.
    pub group: Option<group::Model>,
    /// Comments with their authors, oldest first.
    pub comments: Vec<(comment::Model, user::Model)>,
    /// Total number of posts by the author.
    pub author_post_count: u64,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    user_repo: UserRepository,
    follow_repo: FollowRepository,
    comment_repo: CommentRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
    per_page: u64,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        user_repo: UserRepository,
        follow_repo: FollowRepository,
        comment_repo: CommentRepository,
        storage: Arc<dyn StorageBackend>,
        per_page: u64,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            user_repo,
            follow_repo,
            comment_repo,
            storage,
            id_gen: IdGenerator::new(),
            per_page,
        }
    }

    /// Site feed: every post, newest first.
    pub async fn site_feed(&self, page: Option<u64>) -> AppResult<Page<FeedItem>> {
        let posts = self.post_repo.find_page(page, self.per_page).await?;
        self.assemble(posts).await
    }

    /// Group feed: posts in the group with the given slug.
    ///
    /// Unknown slugs are a not-found error.
    pub async fn group_feed(
        &self,
        slug: &str,
        page: Option<u64>,
    ) -> AppResult<(group::Model, Page<FeedItem>)> {
        let group = self.group_repo.get_by_slug(slug).await?;
        let posts = self
            .post_repo
            .find_page_by_group(&group.id, page, self.per_page)
            .await?;
        let feed = self.assemble(posts).await?;
        Ok((group, feed))
    }

    /// Profile feed: posts by the user with the given username.
    ///
    /// The page's `total_items` doubles as the author's post count.
    pub async fn profile_feed(
        &self,
        username: &str,
        page: Option<u64>,
    ) -> AppResult<(user::Model, Page<FeedItem>)> {
        let author = self.user_repo.get_by_username(username).await?;
        let posts = self
            .post_repo
            .find_page_by_author(&author.id, page, self.per_page)
            .await?;
        let feed = self.assemble(posts).await?;
        Ok((author, feed))
    }

    /// Follow feed: posts by every author the user follows.
    pub async fn follow_feed(&self, user_id: &str, page: Option<u64>) -> AppResult<Page<FeedItem>> {
        let author_ids = self.follow_repo.list_followed_ids(user_id).await?;
        let posts = self
            .post_repo
            .find_page_by_authors(&author_ids, page, self.per_page)
            .await?;
        self.assemble(posts).await
    }

    /// Everything needed to render a post's detail page.
    pub async fn detail(&self, post_id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let author = self.user_repo.get_by_id(&post.author_id).await?;

        let group = match &post.group_id {
            Some(group_id) => self.group_repo.find_by_id(group_id).await?,
            None => None,
        };

        let comments = self
            .comment_repo
            .find_by_post_with_authors(post_id)
            .await?
            .into_iter()
            .filter_map(|(comment, author)| author.map(|a| (comment, a)))
            .collect();

        let author_post_count = self.post_repo.count_by_author(&post.author_id).await?;

        Ok(PostDetail {
            post,
            author,
            group,
            comments,
            author_post_count,
        })
    }

    /// Create a post. The author is always the caller; it cannot be
    /// supplied through the form.
    pub async fn create(
        &self,
        author_id: &str,
        form: PostForm,
        image: Option<ImageUpload>,
    ) -> AppResult<post::Model> {
        form.validate()?;

        let group_id = self.resolve_group(&form).await?;
        let post_id = self.id_gen.generate();
        let image_key = self.store_image(&post_id, image).await?;

        let model = post::ActiveModel {
            id: Set(post_id),
            author_id: Set(author_id.to_string()),
            group_id: Set(group_id),
            text: Set(form.text),
            image_key: Set(image_key),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        tracing::debug!(post_id = %post.id, author_id = %author_id, "Created post");

        Ok(post)
    }

    /// Edit a post. Only the author may edit; anyone else gets a
    /// forbidden error.
    pub async fn update(
        &self,
        post_id: &str,
        user_id: &str,
        form: PostForm,
        image: Option<ImageUpload>,
    ) -> AppResult<post::Model> {
        let existing = self.post_repo.get_by_id(post_id).await?;

        if authorize_post_edit(&existing, user_id) == AuthzDecision::Denied {
            return Err(AppError::Forbidden(
                "Only the author can edit this post".to_string(),
            ));
        }

        form.validate()?;

        let group_id = self.resolve_group(&form).await?;
        let new_image_key = self.store_image(post_id, image).await?;

        let image_key = match new_image_key {
            Some(new) => {
                // A replacement with a different extension leaves the
                // old file behind; clean it up.
                if let Some(old) = &existing.image_key
                    && old != &new
                    && let Err(e) = self.storage.delete(old).await
                {
                    tracing::warn!(error = %e, key = %old, "Failed to delete replaced image");
                }
                Some(new)
            }
            None if form.clear_image => {
                if let Some(old) = &existing.image_key
                    && let Err(e) = self.storage.delete(old).await
                {
                    tracing::warn!(error = %e, key = %old, "Failed to delete cleared image");
                }
                None
            }
            None => existing.image_key,
        };

        let model = post::ActiveModel {
            id: Set(post_id.to_string()),
            group_id: Set(group_id),
            text: Set(form.text),
            image_key: Set(image_key),
            updated_at: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };

        self.post_repo.update(model).await
    }

    /// Delete a post. Only the author may delete.
    pub async fn delete(&self, post_id: &str, user_id: &str) -> AppResult<()> {
        let existing = self.post_repo.get_by_id(post_id).await?;

        if authorize_post_edit(&existing, user_id) == AuthzDecision::Denied {
            return Err(AppError::Forbidden(
                "Only the author can delete this post".to_string(),
            ));
        }

        self.post_repo.delete(post_id).await?;

        if let Some(key) = &existing.image_key
            && let Err(e) = self.storage.delete(key).await
        {
            tracing::warn!(error = %e, key = %key, "Failed to delete post image");
        }

        Ok(())
    }

    /// Resolve the form's group slug to a group ID.
    async fn resolve_group(&self, form: &PostForm) -> AppResult<Option<String>> {
        match form.group_slug() {
            Some(slug) => {
                let group = self
                    .group_repo
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| AppError::Validation(format!("Unknown group: {slug}")))?;
                Ok(Some(group.id))
            }
            None => Ok(None),
        }
    }

    /// Store an uploaded image under the post's key.
    async fn store_image(
        &self,
        post_id: &str,
        image: Option<ImageUpload>,
    ) -> AppResult<Option<String>> {
        let Some(image) = image else {
            return Ok(None);
        };

        let ext = image.extension()?;
        let content_type = image.mime_type()?;
        let key = format!("posts/{post_id}.{ext}");

        let stored = self.storage.store(&key, &image.data, content_type).await?;
        Ok(Some(stored.key))
    }

    /// Resolve authors and groups for a page of posts in two batch queries.
    async fn assemble(&self, page: Page<post::Model>) -> AppResult<Page<FeedItem>> {
        let mut author_ids: Vec<String> = page.items.iter().map(|p| p.author_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let mut group_ids: Vec<String> = page
            .items
            .iter()
            .filter_map(|p| p.group_id.clone())
            .collect();
        group_ids.sort_unstable();
        group_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let groups: HashMap<String, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        page.try_map(|post| {
            let author = authors
                .get(&post.author_id)
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("Missing author for post {}", post.id)))?;
            let group = post.group_id.as_ref().and_then(|id| groups.get(id)).cloned();
            Ok(FeedItem {
                post,
                author,
                group,
            })
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    struct NullStorage;

    #[async_trait::async_trait]
    impl StorageBackend for NullStorage {
        async fn store(
            &self,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> AppResult<quill_common::StoredFile> {
            Ok(quill_common::StoredFile {
                key: key.to_string(),
                url: format!("/media/{key}"),
                size: data.len() as u64,
                content_type: content_type.to_string(),
                md5: String::new(),
            })
        }

        async fn delete(&self, _key: &str) -> AppResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("/media/{key}")
        }

        async fn exists(&self, _key: &str) -> AppResult<bool> {
            Ok(false)
        }
    }

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            password_hash: "$argon2id$test".to_string(),
            token: None,
            name: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            group_id: None,
            text: "Hello".to_string(),
            image_key: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, Value> {
        btreemap! { "num_items" => Value::BigInt(Some(n)) }
    }

    fn service_with(
        post_db: sea_orm::DatabaseConnection,
        group_db: sea_orm::DatabaseConnection,
        user_db: sea_orm::DatabaseConnection,
        follow_db: sea_orm::DatabaseConnection,
        comment_db: sea_orm::DatabaseConnection,
    ) -> PostService {
        PostService::new(
            PostRepository::new(Arc::new(post_db)),
            GroupRepository::new(Arc::new(group_db)),
            UserRepository::new(Arc::new(user_db)),
            FollowRepository::new(Arc::new(follow_db)),
            CommentRepository::new(Arc::new(comment_db)),
            Arc::new(NullStorage),
            10,
        )
    }

    #[tokio::test]
    async fn test_site_feed_resolves_authors() {
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(1)]])
            .append_query_results([vec![create_test_post("p1", "u1")]])
            .into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![create_test_user("u1", "leo")]])
            .into_connection();
        let group_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group::Model>::new()])
            .into_connection();
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(post_db, group_db, user_db, follow_db, comment_db);
        let feed = service.site_feed(None).await.unwrap();

        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].author.username, "leo");
        assert!(feed.items[0].group.is_none());
    }

    #[tokio::test]
    async fn test_create_assigns_caller_as_author() {
        let inserted = create_test_post("p1", "u1");

        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![inserted]])
            .into_connection();
        let group_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(post_db, group_db, user_db, follow_db, comment_db);
        let form = PostForm {
            text: "Hello".to_string(),
            group: None,
            clear_image: false,
        };
        let post = service.create("u1", form, None).await.unwrap();

        assert_eq!(post.author_id, "u1");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_text_before_any_query() {
        let post_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let group_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(post_db, group_db, user_db, follow_db, comment_db);
        let form = PostForm {
            text: "   ".to_string(),
            group: None,
            clear_image: false,
        };
        let result = service.create("u1", form, None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_by_non_author_is_forbidden() {
        let existing = create_test_post("p1", "u1");

        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .into_connection();
        let group_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(post_db, group_db, user_db, follow_db, comment_db);
        let form = PostForm {
            text: "Edited".to_string(),
            group: None,
            clear_image: false,
        };
        let result = service.update("p1", "u2", form, None).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_with_clear_flag_removes_image() {
        let existing = post::Model {
            image_key: Some("posts/p1.png".to_string()),
            ..create_test_post("p1", "u1")
        };
        let updated = create_test_post("p1", "u1");

        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([vec![updated]])
            .into_connection();
        let group_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(post_db, group_db, user_db, follow_db, comment_db);
        let form = PostForm {
            text: "Hello".to_string(),
            group: None,
            clear_image: true,
        };
        let post = service.update("p1", "u1", form, None).await.unwrap();

        assert!(post.image_key.is_none());
    }

    #[tokio::test]
    async fn test_follow_feed_without_follows_is_empty() {
        let post_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let group_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group::Model>::new()])
            .into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<quill_db::entities::follow::Model>::new()])
            .into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(post_db, group_db, user_db, follow_db, comment_db);
        let feed = service.follow_feed("u1", None).await.unwrap();

        assert!(feed.items.is_empty());
        assert_eq!(feed.total_items, 0);
    }

    #[tokio::test]
    async fn test_detail_unknown_post_is_not_found() {
        let post_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();
        let group_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let user_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let comment_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = service_with(post_db, group_db, user_db, follow_db, comment_db);
        let result = service.detail("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
