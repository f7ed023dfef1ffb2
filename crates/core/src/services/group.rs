//! Group service.

use quill_common::{AppResult, IdGenerator};
use quill_db::{entities::group, repositories::GroupRepository};
use sea_orm::Set;

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List all groups, oldest first.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.list_all().await
    }

    /// Look up a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// Create a group. Groups are operator-managed; there is no public
    /// endpoint for this.
    pub async fn create(
        &self,
        title: &str,
        slug: &str,
        description: &str,
    ) -> AppResult<group::Model> {
        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title.to_string()),
            slug: Set(slug.to_string()),
            description: Set(description.to_string()),
            ..Default::default()
        };
        self.group_repo.create(model).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quill_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_group(id: &str, slug: &str) -> group::Model {
        group::Model {
            id: id.to_string(),
            title: format!("Group {slug}"),
            slug: slug.to_string(),
            description: "A test group".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_slug_unknown_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<group::Model>::new()])
            .into_connection();

        let service = GroupService::new(GroupRepository::new(Arc::new(db)));
        let result = service.get_by_slug("missing").await;

        assert!(matches!(result, Err(AppError::GroupNotFound(_))));
    }

    #[tokio::test]
    async fn test_list() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                create_test_group("g1", "cats"),
                create_test_group("g2", "dogs"),
            ]])
            .into_connection();

        let service = GroupService::new(GroupRepository::new(Arc::new(db)));
        let groups = service.list().await.unwrap();

        assert_eq!(groups.len(), 2);
    }
}
