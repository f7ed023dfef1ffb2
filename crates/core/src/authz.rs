//! Authorization rules.

use quill_db::entities::post;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzDecision {
    /// The caller may perform the action.
    Granted,
    /// The caller may not perform the action.
    Denied,
}

/// Only the author of a post may edit or delete it.
#[must_use]
pub fn authorize_post_edit(post: &post::Model, user_id: &str) -> AuthzDecision {
    if post.author_id == user_id {
        AuthzDecision::Granted
    } else {
        AuthzDecision::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_post(author_id: &str) -> post::Model {
        post::Model {
            id: "p1".to_string(),
            author_id: author_id.to_string(),
            group_id: None,
            text: "Hello".to_string(),
            image_key: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_author_may_edit() {
        let post = create_test_post("u1");
        assert_eq!(authorize_post_edit(&post, "u1"), AuthzDecision::Granted);
    }

    #[test]
    fn test_non_author_may_not_edit() {
        let post = create_test_post("u1");
        assert_eq!(authorize_post_edit(&post, "u2"), AuthzDecision::Denied);
    }
}
