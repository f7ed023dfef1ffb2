//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use validator::Validate;

use crate::forms::SignupForm;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and log it in.
    ///
    /// Returns the created user together with a fresh session token.
    pub async fn signup(&self, form: SignupForm) -> AppResult<(user::Model, String)> {
        form.validate()?;

        // Check if username is taken
        if self
            .user_repo
            .find_by_username(&form.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        let password_hash = hash_password(&form.password)?;

        let user_id = self.id_gen.generate();
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(user_id),
            username: Set(form.username.clone()),
            username_lower: Set(form.username.to_lowercase()),
            password_hash: Set(password_hash),
            token: Set(Some(token.clone())),
            name: Set(form.name),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Registered new user");

        Ok((user, token))
    }

    /// Log in with username and password.
    ///
    /// Issues a fresh session token, invalidating any previous one.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(user::Model, String)> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid username or password".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.id_gen.generate_token();
        let user = self.user_repo.update_token(&user.id, &token).await?;

        Ok((user, token))
    }

    /// Log out by discarding the session token.
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.clear_token(user_id).await?;
        Ok(())
    }

    /// Resolve a session token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        self.user_repo.find_by_token(token).await
    }

    /// Look up a user by username, case-insensitively.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against an Argon2 hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            password_hash: hash_password(password).unwrap(),
            token: Some("token".to_string()),
            name: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_signup_duplicate_username_returns_error() {
        let existing = create_test_user("u1", "leo", "some-password");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service
            .signup(SignupForm {
                username: "Leo".to_string(),
                password: "long-enough-password".to_string(),
                name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_signup_invalid_form_fails_before_any_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = UserService::new(UserRepository::new(db));
        let result = service
            .signup(SignupForm {
                username: "leo".to_string(),
                password: "short".to_string(),
                name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let user = create_test_user("u1", "leo", "the-real-password");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.login("leo", "not-the-password").await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_unauthorized() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.login("ghost", "whatever-password").await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
