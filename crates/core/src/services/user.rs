//! User service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for registering a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserInput {
    /// Unique handle.
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    /// Contact email, unique.
    #[validate(email)]
    pub email: String,
    /// Optional given name.
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    /// Optional family name.
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
}

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

    /// Register a user and issue an API token.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            email: Set(input.email),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            token: Set(Some(self.id_gen.generate_token())),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Resolve an API token to a user, if valid.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        if token.is_empty() {
            return Ok(None);
        }
        self.user_repo.find_by_token(token).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            token: Some("test_token".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(UserRepository::new(db));

        let input = CreateUserInput {
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            first_name: None,
            last_name: None,
        };

        let result = service.create(input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate_by_token_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(UserRepository::new(db));

        let result = service.authenticate_by_token("").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_by_token_found() {
        let user = create_test_user("u1", "alice");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let service = UserService::new(UserRepository::new(db));

        let result = service.authenticate_by_token("test_token").await.unwrap();
        assert_eq!(result.unwrap().username, "alice");
    }
}
