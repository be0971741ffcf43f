//! Follow service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{
    entities::{follow, recipe, user},
    repositories::{FollowRepository, RecipeRepository, UserRepository},
};
use sea_orm::Set;

/// A followed author with their recipe activity, for subscription listings.
#[derive(Debug, Clone)]
pub struct Subscription {
    /// The followed author.
    pub author: user::Model,
    /// Total number of recipes the author has published.
    pub recipes_count: u64,
    /// The author's most recent recipes, capped by the requested limit.
    pub recipes: Vec<recipe::Model>,
}

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(
        follow_repo: FollowRepository,
        user_repo: UserRepository,
        recipe_repo: RecipeRepository,
    ) -> Self {
        Self {
            follow_repo,
            user_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user.
    ///
    /// Self-follows are rejected, an existing edge is a conflict, and the
    /// unique index backs the pre-check up under concurrent requests.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<follow::Model> {
        if follower_id == followee_id {
            return Err(AppError::Validation(
                "Cannot follow yourself".to_string(),
            ));
        }

        let followee = self.user_repo.get_by_id(followee_id).await?;

        if self.follow_repo.exists(follower_id, followee_id).await? {
            return Err(AppError::Conflict(
                "Already following this user".to_string(),
            ));
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee.id),
            ..Default::default()
        };
        let edge = self.follow_repo.create(model).await?;
        tracing::info!(follower_id, followee_id, "Follow created");
        Ok(edge)
    }

    /// Unfollow a user. A missing edge is an error.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        let removed = self
            .follow_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;
        if !removed {
            return Err(AppError::NotFound(
                "Not following this user".to_string(),
            ));
        }
        tracing::info!(follower_id, followee_id, "Follow removed");
        Ok(())
    }

    /// Check whether a follow edge exists.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.exists(follower_id, followee_id).await
    }

    /// Build the subscription view for a single author.
    pub async fn subscription(
        &self,
        followee_id: &str,
        recipes_limit: Option<u64>,
    ) -> AppResult<Subscription> {
        let author = self.user_repo.get_by_id(followee_id).await?;
        let recipes_count = self.recipe_repo.count_by_author(followee_id).await?;
        let recipes = self
            .recipe_repo
            .find_recent_by_author(followee_id, recipes_limit)
            .await?;
        Ok(Subscription {
            author,
            recipes_count,
            recipes,
        })
    }

    /// List the authors a user follows, newest subscription first, each
    /// with their recipe count and most recent recipes.
    pub async fn list_following(
        &self,
        follower_id: &str,
        recipes_limit: Option<u64>,
    ) -> AppResult<Vec<Subscription>> {
        let followee_ids = self.follow_repo.find_followee_ids(follower_id).await?;
        let authors = self.user_repo.find_by_ids(&followee_ids).await?;

        let mut subscriptions = Vec::with_capacity(followee_ids.len());
        // Preserve subscription order; find_by_ids gives no ordering guarantee.
        for followee_id in &followee_ids {
            let Some(author) = authors.iter().find(|u| &u.id == followee_id) else {
                continue;
            };
            let recipes_count = self.recipe_repo.count_by_author(followee_id).await?;
            let recipes = self
                .recipe_repo
                .find_recent_by_author(followee_id, recipes_limit)
                .await?;
            subscriptions.push(Subscription {
                author: author.clone(),
                recipes_count,
                recipes,
            });
        }
        Ok(subscriptions)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn empty_conn() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: None,
            last_name: None,
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_follow(id: &str, follower_id: &str, followee_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_follow_yourself_rejected() {
        let service = FollowService::new(
            FollowRepository::new(empty_conn()),
            UserRepository::new(empty_conn()),
            RecipeRepository::new(empty_conn()),
        );

        let result = service.follow("u1", "u1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_follow_missing_user() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = FollowService::new(
            FollowRepository::new(empty_conn()),
            UserRepository::new(user_db),
            RecipeRepository::new(empty_conn()),
        );

        let result = service.follow("u1", "missing").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_follow_duplicate_conflict() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u2", "bob")]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_follow("fo1", "u1", "u2")]])
                .into_connection(),
        );

        let service = FollowService::new(
            FollowRepository::new(follow_db),
            UserRepository::new(user_db),
            RecipeRepository::new(empty_conn()),
        );

        let result = service.follow("u1", "u2").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unfollow_missing_edge() {
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([sea_orm::MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let service = FollowService::new(
            FollowRepository::new(follow_db),
            UserRepository::new(empty_conn()),
            RecipeRepository::new(empty_conn()),
        );

        let result = service.unfollow("u1", "u2").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_following_preserves_order() {
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_follow("fo2", "u1", "u3"),
                    create_test_follow("fo1", "u1", "u2"),
                ]])
                .into_connection(),
        );
        // find_by_ids returns authors in an arbitrary order
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_user("u2", "bob"),
                    create_test_user("u3", "carol"),
                ]])
                .into_connection(),
        );
        // Per followee, in order: one count query, one recent-recipes query.
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(3)]])
                .append_query_results([Vec::<recipe::Model>::new()])
                .append_query_results([[count_row(0)]])
                .append_query_results([Vec::<recipe::Model>::new()])
                .into_connection(),
        );

        let service = FollowService::new(
            FollowRepository::new(follow_db),
            UserRepository::new(user_db),
            RecipeRepository::new(recipe_db),
        );

        let subs = service.list_following("u1", Some(3)).await.unwrap();

        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].author.id, "u3");
        assert_eq!(subs[1].author.id, "u2");
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut m = std::collections::BTreeMap::new();
        m.insert("num_items", sea_orm::Value::from(n));
        m
    }
}
