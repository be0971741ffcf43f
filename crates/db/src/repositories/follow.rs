//! Follow repository.

use std::sync::Arc;

use crate::entities::{Follow, follow};
use foodgram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether a follow edge exists.
    pub async fn exists(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let found = Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    /// Insert a follow edge.
    ///
    /// The storage-level unique index on (follower, followee) is the
    /// authoritative duplicate detector under concurrent inserts.
    pub async fn create(&self, model: follow::ActiveModel) -> AppResult<follow::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Already following this user".to_string())
            }
            _ => AppError::Database(e.to_string()),
        })
    }

    /// Remove a follow edge, reporting whether one was present.
    pub async fn delete_by_pair(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let result = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FolloweeId.eq(followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// IDs of users a follower subscribes to, newest edge first.
    pub async fn find_followee_ids(&self, follower_id: &str) -> AppResult<Vec<String>> {
        let rows = Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(|m| m.followee_id).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_follow(id: &str, follower_id: &str, followee_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_exists_true() {
        let edge = create_test_follow("fo1", "u1", "u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[edge]])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert!(repo.exists("u1", "u2").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_absent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert!(!repo.delete_by_pair("u1", "u2").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_followee_ids_order() {
        let newer = create_test_follow("fo2", "u1", "u3");
        let older = create_test_follow("fo1", "u1", "u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[newer, older]])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        let ids = repo.find_followee_ids("u1").await.unwrap();

        assert_eq!(ids, vec!["u3".to_string(), "u2".to_string()]);
    }
}
