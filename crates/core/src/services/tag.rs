//! Tag catalog service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{entities::tag, repositories::TagRepository};
use sea_orm::Set;

/// Tag service for business logic.
#[derive(Clone)]
pub struct TagService {
    tag_repo: TagRepository,
    id_gen: IdGenerator,
}

impl TagService {
    /// Create a new tag service.
    #[must_use]
    pub fn new(tag_repo: TagRepository) -> Self {
        Self {
            tag_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List all tags.
    pub async fn list(&self) -> AppResult<Vec<tag::Model>> {
        self.tag_repo.list().await
    }

    /// Get a tag by ID.
    pub async fn get(&self, id: &str) -> AppResult<tag::Model> {
        self.tag_repo.get_by_id(id).await
    }

    /// Create a tag. The slug defaults to a slugified name and the color
    /// to red when not given.
    pub async fn create(
        &self,
        name: &str,
        color: Option<&str>,
        slug: Option<&str>,
    ) -> AppResult<tag::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Tag name must be non-empty".to_string()));
        }
        let color = color.unwrap_or("#FF0000");
        if !is_hex_color(color) {
            return Err(AppError::Validation(format!(
                "Invalid color code: {color}"
            )));
        }

        let slug = match slug {
            Some(s) => s.trim().to_string(),
            None => slugify(name),
        };
        if slug.is_empty() {
            return Err(AppError::Validation("Tag slug must be non-empty".to_string()));
        }

        let model = tag::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            color: Set(color.to_string()),
            slug: Set(slug),
        };
        self.tag_repo.create(model).await
    }
}

/// Lowercase the name and collapse non-alphanumeric runs into hyphens.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// A `#RRGGBB` hex color code.
fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Breakfast"), "breakfast");
        assert_eq!(slugify("Quick & Easy"), "quick-easy");
        assert_eq!(slugify("  Late Dinner  "), "late-dinner");
    }

    #[test]
    fn test_is_hex_color() {
        assert!(is_hex_color("#FF0000"));
        assert!(is_hex_color("#a1b2c3"));
        assert!(!is_hex_color("FF0000"));
        assert!(!is_hex_color("#FF00"));
        assert!(!is_hex_color("#GG0000"));
    }

    #[tokio::test]
    async fn test_create_invalid_color() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = TagService::new(TagRepository::new(db));

        let result = service.create("Breakfast", Some("red"), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_defaults_slug() {
        let created = tag::Model {
            id: "t1".to_string(),
            name: "Quick Easy".to_string(),
            color: "#00FF00".to_string(),
            slug: "quick-easy".to_string(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[created]])
                .into_connection(),
        );
        let service = TagService::new(TagRepository::new(db));

        let result = service
            .create("Quick Easy", Some("#00FF00"), None)
            .await
            .unwrap();
        assert_eq!(result.slug, "quick-easy");
    }
}
