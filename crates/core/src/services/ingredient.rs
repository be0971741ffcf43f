//! Ingredient catalog service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{entities::ingredient, repositories::IngredientRepository};
use sea_orm::Set;

/// Ingredient service for business logic.
#[derive(Clone)]
pub struct IngredientService {
    ingredient_repo: IngredientRepository,
    id_gen: IdGenerator,
}

impl IngredientService {
    /// Create a new ingredient service.
    #[must_use]
    pub fn new(ingredient_repo: IngredientRepository) -> Self {
        Self {
            ingredient_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List the full catalog.
    pub async fn list(&self) -> AppResult<Vec<ingredient::Model>> {
        self.ingredient_repo.list().await
    }

    /// Get a catalog entry by ID.
    pub async fn get(&self, id: &str) -> AppResult<ingredient::Model> {
        self.ingredient_repo.get_by_id(id).await
    }

    /// Search the catalog by name.
    ///
    /// Prefix matches rank before substring matches; within each group the
    /// catalog order (name, then id) is preserved.
    pub async fn search(&self, query: &str) -> AppResult<Vec<ingredient::Model>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list().await;
        }

        let prefix = self.ingredient_repo.search_prefix(query).await?;
        let contains = self.ingredient_repo.search_contains(query).await?;

        let mut results = prefix;
        for candidate in contains {
            if !results.iter().any(|m| m.id == candidate.id) {
                results.push(candidate);
            }
        }
        Ok(results)
    }

    /// Create a catalog entry, rejecting a duplicate natural key.
    pub async fn create(&self, name: &str, measurement_unit: &str) -> AppResult<ingredient::Model> {
        let name = name.trim();
        let measurement_unit = measurement_unit.trim();
        if name.is_empty() || measurement_unit.is_empty() {
            return Err(AppError::Validation(
                "Ingredient name and measurement unit must be non-empty".to_string(),
            ));
        }

        if self
            .ingredient_repo
            .find_by_name_and_unit(name, measurement_unit)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Ingredient {name} ({measurement_unit}) already exists"
            )));
        }

        let model = ingredient::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            measurement_unit: Set(measurement_unit.to_string()),
        };
        self.ingredient_repo.create(model).await
    }

    /// Import catalog entries from CSV content, one `name,unit` pair per
    /// line. Rows already present (same name and unit) are skipped.
    ///
    /// Returns the number of entries inserted.
    pub async fn import_csv(&self, content: &str) -> AppResult<usize> {
        let mut inserted = 0;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some((name, unit)) = line.rsplit_once(',') else {
                return Err(AppError::Validation(format!(
                    "Malformed CSV row on line {}",
                    line_no + 1
                )));
            };
            let name = name.trim().trim_matches('"');
            let unit = unit.trim().trim_matches('"');
            if name.is_empty() || unit.is_empty() {
                return Err(AppError::Validation(format!(
                    "Empty name or unit on line {}",
                    line_no + 1
                )));
            }

            if self
                .ingredient_repo
                .find_by_name_and_unit(name, unit)
                .await?
                .is_some()
            {
                continue;
            }

            let model = ingredient::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(name.to_string()),
                measurement_unit: Set(unit.to_string()),
            };
            self.ingredient_repo.create(model).await?;
            inserted += 1;
        }

        tracing::info!(inserted, "Ingredient catalog import finished");
        Ok(inserted)
    }
}
