use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{CategoryFilter, CategoryRepository};
use crate::core::database::like_pattern;
use crate::core::error::{AppError, Result};
use crate::features::categories::models::{Category, NewCategory};

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, display_order, is_active, created_at, updated_at";

const CATEGORY_TAKEN: &str = "A category with this name or slug already exists";

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM categories WHERE TRUE", CATEGORY_COLUMNS));

        if !filter.include_inactive {
            qb.push(" AND is_active = TRUE");
        }
        if let Some(search) = filter.search.as_deref() {
            let pattern = like_pattern(search);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY display_order, name");

        qb.build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find(&self, id: i32, include_inactive: bool) -> Result<Option<Category>> {
        let query = format!(
            "SELECT {} FROM categories WHERE id = $1 AND ($2 OR is_active = TRUE)",
            CATEGORY_COLUMNS
        );

        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(include_inactive)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND ($2::INT4 IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, category: NewCategory) -> Result<Category> {
        let query = format!(
            r#"
            INSERT INTO categories (name, slug, description, display_order, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(category.display_order)
            .bind(category.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, CATEGORY_TAKEN))
    }

    async fn save(&self, category: &Category) -> Result<Category> {
        let query = format!(
            r#"
            UPDATE categories
            SET name = $2, description = $3, display_order = $4, is_active = $5, updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        sqlx::query_as::<_, Category>(&query)
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.display_order)
            .bind(category.is_active)
            .bind(category.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, CATEGORY_TAKEN))?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", category.id)))
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn active_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM categories WHERE id = ANY($1) AND is_active = TRUE",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(found)
    }
}
