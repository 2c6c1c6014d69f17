mod postgres;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::categories::models::{Category, NewCategory};

pub use postgres::PgCategoryRepository;

#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    pub include_inactive: bool,
    /// Case-insensitive match over name and description
    pub search: Option<String>,
}

/// Persistence boundary for categories. Listings are ordered by
/// `display_order, name`.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>>;

    async fn find(&self, id: i32, include_inactive: bool) -> Result<Option<Category>>;

    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> Result<bool>;

    /// Fails with `AppError::Conflict` when the name or slug was taken concurrently
    async fn insert(&self, category: NewCategory) -> Result<Category>;

    async fn save(&self, category: &Category) -> Result<Category>;

    /// Hard delete; join rows go with it. Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool>;

    /// The subset of `ids` naming existing, active categories
    async fn active_ids(&self, ids: &[i32]) -> Result<Vec<i32>>;
}
