use chrono::Utc;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryNewsQueryParams, CategoryQueryParams, CategoryResponseDto, CreateCategoryDto,
    UpdateCategoryDto,
};
use crate::features::categories::models::{Category, CategoryChanges, NewCategory};
use crate::features::categories::repository::{CategoryFilter, CategoryRepository};
use crate::features::news::dtos::NewsListItemDto;
use crate::features::news::repository::{NewsFilter, NewsRepository, RecordScope};
use crate::features::news::services::news_service::{search_term, PUBLIC_DEFAULT_ORDER};
use crate::shared::constants::FALLBACK_CATEGORY_SLUG;
use crate::shared::slugs::{base_slug, unique_slug};

/// Service for category operations
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    news: Arc<dyn NewsRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, news: Arc<dyn NewsRepository>) -> Self {
        Self { categories, news }
    }

    async fn load(&self, id: i32, include_inactive: bool) -> Result<Category> {
        self.categories
            .find(id, include_inactive)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    async fn ensure_name_free(&self, name: &str, exclude_id: Option<i32>) -> Result<()> {
        if self.categories.name_exists(name, exclude_id).await? {
            return Err(AppError::Validation(format!(
                "A category named '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    /// Active categories only unless `include_inactive` (staff)
    pub async fn list(
        &self,
        params: &CategoryQueryParams,
        include_inactive: bool,
    ) -> Result<Vec<CategoryResponseDto>> {
        let filter = CategoryFilter {
            include_inactive,
            search: search_term(params.search.as_deref()),
        };
        let categories = self.categories.list(&filter).await?;
        Ok(categories.into_iter().map(CategoryResponseDto::from).collect())
    }

    pub async fn get(&self, id: i32, include_inactive: bool) -> Result<CategoryResponseDto> {
        Ok(self.load(id, include_inactive).await?.into())
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be blank".to_string()));
        }
        self.ensure_name_free(&name, None).await?;

        let repo = Arc::clone(&self.categories);
        let slug = unique_slug(&base_slug(&name, FALLBACK_CATEGORY_SLUG), move |candidate| {
            let repo = Arc::clone(&repo);
            async move { repo.slug_exists(&candidate).await }
        })
        .await?;

        let category = self
            .categories
            .insert(NewCategory {
                name,
                slug,
                description: dto.description,
                display_order: dto.display_order.unwrap_or(0),
                is_active: dto.is_active.unwrap_or(true),
            })
            .await?;

        tracing::info!("Category {} ('{}') created", category.id, category.slug);
        Ok(category.into())
    }

    /// PUT when `partial` is false (name required), PATCH otherwise
    pub async fn update(
        &self,
        id: i32,
        dto: UpdateCategoryDto,
        partial: bool,
    ) -> Result<CategoryResponseDto> {
        if !partial && dto.name.is_none() {
            return Err(AppError::Validation("name is required".to_string()));
        }

        let mut category = self.load(id, true).await?;

        let name = dto.name.map(|n| n.trim().to_string());
        if let Some(name) = name.as_deref() {
            if name.is_empty() {
                return Err(AppError::Validation("name must not be blank".to_string()));
            }
            self.ensure_name_free(name, Some(id)).await?;
        }

        category.apply_changes(
            CategoryChanges {
                name,
                description: dto.description,
                display_order: dto.display_order,
                is_active: dto.is_active,
            },
            Utc::now(),
        );

        let saved = self.categories.save(&category).await?;
        tracing::info!("Category {} updated", saved.id);
        Ok(saved.into())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        if !self.categories.delete(id).await? {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                id
            )));
        }
        tracing::info!("Category {} deleted", id);
        Ok(())
    }

    /// Publicly visible news tagged with the category
    pub async fn news(
        &self,
        id: i32,
        include_inactive: bool,
        params: &CategoryNewsQueryParams,
    ) -> Result<(Vec<NewsListItemDto>, i64)> {
        let category = self.load(id, include_inactive).await?;
        let now = Utc::now();

        let filter = NewsFilter {
            scope: RecordScope::Active,
            visible_at: Some(now),
            status: None,
            category_id: Some(category.id),
            search: None,
            ordering: PUBLIC_DEFAULT_ORDER.to_vec(),
            limit: params.limit(),
            offset: params.offset(),
        };

        let (items, total) = self.news.list(&filter).await?;
        let ids: Vec<i32> = items.iter().map(|n| n.id).collect();
        let mut categories = self.news.categories_for(&ids).await?;

        let dtos = items
            .into_iter()
            .map(|news| {
                let cats = categories.remove(&news.id).unwrap_or_default();
                NewsListItemDto::new(news, cats, now)
            })
            .collect();

        Ok((dtos, total))
    }
}
