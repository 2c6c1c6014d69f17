use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::CategorySummary;
use crate::features::categories::repository::CategoryRepository;
use crate::features::news::dtos::news_dto::validate_slug_format;
use crate::features::news::dtos::{
    CreateNewsDto, NewsDetailDto, NewsListItemDto, NewsPublicDto, NewsQueryParams, NewsStatsDto,
    PublicNewsQueryParams, UpdateNewsDto,
};
use crate::features::news::models::{NewNews, News, NewsChanges, NewsStatus, PublishOutcome};
use crate::features::news::repository::{
    NewsFilter, NewsOrderField, NewsOrdering, NewsRepository, RecordScope,
};
use crate::shared::constants::{FALLBACK_NEWS_SLUG, SLUG_INSERT_ATTEMPTS};
use crate::shared::slugs::{base_slug, unique_slug};

const STAFF_ORDER_FIELDS: &[NewsOrderField] = &[
    NewsOrderField::PublishedAt,
    NewsOrderField::CreatedAt,
    NewsOrderField::ViewCount,
];
const STAFF_DEFAULT_ORDER: &[NewsOrdering] = &[
    NewsOrdering::desc(NewsOrderField::PublishedAt),
    NewsOrdering::desc(NewsOrderField::CreatedAt),
];

const PUBLIC_ORDER_FIELDS: &[NewsOrderField] =
    &[NewsOrderField::PublishedAt, NewsOrderField::ViewCount];
pub(crate) const PUBLIC_DEFAULT_ORDER: &[NewsOrdering] =
    &[NewsOrdering::desc(NewsOrderField::PublishedAt)];

/// Blank search terms are treated as absent
pub(crate) fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Soft-delete scope for reads made by `user`. Only staff see deleted rows.
fn read_scope(user: &AuthenticatedUser, deleted: Option<bool>) -> RecordScope {
    if !user.has_staff_access() {
        return RecordScope::Active;
    }
    match deleted {
        Some(true) => RecordScope::DeletedOnly,
        Some(false) => RecordScope::Active,
        None => RecordScope::All,
    }
}

/// Service for news articles and their publication lifecycle
pub struct NewsService {
    news: Arc<dyn NewsRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl NewsService {
    pub fn new(news: Arc<dyn NewsRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { news, categories }
    }

    async fn load(&self, id: i32, include_deleted: bool) -> Result<News> {
        self.news
            .find(id, include_deleted)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("News with id {} not found", id)))
    }

    async fn category_map(&self, items: &[News]) -> Result<HashMap<i32, Vec<CategorySummary>>> {
        let ids: Vec<i32> = items.iter().map(|n| n.id).collect();
        self.news.categories_for(&ids).await
    }

    async fn detail(&self, news: News, now: DateTime<Utc>) -> Result<NewsDetailDto> {
        let categories = self
            .news
            .categories_for(&[news.id])
            .await?
            .remove(&news.id)
            .unwrap_or_default();
        Ok(NewsDetailDto::new(news, categories, now))
    }

    /// Deduplicate and check that every id names an active category
    async fn resolve_categories(&self, ids: Option<Vec<i32>>) -> Result<Option<Vec<i32>>> {
        let Some(mut ids) = ids else {
            return Ok(None);
        };
        ids.sort_unstable();
        ids.dedup();

        let active = self.categories.active_ids(&ids).await?;
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !active.contains(id))
            .map(|id| id.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Invalid category ids: {}",
                missing.join(", ")
            )));
        }
        Ok(Some(ids))
    }

    async fn free_slug(&self, base: &str, exclude_id: Option<i32>) -> Result<String> {
        let repo = Arc::clone(&self.news);
        unique_slug(base, move |candidate| {
            let repo = Arc::clone(&repo);
            async move { repo.slug_exists(&candidate, exclude_id).await }
        })
        .await
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        params: &NewsQueryParams,
    ) -> Result<(Vec<NewsListItemDto>, i64)> {
        let filter = NewsFilter {
            scope: read_scope(user, params.deleted),
            visible_at: None,
            status: params.status,
            category_id: params.category,
            search: search_term(params.search.as_deref()),
            ordering: NewsOrdering::parse_list(
                params.ordering.as_deref(),
                STAFF_ORDER_FIELDS,
                STAFF_DEFAULT_ORDER,
            ),
            limit: params.limit(),
            offset: params.offset(),
        };

        let (items, total) = self.news.list(&filter).await?;
        let mut categories = self.category_map(&items).await?;
        let now = Utc::now();

        let dtos = items
            .into_iter()
            .map(|news| {
                let cats = categories.remove(&news.id).unwrap_or_default();
                NewsListItemDto::new(news, cats, now)
            })
            .collect();

        Ok((dtos, total))
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: i32) -> Result<NewsDetailDto> {
        let news = self.load(id, user.has_staff_access()).await?;
        self.detail(news, Utc::now()).await
    }

    pub async fn create(&self, user: &AuthenticatedUser, dto: CreateNewsDto) -> Result<NewsDetailDto> {
        if dto.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be blank".to_string()));
        }
        let status = dto.status.unwrap_or(NewsStatus::Draft).ensure_writable()?;
        let category_ids = self.resolve_categories(dto.category_ids).await?;

        let base = base_slug(&dto.title, FALLBACK_NEWS_SLUG);
        let now = Utc::now();

        let mut created = None;
        for attempt in 1..=SLUG_INSERT_ATTEMPTS {
            let slug = self.free_slug(&base, None).await?;
            let new = NewNews {
                title: dto.title.clone(),
                slug,
                excerpt: dto.excerpt.clone(),
                content: dto.content.clone(),
                image_url: dto.image_url.clone(),
                external_link: dto.external_link.clone(),
                status,
                published_at: dto.published_at,
                created_by: user.user_id,
                published_by: None,
                created_at: now,
            }
            .stamp_publication(now);

            match self.news.insert(new, category_ids.as_deref()).await {
                Ok(news) => {
                    created = Some(news);
                    break;
                }
                Err(AppError::Conflict(_)) => {
                    tracing::warn!(
                        "Slug for '{}' taken concurrently (attempt {}/{})",
                        base,
                        attempt,
                        SLUG_INSERT_ATTEMPTS
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let news = created.ok_or_else(|| {
            AppError::Conflict("Could not allocate a unique slug, please retry".to_string())
        })?;

        tracing::info!(
            "News {} ('{}') created by user {} as {}",
            news.id,
            news.slug,
            user.user_id,
            news.status
        );
        self.detail(news, now).await
    }

    /// PUT when `partial` is false (title required), PATCH otherwise
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        dto: UpdateNewsDto,
        partial: bool,
    ) -> Result<NewsDetailDto> {
        if !partial && dto.title.is_none() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        if dto.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::Validation("title must not be blank".to_string()));
        }

        let mut news = self.load(id, true).await?;
        let status = dto.status.map(NewsStatus::ensure_writable).transpose()?;

        let slug = match dto.requested_slug() {
            None => None,
            Some(None) => {
                let title = dto.title.as_deref().unwrap_or(&news.title);
                let base = base_slug(title, FALLBACK_NEWS_SLUG);
                Some(self.free_slug(&base, Some(id)).await?)
            }
            Some(Some(requested)) => {
                if !validate_slug_format(requested) {
                    return Err(AppError::Validation(
                        "slug must be lowercase letters and digits separated by single hyphens"
                            .to_string(),
                    ));
                }
                if self.news.slug_exists(requested, Some(id)).await? {
                    return Err(AppError::Conflict(format!(
                        "Slug '{}' is already in use",
                        requested
                    )));
                }
                Some(requested.to_string())
            }
        };

        let category_ids = self.resolve_categories(dto.category_ids).await?;

        let changes = NewsChanges {
            title: dto.title,
            slug,
            excerpt: dto.excerpt,
            content: dto.content,
            image_url: dto.image_url,
            external_link: dto.external_link,
            status,
            published_at: dto.published_at,
        };

        let now = Utc::now();
        news.apply_changes(changes, user.user_id, now);
        let saved = self.news.save(&news, category_ids.as_deref()).await?;

        tracing::info!("News {} updated by user {}", saved.id, user.user_id);
        self.detail(saved, now).await
    }

    pub async fn soft_delete(&self, user: &AuthenticatedUser, id: i32) -> Result<()> {
        let mut news = self.load(id, true).await?;
        news.soft_delete(user.user_id, Utc::now());
        self.news.save(&news, None).await?;

        tracing::info!("News {} soft-deleted by user {}", id, user.user_id);
        Ok(())
    }

    pub async fn restore(&self, user: &AuthenticatedUser, id: i32) -> Result<NewsDetailDto> {
        let mut news = self.load(id, true).await?;
        let now = Utc::now();
        news.restore(now)?;
        let saved = self.news.save(&news, None).await?;

        tracing::info!("News {} restored by user {}", id, user.user_id);
        self.detail(saved, now).await
    }

    pub async fn publish(
        &self,
        user: &AuthenticatedUser,
        id: i32,
    ) -> Result<(NewsDetailDto, PublishOutcome)> {
        let mut news = self.load(id, true).await?;
        let now = Utc::now();

        let outcome = news.publish(user.user_id, now)?;
        let news = match outcome {
            PublishOutcome::AlreadyPublished => news,
            PublishOutcome::Published => {
                let saved = self.news.save(&news, None).await?;
                tracing::info!("News {} published by user {}", id, user.user_id);
                saved
            }
        };

        Ok((self.detail(news, now).await?, outcome))
    }

    /// Count one view of a publicly visible article
    pub async fn increment_views(&self, id: i32) -> Result<i32> {
        self.news
            .increment_views(id, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("News not available".to_string()))
    }

    pub async fn stats(&self) -> Result<NewsStatsDto> {
        Ok(self.news.stats().await?.into())
    }

    pub async fn public_list(
        &self,
        params: &PublicNewsQueryParams,
    ) -> Result<(Vec<NewsPublicDto>, i64)> {
        let now = Utc::now();
        let filter = NewsFilter {
            scope: RecordScope::Active,
            visible_at: Some(now),
            status: None,
            category_id: params.category,
            search: search_term(params.search.as_deref()),
            ordering: NewsOrdering::parse_list(
                params.ordering.as_deref(),
                PUBLIC_ORDER_FIELDS,
                PUBLIC_DEFAULT_ORDER,
            ),
            limit: params.limit(),
            offset: params.offset(),
        };

        let (items, total) = self.news.list(&filter).await?;
        let mut categories = self.category_map(&items).await?;

        let dtos = items
            .into_iter()
            .map(|news| {
                let cats = categories.remove(&news.id).unwrap_or_default();
                NewsPublicDto::new(news, cats)
            })
            .collect();

        Ok((dtos, total))
    }

    pub async fn public_get(&self, id: i32) -> Result<NewsPublicDto> {
        let news = self
            .news
            .find(id, false)
            .await?
            .filter(|n| n.is_published_at(Utc::now()))
            .ok_or_else(|| AppError::NotFound(format!("News with id {} not found", id)))?;

        let categories = self
            .news
            .categories_for(&[news.id])
            .await?
            .remove(&news.id)
            .unwrap_or_default();
        Ok(NewsPublicDto::new(news, categories))
    }
}
