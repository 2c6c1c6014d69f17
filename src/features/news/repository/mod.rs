//! Persistence boundary for news articles.
//!
//! Every read states whether soft-deleted rows may be returned, so they only
//! ever come back when the caller asked for them.

mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::core::error::Result;
use crate::features::categories::models::CategorySummary;
use crate::features::news::models::{NewNews, News, NewsStats, NewsStatus};

pub use postgres::PgNewsRepository;

/// Which rows a query may see with respect to soft deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    /// `deleted_at IS NULL`
    Active,
    All,
    /// `deleted_at IS NOT NULL`
    DeletedOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsOrderField {
    PublishedAt,
    CreatedAt,
    ViewCount,
}

impl NewsOrderField {
    pub fn column(self) -> &'static str {
        match self {
            NewsOrderField::PublishedAt => "published_at",
            NewsOrderField::CreatedAt => "created_at",
            NewsOrderField::ViewCount => "view_count",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "published_at" => Some(NewsOrderField::PublishedAt),
            "created_at" => Some(NewsOrderField::CreatedAt),
            "view_count" => Some(NewsOrderField::ViewCount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsOrdering {
    pub field: NewsOrderField,
    pub descending: bool,
}

impl NewsOrdering {
    pub const fn desc(field: NewsOrderField) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    /// Parse `-published_at,view_count` style lists. Fields outside `allowed`
    /// are ignored; when nothing usable remains `default` is returned.
    pub fn parse_list(
        raw: Option<&str>,
        allowed: &[NewsOrderField],
        default: &[NewsOrdering],
    ) -> Vec<NewsOrdering> {
        let parsed: Vec<NewsOrdering> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter_map(|term| {
                let (descending, name) = match term.strip_prefix('-') {
                    Some(name) => (true, name),
                    None => (false, term),
                };
                NewsOrderField::parse(name)
                    .filter(|field| allowed.contains(field))
                    .map(|field| NewsOrdering { field, descending })
            })
            .collect();

        if parsed.is_empty() {
            default.to_vec()
        } else {
            parsed
        }
    }
}

/// Query for news listings. Results are always tie-broken by `id DESC`.
#[derive(Debug, Clone)]
pub struct NewsFilter {
    pub scope: RecordScope,
    /// Only rows publicly visible at this instant
    pub visible_at: Option<DateTime<Utc>>,
    pub status: Option<NewsStatus>,
    pub category_id: Option<i32>,
    /// Case-insensitive match over title, excerpt and content
    pub search: Option<String>,
    pub ordering: Vec<NewsOrdering>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Whether any row, soft-deleted included, uses `slug`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> Result<bool>;

    /// Insert the row and, when given, its category links in one transaction.
    /// Fails with `AppError::Conflict` when the slug was taken concurrently.
    async fn insert(&self, news: NewNews, category_ids: Option<&[i32]>) -> Result<News>;

    /// Soft-deleted rows are only found when `include_deleted` is set
    async fn find(&self, id: i32, include_deleted: bool) -> Result<Option<News>>;

    /// Returns one page plus the total number of matching rows
    async fn list(&self, filter: &NewsFilter) -> Result<(Vec<News>, i64)>;

    /// Persist every mutable column of `news`. When `category_ids` is given the
    /// category set is replaced in the same transaction.
    async fn save(&self, news: &News, category_ids: Option<&[i32]>) -> Result<News>;

    /// Atomically bump the counter of a publicly visible article.
    /// `None` when the article is missing, deleted or not visible.
    async fn increment_views(&self, id: i32, now: DateTime<Utc>) -> Result<Option<i32>>;

    async fn categories_for(&self, news_ids: &[i32])
        -> Result<HashMap<i32, Vec<CategorySummary>>>;

    async fn stats(&self) -> Result<NewsStats>;
}
