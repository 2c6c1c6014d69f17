use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::categories::models::CategorySummary;
use crate::features::news::models::{News, NewsStats, NewsStatus};
use crate::shared::types::{default_page, default_page_size, page_limit, page_offset};
use crate::shared::validation::SLUG_REGEX;

// =============================================================================
// QUERY PARAMS
// =============================================================================

/// Query params for the authenticated news listing
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct NewsQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    pub status: Option<NewsStatus>,

    /// Category id
    pub category: Option<i32>,

    /// Staff only: `true` for deleted records, `false` for live ones
    pub deleted: Option<bool>,

    /// Search in title, excerpt and content
    pub search: Option<String>,

    /// Comma separated, `-` prefix for descending.
    /// Fields: `published_at`, `created_at`, `view_count`
    pub ordering: Option<String>,
}

impl NewsQueryParams {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.page_size)
    }

    pub fn limit(&self) -> i64 {
        page_limit(self.page_size)
    }
}

/// Query params for the public news listing
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct PublicNewsQueryParams {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    pub category: Option<i32>,

    pub search: Option<String>,

    /// Fields: `published_at`, `view_count`
    pub ordering: Option<String>,
}

impl PublicNewsQueryParams {
    pub fn offset(&self) -> i64 {
        page_offset(self.page, self.page_size)
    }

    pub fn limit(&self) -> i64 {
        page_limit(self.page_size)
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNewsDto {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,

    pub excerpt: Option<String>,

    pub content: Option<String>,

    #[validate(length(max = 500), url(message = "image_url must be a valid URL"))]
    pub image_url: Option<String>,

    #[validate(length(max = 500), url(message = "external_link must be a valid URL"))]
    pub external_link: Option<String>,

    /// Defaults to `draft`
    pub status: Option<NewsStatus>,

    pub published_at: Option<DateTime<Utc>>,

    /// Active category ids; replaces the category set
    pub category_ids: Option<Vec<i32>>,
}

/// Body of PUT and PATCH. PUT additionally requires `title`.
///
/// Nullable fields distinguish "absent" (left alone) from `null` (cleared).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateNewsDto {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: Option<String>,

    /// `null` or `""` re-derives the slug from the title
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub slug: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub excerpt: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub content: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 500), url(message = "image_url must be a valid URL"))]
    pub image_url: Option<Option<String>>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    #[validate(length(max = 500), url(message = "external_link must be a valid URL"))]
    pub external_link: Option<Option<String>>,

    pub status: Option<NewsStatus>,

    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub published_at: Option<Option<DateTime<Utc>>>,

    pub category_ids: Option<Vec<i32>>,
}

impl UpdateNewsDto {
    /// The explicit slug requested, if any. `Some(None)` means re-derive.
    pub fn requested_slug(&self) -> Option<Option<&str>> {
        self.slug
            .as_ref()
            .map(|slug| slug.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    }
}

pub fn validate_slug_format(slug: &str) -> bool {
    slug.len() <= crate::shared::constants::MAX_SLUG_LENGTH && SLUG_REGEX.is_match(slug)
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Row in the authenticated news listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsListItemDto {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub status: NewsStatus,
    pub view_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<CategorySummary>,
    pub created_by: Option<i32>,
    pub is_published: bool,
}

impl NewsListItemDto {
    pub fn new(news: News, categories: Vec<CategorySummary>, now: DateTime<Utc>) -> Self {
        let is_published = news.is_published_at(now);
        Self {
            id: news.id,
            title: news.title,
            slug: news.slug,
            excerpt: news.excerpt,
            image_url: news.image_url,
            status: news.status,
            view_count: news.view_count,
            published_at: news.published_at,
            created_at: news.created_at,
            categories,
            created_by: news.created_by,
            is_published,
        }
    }
}

/// Full article with audit fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsDetailDto {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub status: NewsStatus,
    pub view_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub categories: Vec<CategorySummary>,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub published_by: Option<i32>,
    pub is_published: bool,
}

impl NewsDetailDto {
    pub fn new(news: News, categories: Vec<CategorySummary>, now: DateTime<Utc>) -> Self {
        let is_published = news.is_published_at(now);
        Self {
            id: news.id,
            title: news.title,
            slug: news.slug,
            excerpt: news.excerpt,
            content: news.content,
            image_url: news.image_url,
            external_link: news.external_link,
            status: news.status,
            view_count: news.view_count,
            published_at: news.published_at,
            created_at: news.created_at,
            updated_at: news.updated_at,
            deleted_at: news.deleted_at,
            categories,
            created_by: news.created_by,
            updated_by: news.updated_by,
            published_by: news.published_by,
            is_published,
        }
    }
}

/// Article as served to the mobile app
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsPublicDto {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub view_count: i32,
    pub published_at: Option<DateTime<Utc>>,
    pub categories: Vec<CategorySummary>,
}

impl NewsPublicDto {
    pub fn new(news: News, categories: Vec<CategorySummary>) -> Self {
        Self {
            id: news.id,
            title: news.title,
            slug: news.slug,
            excerpt: news.excerpt,
            content: news.content,
            image_url: news.image_url,
            external_link: news.external_link,
            view_count: news.view_count,
            published_at: news.published_at,
            categories,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsStatsDto {
    /// Every record, soft-deleted included
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub archived: i64,
    pub deleted: i64,
    pub total_views: i64,
    /// `total - deleted`
    pub active: i64,
}

impl From<NewsStats> for NewsStatsDto {
    fn from(s: NewsStats) -> Self {
        Self {
            total: s.total,
            published: s.published,
            draft: s.draft,
            archived: s.archived,
            deleted: s.deleted,
            total_views: s.total_views,
            active: s.total - s.deleted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViewCountDto {
    pub view_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_dto_distinguishes_null_from_absent() {
        let dto: UpdateNewsDto =
            serde_json::from_value(json!({ "excerpt": null, "title": "New" })).unwrap();

        assert_eq!(dto.excerpt, Some(None));
        assert_eq!(dto.content, None);
        assert_eq!(dto.title.as_deref(), Some("New"));
    }

    #[test]
    fn test_requested_slug() {
        let absent = UpdateNewsDto::default();
        assert_eq!(absent.requested_slug(), None);

        let cleared: UpdateNewsDto = serde_json::from_value(json!({ "slug": "" })).unwrap();
        assert_eq!(cleared.requested_slug(), Some(None));

        let null: UpdateNewsDto = serde_json::from_value(json!({ "slug": null })).unwrap();
        assert_eq!(null.requested_slug(), Some(None));

        let set: UpdateNewsDto = serde_json::from_value(json!({ "slug": "my-news" })).unwrap();
        assert_eq!(set.requested_slug(), Some(Some("my-news")));
    }

    #[test]
    fn test_create_dto_validation() {
        let dto: CreateNewsDto = serde_json::from_value(json!({
            "title": "",
            "image_url": "not a url"
        }))
        .unwrap();

        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("image_url"));
    }

    #[test]
    fn test_stats_active_is_total_minus_deleted() {
        let dto = NewsStatsDto::from(NewsStats {
            total: 10,
            published: 4,
            draft: 2,
            archived: 1,
            deleted: 3,
            total_views: 120,
        });
        assert_eq!(dto.active, 7);
    }

    #[test]
    fn test_slug_format() {
        assert!(validate_slug_format("test-news-1"));
        assert!(!validate_slug_format("Test News"));
        assert!(!validate_slug_format("-leading"));
    }
}
