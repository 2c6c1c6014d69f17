use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use utoipa::ToSchema;

use crate::core::error::AppError;

/// Publication status matching the `news_status` database enum.
///
/// `Scheduled` exists in the database type but is reserved: rows may carry it,
/// the API never accepts it as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "news_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    Draft,
    Scheduled,
    Published,
    Archived,
}

impl std::fmt::Display for NewsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NewsStatus::Draft => write!(f, "draft"),
            NewsStatus::Scheduled => write!(f, "scheduled"),
            NewsStatus::Published => write!(f, "published"),
            NewsStatus::Archived => write!(f, "archived"),
        }
    }
}

impl NewsStatus {
    /// Reject the reserved status on input
    pub fn ensure_writable(self) -> Result<Self, AppError> {
        match self {
            NewsStatus::Scheduled => Err(AppError::Validation(
                "status 'scheduled' is not supported; use draft, published or archived"
                    .to_string(),
            )),
            other => Ok(other),
        }
    }
}

/// Database model for a news article
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct News {
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
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub published_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Data for inserting a news article; the slug is already resolved
#[derive(Debug, Clone)]
pub struct NewNews {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub status: NewsStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: i32,
    pub published_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl NewNews {
    /// Fill in the publication stamps for a record created directly as published
    pub fn stamp_publication(mut self, now: DateTime<Utc>) -> Self {
        if self.status == NewsStatus::Published {
            self.published_at.get_or_insert(now);
            self.published_by = Some(self.created_by);
        }
        self
    }
}

/// Fields an update may touch. `None` leaves the field alone; for nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct NewsChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub content: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub external_link: Option<Option<String>>,
    pub status: Option<NewsStatus>,
    pub published_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    AlreadyPublished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Cannot publish a deleted news article")]
    PublishDeleted,

    #[error("Cannot archive a deleted news article")]
    ArchiveDeleted,

    #[error("News article is not deleted")]
    NotDeleted,
}

impl From<LifecycleError> for AppError {
    fn from(e: LifecycleError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl News {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Published, with a publication date that has already passed
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.status == NewsStatus::Published && self.published_at.is_some_and(|at| at <= now)
    }

    pub fn publish(&mut self, actor: i32, now: DateTime<Utc>) -> Result<PublishOutcome, LifecycleError> {
        if self.is_deleted() {
            return Err(LifecycleError::PublishDeleted);
        }
        if self.status == NewsStatus::Published {
            return Ok(PublishOutcome::AlreadyPublished);
        }

        self.status = NewsStatus::Published;
        self.published_at.get_or_insert(now);
        self.published_by.get_or_insert(actor);
        self.updated_by = Some(actor);
        self.updated_at = now;
        Ok(PublishOutcome::Published)
    }

    /// Repeating a soft delete re-stamps `deleted_at`
    pub fn soft_delete(&mut self, actor: i32, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_by = Some(actor);
        self.updated_at = now;
    }

    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if !self.is_deleted() {
            return Err(LifecycleError::NotDeleted);
        }
        self.deleted_at = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn archive(&mut self, actor: i32, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if self.is_deleted() {
            return Err(LifecycleError::ArchiveDeleted);
        }
        self.status = NewsStatus::Archived;
        self.updated_by = Some(actor);
        self.updated_at = now;
        Ok(())
    }

    pub fn apply_changes(&mut self, changes: NewsChanges, actor: i32, now: DateTime<Utc>) {
        let was_published = self.status == NewsStatus::Published;

        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(slug) = changes.slug {
            self.slug = slug;
        }
        if let Some(excerpt) = changes.excerpt {
            self.excerpt = excerpt;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(image_url) = changes.image_url {
            self.image_url = image_url;
        }
        if let Some(external_link) = changes.external_link {
            self.external_link = external_link;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(published_at) = changes.published_at {
            self.published_at = published_at;
        }

        if !was_published && self.status == NewsStatus::Published {
            self.published_at.get_or_insert(now);
            self.published_by.get_or_insert(actor);
        }

        self.updated_by = Some(actor);
        self.updated_at = now;
    }
}

/// Aggregate counters for the staff dashboard
#[derive(Debug, Clone, Default, FromRow, PartialEq, Eq)]
pub struct NewsStats {
    pub total: i64,
    pub published: i64,
    pub draft: i64,
    pub archived: i64,
    pub deleted: i64,
    pub total_views: i64,
}
