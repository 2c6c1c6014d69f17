//! In-memory stand-ins for the repositories and object storage, plus helpers
//! that inject an authenticated user into a router.

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::models::{Category, CategorySummary, NewCategory};
use crate::features::categories::repository::{CategoryFilter, CategoryRepository};
use crate::features::news::models::{NewNews, News, NewsStats, NewsStatus};
use crate::features::news::repository::{
    NewsFilter, NewsOrderField, NewsRepository, RecordScope,
};
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::{FALLBACK_CATEGORY_SLUG, FALLBACK_NEWS_SLUG};
use crate::shared::slugs::base_slug;

pub fn staff_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: 1,
        sub: "1".to_string(),
        is_staff: true,
        roles: vec![],
    }
}

pub fn regular_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: 2,
        sub: "2".to_string(),
        is_staff: false,
        roles: vec![],
    }
}

/// Wrap `router` so every request arrives authenticated as `user`
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

#[derive(Default)]
struct Tables {
    news: Vec<News>,
    categories: Vec<Category>,
    /// (news_id, category_id)
    tags: Vec<(i32, i32)>,
    next_news_id: i32,
    next_category_id: i32,
}

impl Tables {
    fn news_slug_taken(&self, slug: &str, exclude_id: Option<i32>) -> bool {
        self.news
            .iter()
            .any(|n| n.slug == slug && Some(n.id) != exclude_id)
    }

    fn free_news_slug(&self, title: &str) -> String {
        let base = base_slug(title, FALLBACK_NEWS_SLUG);
        let mut slug = base.clone();
        let mut counter = 1;
        while self.news_slug_taken(&slug, None) {
            slug = format!("{}-{}", base, counter);
            counter += 1;
        }
        slug
    }

    fn insert_news(&mut self, news: NewNews) -> Result<News> {
        if self.news_slug_taken(&news.slug, None) {
            return Err(AppError::Conflict("Slug already in use".to_string()));
        }
        self.next_news_id += 1;
        let row = News {
            id: self.next_news_id,
            title: news.title,
            slug: news.slug,
            excerpt: news.excerpt,
            content: news.content,
            image_url: news.image_url,
            external_link: news.external_link,
            status: news.status,
            view_count: 0,
            published_at: news.published_at,
            created_by: Some(news.created_by),
            updated_by: None,
            published_by: news.published_by,
            created_at: news.created_at,
            updated_at: news.created_at,
            deleted_at: None,
        };
        self.news.push(row.clone());
        Ok(row)
    }

    fn replace_tags(&mut self, news_id: i32, category_ids: &[i32]) {
        self.tags.retain(|(n, _)| *n != news_id);
        for &category_id in category_ids {
            if !self.tags.contains(&(news_id, category_id)) {
                self.tags.push((news_id, category_id));
            }
        }
    }

    fn insert_category(&mut self, category: NewCategory) -> Result<Category> {
        if self
            .categories
            .iter()
            .any(|c| c.name == category.name || c.slug == category.slug)
        {
            return Err(AppError::Conflict(
                "Category name or slug already in use".to_string(),
            ));
        }
        self.next_category_id += 1;
        let now = Utc::now();
        let row = Category {
            id: self.next_category_id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            display_order: category.display_order,
            is_active: category.is_active,
            created_at: now,
            updated_at: now,
        };
        self.categories.push(row.clone());
        Ok(row)
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

fn in_scope(scope: RecordScope, news: &News) -> bool {
    match scope {
        RecordScope::Active => !news.is_deleted(),
        RecordScope::All => true,
        RecordScope::DeletedOnly => news.is_deleted(),
    }
}

fn order_key(news: &News, field: NewsOrderField) -> Option<i64> {
    match field {
        NewsOrderField::PublishedAt => news.published_at.map(|at| at.timestamp_micros()),
        NewsOrderField::CreatedAt => Some(news.created_at.timestamp_micros()),
        NewsOrderField::ViewCount => Some(i64::from(news.view_count)),
    }
}

/// Same ordering as the SQL: each key with NULLS LAST, then `id DESC`
fn compare_news(a: &News, b: &News, filter: &NewsFilter) -> Ordering {
    for ordering in &filter.ordering {
        let by_key = match (order_key(a, ordering.field), order_key(b, ordering.field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) if ordering.descending => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
        };
        if by_key != Ordering::Equal {
            return by_key;
        }
    }
    b.id.cmp(&a.id)
}

/// Both repositories over one set of in-memory tables
#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
    hide_slug_check: AtomicBool,
    fail_category_write: AtomicBool,
}

impl InMemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next `slug_exists` answer `false`, as if another writer
    /// claimed the slug between the check and the insert
    pub fn hide_next_slug_check(&self) {
        self.hide_slug_check.store(true, AtomicOrdering::SeqCst);
    }

    /// Make the next write that carries category links fail, as a database
    /// error inside the transaction would. Nothing from that write is kept.
    pub fn fail_next_category_write(&self) {
        self.fail_category_write.store(true, AtomicOrdering::SeqCst);
    }

    fn category_write_fails(&self, category_ids: Option<&[i32]>) -> Result<()> {
        if category_ids.is_some() && self.fail_category_write.swap(false, AtomicOrdering::SeqCst) {
            return Err(AppError::Internal("category write failed".to_string()));
        }
        Ok(())
    }

    pub async fn add_category(&self, name: &str, active: bool) -> Category {
        let mut tables = self.tables.lock().await;
        let slug = base_slug(name, FALLBACK_CATEGORY_SLUG);
        tables
            .insert_category(NewCategory {
                name: name.to_string(),
                slug,
                description: None,
                display_order: 0,
                is_active: active,
            })
            .unwrap()
    }

    /// A draft, or an article published an hour ago
    pub async fn add_news(&self, title: &str, published: bool) -> News {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let slug = tables.free_news_slug(title);
        tables
            .insert_news(NewNews {
                title: title.to_string(),
                slug,
                excerpt: None,
                content: None,
                image_url: None,
                external_link: None,
                status: if published {
                    NewsStatus::Published
                } else {
                    NewsStatus::Draft
                },
                published_at: published.then(|| now - Duration::hours(1)),
                created_by: 1,
                published_by: published.then_some(1),
                created_at: now,
            })
            .unwrap()
    }

    pub async fn get_news(&self, id: i32) -> Option<News> {
        let tables = self.tables.lock().await;
        tables.news.iter().find(|n| n.id == id).cloned()
    }

    pub async fn update_news<F>(&self, id: i32, change: F)
    where
        F: FnOnce(&mut News),
    {
        let mut tables = self.tables.lock().await;
        if let Some(news) = tables.news.iter_mut().find(|n| n.id == id) {
            change(news);
        }
    }

    pub async fn tag(&self, news_id: i32, category_id: i32) {
        let mut tables = self.tables.lock().await;
        if !tables.tags.contains(&(news_id, category_id)) {
            tables.tags.push((news_id, category_id));
        }
    }
}

#[async_trait]
impl NewsRepository for InMemoryDb {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> Result<bool> {
        if self.hide_slug_check.swap(false, AtomicOrdering::SeqCst) {
            return Ok(false);
        }
        Ok(self.tables.lock().await.news_slug_taken(slug, exclude_id))
    }

    async fn insert(&self, news: NewNews, category_ids: Option<&[i32]>) -> Result<News> {
        let mut tables = self.tables.lock().await;
        self.category_write_fails(category_ids)?;
        let row = tables.insert_news(news)?;
        if let Some(ids) = category_ids {
            tables.replace_tags(row.id, ids);
        }
        Ok(row)
    }

    async fn find(&self, id: i32, include_deleted: bool) -> Result<Option<News>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .news
            .iter()
            .find(|n| n.id == id && (include_deleted || !n.is_deleted()))
            .cloned())
    }

    async fn list(&self, filter: &NewsFilter) -> Result<(Vec<News>, i64)> {
        let tables = self.tables.lock().await;
        let search = filter.search.as_deref().map(str::to_lowercase);

        let mut rows: Vec<News> = tables
            .news
            .iter()
            .filter(|n| in_scope(filter.scope, n))
            .filter(|n| filter.visible_at.is_none_or(|at| n.is_published_at(at)))
            .filter(|n| filter.status.is_none_or(|s| n.status == s))
            .filter(|n| {
                filter
                    .category_id
                    .is_none_or(|c| tables.tags.contains(&(n.id, c)))
            })
            .filter(|n| {
                search.as_deref().is_none_or(|s| {
                    n.title.to_lowercase().contains(s)
                        || contains_ci(n.excerpt.as_deref(), s)
                        || contains_ci(n.content.as_deref(), s)
                })
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| compare_news(a, b, filter));
        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn save(&self, news: &News, category_ids: Option<&[i32]>) -> Result<News> {
        let mut tables = self.tables.lock().await;
        if tables.news_slug_taken(&news.slug, Some(news.id)) {
            return Err(AppError::Conflict("Slug already in use".to_string()));
        }
        self.category_write_fails(category_ids)?;

        let row = tables
            .news
            .iter_mut()
            .find(|n| n.id == news.id)
            .ok_or_else(|| AppError::NotFound(format!("News with id {} not found", news.id)))?;
        *row = news.clone();
        let saved = row.clone();
        if let Some(ids) = category_ids {
            tables.replace_tags(saved.id, ids);
        }
        Ok(saved)
    }

    async fn increment_views(&self, id: i32, now: DateTime<Utc>) -> Result<Option<i32>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .news
            .iter_mut()
            .find(|n| n.id == id && !n.is_deleted() && n.is_published_at(now))
            .map(|n| {
                n.view_count += 1;
                n.view_count
            }))
    }

    async fn categories_for(
        &self,
        news_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<CategorySummary>>> {
        let tables = self.tables.lock().await;
        let mut categories: Vec<&Category> = tables.categories.iter().collect();
        categories.sort_by(|a, b| (a.display_order, &a.name).cmp(&(b.display_order, &b.name)));

        let mut map: HashMap<i32, Vec<CategorySummary>> = HashMap::new();
        for &news_id in news_ids {
            for category in &categories {
                if tables.tags.contains(&(news_id, category.id)) {
                    map.entry(news_id).or_default().push(CategorySummary::from(*category));
                }
            }
        }
        Ok(map)
    }

    async fn stats(&self) -> Result<NewsStats> {
        let tables = self.tables.lock().await;
        let live = || tables.news.iter().filter(|n| !n.is_deleted());
        let count_status = |status: NewsStatus| live().filter(|n| n.status == status).count() as i64;

        Ok(NewsStats {
            total: tables.news.len() as i64,
            published: count_status(NewsStatus::Published),
            draft: count_status(NewsStatus::Draft),
            archived: count_status(NewsStatus::Archived),
            deleted: tables.news.iter().filter(|n| n.is_deleted()).count() as i64,
            total_views: live().map(|n| i64::from(n.view_count)).sum(),
        })
    }
}

#[async_trait]
impl CategoryRepository for InMemoryDb {
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Category>> {
        let tables = self.tables.lock().await;
        let search = filter.search.as_deref().map(str::to_lowercase);

        let mut rows: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| filter.include_inactive || c.is_active)
            .filter(|c| {
                search.as_deref().is_none_or(|s| {
                    c.name.to_lowercase().contains(s) || contains_ci(c.description.as_deref(), s)
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.display_order, &a.name).cmp(&(b.display_order, &b.name)));
        Ok(rows)
    }

    async fn find(&self, id: i32, include_inactive: bool) -> Result<Option<Category>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id && (include_inactive || c.is_active))
            .cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.iter().any(|c| c.slug == slug))
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i32>) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .iter()
            .any(|c| c.name == name && Some(c.id) != exclude_id))
    }

    async fn insert(&self, category: NewCategory) -> Result<Category> {
        self.tables.lock().await.insert_category(category)
    }

    async fn save(&self, category: &Category) -> Result<Category> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Category with id {} not found", category.id))
            })?;
        *row = category.clone();
        Ok(row.clone())
    }

    async fn delete(&self, id: i32) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        tables.tags.retain(|(_, c)| *c != id);
        Ok(tables.categories.len() < before)
    }

    async fn active_ids(&self, ids: &[i32]) -> Result<Vec<i32>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .categories
            .iter()
            .filter(|c| c.is_active && ids.contains(&c.id))
            .map(|c| c.id)
            .collect())
    }
}

/// Object storage that keeps uploads in memory
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put_public(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<String> {
        self.objects
            .lock()
            .await
            .insert(path.to_string(), (data, content_type.to_string()));
        Ok(format!("http://storage.test/public/{}", path))
    }
}
