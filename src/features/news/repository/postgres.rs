use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use super::{NewsFilter, NewsRepository, RecordScope};
use crate::core::database::like_pattern;
use crate::core::error::{AppError, Result};
use crate::features::categories::models::CategorySummary;
use crate::features::news::models::{NewNews, News, NewsStats};

const NEWS_COLUMNS: &str = "id, title, slug, excerpt, content, image_url, external_link, \
     status, view_count, published_at, created_by, updated_by, published_by, \
     created_at, updated_at, deleted_at";

const SLUG_TAKEN: &str = "A news article with this slug already exists";

pub struct PgNewsRepository {
    pool: PgPool,
}

impl PgNewsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NewsCategoryRow {
    news_id: i32,
    #[sqlx(flatten)]
    category: CategorySummary,
}

fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, filter: &'a NewsFilter) {
    qb.push(" WHERE TRUE");

    match filter.scope {
        RecordScope::Active => {
            qb.push(" AND deleted_at IS NULL");
        }
        RecordScope::DeletedOnly => {
            qb.push(" AND deleted_at IS NOT NULL");
        }
        RecordScope::All => {}
    }

    if let Some(now) = filter.visible_at {
        qb.push(" AND status = 'published' AND published_at IS NOT NULL AND published_at <= ")
            .push_bind(now);
    }

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }

    if let Some(category_id) = filter.category_id {
        qb.push(
            " AND EXISTS (SELECT 1 FROM news_categories nc \
             WHERE nc.news_id = news.id AND nc.category_id = ",
        )
        .push_bind(category_id)
        .push(")");
    }

    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR excerpt ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR content ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_ordering(qb: &mut QueryBuilder<'_, Postgres>, filter: &NewsFilter) {
    qb.push(" ORDER BY ");
    for ordering in &filter.ordering {
        qb.push(ordering.field.column());
        qb.push(if ordering.descending {
            " DESC NULLS LAST, "
        } else {
            " ASC NULLS LAST, "
        });
    }
    qb.push("id DESC");
}

async fn replace_categories(
    conn: &mut PgConnection,
    news_id: i32,
    category_ids: &[i32],
) -> Result<()> {
    sqlx::query("DELETE FROM news_categories WHERE news_id = $1")
        .bind(news_id)
        .execute(&mut *conn)
        .await?;

    if !category_ids.is_empty() {
        sqlx::query(
            r#"
            INSERT INTO news_categories (news_id, category_id)
            SELECT $1, UNNEST($2::INT4[])
            ON CONFLICT (news_id, category_id) DO NOTHING
            "#,
        )
        .bind(news_id)
        .bind(category_ids)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl NewsRepository for PgNewsRepository {
    async fn slug_exists(&self, slug: &str, exclude_id: Option<i32>) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM news WHERE slug = $1 AND ($2::INT4 IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, news: NewNews, category_ids: Option<&[i32]>) -> Result<News> {
        let query = format!(
            r#"
            INSERT INTO news (title, slug, excerpt, content, image_url, external_link,
                              status, published_at, created_by, published_by,
                              created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING {}
            "#,
            NEWS_COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        let created = sqlx::query_as::<_, News>(&query)
            .bind(&news.title)
            .bind(&news.slug)
            .bind(&news.excerpt)
            .bind(&news.content)
            .bind(&news.image_url)
            .bind(&news.external_link)
            .bind(news.status)
            .bind(news.published_at)
            .bind(news.created_by)
            .bind(news.published_by)
            .bind(news.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::from_unique_violation(e, SLUG_TAKEN))?;

        if let Some(ids) = category_ids {
            replace_categories(&mut tx, created.id, ids).await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn find(&self, id: i32, include_deleted: bool) -> Result<Option<News>> {
        let query = format!(
            "SELECT {} FROM news WHERE id = $1 AND ($2 OR deleted_at IS NULL)",
            NEWS_COLUMNS
        );

        let news = sqlx::query_as::<_, News>(&query)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?;

        Ok(news)
    }

    async fn list(&self, filter: &NewsFilter) -> Result<(Vec<News>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM news");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count news: {:?}", e);
                AppError::Database(e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM news", NEWS_COLUMNS));
        push_filters(&mut select, filter);
        push_ordering(&mut select, filter);
        select
            .push(" LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let items = select
            .build_query_as::<News>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list news: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((items, total))
    }

    async fn save(&self, news: &News, category_ids: Option<&[i32]>) -> Result<News> {
        let query = format!(
            r#"
            UPDATE news
            SET title = $2, slug = $3, excerpt = $4, content = $5, image_url = $6,
                external_link = $7, status = $8, published_at = $9, updated_by = $10,
                published_by = $11, updated_at = $12, deleted_at = $13
            WHERE id = $1
            RETURNING {}
            "#,
            NEWS_COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        let saved = sqlx::query_as::<_, News>(&query)
            .bind(news.id)
            .bind(&news.title)
            .bind(&news.slug)
            .bind(&news.excerpt)
            .bind(&news.content)
            .bind(&news.image_url)
            .bind(&news.external_link)
            .bind(news.status)
            .bind(news.published_at)
            .bind(news.updated_by)
            .bind(news.published_by)
            .bind(news.updated_at)
            .bind(news.deleted_at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::from_unique_violation(e, SLUG_TAKEN))?
            .ok_or_else(|| AppError::NotFound(format!("News with id {} not found", news.id)))?;

        if let Some(ids) = category_ids {
            replace_categories(&mut tx, saved.id, ids).await?;
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn increment_views(&self, id: i32, now: DateTime<Utc>) -> Result<Option<i32>> {
        let view_count: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE news
            SET view_count = view_count + 1
            WHERE id = $1
              AND status = 'published'
              AND published_at IS NOT NULL
              AND published_at <= $2
              AND deleted_at IS NULL
            RETURNING view_count
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(view_count)
    }

    async fn categories_for(
        &self,
        news_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<CategorySummary>>> {
        if news_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, NewsCategoryRow>(
            r#"
            SELECT nc.news_id, c.id, c.name, c.slug
            FROM news_categories nc
            JOIN categories c ON c.id = nc.category_id
            WHERE nc.news_id = ANY($1)
            ORDER BY c.display_order, c.name
            "#,
        )
        .bind(news_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_news: HashMap<i32, Vec<CategorySummary>> = HashMap::new();
        for row in rows {
            by_news.entry(row.news_id).or_default().push(row.category);
        }
        Ok(by_news)
    }

    async fn stats(&self) -> Result<NewsStats> {
        let stats = sqlx::query_as::<_, NewsStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE deleted_at IS NULL AND status = 'published') AS published,
                COUNT(*) FILTER (WHERE deleted_at IS NULL AND status = 'draft') AS draft,
                COUNT(*) FILTER (WHERE deleted_at IS NULL AND status = 'archived') AS archived,
                COUNT(*) FILTER (WHERE deleted_at IS NOT NULL) AS deleted,
                COALESCE(SUM(view_count) FILTER (WHERE deleted_at IS NULL), 0)::INT8 AS total_views
            FROM news
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
