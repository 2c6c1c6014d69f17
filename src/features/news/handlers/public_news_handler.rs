use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::news::dtos::{NewsPublicDto, PublicNewsQueryParams, ViewCountDto};
use crate::features::news::services::NewsService;
use crate::shared::types::{ApiResponse, Meta};

/// List published news for the mobile app
#[utoipa::path(
    get,
    path = "/api/public/news",
    params(PublicNewsQueryParams),
    responses(
        (status = 200, description = "Published news", body = ApiResponse<Vec<NewsPublicDto>>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "public"
)]
pub async fn list_public_news(
    State(service): State<Arc<NewsService>>,
    AppQuery(params): AppQuery<PublicNewsQueryParams>,
) -> Result<Json<ApiResponse<Vec<NewsPublicDto>>>> {
    let (items, total) = service.public_list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a published news article
#[utoipa::path(
    get,
    path = "/api/public/news/{id}",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    responses(
        (status = 200, description = "Published news article", body = ApiResponse<NewsPublicDto>),
        (status = 404, description = "News not found")
    ),
    tag = "public"
)]
pub async fn get_public_news(
    State(service): State<Arc<NewsService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NewsPublicDto>>> {
    let news = service.public_get(id).await?;
    Ok(Json(ApiResponse::success(Some(news), None, None)))
}

/// Record a view of a published article
#[utoipa::path(
    post,
    path = "/api/public/news/{id}/view",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    responses(
        (status = 200, description = "View recorded", body = ApiResponse<ViewCountDto>),
        (status = 404, description = "News not available")
    ),
    tag = "public"
)]
pub async fn view_public_news(
    State(service): State<Arc<NewsService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ViewCountDto>>> {
    let view_count = service.increment_views(id).await?;
    Ok(Json(ApiResponse::success(
        Some(ViewCountDto { view_count }),
        Some("View recorded".to_string()),
        None,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::news::routes::public_routes;
    use crate::shared::test_helpers::InMemoryDb;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::Value;

    fn server(db: &Arc<InMemoryDb>) -> TestServer {
        let service = Arc::new(NewsService::new(db.clone(), db.clone()));
        TestServer::new(public_routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_public_list_only_visible() {
        let db = InMemoryDb::new();
        let live = db.add_news("Live", true).await;
        db.add_news("Draft", false).await;
        let future = db.add_news("Future", true).await;
        db.update_news(future.id, |n| {
            n.published_at = Some(Utc::now() + Duration::days(3))
        })
        .await;
        let deleted = db.add_news("Deleted", true).await;
        db.update_news(deleted.id, |n| n.deleted_at = Some(Utc::now()))
            .await;

        let body: Value = server(&db).get("/api/public/news").await.json();

        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["id"], live.id);
        assert!(body["data"][0].get("status").is_none());
    }

    #[tokio::test]
    async fn test_public_list_alias_and_category_filter() {
        let db = InMemoryDb::new();
        let sports = db.add_category("Sports", true).await;
        let tagged = db.add_news("Tagged", true).await;
        db.add_news("Untagged", true).await;
        db.tag(tagged.id, sports.id).await;

        let body: Value = server(&db)
            .get("/api/news/public")
            .add_query_param("category", sports.id)
            .await
            .json();

        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["categories"][0]["slug"], "sports");
    }

    #[tokio::test]
    async fn test_public_ordering_by_views() {
        let db = InMemoryDb::new();
        let quiet = db.add_news("Quiet", true).await;
        let popular = db.add_news("Popular", true).await;
        db.update_news(popular.id, |n| n.view_count = 50).await;

        let body: Value = server(&db)
            .get("/api/public/news")
            .add_query_param("ordering", "-view_count")
            .await
            .json();

        assert_eq!(body["data"][0]["id"], popular.id);
        assert_eq!(body["data"][1]["id"], quiet.id);
    }

    #[tokio::test]
    async fn test_public_list_far_page_is_empty() {
        let db = InMemoryDb::new();
        db.add_news("Live", true).await;

        let response = server(&db)
            .get("/api/public/news")
            .add_query_param("page", i64::MAX)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn test_public_view_counts() {
        let db = InMemoryDb::new();
        let live = db.add_news("Live", true).await;
        let draft = db.add_news("Draft", false).await;
        let server = server(&db);

        server
            .post(&format!("/api/public/news/{}/view", live.id))
            .await
            .assert_status_ok();
        let body: Value = server
            .post(&format!("/api/public/news/{}/view", live.id))
            .await
            .json();
        assert_eq!(body["data"]["view_count"], 2);

        server
            .post(&format!("/api/public/news/{}/view", draft.id))
            .await
            .assert_status_not_found();
        server
            .get(&format!("/api/public/news/{}", draft.id))
            .await
            .assert_status_not_found();
    }
}
