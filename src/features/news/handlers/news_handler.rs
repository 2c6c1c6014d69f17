use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::guards::RequireStaff;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::news::dtos::{
    CreateNewsDto, NewsDetailDto, NewsListItemDto, NewsQueryParams, NewsStatsDto, UpdateNewsDto,
    ViewCountDto,
};
use crate::features::news::models::PublishOutcome;
use crate::features::news::services::NewsService;
use crate::shared::types::{ApiResponse, Meta};

/// List news (staff also see soft-deleted records)
#[utoipa::path(
    get,
    path = "/api/news",
    params(NewsQueryParams),
    responses(
        (status = 200, description = "News retrieved successfully", body = ApiResponse<Vec<NewsListItemDto>>),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Authentication required")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_news(
    user: AuthenticatedUser,
    State(service): State<Arc<NewsService>>,
    AppQuery(params): AppQuery<NewsQueryParams>,
) -> Result<Json<ApiResponse<Vec<NewsListItemDto>>>> {
    let (items, total) = service.list(&user, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get a news article by ID
#[utoipa::path(
    get,
    path = "/api/news/{id}",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    responses(
        (status = 200, description = "News retrieved successfully", body = ApiResponse<NewsDetailDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "News not found")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_news(
    user: AuthenticatedUser,
    State(service): State<Arc<NewsService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NewsDetailDto>>> {
    let news = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(news), None, None)))
}

/// Create a news article (staff only)
#[utoipa::path(
    post,
    path = "/api/news",
    request_body = CreateNewsDto,
    responses(
        (status = 201, description = "News created successfully", body = ApiResponse<NewsDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - staff only"),
        (status = 409, description = "Slug could not be allocated")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_news(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<NewsService>>,
    AppJson(dto): AppJson<CreateNewsDto>,
) -> Result<(StatusCode, Json<ApiResponse<NewsDetailDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let news = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(news),
            Some("News created successfully".to_string()),
            None,
        )),
    ))
}

/// Replace a news article (staff only, `title` required)
#[utoipa::path(
    put,
    path = "/api/news/{id}",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    request_body = UpdateNewsDto,
    responses(
        (status = 200, description = "News updated successfully", body = ApiResponse<NewsDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - staff only"),
        (status = 404, description = "News not found"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_news(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<NewsService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateNewsDto>,
) -> Result<Json<ApiResponse<NewsDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let news = service.update(&user, id, dto, false).await?;
    Ok(Json(ApiResponse::success(Some(news), None, None)))
}

/// Partially update a news article (staff only)
#[utoipa::path(
    patch,
    path = "/api/news/{id}",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    request_body = UpdateNewsDto,
    responses(
        (status = 200, description = "News updated successfully", body = ApiResponse<NewsDetailDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - staff only"),
        (status = 404, description = "News not found"),
        (status = 409, description = "Slug already in use")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn patch_news(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<NewsService>>,
    Path(id): Path<i32>,
    AppJson(dto): AppJson<UpdateNewsDto>,
) -> Result<Json<ApiResponse<NewsDetailDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let news = service.update(&user, id, dto, true).await?;
    Ok(Json(ApiResponse::success(Some(news), None, None)))
}

/// Soft delete a news article (staff only)
#[utoipa::path(
    delete,
    path = "/api/news/{id}",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    responses(
        (status = 204, description = "News deleted"),
        (status = 403, description = "Forbidden - staff only"),
        (status = 404, description = "News not found")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_news(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<NewsService>>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    service.soft_delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Restore a soft-deleted news article (staff only)
#[utoipa::path(
    post,
    path = "/api/news/{id}/restore",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    responses(
        (status = 200, description = "News restored successfully", body = ApiResponse<NewsDetailDto>),
        (status = 400, description = "News is not deleted"),
        (status = 403, description = "Forbidden - staff only"),
        (status = 404, description = "News not found")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn restore_news(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<NewsService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NewsDetailDto>>> {
    let news = service.restore(&user, id).await?;
    Ok(Json(ApiResponse::success(
        Some(news),
        Some("News restored successfully".to_string()),
        None,
    )))
}

/// Publish a news article (staff only)
///
/// Publishing an already published article succeeds without changes.
#[utoipa::path(
    post,
    path = "/api/news/{id}/publish",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    responses(
        (status = 200, description = "News published (or already published)", body = ApiResponse<NewsDetailDto>),
        (status = 400, description = "News is deleted"),
        (status = 403, description = "Forbidden - staff only"),
        (status = 404, description = "News not found")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn publish_news(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<NewsService>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NewsDetailDto>>> {
    let (news, outcome) = service.publish(&user, id).await?;
    let message = match outcome {
        PublishOutcome::Published => "News published successfully",
        PublishOutcome::AlreadyPublished => "News is already published",
    };
    Ok(Json(ApiResponse::success(
        Some(news),
        Some(message.to_string()),
        None,
    )))
}

/// News statistics (staff only)
#[utoipa::path(
    get,
    path = "/api/news/stats",
    responses(
        (status = 200, description = "Statistics retrieved successfully", body = ApiResponse<NewsStatsDto>),
        (status = 403, description = "Forbidden - staff only")
    ),
    tag = "news",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn news_stats(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<NewsService>>,
) -> Result<Json<ApiResponse<NewsStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Record a view of a published article (no authentication)
#[utoipa::path(
    post,
    path = "/api/news/{id}/increment_views",
    params(
        ("id" = i32, Path, description = "News ID")
    ),
    responses(
        (status = 200, description = "View recorded", body = ApiResponse<ViewCountDto>),
        (status = 404, description = "News not available")
    ),
    tag = "news"
)]
pub async fn increment_views(
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
    use crate::features::news::routes::{public_routes, routes};
    use crate::shared::test_helpers::{regular_user, staff_user, with_user, InMemoryDb};
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn app(db: &Arc<InMemoryDb>, user: AuthenticatedUser) -> TestServer {
        let service = Arc::new(NewsService::new(db.clone(), db.clone()));
        let router = Router::new()
            .merge(with_user(routes(Arc::clone(&service)), user))
            .merge(public_routes(service));
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_create_requires_staff() {
        let db = InMemoryDb::new();
        let server = app(&db, regular_user());

        let response = server
            .post("/api/news")
            .json(&json!({ "title": "Test News" }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let db = InMemoryDb::new();
        let server = app(&db, staff_user());

        let response = server
            .post("/api/news")
            .json(&json!({ "title": "Test News", "content": "Body" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["slug"], "test-news");
        assert_eq!(body["data"]["status"], "draft");

        let id = body["data"]["id"].as_i64().unwrap();
        let fetched = server.get(&format!("/api/news/{}", id)).await;
        fetched.assert_status_ok();
        let fetched: Value = fetched.json();
        assert_eq!(fetched["data"]["title"], "Test News");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let db = InMemoryDb::new();
        let server = app(&db, staff_user());

        server
            .post("/api/news")
            .json(&json!({ "title": "" }))
            .await
            .assert_status_bad_request();

        server
            .post("/api/news")
            .json(&json!({ "title": "X", "status": "scheduled" }))
            .await
            .assert_status_bad_request();

        server
            .post("/api/news")
            .json(&json!({ "content": "missing title" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_delete_is_soft() {
        let db = InMemoryDb::new();
        let server = app(&db, staff_user());
        let news = db.add_news("Old", false).await;

        server
            .delete(&format!("/api/news/{}", news.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let fetched: Value = server.get(&format!("/api/news/{}", news.id)).await.json();
        assert!(fetched["data"]["deleted_at"].is_string());
    }

    #[tokio::test]
    async fn test_restore_non_deleted_is_bad_request() {
        let db = InMemoryDb::new();
        let server = app(&db, staff_user());
        let news = db.add_news("Alive", false).await;

        let response = server
            .post(&format!("/api/news/{}/restore", news.id))
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_publish_twice() {
        let db = InMemoryDb::new();
        let server = app(&db, staff_user());
        let news = db.add_news("Launch", false).await;

        let first: Value = server
            .post(&format!("/api/news/{}/publish", news.id))
            .await
            .json();
        assert_eq!(first["message"], "News published successfully");

        let second = server
            .post(&format!("/api/news/{}/publish", news.id))
            .await;
        second.assert_status_ok();
        let second: Value = second.json();
        assert_eq!(second["message"], "News is already published");
        assert_eq!(second["data"]["published_at"], first["data"]["published_at"]);
    }

    #[tokio::test]
    async fn test_increment_views_is_public() {
        let db = InMemoryDb::new();
        let server = app(&db, regular_user());
        let live = db.add_news("Live", true).await;
        let draft = db.add_news("Draft", false).await;

        let body: Value = server
            .post(&format!("/api/news/{}/increment_views", live.id))
            .await
            .json();
        assert_eq!(body["data"]["view_count"], 1);

        server
            .post(&format!("/api/news/{}/increment_views", draft.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_stats_staff_only() {
        let db = InMemoryDb::new();
        db.add_news("A", true).await;

        app(&db, regular_user())
            .get("/api/news/stats")
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let body: Value = app(&db, staff_user()).get("/api/news/stats").await.json();
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["published"], 1);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let db = InMemoryDb::new();
        let server = app(&db, staff_user());

        server
            .get("/api/news")
            .add_query_param("status", "unknown")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_patch_clears_field() {
        let db = InMemoryDb::new();
        let server = app(&db, staff_user());

        let created: Value = server
            .post("/api/news")
            .json(&json!({ "title": "Patch Me", "excerpt": "Short" }))
            .await
            .json();
        let id = created["data"]["id"].as_i64().unwrap();

        let patched: Value = server
            .patch(&format!("/api/news/{}", id))
            .json(&json!({ "excerpt": null }))
            .await
            .json();
        assert!(patched["data"]["excerpt"].is_null());
        assert_eq!(patched["data"]["title"], "Patch Me");

        server
            .put(&format!("/api/news/{}", id))
            .json(&json!({ "excerpt": "no title" }))
            .await
            .assert_status_bad_request();
    }
}
