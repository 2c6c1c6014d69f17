use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::news::{handlers, services::NewsService};

/// Routes that need an authenticated caller; staff checks happen per handler
pub fn routes(service: Arc<NewsService>) -> Router {
    Router::new()
        .route(
            "/api/news",
            get(handlers::list_news).post(handlers::create_news),
        )
        .route("/api/news/stats", get(handlers::news_stats))
        .route(
            "/api/news/{id}",
            get(handlers::get_news)
                .put(handlers::update_news)
                .patch(handlers::patch_news)
                .delete(handlers::delete_news),
        )
        .route("/api/news/{id}/restore", post(handlers::restore_news))
        .route("/api/news/{id}/publish", post(handlers::publish_news))
        .with_state(service)
}

/// Routes open to anonymous callers
pub fn public_routes(service: Arc<NewsService>) -> Router {
    Router::new()
        .route(
            "/api/news/{id}/increment_views",
            post(handlers::increment_views),
        )
        .route("/api/news/public", get(handlers::list_public_news))
        .route("/api/public/news", get(handlers::list_public_news))
        .route("/api/public/news/{id}", get(handlers::get_public_news))
        .route(
            "/api/public/news/{id}/view",
            post(handlers::view_public_news),
        )
        .with_state(service)
}
