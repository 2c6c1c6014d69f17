use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::categories::{handlers, services::CategoryService};

/// Routes that need an authenticated caller; staff checks happen per handler
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .patch(handlers::patch_category)
                .delete(handlers::delete_category),
        )
        .route("/api/categories/{id}/news", get(handlers::category_news))
        .with_state(service)
}

/// Active categories, open to anonymous callers
pub fn public_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/public/categories", get(handlers::list_public_categories))
        .route(
            "/api/public/categories/{id}",
            get(handlers::get_public_category),
        )
        .with_state(service)
}
