use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;
use crate::shared::constants::MAX_IMAGE_SIZE;

/// Create admin routes (all require staff access)
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route(
            "/admin/news/news/upload-image",
            // oversize images must reach the handler to get the `{"error"}` 413 body
            post(handlers::upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE * 2)),
        )
        .route("/admin/news/news/actions", post(handlers::bulk_news_action))
        .with_state(admin_service)
}
