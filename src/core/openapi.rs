use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::categories::{
    dtos as categories_dtos, handlers as categories_handlers, models as categories_models,
};
use crate::features::news::{dtos as news_dtos, handlers as news_handlers, models as news_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // News
        news_handlers::list_news,
        news_handlers::get_news,
        news_handlers::create_news,
        news_handlers::update_news,
        news_handlers::patch_news,
        news_handlers::delete_news,
        news_handlers::restore_news,
        news_handlers::publish_news,
        news_handlers::news_stats,
        news_handlers::increment_views,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::patch_category,
        categories_handlers::delete_category,
        categories_handlers::category_news,
        // Public
        news_handlers::list_public_news,
        news_handlers::get_public_news,
        news_handlers::view_public_news,
        categories_handlers::list_public_categories,
        categories_handlers::get_public_category,
        // Admin
        admin_handlers::bulk_news_action,
        admin_handlers::upload_image,
    ),
    components(
        schemas(
            Meta,
            // News
            news_models::NewsStatus,
            news_dtos::CreateNewsDto,
            news_dtos::UpdateNewsDto,
            news_dtos::NewsListItemDto,
            news_dtos::NewsDetailDto,
            news_dtos::NewsPublicDto,
            news_dtos::NewsStatsDto,
            news_dtos::ViewCountDto,
            ApiResponse<news_dtos::NewsDetailDto>,
            ApiResponse<Vec<news_dtos::NewsListItemDto>>,
            ApiResponse<Vec<news_dtos::NewsPublicDto>>,
            ApiResponse<news_dtos::NewsStatsDto>,
            // Categories
            categories_models::CategorySummary,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::CategoryResponseDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Admin
            admin_dtos::BulkAction,
            admin_dtos::BulkActionDto,
            admin_dtos::BulkActionResultDto,
            admin_dtos::UploadImageDto,
            admin_dtos::UploadImageResponseDto,
            admin_dtos::UploadErrorDto,
        )
    ),
    tags(
        (name = "news", description = "News management (authenticated; writes are staff only)"),
        (name = "categories", description = "Category management (authenticated; writes are staff only)"),
        (name = "public", description = "Read-only endpoints for the mobile app, no authentication"),
        (name = "admin", description = "Editorial back office: bulk actions and image uploads"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "News API",
        version = "0.1.0",
        description = "API documentation for the News backend",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
