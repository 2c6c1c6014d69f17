use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// =============================================================================
// BULK ACTIONS
// =============================================================================

/// Editorial action applied to a selection of news
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Publish,
    Archive,
    SoftDelete,
    Restore,
}

impl BulkAction {
    /// Past-tense verb for the result message
    pub fn verb(&self) -> &'static str {
        match self {
            BulkAction::Publish => "published",
            BulkAction::Archive => "archived",
            BulkAction::SoftDelete => "deleted",
            BulkAction::Restore => "restored",
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkActionDto {
    pub action: BulkAction,

    #[validate(length(min = 1, message = "ids must not be empty"))]
    pub ids: Vec<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkActionResultDto {
    pub action: BulkAction,
    /// Records actually changed; skipped ids are not counted
    pub affected: usize,
    pub message: String,
}

// =============================================================================
// IMAGE UPLOAD
// =============================================================================

/// Multipart body of the image upload, for Swagger only.
/// The handler reads the form with axum's Multipart extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadImageDto {
    /// The image (also accepted under the field name `file`)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadImageResponseDto {
    /// Public URL of the stored image
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadErrorDto {
    pub error: String,
}

/// File extension for an allowed image MIME type
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
