use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireStaff;
use crate::shared::constants::{ALLOWED_IMAGE_MIME_TYPES, MAX_IMAGE_SIZE};
use crate::shared::types::ApiResponse;

/// Apply a bulk action to selected news
#[utoipa::path(
    post,
    path = "/admin/news/news/actions",
    request_body = BulkActionDto,
    responses(
        (status = 200, description = "Action applied", body = ApiResponse<BulkActionResultDto>),
        (status = 400, description = "Unknown action or empty selection"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - staff only")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn bulk_news_action(
    RequireStaff(user): RequireStaff,
    State(service): State<Arc<AdminService>>,
    AppJson(dto): AppJson<BulkActionDto>,
) -> Result<Json<ApiResponse<BulkActionResultDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = service.bulk_action(&user, dto.action, &dto.ids).await?;
    let message = result.message.clone();
    Ok(Json(ApiResponse::success(Some(result), Some(message), None)))
}

/// Errors of the image upload endpoint, rendered as `{"error": "..."}` for the
/// editor's drop widget.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Auth(AppError),

    #[error("No image provided")]
    MissingFile,

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image exceeds the maximum size of {} MB", MAX_IMAGE_SIZE / (1024 * 1024))]
    TooLarge,

    #[error("Invalid multipart body: {0}")]
    Malformed(String),

    #[error("Failed to store image")]
    Storage(#[source] AppError),
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::Auth(AppError::Forbidden(_)) => StatusCode::FORBIDDEN,
            UploadError::Auth(_) => StatusCode::UNAUTHORIZED,
            UploadError::MissingFile
            | UploadError::UnsupportedType(_)
            | UploadError::Malformed(_) => StatusCode::BAD_REQUEST,
            UploadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        if let UploadError::Storage(ref e) = self {
            tracing::error!("Image upload failed: {}", e);
        }
        let body = UploadErrorDto {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Upload an image for a news article
///
/// Accepts multipart/form-data with one image in the `image` (or `file`) field.
#[utoipa::path(
    post,
    path = "/admin/news/news/upload-image",
    request_body(
        content = UploadImageDto,
        content_type = "multipart/form-data",
        description = "Image to upload (jpeg, png, gif or webp, at most 5 MB)",
    ),
    responses(
        (status = 201, description = "Image stored", body = UploadImageResponseDto),
        (status = 400, description = "Missing file or unsupported type", body = UploadErrorDto),
        (status = 401, description = "Unauthorized", body = UploadErrorDto),
        (status = 403, description = "Forbidden - staff only", body = UploadErrorDto),
        (status = 413, description = "Image too large", body = UploadErrorDto)
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    staff: std::result::Result<RequireStaff, AppError>,
    State(service): State<Arc<AdminService>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<(StatusCode, Json<UploadImageResponseDto>), UploadError> {
    staff.map_err(UploadError::Auth)?;
    let mut multipart = multipart.map_err(|e| UploadError::Malformed(e.body_text()))?;

    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge
        } else {
            UploadError::Malformed(e.body_text())
        }
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "image" && field_name != "file" {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                UploadError::TooLarge
            } else {
                UploadError::Malformed(e.body_text())
            }
        })?;

        image = Some((data.to_vec(), content_type));
        break;
    }

    let (data, content_type) = image.ok_or(UploadError::MissingFile)?;
    if data.is_empty() {
        return Err(UploadError::MissingFile);
    }
    if !ALLOWED_IMAGE_MIME_TYPES.contains(&content_type.as_str()) {
        return Err(UploadError::UnsupportedType(content_type));
    }
    if data.len() > MAX_IMAGE_SIZE {
        return Err(UploadError::TooLarge);
    }

    let url = service
        .upload_image(data, &content_type)
        .await
        .map_err(UploadError::Storage)?;

    Ok((StatusCode::CREATED, Json(UploadImageResponseDto { url })))
}
