use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
};
use std::sync::Arc;

use super::validation::decode_handle;
use super::{ApiError, ApiResponse, AppState, UploadedImageDto, UploadedImageResponse};
use crate::clients::blob::ImageUpload;

/// POST /upload/image
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadedImageResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::validation("No image file provided"))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().map(ToString::to_string);
        let content_type = field.content_type().map(ToString::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read image: {e}")))?;

        upload = Some(ImageUpload {
            bytes: bytes.to_vec(),
            file_name,
            content_type,
        });
        break;
    }

    let upload = upload.ok_or_else(|| ApiError::validation("No image file provided"))?;
    let stored = state.shared.product_service.upload_image(upload).await?;

    Ok(Json(UploadedImageResponse::new(UploadedImageDto {
        image_url: stored.url,
        public_id: stored.handle,
    })))
}

/// DELETE /upload/image/{publicId}
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let handle = decode_handle(&public_id)?;
    state.shared.product_service.delete_image(&handle).await?;
    Ok(Json(ApiResponse::message("Image deleted successfully")))
}
