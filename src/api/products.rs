use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::parse_id;
use super::{ApiError, ApiResponse, AppState};
use crate::clients::blob::ImageUpload;
use crate::models::product::Product;
use crate::services::{ImageSource, ProductFields};

/// Product write body. Accepts `multipart/form-data` (text fields plus an
/// optional `image` file) or JSON with `image` as a URL.
#[derive(Debug, Default)]
pub struct ProductPayload {
    pub fields: ProductFields,
    pub image: Option<ImageSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductJson {
    #[serde(flatten)]
    fields: ProductFields,
    image: Option<String>,
    cloudinary_id: Option<String>,
}

impl<S> FromRequest<S> for ProductPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?;
            return read_multipart(multipart).await;
        }

        let Json(body) = Json::<ProductJson>::from_request(req, state)
            .await
            .map_err(|e| ApiError::validation(format!("Invalid product body: {}", e.body_text())))?;

        let image = body.image.map(|url| ImageSource::Url {
            url,
            handle: body.cloudinary_id.filter(|h| !h.trim().is_empty()),
        });

        Ok(Self {
            fields: body.fields,
            image,
        })
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ProductPayload, ApiError> {
    let mut payload = ProductPayload::default();
    let mut upload = None;
    let mut image_url = None;
    let mut handle = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" && field.file_name().is_some() {
            let file_name = field.file_name().map(ToString::to_string);
            let content_type = field.content_type().map(ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("Failed to read image: {e}")))?;

            // Browsers send an empty part for an untouched file input
            if bytes.is_empty() {
                continue;
            }

            upload = Some(ImageUpload {
                bytes: bytes.to_vec(),
                file_name,
                content_type,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::validation(format!("Invalid field '{name}': {e}")))?;

        let fields = &mut payload.fields;
        match name.as_str() {
            "name" => fields.name = Some(value),
            "category" => fields.category = Some(value),
            "description" => fields.description = Some(value),
            "indiamart_url" => fields.indiamart_url = Some(value),
            "whatsapp_message" => fields.whatsapp_message = Some(value),
            "rating" => fields.rating = parse_rating(&value)?,
            "is_active" => fields.is_active = parse_flag(&value)?,
            "image" => image_url = Some(value),
            "cloudinary_id" => handle = Some(value).filter(|h| !h.trim().is_empty()),
            _ => tracing::debug!(field = %name, "Ignoring unknown product field"),
        }
    }

    payload.image = match (upload, image_url) {
        (Some(upload), _) => Some(ImageSource::Upload(upload)),
        (None, Some(url)) => Some(ImageSource::Url { url, handle }),
        (None, None) => None,
    };

    Ok(payload)
}

fn parse_rating(raw: &str) -> Result<Option<f64>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| ApiError::validation("Rating must be a number"))
}

fn parse_flag(raw: &str) -> Result<Option<bool>, ApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "1" | "on" | "yes" => Ok(Some(true)),
        "false" | "0" | "off" | "no" => Ok(Some(false)),
        _ => Err(ApiError::validation("is_active must be true or false")),
    }
}

/// GET /products
pub async fn list_public(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state.shared.product_service.list_public().await?;
    Ok(Json(ApiResponse::success(products)))
}

/// GET /products/admin/all
pub async fn list_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state.shared.product_service.list_all().await?;
    Ok(Json(ApiResponse::list(products)))
}

/// GET /products/{id}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let id = parse_id(&id)?;
    let product = state.shared.product_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

/// POST /products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    payload: ProductPayload,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let product = state
        .shared
        .product_service
        .create(payload.fields, payload.image)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(product).with_message("Product created successfully")),
    ))
}

/// PUT /products/{id}
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: ProductPayload,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let id = parse_id(&id)?;
    let product = state
        .shared
        .product_service
        .update(id, payload.fields, payload.image)
        .await?;

    Ok(Json(
        ApiResponse::success(product).with_message("Product updated successfully"),
    ))
}

/// DELETE /products/{id}
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_id(&id)?;
    if !state.shared.product_service.delete(id).await? {
        return Err(ApiError::not_found("Product"));
    }
    Ok(Json(ApiResponse::message("Product deleted successfully")))
}
