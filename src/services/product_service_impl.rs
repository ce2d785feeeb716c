//! `SeaORM` implementation of the `ProductService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::blob::{BlobStore, ImageUpload, StoredBlob};
use crate::db::Store;
use crate::models::product::{
    Category, DEFAULT_RATING, Product, ProductFields, ProductRecord, clamp_rating,
};
use crate::services::product_service::{ImageSource, ProductError, ProductService};

pub struct SeaOrmProductService {
    store: Store,
    blobs: Arc<dyn BlobStore>,
}

/// Image reference resolved for a write.
struct ResolvedImage {
    url: String,
    handle: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_category(raw: &str) -> Result<Category, ProductError> {
    raw.parse::<Category>()
        .map_err(|e| ProductError::Validation(e.to_string()))
}

/// A URL source with a blank URL counts as no image.
fn normalize_source(image: Option<ImageSource>) -> Option<ImageSource> {
    match image {
        Some(ImageSource::Url { url, handle }) => {
            let url = url.trim().to_string();
            (!url.is_empty()).then(|| ImageSource::Url {
                url,
                handle: non_blank(handle),
            })
        }
        other => other,
    }
}

impl SeaOrmProductService {
    #[must_use]
    pub fn new(store: Store, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    async fn resolve(&self, source: ImageSource) -> Result<ResolvedImage, ProductError> {
        match source {
            ImageSource::Upload(upload) => {
                let stored = self.blobs.upload(upload).await?;
                Ok(ResolvedImage {
                    url: stored.url,
                    handle: Some(stored.handle),
                })
            }
            ImageSource::Url { url, handle } => Ok(ResolvedImage { url, handle }),
        }
    }

    /// Best-effort blob removal. Failures leave an orphan, which is logged.
    async fn release(&self, handle: &str, reason: &'static str) {
        match self.blobs.delete(handle).await {
            Ok(()) => {
                metrics::counter!("product_blob_releases_total", "reason" => reason, "outcome" => "deleted")
                    .increment(1);
                info!(handle, reason, "Released product image");
            }
            Err(e) => {
                metrics::counter!("product_blob_releases_total", "reason" => reason, "outcome" => "failed")
                    .increment(1);
                warn!(handle, reason, error = %e, "Failed to release product image, leaving orphan");
            }
        }
    }
}

#[async_trait]
impl ProductService for SeaOrmProductService {
    async fn list_public(&self) -> Result<Vec<Product>, ProductError> {
        Ok(self.store.list_products(false).await?)
    }

    async fn list_all(&self) -> Result<Vec<Product>, ProductError> {
        Ok(self.store.list_products(true).await?)
    }

    async fn get_by_id(&self, id: i32) -> Result<Product, ProductError> {
        self.store
            .get_product(id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    async fn create(
        &self,
        fields: ProductFields,
        image: Option<ImageSource>,
    ) -> Result<Product, ProductError> {
        let (Some(name), Some(category), Some(description), Some(indiamart_url), Some(whatsapp_message)) = (
            non_blank(fields.name),
            non_blank(fields.category),
            non_blank(fields.description),
            non_blank(fields.indiamart_url),
            non_blank(fields.whatsapp_message),
        ) else {
            return Err(ProductError::Validation("All fields are required".to_string()));
        };

        let category = parse_category(&category)?;

        let Some(source) = normalize_source(image) else {
            return Err(ProductError::Validation("Image is required".to_string()));
        };

        let image = self.resolve(source).await?;

        let record = ProductRecord {
            name,
            category,
            description,
            image: image.url,
            cloudinary_id: image.handle.clone(),
            indiamart_url,
            whatsapp_message,
            rating: fields.rating.map_or(DEFAULT_RATING, clamp_rating),
            is_active: fields.is_active.unwrap_or(true),
        };

        match self.store.insert_product(record).await {
            Ok(product) => {
                info!(product_id = product.id, name = %product.name, "Product created");
                Ok(product)
            }
            Err(e) => {
                if let Some(handle) = image.handle.as_deref() {
                    self.release(handle, "create_failed").await;
                }
                Err(e.into())
            }
        }
    }

    async fn update(
        &self,
        id: i32,
        fields: ProductFields,
        image: Option<ImageSource>,
    ) -> Result<Product, ProductError> {
        let existing = self.get_by_id(id).await?;

        let category = match non_blank(fields.category) {
            Some(raw) => parse_category(&raw)?,
            None => parse_category(&existing.category)?,
        };

        let replacement = match normalize_source(image) {
            Some(ImageSource::Url { url, .. }) if url == existing.image => None,
            Some(source) => Some(self.resolve(source).await?),
            None => None,
        };

        let (image_url, handle) = replacement.as_ref().map_or_else(
            || (existing.image.clone(), existing.cloudinary_id.clone()),
            |r| (r.url.clone(), r.handle.clone()),
        );

        let record = ProductRecord {
            name: non_blank(fields.name).unwrap_or_else(|| existing.name.clone()),
            category,
            description: non_blank(fields.description)
                .unwrap_or_else(|| existing.description.clone()),
            image: image_url,
            cloudinary_id: handle,
            indiamart_url: non_blank(fields.indiamart_url)
                .unwrap_or_else(|| existing.indiamart_url.clone()),
            whatsapp_message: non_blank(fields.whatsapp_message)
                .unwrap_or_else(|| existing.whatsapp_message.clone()),
            rating: fields.rating.map_or(existing.rating, clamp_rating),
            is_active: fields.is_active.unwrap_or(existing.is_active),
        };

        let result = self.store.update_product(id, record).await;

        let new_handle = replacement.as_ref().and_then(|r| r.handle.as_deref());
        let updated = match result {
            Ok(Some(product)) => product,
            Ok(None) => {
                if let Some(handle) = new_handle {
                    self.release(handle, "update_failed").await;
                }
                return Err(ProductError::NotFound);
            }
            Err(e) => {
                if let Some(handle) = new_handle {
                    self.release(handle, "update_failed").await;
                }
                return Err(e.into());
            }
        };

        if replacement.is_some()
            && let Some(old) = existing.cloudinary_id.as_deref()
            && Some(old) != new_handle
        {
            self.release(old, "replaced").await;
        }

        info!(product_id = id, "Product updated");
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<bool, ProductError> {
        let Some(product) = self.store.get_product(id).await? else {
            return Ok(false);
        };

        if !self.store.delete_product(id).await? {
            return Ok(false);
        }

        info!(product_id = id, "Product deleted");

        if let Some(handle) = product.cloudinary_id.as_deref() {
            self.release(handle, "deleted").await;
        }

        Ok(true)
    }

    async fn upload_image(&self, image: ImageUpload) -> Result<StoredBlob, ProductError> {
        Ok(self.blobs.upload(image).await?)
    }

    async fn delete_image(&self, handle: &str) -> Result<(), ProductError> {
        self.blobs.delete(handle).await?;
        info!(handle, "Deleted image");
        Ok(())
    }
}
