//! Domain service for the product catalog.
//!
//! Product rows reference images held by a [`BlobStore`](crate::clients::blob::BlobStore).
//! The row is authoritative: blob deletions only ever follow a committed row
//! change, and blobs created for a write that fails are released again.

use thiserror::Error;

use crate::clients::blob::{BlobError, ImageUpload, StoredBlob};
use crate::db::DbFailure;
use crate::models::product::Product;

pub use crate::models::product::ProductFields;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{0}")]
    Validation(String),

    #[error("Product not found")]
    NotFound,

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Database(DbFailure),
}

impl From<anyhow::Error> for ProductError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(DbFailure::classify(&err))
    }
}

/// Where a product's image comes from on create or update.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file to push through the blob store.
    Upload(ImageUpload),

    /// An already hosted image, optionally with the handle obtained from a
    /// previous direct upload.
    Url { url: String, handle: Option<String> },
}

#[async_trait::async_trait]
pub trait ProductService: Send + Sync {
    /// Active products, newest first.
    async fn list_public(&self) -> Result<Vec<Product>, ProductError>;

    /// Every product, newest first.
    async fn list_all(&self) -> Result<Vec<Product>, ProductError>;

    async fn get_by_id(&self, id: i32) -> Result<Product, ProductError>;

    /// # Errors
    ///
    /// Returns [`ProductError::Validation`] before any upload when a required
    /// field or the image is missing, or the category is unknown.
    async fn create(
        &self,
        fields: ProductFields,
        image: Option<ImageSource>,
    ) -> Result<Product, ProductError>;

    /// Partial update. Fields left unset keep their stored value.
    async fn update(
        &self,
        id: i32,
        fields: ProductFields,
        image: Option<ImageSource>,
    ) -> Result<Product, ProductError>;

    /// Returns false when no product has this id.
    async fn delete(&self, id: i32) -> Result<bool, ProductError>;

    /// Stores an image without attaching it to a product.
    async fn upload_image(&self, image: ImageUpload) -> Result<StoredBlob, ProductError>;

    async fn delete_image(&self, handle: &str) -> Result<(), ProductError>;
}
