//! Image storage seam.
//!
//! Product images live in an external blob store. The catalog only keeps the
//! public URL and the opaque handle needed to delete the blob again.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    /// The upload itself is unacceptable (type, size, empty).
    #[error("{0}")]
    Rejected(String),

    /// Provider could not be reached or timed out.
    #[error("Image storage unavailable: {0}")]
    Unavailable(String),

    /// Provider answered with an error.
    #[error("Image storage error: {0}")]
    Provider(String),

    #[error("Image storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for BlobError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Provider(err.to_string())
        }
    }
}

/// A file received from a client, not yet stored anywhere.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl ImageUpload {
    /// Content type from the part header, falling back to the file extension.
    #[must_use]
    pub fn mime(&self) -> Option<String> {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .or_else(|| {
                self.file_name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first_raw())
                    .map(ToString::to_string)
            })
    }

    /// Extension to store the file under, derived from the mime type.
    #[must_use]
    pub fn extension(&self) -> String {
        match self.mime().as_deref() {
            Some("image/jpeg" | "image/jpg") => "jpg".to_string(),
            Some(mime) => mime_guess::get_mime_extensions_str(mime)
                .and_then(|exts| exts.first())
                .map_or_else(|| "bin".to_string(), |ext| (*ext).to_string()),
            None => "bin".to_string(),
        }
    }

    pub fn validate(&self, max_bytes: usize) -> Result<(), BlobError> {
        if self.bytes.is_empty() {
            return Err(BlobError::Rejected("No image file provided".to_string()));
        }

        if self.bytes.len() > max_bytes {
            return Err(BlobError::Rejected(format!(
                "Image exceeds the maximum size of {} KiB",
                max_bytes / 1024
            )));
        }

        match self.mime() {
            Some(mime) if ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) => Ok(()),
            Some(mime) => Err(BlobError::Rejected(format!(
                "Unsupported image type '{mime}'. Allowed: jpg, png, webp, gif"
            ))),
            None => Err(BlobError::Rejected(
                "Could not determine image type".to_string(),
            )),
        }
    }
}

pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredBlob {
    pub url: String,
    pub handle: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, image: ImageUpload) -> Result<StoredBlob, BlobError>;

    /// Deleting a handle that no longer exists is not an error.
    async fn delete(&self, handle: &str) -> Result<(), BlobError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(bytes: &[u8], name: Option<&str>, ct: Option<&str>) -> ImageUpload {
        ImageUpload {
            bytes: bytes.to_vec(),
            file_name: name.map(ToString::to_string),
            content_type: ct.map(ToString::to_string),
        }
    }

    #[test]
    fn test_mime_falls_back_to_file_name() {
        let image = upload(b"x", Some("scale.png"), Some("application/octet-stream"));
        assert_eq!(image.mime().as_deref(), Some("image/png"));
        assert_eq!(image.extension(), "png");
    }

    #[test]
    fn test_validate_rejects_empty_and_oversized() {
        assert!(matches!(
            upload(b"", Some("a.png"), None).validate(10),
            Err(BlobError::Rejected(_))
        ));
        assert!(matches!(
            upload(&[0; 11], Some("a.png"), None).validate(10),
            Err(BlobError::Rejected(_))
        ));
    }

    #[test]
    fn test_validate_rejects_non_images() {
        let pdf = upload(b"%PDF", Some("brochure.pdf"), Some("application/pdf"));
        assert!(matches!(pdf.validate(1024), Err(BlobError::Rejected(_))));

        let jpeg = upload(b"\xff\xd8", Some("photo.jpg"), Some("image/jpeg"));
        assert!(jpeg.validate(1024).is_ok());
    }
}
