use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::clients::blob::{BlobError, BlobStore, ImageUpload, StoredBlob};

/// Stores images on local disk under the directory served at `/uploads`.
///
/// The handle is the stored file name; the URL is built from the public base URL.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
    max_upload_bytes: usize,
}

impl LocalBlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str, max_upload_bytes: usize) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_upload_bytes,
        }
    }

    /// Only plain file names are accepted as handles.
    fn resolve(&self, handle: &str) -> Result<PathBuf, BlobError> {
        let valid = !handle.is_empty()
            && handle != "."
            && handle != ".."
            && !handle.contains(['/', '\\'])
            && !handle.contains('\0');

        if valid {
            Ok(self.root.join(handle))
        } else {
            Err(BlobError::Rejected(format!("Invalid image id '{handle}'")))
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, image: ImageUpload) -> Result<StoredBlob, BlobError> {
        image.validate(self.max_upload_bytes)?;

        tokio::fs::create_dir_all(&self.root).await?;

        let name = format!("{}.{}", uuid::Uuid::new_v4(), image.extension());
        let path = self.root.join(&name);
        tokio::fs::write(&path, &image.bytes).await?;

        info!(path = %path.display(), size = image.bytes.len(), "Stored uploaded image");

        Ok(StoredBlob {
            url: format!("{}/uploads/{}", self.public_base_url, name),
            handle: name,
        })
    }

    async fn delete(&self, handle: &str) -> Result<(), BlobError> {
        let path = self.resolve(handle)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted stored image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
