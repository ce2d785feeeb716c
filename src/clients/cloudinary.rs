use async_trait::async_trait;
use reqwest::{Client, multipart};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clients::blob::{BlobError, BlobStore, ImageUpload, StoredBlob};
use crate::config::BlobConfig;

const DEFAULT_API_URL: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub base_url: String,

    pub cloud_name: String,

    pub api_key: String,

    pub api_secret: String,

    pub folder: String,

    pub max_upload_bytes: usize,

    pub timeout: Duration,
}

impl From<&BlobConfig> for CloudinaryConfig {
    fn from(config: &BlobConfig) -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
            max_upload_bytes: config.max_upload_bytes,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Signed-upload client for the Cloudinary image API.
pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, BlobError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("Bharani/1.0")
            .build()
            .map_err(|e| BlobError::Provider(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    fn timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    async fn read_error(response: reqwest::Response) -> BlobError {
        let status = response.status();
        let message = response
            .json::<ErrorResponse>()
            .await
            .map_or_else(|_| status.to_string(), |body| body.error.message);

        if status.is_server_error() {
            BlobError::Unavailable(message)
        } else {
            BlobError::Provider(message)
        }
    }
}

/// Hex SHA-256 over the parameters sorted by key, joined as `k=v&k=v`, with the secret appended.
#[must_use]
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by_key(|(k, _)| *k);

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl BlobStore for CloudinaryClient {
    async fn upload(&self, image: ImageUpload) -> Result<StoredBlob, BlobError> {
        image.validate(self.config.max_upload_bytes)?;

        let timestamp = Self::timestamp();
        let signature = sign(
            &[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let file_name = image
            .file_name
            .clone()
            .unwrap_or_else(|| format!("upload.{}", image.extension()));
        let mime = image.mime().unwrap_or_else(|| "image/jpeg".to_string());

        let part = multipart::Part::bytes(image.bytes)
            .file_name(file_name)
            .mime_str(&mime)
            .map_err(|e| BlobError::Rejected(format!("Invalid content type: {e}")))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: UploadResponse = response.json().await?;
        info!(public_id = %body.public_id, "Uploaded image to Cloudinary");

        Ok(StoredBlob {
            url: body.secure_url,
            handle: body.public_id,
        })
    }

    async fn delete(&self, handle: &str) -> Result<(), BlobError> {
        let timestamp = Self::timestamp();
        let signature = sign(
            &[("public_id", handle), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", handle),
            ("api_key", self.config.api_key.as_str()),
            ("timestamp", timestamp.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => {
                debug!(public_id = %handle, "Deleted image from Cloudinary");
                Ok(())
            }
            "not found" => {
                warn!(public_id = %handle, "Image already absent from Cloudinary");
                Ok(())
            }
            other => Err(BlobError::Provider(format!(
                "Unexpected destroy result '{other}' for {handle}"
            ))),
        }
    }
}
