use serde::{Deserialize, Serialize};

/// Uniform response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let mut response = Self::success(items);
        response.count = response.data.as_ref().map(Vec::len);
        response
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            data: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            count: None,
            data: None,
            error: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AdminEnvelope<T> {
    pub admin: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedImageDto {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "publicId")]
    pub public_id: String,
}

/// Upload result. `imageUrl` and `publicId` are repeated at the top level for
/// admin clients that read them there.
#[derive(Debug, Serialize)]
pub struct UploadedImageResponse {
    #[serde(flatten)]
    pub envelope: ApiResponse<UploadedImageDto>,
    #[serde(flatten)]
    pub image: UploadedImageDto,
}

impl UploadedImageResponse {
    pub fn new(image: UploadedImageDto) -> Self {
        Self {
            envelope: ApiResponse::success(image.clone())
                .with_message("Image uploaded successfully"),
            image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: String,
    /// Seconds since startup.
    pub uptime: f64,
}

#[derive(Debug, Serialize)]
pub struct BannerDto {
    pub message: String,
    pub status: &'static str,
    pub timestamp: String,
}
