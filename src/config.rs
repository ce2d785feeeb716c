use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub database: DatabaseConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,

    pub mail: MailConfig,

    pub blob: BlobConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Business name used in mail subjects and footers.
    pub site_name: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads. 0 uses the number of CPU cores.
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            site_name: "Bharani Scales".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite:` or `postgres://` connection string
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/bharani.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// `["*"]` reflects any request origin. Anything else is an explicit allow-list.
    pub cors_allowed_origins: Vec<String>,

    /// Ceiling for request bodies, including multipart uploads.
    pub body_limit_bytes: usize,

    /// Directory served at `/uploads` and used by the local blob backend.
    pub uploads_path: String,

    /// Base URL used to build links to locally stored uploads.
    pub public_base_url: String,

    /// Include internal error details in error envelopes. Development only.
    pub expose_error_details: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_allowed_origins: vec!["*".to_string()],
            body_limit_bytes: 10 * 1024 * 1024,
            uploads_path: "uploads".to_string(),
            public_base_url: "http://localhost:5000".to_string(),
            expose_error_details: false,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for bearer tokens. Generated per process when empty.
    pub jwt_secret: String,

    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// When false, notifications are logged and dropped.
    pub enabled: bool,

    pub smtp_host: String,

    pub smtp_port: u16,

    pub smtp_username: String,

    pub smtp_password: String,

    pub from_address: String,

    /// Recipient of new-lead notifications.
    pub admin_email: String,

    pub timeout_seconds: u64,

    /// Offset applied to the "received on" timestamp (minutes east of UTC).
    pub timezone_offset_minutes: i32,

    /// Capacity of the background notification queue.
    pub queue_capacity: usize,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "smtp.sendgrid.net".to_string(),
            smtp_port: 587,
            smtp_username: "apikey".to_string(),
            smtp_password: String::new(),
            from_address: "noreply@bharaniscales.com".to_string(),
            admin_email: "admin@bharaniscales.com".to_string(),
            timeout_seconds: 15,
            timezone_offset_minutes: 330,
            queue_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobProvider {
    Local,
    Cloudinary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    pub provider: BlobProvider,

    pub cloud_name: String,

    pub api_key: String,

    pub api_secret: String,

    /// Folder prefix for uploaded product images.
    pub folder: String,

    pub max_upload_bytes: usize,

    pub timeout_seconds: u64,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            provider: BlobProvider::Local,
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "bharani-scales/products".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            security: SecurityConfig::default(),
            mail: MailConfig::default(),
            blob: BlobConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads the first config file found, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Overrides file settings with deployment environment variables.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = var(key).filter(|v| !v.is_empty()) {
                *target = value;
            }
        };

        set(&mut self.database.url, "DATABASE_URL");
        set(&mut self.auth.jwt_secret, "JWT_SECRET");
        set(&mut self.general.log_level, "LOG_LEVEL");
        set(&mut self.mail.smtp_host, "SMTP_HOST");
        set(&mut self.mail.smtp_username, "SMTP_USERNAME");
        set(&mut self.mail.smtp_password, "SMTP_PASSWORD");
        set(&mut self.mail.from_address, "MAIL_FROM");
        set(&mut self.mail.admin_email, "ADMIN_EMAIL");
        set(&mut self.blob.cloud_name, "CLOUDINARY_CLOUD_NAME");
        set(&mut self.blob.api_key, "CLOUDINARY_API_KEY");
        set(&mut self.blob.api_secret, "CLOUDINARY_API_SECRET");
        set(&mut self.server.public_base_url, "PUBLIC_BASE_URL");

        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(port) = var("SMTP_PORT").and_then(|p| p.parse().ok()) {
            self.mail.smtp_port = port;
        }

        if let Some(origins) = var("CORS_ALLOWED_ORIGINS") {
            self.server.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToString::to_string)
                .collect();
        } else if let Some(client) = var("CLIENT_URL").filter(|c| !c.is_empty())
            && !self.server.allows_any_origin()
            && !self.server.cors_allowed_origins.contains(&client)
        {
            self.server.cors_allowed_origins.push(client);
        }

        if var("SMTP_PASSWORD").is_some_and(|p| !p.is_empty()) {
            self.mail.enabled = true;
        }

        if !self.blob.cloud_name.is_empty()
            && !self.blob.api_key.is_empty()
            && !self.blob.api_secret.is_empty()
        {
            self.blob.provider = BlobProvider::Cloudinary;
        }

        if var("APP_ENV").is_some_and(|env| env == "development") {
            self.server.expose_error_details = true;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("bharani").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".bharani").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!("database.min_connections cannot exceed database.max_connections");
        }

        if self.auth.token_ttl_hours <= 0 {
            anyhow::bail!("auth.token_ttl_hours must be > 0");
        }

        if self.mail.enabled && (self.mail.smtp_host.is_empty() || self.mail.admin_email.is_empty())
        {
            anyhow::bail!("SMTP host and admin email are required when mail is enabled");
        }

        if self.blob.provider == BlobProvider::Cloudinary
            && (self.blob.cloud_name.is_empty()
                || self.blob.api_key.is_empty()
                || self.blob.api_secret.is_empty())
        {
            anyhow::bail!("Cloudinary cloud name, API key and API secret are required");
        }

        if self.mail.queue_capacity == 0 {
            anyhow::bail!("mail.queue_capacity must be > 0");
        }

        if self.auth.jwt_secret.is_empty() {
            warn!("No JWT secret configured; tokens will not survive a restart");
        } else if self.auth.jwt_secret.len() < 32 {
            warn!("JWT secret is shorter than 32 bytes");
        }

        Ok(())
    }
}
