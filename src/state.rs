use std::sync::Arc;
use tracing::info;

use crate::clients::{
    BlobStore, CloudinaryClient, CloudinaryConfig, DisabledMailer, LocalBlobStore, MailTransport,
    SmtpMailer,
};
use crate::config::{BlobProvider, Config};
use crate::db::Store;
use crate::services::{
    AuthService, ContactService, LeadTemplates, NotificationQueue, ProductService,
    SeaOrmAuthService, SeaOrmContactService, SeaOrmProductService, TokenService,
};

fn build_mailer(config: &Config) -> anyhow::Result<Arc<dyn MailTransport>> {
    if !config.mail.enabled {
        info!("SMTP credentials not configured, outbound mail disabled");
        return Ok(Arc::new(DisabledMailer));
    }

    let mailer = SmtpMailer::new(&config.mail, &config.general.site_name)
        .map_err(|e| anyhow::anyhow!("Failed to configure SMTP transport: {e}"))?;
    info!(
        host = %config.mail.smtp_host,
        port = config.mail.smtp_port,
        "SMTP mail transport configured"
    );
    Ok(Arc::new(mailer))
}

fn build_blob_store(config: &Config) -> anyhow::Result<Arc<dyn BlobStore>> {
    match config.blob.provider {
        BlobProvider::Cloudinary => {
            let client = CloudinaryClient::new(CloudinaryConfig::from(&config.blob))
                .map_err(|e| anyhow::anyhow!("Failed to configure Cloudinary: {e}"))?;
            info!(cloud = %config.blob.cloud_name, "Using Cloudinary image storage");
            Ok(Arc::new(client))
        }
        BlobProvider::Local => {
            info!(path = %config.server.uploads_path, "Using local image storage");
            Ok(Arc::new(LocalBlobStore::new(
                &config.server.uploads_path,
                &config.server.public_base_url,
                config.blob.max_upload_bytes,
            )))
        }
    }
}

/// Process-wide dependencies, constructed once at startup and injected into the router.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: TokenService,

    pub notifications: Arc<NotificationQueue>,

    pub auth_service: Arc<dyn AuthService>,

    pub contact_service: Arc<dyn ContactService>,

    pub product_service: Arc<dyn ProductService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::from_config(&config.database).await?;
        let mailer = build_mailer(&config)?;
        let blobs = build_blob_store(&config)?;

        Ok(Self::from_parts(config, store, mailer, blobs))
    }

    /// Wires services from explicit adapters. Must run inside a tokio runtime.
    #[must_use]
    pub fn from_parts(
        config: Config,
        store: Store,
        mailer: Arc<dyn MailTransport>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let tokens = TokenService::from_config(&config.auth);

        let notifications = Arc::new(NotificationQueue::start(
            mailer,
            LeadTemplates::from_config(&config),
            config.mail.queue_capacity,
        ));

        let auth_service =
            Arc::new(SeaOrmAuthService::new(store.clone(), tokens.clone())) as Arc<dyn AuthService>;

        let contact_service = Arc::new(SeaOrmContactService::new(
            store.clone(),
            notifications.clone(),
        )) as Arc<dyn ContactService>;

        let product_service =
            Arc::new(SeaOrmProductService::new(store.clone(), blobs)) as Arc<dyn ProductService>;

        Self {
            config: Arc::new(config),
            store,
            tokens,
            notifications,
            auth_service,
            contact_service,
            product_service,
        }
    }

    /// Drains pending notifications, then closes the pool.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.notifications.shutdown().await;
        self.store.close().await
    }
}
