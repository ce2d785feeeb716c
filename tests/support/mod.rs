#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bharani::api::{AppState, router};
use bharani::clients::{
    BlobError, BlobStore, ImageUpload, MailError, MailTransport, OutboundMail, StoredBlob,
};
use bharani::config::Config;
use bharani::db::Store;
use bharani::models::admin::Admin;
use bharani::state::SharedState;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Statement};
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct-horse";
pub const ADMIN_EMAIL: &str = "admin@example.com";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutboundMail>>,
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent.lock().unwrap().clone()
    }
}

/// Every send fails as if the relay rejected the address.
pub struct FailingMailer;

#[async_trait]
impl MailTransport for FailingMailer {
    async fn send(&self, mail: &OutboundMail) -> Result<(), MailError> {
        Err(MailError::InvalidAddress(mail.to.clone()))
    }
}

/// In-memory blob store that records every call.
#[derive(Default)]
pub struct FakeBlobStore {
    pub uploads: Mutex<Vec<StoredBlob>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail_uploads: bool,
    pub fail_deletes: bool,
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn upload(&self, image: ImageUpload) -> Result<StoredBlob, BlobError> {
        image.validate(5 * 1024 * 1024)?;
        if self.fail_uploads {
            return Err(BlobError::Unavailable("connection refused".to_string()));
        }

        let mut uploads = self.uploads.lock().unwrap();
        let handle = format!("products/fake-{}", uploads.len() + 1);
        let stored = StoredBlob {
            url: format!("https://cdn.example.com/{handle}.{}", image.extension()),
            handle,
        };
        uploads.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, handle: &str) -> Result<(), BlobError> {
        self.deletes.lock().unwrap().push(handle.to_string());
        if self.fail_deletes {
            return Err(BlobError::Provider("destroy failed".to_string()));
        }
        Ok(())
    }
}

impl FakeBlobStore {
    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

pub struct TestApp {
    pub router: Router,
    pub shared: Arc<SharedState>,
    pub mailer: Arc<RecordingMailer>,
    pub blobs: Arc<FakeBlobStore>,
    pub admin: Admin,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Config::default(), FakeBlobStore::default()).await
}

pub async fn spawn_app_with(mut config: Config, blobs: FakeBlobStore) -> TestApp {
    // Cheap hashing keeps the suite fast
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.auth.jwt_secret = "integration-test-secret-integration-test".to_string();
    config.observability.metrics_enabled = false;

    let store = Store::in_memory().await.expect("Failed to open store");
    let admin = store
        .replace_admin(ADMIN_USERNAME, ADMIN_PASSWORD, ADMIN_EMAIL, &config.security)
        .await
        .expect("Failed to seed admin");

    let mailer = Arc::new(RecordingMailer::default());
    let blobs = Arc::new(blobs);

    let shared = Arc::new(SharedState::from_parts(
        config,
        store,
        mailer.clone(),
        blobs.clone(),
    ));
    let router = router(AppState::new(shared.clone(), None));

    TestApp {
        router,
        shared,
        mailer,
        blobs,
        admin,
    }
}

impl TestApp {
    pub fn token(&self) -> String {
        self.shared.tokens.issue(&self.admin).expect("Failed to issue token")
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_authed(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: &serde_json::Value,
        authed: bool,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if authed {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token()));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn authed(&self, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Runs raw SQL against the test database, e.g. to install failure triggers.
    pub async fn execute_sql(&self, sql: &str) {
        let conn = &self.shared.store.conn;
        conn.execute(Statement::from_string(
            conn.get_database_backend(),
            sql.to_string(),
        ))
        .await
        .expect("Failed to execute SQL");
    }

    /// Waits for every queued notification to be delivered.
    pub async fn drain_notifications(&self) {
        self.shared.notifications.shutdown().await;
    }
}

/// Builds a `multipart/form-data` body from text fields and an optional file part.
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    let boundary = "----bharani-test-boundary";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((name, file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}
