use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, SecurityConfig};
use crate::models::admin::Admin;
use crate::models::lead::{Lead, NewLead};
use crate::models::product::{Product, ProductRecord};

pub mod errors;
pub mod migrator;
pub mod repositories;

pub use errors::DbFailure;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::with_pool_options(&config.url, config.max_connections, config.min_connections).await
    }

    /// Single-connection in-memory SQLite store. Every pooled connection to
    /// `:memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool_options("sqlite::memory:", 1, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:")
                .split('?')
                .next()
                .unwrap_or_default();
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Closes the pool. Pending checkouts fail afterwards.
    pub async fn close(self) -> Result<()> {
        self.conn
            .close()
            .await
            .context("Failed to close database pool")
    }

    fn admin_repo(&self) -> repositories::admin::AdminRepository {
        repositories::admin::AdminRepository::new(self.conn.clone())
    }

    fn contact_repo(&self) -> repositories::contact::ContactRepository {
        repositories::contact::ContactRepository::new(self.conn.clone())
    }

    fn product_repo(&self) -> repositories::product::ProductRepository {
        repositories::product::ProductRepository::new(self.conn.clone())
    }

    // Administrators

    pub async fn get_admin(&self, id: i32) -> Result<Option<Admin>> {
        self.admin_repo().get_by_id(id).await
    }

    pub async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>> {
        self.admin_repo().get_by_username(username).await
    }

    pub async fn verify_admin_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Admin>> {
        self.admin_repo()
            .verify_credentials(username, password)
            .await
    }

    pub async fn replace_admin(
        &self,
        username: &str,
        password: &str,
        email: &str,
        security: &SecurityConfig,
    ) -> Result<Admin> {
        self.admin_repo()
            .replace(username, password, email, security)
            .await
    }

    // Leads

    pub async fn create_lead(&self, lead: NewLead) -> Result<Lead> {
        self.contact_repo().create(lead).await
    }

    pub async fn list_leads(&self) -> Result<Vec<Lead>> {
        self.contact_repo().list_all().await
    }

    pub async fn get_lead(&self, id: i32) -> Result<Option<Lead>> {
        self.contact_repo().get(id).await
    }

    pub async fn delete_lead(&self, id: i32) -> Result<bool> {
        self.contact_repo().delete(id).await
    }

    pub async fn mark_lead_read(&self, id: i32) -> Result<bool> {
        self.contact_repo().mark_read(id).await
    }

    // Products

    pub async fn list_products(&self, include_inactive: bool) -> Result<Vec<Product>> {
        self.product_repo().list(include_inactive).await
    }

    pub async fn get_product(&self, id: i32) -> Result<Option<Product>> {
        self.product_repo().get(id).await
    }

    pub async fn insert_product(&self, record: ProductRecord) -> Result<Product> {
        self.product_repo().insert(record).await
    }

    pub async fn update_product(&self, id: i32, record: ProductRecord) -> Result<Option<Product>> {
        self.product_repo().update(id, record).await
    }

    pub async fn delete_product(&self, id: i32) -> Result<bool> {
        self.product_repo().delete(id).await
    }
}
