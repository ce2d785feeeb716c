//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::Store;
use crate::services::auth_service::{AdminProfile, AuthError, AuthService, LoginResult};
use crate::services::token::TokenService;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenService,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenService) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some(admin) = self
            .store
            .verify_admin_credentials(username, password)
            .await?
        else {
            warn!(username = %username, "Failed admin login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let token = self.tokens.issue(&admin)?;
        info!(admin_id = admin.id, username = %admin.username, "Admin logged in");

        Ok(LoginResult {
            token,
            admin: AdminProfile::from(admin),
        })
    }

    async fn profile(&self, admin_id: i32) -> Result<AdminProfile, AuthError> {
        self.store
            .get_admin(admin_id)
            .await?
            .map(AdminProfile::from)
            .ok_or(AuthError::AdminNotFound)
    }
}
