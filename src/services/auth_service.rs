//! Domain service for administrator authentication.
//!
//! Handles login against the credential store and profile lookup for the
//! token-verification endpoint.

use serde::Serialize;
use thiserror::Error;

use crate::db::DbFailure;
use crate::models::admin::Admin;
use crate::services::token::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    /// Unknown username and wrong password are deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin not found")]
    AdminNotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Database(DbFailure),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(DbFailure::classify(&err))
    }
}

/// Public part of an administrator, as returned to the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<Admin> for AdminProfile {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            email: admin.email,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub admin: AdminProfile,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for blank input and
    /// [`AuthError::InvalidCredentials`] if login fails.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Looks up the token subject in the credential store.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AdminNotFound`] if the administrator was removed after the token was issued.
    async fn profile(&self, admin_id: i32) -> Result<AdminProfile, AuthError>;
}
