//! Bearer tokens for the admin surface.
//!
//! Tokens are HS256 JWTs carrying the administrator's identity. Verification
//! checks signature and expiry only; it never touches the credential store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::AuthConfig;
use crate::models::admin::Admin;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature does not match this server's secret.
    #[error("Token signature is invalid")]
    Unauthorized,

    #[error("Token has expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: i32,
    pub username: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Uses the configured secret, or a random one for this process when none is set.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let ttl = Duration::hours(config.token_ttl_hours);

        if config.jwt_secret.is_empty() {
            use rand::Rng;

            warn!("JWT secret not configured, generating an ephemeral one");
            let secret: [u8; 32] = rand::rng().random();
            Self::new(&secret, ttl)
        } else {
            Self::new(config.jwt_secret.as_bytes(), ttl)
        }
    }

    pub fn issue(&self, admin: &Admin) -> Result<String, TokenError> {
        self.issue_at(admin, Utc::now())
    }

    pub fn issue_at(&self, admin: &Admin, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = AdminClaims {
            sub: admin.id,
            username: admin.username.clone(),
            email: admin.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<AdminClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<AdminClaims, TokenError> {
        // Expiry is checked against `now` below, without leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<AdminClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::Unauthorized,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
