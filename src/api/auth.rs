use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::{AdminEnvelope, ApiError, ApiResponse, AppState, LoginRequest};
use crate::services::{AdminClaims, AdminProfile, LoginResult};

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <token>`. On success the verified
/// [`AdminClaims`] are available to handlers as a request extension.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_bearer(request.headers()) else {
        return Err(ApiError::unauthorized("Access denied. No token provided."));
    };

    let claims = state.shared.tokens.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        ApiError::from(e)
    })?;

    tracing::Span::current().record("user_id", claims.sub);
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    (scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty())
        .then(|| token.trim().to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    let Json(payload) =
        payload.map_err(|_| ApiError::validation("Username and password are required"))?;

    let result = state
        .shared
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(
        ApiResponse::success(result).with_message("Login successful"),
    ))
}

/// GET /auth/verify
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AdminClaims>,
) -> Result<Json<ApiResponse<AdminEnvelope<AdminProfile>>>, ApiError> {
    let admin = state.shared.auth_service.profile(claims.sub).await?;
    Ok(Json(ApiResponse::success(AdminEnvelope { admin })))
}
