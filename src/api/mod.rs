use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::state::SharedState;

pub mod auth;
mod contact;
mod error;
mod health;
mod observability;
mod products;
mod types;
mod upload;
mod validation;

pub use error::{ApiError, ErrorDetail};
pub use types::*;

pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn new(shared: Arc<SharedState>, prometheus_handle: Option<PrometheusHandle>) -> Arc<Self> {
        Arc::new(Self {
            shared,
            start_time: Instant::now(),
            prometheus_handle,
        })
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = state.shared.config.server.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/contact", post(contact::submit))
        .route("/auth/login", post(auth::login))
        .route("/products", get(products::list_public))
        .route("/products/{id}", get(products::get_product))
        .route("/health", get(health::health));

    Router::new()
        .nest("/api", api_router)
        .route("/", get(health::root))
        .nest_service("/uploads", ServeDir::new(&server.uploads_path))
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            observability::error_detail_middleware,
        ))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(cors_layer(&server))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/contact/admin/all", get(contact::list_all))
        .route(
            "/contact/{id}",
            get(contact::get_contact).delete(contact::delete_contact),
        )
        .route("/contact/{id}/read", patch(contact::mark_read))
        .route("/auth/verify", get(auth::verify))
        .route("/products/admin/all", get(products::list_all))
        .route("/products", post(products::create_product))
        .route(
            "/products/{id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/upload/image", post(upload::upload_image))
        .route("/upload/image/{public_id}", delete(upload::delete_image))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

/// `["*"]` reflects the caller's origin with credentials allowed; any other
/// list is an exact allow-list.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origin = if server.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Route not found")),
    )
}
