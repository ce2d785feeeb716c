use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::parse_id;
use super::{ApiError, ApiResponse, AppState};
use crate::models::lead::{Lead, LeadSummary};
use crate::services::ContactSubmission;

/// POST /contact
pub async fn submit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<LeadSummary>>), ApiError> {
    let Json(submission) = payload
        .map_err(|_| ApiError::validation("Name, email, and message are required fields"))?;

    let summary = state.shared.contact_service.submit(submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(summary)
                .with_message("Your message has been received! We will get back to you soon."),
        ),
    ))
}

/// GET /contact/admin/all
pub async fn list_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Lead>>>, ApiError> {
    let leads = state.shared.contact_service.list_all().await?;
    Ok(Json(ApiResponse::list(leads)))
}

/// GET /contact/{id}
pub async fn get_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Lead>>, ApiError> {
    let id = parse_id(&id)?;
    let lead = state.shared.contact_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(lead)))
}

/// DELETE /contact/{id}
pub async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_id(&id)?;
    if !state.shared.contact_service.delete(id).await? {
        return Err(ApiError::not_found("Contact"));
    }
    Ok(Json(ApiResponse::message("Contact deleted successfully")))
}

/// PATCH /contact/{id}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_id(&id)?;
    if !state.shared.contact_service.mark_read(id).await? {
        return Err(ApiError::not_found("Contact"));
    }
    Ok(Json(ApiResponse::message("Contact marked as read")))
}
