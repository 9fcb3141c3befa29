//! Axum route handlers for the customization flow.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::customization::models::CustomizationResult;
use crate::customization::session::{CustomizationSession, CustomizationSnapshot};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BaseResumeRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Omit to use the stored base resume (typed earlier or uploaded).
    #[serde(default)]
    pub base_resume: Option<String>,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub result: CustomizationResult,
    pub fallback: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/customizations
pub async fn handle_create_customization(
    State(state): State<AppState>,
) -> (StatusCode, Json<CustomizationSnapshot>) {
    let session = Arc::new(CustomizationSession::new(state.gateway.clone()));
    let snapshot = session.snapshot().await;
    state.customizations.insert(session.id(), session).await;
    let active = state.customizations.len().await;
    info!(session_id = %snapshot.session_id, active, "Customization session created");
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/v1/customizations/:id
pub async fn handle_get_customization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomizationSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.snapshot().await))
}

/// DELETE /api/v1/customizations/:id
pub async fn handle_delete_customization(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.customizations.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Customization session {id} not found")))
    }
}

/// PUT /api/v1/customizations/:id/base-resume
pub async fn handle_set_base_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<BaseResumeRequest>,
) -> Result<Json<CustomizationSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    session.set_base_resume(request.text).await;
    Ok(Json(session.snapshot().await))
}

/// POST /api/v1/customizations/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let result = session
        .submit(request.base_resume, request.job_description)
        .await?;
    Ok(Json(SubmitResponse {
        fallback: result.is_fallback(),
        result: result.into_inner(),
    }))
}

pub(crate) async fn find_session(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<CustomizationSession>, AppError> {
    state
        .customizations
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Customization session {id} not found")))
}
