//! Axum route handlers for the guided-writing flow.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::guided::models::{Situation, SynthesizedDocument};
use crate::guided::session::{ConversationSession, ConversationSnapshot};
use crate::llm_client::Generated;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SituationOption {
    pub id: Situation,
    pub label: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct SelectSituationRequest {
    pub situation: Situation,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Reply to a conversational action: the new assistant text plus the full session view.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub reply: String,
    pub fallback: bool,
    pub session: ConversationSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub document: SynthesizedDocument,
    pub fallback: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/situations
pub async fn handle_list_situations() -> Json<Vec<SituationOption>> {
    Json(
        Situation::ALL
            .iter()
            .map(|s| SituationOption {
                id: *s,
                label: s.label(),
            })
            .collect(),
    )
}

/// POST /api/v1/guided
pub async fn handle_create_conversation(
    State(state): State<AppState>,
) -> (StatusCode, Json<ConversationSnapshot>) {
    let session = Arc::new(ConversationSession::new(state.gateway.clone()));
    let snapshot = session.snapshot().await;
    state.conversations.insert(session.id(), session).await;
    let active = state.conversations.len().await;
    info!(session_id = %snapshot.session_id, active, "Conversation created");
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/v1/guided/:id
pub async fn handle_get_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationSnapshot>, AppError> {
    let session = find_session(&state, id).await?;
    Ok(Json(session.snapshot().await))
}

/// DELETE /api/v1/guided/:id
pub async fn handle_delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.conversations.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Conversation {id} not found")))
    }
}

/// POST /api/v1/guided/:id/situation
pub async fn handle_select_situation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectSituationRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let reply = session.select_situation(request.situation).await?;
    Ok(Json(turn_response(&session, reply).await))
}

/// POST /api/v1/guided/:id/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let reply = session.send_user_message(&request.text).await?;
    Ok(Json(turn_response(&session, reply).await))
}

/// POST /api/v1/guided/:id/synthesize
pub async fn handle_synthesize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SynthesizeResponse>, AppError> {
    let session = find_session(&state, id).await?;
    let document = session.synthesize().await?;
    Ok(Json(SynthesizeResponse {
        fallback: document.is_fallback(),
        document: document.into_inner(),
    }))
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<ConversationSession>, AppError> {
    state
        .conversations
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Conversation {id} not found")))
}

async fn turn_response(session: &ConversationSession, reply: Generated<String>) -> TurnResponse {
    TurnResponse {
        fallback: reply.is_fallback(),
        reply: reply.into_inner(),
        session: session.snapshot().await,
    }
}
