//! Axum handler for PDF export.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::customization::handlers::find_session;
use crate::errors::AppError;
use crate::export::export_to_file;
use crate::state::AppState;

/// GET /api/v1/customizations/:id/export
///
/// Returns the customized resume as a PDF attachment.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = find_session(&state, id).await?;
    let result = session
        .result()
        .await
        .ok_or_else(|| AppError::NotFound("No customized resume to export yet".to_string()))?;

    let settings = state.export.clone();
    let exported = tokio::task::spawn_blocking(move || {
        export_to_file(
            &result.customized_resume,
            &result.company_name,
            &result.position_name,
            &settings,
        )
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Export task failed: {e}")))??;

    let disposition = format!(
        "attachment; filename=\"resume.pdf\"; filename*=UTF-8''{}",
        urlencoding::encode(&exported.file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.bytes,
    )
        .into_response())
}
