//! Axum handler for resume uploads.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use uuid::Uuid;

use crate::customization::handlers::find_session;
use crate::errors::AppError;
use crate::intake::{ingest_upload, IngestedResume, IntakeError, UploadedDocument};
use crate::state::AppState;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// POST /api/v1/customizations/:id/upload
///
/// Replaces the session's base resume with the uploaded PDF's text.
/// Any failure leaves the base resume empty.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<IngestedResume>, AppError> {
    let session = find_session(&state, id).await?;

    let upload = read_upload(&mut multipart).await;
    let resume = ingest_upload(&session, upload, state.text_source.clone()).await?;
    Ok(Json(resume))
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadedDocument, IntakeError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IntakeError::Multipart(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| IntakeError::Multipart(e.to_string()))?;

        return Ok(UploadedDocument {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(IntakeError::MissingFile)
}
