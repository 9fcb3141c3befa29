//! Document Intake: turns an uploaded resume file into base-resume text.
//!
//! Byte-level parsing is delegated to a `PageTextSource`; this module owns the
//! type check, the page/fragment joining rules, and what happens to the
//! session's base resume on success or failure.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::customization::CustomizationSession;

pub mod extractor;
pub mod handlers;

pub use extractor::{PageTextSource, PdfTextSource};

/// The only declared content type accepted for upload.
pub const SUPPORTED_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Unsupported file type '{0}': please upload a PDF file")]
    UnsupportedType(String),

    #[error("The upload did not include a `file` field")]
    MissingFile,

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Could not read the PDF: {0}")]
    Corrupt(String),

    #[error("The PDF contains no extractable text")]
    NoText,
}

/// A file as received from the user. Lives only until its text is extracted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestedResume {
    pub file_name: String,
    pub text: String,
    pub page_count: usize,
}

fn is_supported(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(SUPPORTED_CONTENT_TYPE))
}

/// Joins fragments of a page with a space, then pages with a blank line.
pub fn join_pages(pages: &[Vec<String>]) -> String {
    pages
        .iter()
        .map(|fragments| fragments.join(" "))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extracts plain text from `upload`, page order preserved.
pub async fn extract_text(
    upload: &UploadedDocument,
    source: Arc<dyn PageTextSource>,
) -> Result<IngestedResume, IntakeError> {
    let declared = upload.content_type.as_deref().unwrap_or("unknown");
    if !is_supported(declared) {
        return Err(IntakeError::UnsupportedType(declared.to_string()));
    }
    if upload.bytes.is_empty() {
        return Err(IntakeError::Corrupt("file is empty".to_string()));
    }

    // Parsing is CPU-bound and may panic on hostile input; keep it off the async workers.
    let bytes = upload.bytes.clone();
    let pages = tokio::task::spawn_blocking(move || source.page_fragments(&bytes))
        .await
        .map_err(|e| IntakeError::Corrupt(format!("parser aborted: {e}")))??;

    let text = join_pages(&pages);
    if text.trim().is_empty() {
        return Err(IntakeError::NoText);
    }

    Ok(IngestedResume {
        file_name: upload.file_name.clone(),
        text,
        page_count: pages.len(),
    })
}

/// Extracts `upload` into the session's base resume.
///
/// Success overwrites the base resume in full; any failure clears it.
pub async fn ingest_upload(
    session: &CustomizationSession,
    upload: Result<UploadedDocument, IntakeError>,
    source: Arc<dyn PageTextSource>,
) -> Result<IngestedResume, IntakeError> {
    let extracted = match upload {
        Ok(upload) => extract_text(&upload, source).await,
        Err(e) => Err(e),
    };

    match extracted {
        Ok(resume) => {
            session
                .load_base_resume(resume.file_name.clone(), resume.text.clone())
                .await;
            info!(
                session_id = %session.id(),
                file = %resume.file_name,
                pages = resume.page_count,
                "Base resume loaded from upload"
            );
            Ok(resume)
        }
        Err(e) => {
            session.clear_base_resume().await;
            warn!(session_id = %session.id(), error = %e, "Upload rejected, base resume cleared");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGateway;

    /// Returns canned pages, or fails like a corrupt file.
    struct FakePages(Option<Vec<Vec<String>>>);

    impl PageTextSource for FakePages {
        fn page_fragments(&self, _bytes: &[u8]) -> Result<Vec<Vec<String>>, IntakeError> {
            self.0
                .clone()
                .ok_or_else(|| IntakeError::Corrupt("bad xref table".to_string()))
        }
    }

    struct PanickingSource;

    impl PageTextSource for PanickingSource {
        fn page_fragments(&self, _bytes: &[u8]) -> Result<Vec<Vec<String>>, IntakeError> {
            panic!("parser blew up");
        }
    }

    fn pages(n: usize) -> Vec<Vec<String>> {
        (1..=n)
            .map(|i| vec![format!("第{i}页"), "内容".to_string()])
            .collect()
    }

    fn pdf_upload() -> UploadedDocument {
        UploadedDocument {
            file_name: "resume.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: Bytes::from_static(b"%PDF-1.7 fake"),
        }
    }

    #[tokio::test]
    async fn test_n_pages_yield_n_segments_in_order() {
        let source = Arc::new(FakePages(Some(pages(4))));
        let resume = extract_text(&pdf_upload(), source).await.unwrap();

        let segments: Vec<&str> = resume.text.split("\n\n").collect();
        assert_eq!(segments, vec!["第1页 内容", "第2页 内容", "第3页 内容", "第4页 内容"]);
        assert_eq!(resume.page_count, 4);
    }

    #[tokio::test]
    async fn test_non_pdf_is_rejected_before_parsing() {
        let mut upload = pdf_upload();
        upload.content_type = Some("image/png".to_string());
        let err = extract_text(&upload, Arc::new(PanickingSource))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedType(t) if t == "image/png"));

        upload.content_type = None;
        let err = extract_text(&upload, Arc::new(PanickingSource))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn test_content_type_parameters_are_ignored() {
        let mut upload = pdf_upload();
        upload.content_type = Some("Application/PDF; charset=binary".to_string());
        let resume = extract_text(&upload, Arc::new(FakePages(Some(pages(1)))))
            .await
            .unwrap();
        assert_eq!(resume.text, "第1页 内容");
    }

    #[tokio::test]
    async fn test_parser_panic_is_reported_as_corrupt() {
        let err = extract_text(&pdf_upload(), Arc::new(PanickingSource))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_textless_pdf_is_rejected() {
        let blank = vec![vec![], vec![]];
        let err = extract_text(&pdf_upload(), Arc::new(FakePages(Some(blank))))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::NoText));
    }

    #[tokio::test]
    async fn test_ingest_overwrites_then_failure_clears() {
        let session = CustomizationSession::new(Arc::new(ScriptedGateway::new()));
        session.set_base_resume("手动输入的旧简历".to_string()).await;

        ingest_upload(&session, Ok(pdf_upload()), Arc::new(FakePages(Some(pages(2)))))
            .await
            .unwrap();
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.base_resume, "第1页 内容\n\n第2页 内容");
        assert_eq!(snapshot.base_resume_source.as_deref(), Some("resume.pdf"));

        let err = ingest_upload(&session, Ok(pdf_upload()), Arc::new(FakePages(None)))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Corrupt(_)));
        let snapshot = session.snapshot().await;
        assert!(snapshot.base_resume.is_empty());
        assert!(snapshot.base_resume_source.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_field_clears_base_resume() {
        let session = CustomizationSession::new(Arc::new(ScriptedGateway::new()));
        session.set_base_resume("旧简历".to_string()).await;
        let err = ingest_upload(
            &session,
            Err(IntakeError::MissingFile),
            Arc::new(FakePages(Some(pages(1)))),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, IntakeError::MissingFile));
        assert!(session.snapshot().await.base_resume.is_empty());
    }
}
