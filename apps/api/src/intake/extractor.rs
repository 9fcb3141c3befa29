//! Page-by-page text extraction backends.

use crate::intake::IntakeError;

/// Extracts the text fragments of every page, in page order.
///
/// Implementations are synchronous and may be CPU-heavy; callers run them
/// on the blocking pool.
pub trait PageTextSource: Send + Sync {
    fn page_fragments(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, IntakeError>;
}

/// `pdf-extract` backed source. Each non-blank line of a page is one fragment.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextSource;

impl PageTextSource for PdfTextSource {
    fn page_fragments(&self, bytes: &[u8]) -> Result<Vec<Vec<String>>, IntakeError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| IntakeError::Corrupt(e.to_string()))?;
        Ok(pages.iter().map(|page| page_to_fragments(page)).collect())
    }
}

fn page_to_fragments(page: &str) -> Vec<String> {
    page.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
