//! Document Export: turns a customization result into a downloadable A4 PDF.
//!
//! Pipeline: Markdown is laid out as the preview element at 2x scale
//! (`render`), the element is cut into page bands (`paginate`), and each band
//! is drawn on its own page (`pdf`). Nothing is returned unless every step
//! succeeds.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

pub mod font_metrics;
pub mod handlers;
pub mod paginate;
pub mod pdf;
pub mod render;

pub use paginate::{image_height_mm, paginate};
pub use pdf::{FontSource, A4_HEIGHT_MM, A4_WIDTH_MM};
pub use render::{render_markdown, RenderedDocument, RENDER_SCALE};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("The document has no content to export")]
    Empty,

    #[error("Failed to load export font: {0}")]
    Font(String),

    #[error("Failed to write PDF: {0}")]
    Write(String),
}

/// Process-wide export configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub font: FontSource,
}

impl ExportSettings {
    pub fn from_config(config: &Config) -> Result<Self, ExportError> {
        let font = match &config.export_font_path {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .map_err(|e| ExportError::Font(format!("{}: {e}", path.display())))?;
                info!(path = %path.display(), "Export font loaded");
                FontSource::External(bytes)
            }
            None => {
                warn!("EXPORT_FONT_PATH not set; exported PDFs use Helvetica and cannot show CJK text");
                FontSource::Builtin
            }
        };
        Ok(Self { font })
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            font: FontSource::Builtin,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub file_name: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// `{company}-{position}-简历.pdf`, safe to use as a file name.
pub fn export_file_name(company_name: &str, position_name: &str) -> String {
    format!(
        "{}-{}-简历.pdf",
        file_name_part(company_name),
        file_name_part(position_name)
    )
}

fn file_name_part(part: &str) -> String {
    let cleaned: String = part
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Renders `markdown` and exports it. CPU-bound; call from a blocking task.
pub fn export_to_file(
    markdown: &str,
    company_name: &str,
    position_name: &str,
    settings: &ExportSettings,
) -> Result<ExportedFile, ExportError> {
    let document = render_markdown(markdown, RENDER_SCALE);
    export_rendered(&document, company_name, position_name, settings)
}

/// Paginates an already-rendered element onto A4 pages.
pub fn export_rendered(
    document: &RenderedDocument,
    company_name: &str,
    position_name: &str,
    settings: &ExportSettings,
) -> Result<ExportedFile, ExportError> {
    if document.lines.is_empty() || document.width_px <= 0.0 {
        return Err(ExportError::Empty);
    }

    if let Some(c) = document
        .lines
        .iter()
        .flat_map(|line| line.text.chars())
        .find(|c| !settings.font.can_render(*c))
    {
        return Err(ExportError::Font(format!(
            "the built-in font has no glyph for '{c}'; set EXPORT_FONT_PATH to a CJK-capable font"
        )));
    }

    let placements = paginate(image_height_mm(document, A4_WIDTH_MM), A4_HEIGHT_MM);
    let file_name = export_file_name(company_name, position_name);
    let bytes = pdf::write_pdf(&file_name, document, &placements, &settings.font)?;

    info!(
        file_name = %file_name,
        pages = placements.len(),
        bytes = bytes.len(),
        "Resume exported"
    );
    Ok(ExportedFile {
        file_name,
        bytes,
        page_count: placements.len(),
    })
}
