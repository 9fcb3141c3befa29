//! PDF writer: draws each page's band of the rendered element with printpdf.

use std::io::Cursor;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use super::paginate::PagePlacement;
use super::render::RenderedDocument;
use super::ExportError;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

const PT_PER_MM: f32 = 72.0 / 25.4;
/// Baseline position within the font's em box.
const ASCENT: f32 = 0.8;
const LAYER_NAME: &str = "Resume";

/// Font the PDF text is set in.
#[derive(Debug, Clone)]
pub enum FontSource {
    /// Helvetica. Latin text only.
    Builtin,
    /// TrueType/OpenType bytes, needed for CJK glyphs.
    External(Vec<u8>),
}

/// Characters WinAnsiEncoding adds beyond Latin-1.
const WIN_ANSI_EXTRAS: &[char] = &[
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•',
    '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

impl FontSource {
    /// Whether `c` has a glyph in this font. Embedded fonts are trusted.
    pub fn can_render(&self, c: char) -> bool {
        match self {
            FontSource::Builtin => {
                c.is_ascii() || ('\u{A0}'..='\u{FF}').contains(&c) || WIN_ANSI_EXTRAS.contains(&c)
            }
            FontSource::External(_) => true,
        }
    }
}

fn load_font(
    pdf: &PdfDocumentReference,
    font: &FontSource,
) -> Result<IndirectFontRef, ExportError> {
    match font {
        FontSource::Builtin => pdf.add_builtin_font(BuiltinFont::Helvetica),
        FontSource::External(bytes) => pdf.add_external_font(Cursor::new(bytes.as_slice())),
    }
    .map_err(|e| ExportError::Font(format!("{e:?}")))
}

/// Writes one A4 page per placement and returns the PDF bytes.
pub fn write_pdf(
    title: &str,
    document: &RenderedDocument,
    placements: &[PagePlacement],
    font: &FontSource,
) -> Result<Vec<u8>, ExportError> {
    let mm_per_px = A4_WIDTH_MM / document.width_px;
    let (pdf, first_page, first_layer) =
        PdfDocument::new(title, Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), LAYER_NAME);
    let font = load_font(&pdf, font)?;

    for placement in placements {
        let (page, layer) = if placement.page_index == 0 {
            (first_page, first_layer)
        } else {
            pdf.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), LAYER_NAME)
        };
        let layer = pdf.get_page(page).get_layer(layer);

        for line in &document.lines {
            let font_mm = line.font_size_px * mm_per_px;
            let line_mm = line.line_height_px * mm_per_px;
            let baseline_mm =
                line.top_px * mm_per_px + (line_mm - font_mm) / 2.0 + font_mm * ASCENT;
            if !placement.shows(baseline_mm, A4_HEIGHT_MM) {
                continue;
            }
            let y_from_top = placement.image_top_mm + baseline_mm;
            layer.use_text(
                line.text.clone(),
                font_mm * PT_PER_MM,
                Mm(line.x_px * mm_per_px),
                Mm(A4_HEIGHT_MM - y_from_top),
                &font,
            );
        }
    }

    pdf.save_to_bytes()
        .map_err(|e| ExportError::Write(format!("{e:?}")))
}
