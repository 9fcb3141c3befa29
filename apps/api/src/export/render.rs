//! Lays out resume Markdown as the preview element the PDF is cut from.
//!
//! Coordinates are device pixels at `RENDER_SCALE` times the CSS size, so the
//! element is 794 CSS px (A4 at 96 dpi) wide before scaling.

use serde::Serialize;

use super::font_metrics::SANS_TABLE;

/// Device pixels per CSS pixel.
pub const RENDER_SCALE: f32 = 2.0;
/// Width of the preview element in CSS pixels.
pub const ELEMENT_WIDTH_CSS_PX: f32 = 794.0;

const PADDING_CSS_PX: f32 = 48.0;
const BULLET_INDENT_CSS_PX: f32 = 20.0;
const LINE_HEIGHT: f32 = 1.5;
const BULLET: &str = "• ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// `# ` / `## ` heading.
    Title,
    /// `### ` / `#### ` heading.
    Section,
    Bullet,
    Body,
}

struct BlockStyle {
    font_size: f32,
    space_before: f32,
    space_after: f32,
    indent: f32,
}

impl BlockKind {
    fn style(self) -> BlockStyle {
        match self {
            BlockKind::Title => BlockStyle {
                font_size: 24.0,
                space_before: 32.0,
                space_after: 12.0,
                indent: 0.0,
            },
            BlockKind::Section => BlockStyle {
                font_size: 20.0,
                space_before: 24.0,
                space_after: 8.0,
                indent: 0.0,
            },
            BlockKind::Bullet => BlockStyle {
                font_size: 14.0,
                space_before: 0.0,
                space_after: 0.0,
                indent: BULLET_INDENT_CSS_PX,
            },
            BlockKind::Body => BlockStyle {
                font_size: 14.0,
                space_before: 0.0,
                space_after: 0.0,
                indent: 0.0,
            },
        }
    }
}

/// One laid-out line of text. All lengths are device pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedLine {
    pub kind: BlockKind,
    pub text: String,
    pub x_px: f32,
    /// Top edge of the line box, measured from the element's top.
    pub top_px: f32,
    pub font_size_px: f32,
    pub line_height_px: f32,
}

/// The fully laid-out element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub width_px: f32,
    pub height_px: f32,
    pub lines: Vec<RenderedLine>,
}

fn classify(line: &str) -> Option<(BlockKind, &str)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let block = [
        ("#### ", BlockKind::Section),
        ("### ", BlockKind::Section),
        ("## ", BlockKind::Title),
        ("# ", BlockKind::Title),
        ("* ", BlockKind::Bullet),
        ("- ", BlockKind::Bullet),
    ]
    .into_iter()
    .find_map(|(marker, kind)| trimmed.strip_prefix(marker).map(|rest| (kind, rest)));

    Some(block.unwrap_or((BlockKind::Body, trimmed)))
}

/// Renders `markdown` at `scale` device pixels per CSS pixel.
///
/// Blank source lines leave one body line of vertical space. Inline `**`
/// emphasis markers are dropped.
pub fn render_markdown(markdown: &str, scale: f32) -> RenderedDocument {
    let width_px = ELEMENT_WIDTH_CSS_PX * scale;
    let padding = PADDING_CSS_PX * scale;
    let content_width = width_px - 2.0 * padding;
    let body_line_height = BlockKind::Body.style().font_size * LINE_HEIGHT * scale;

    let mut lines = Vec::new();
    let mut y = padding;

    for raw in markdown.lines() {
        let Some((kind, text)) = classify(raw) else {
            y += body_line_height;
            continue;
        };
        let style = kind.style();
        let font_size = style.font_size * scale;
        let line_height = font_size * LINE_HEIGHT;
        let indent = style.indent * scale;
        let text = text.replace("**", "");

        y += style.space_before * scale;
        let wrapped = SANS_TABLE.wrap(&text, (content_width - indent) / font_size);
        for (i, segment) in wrapped.into_iter().enumerate() {
            let (x, text) = match kind {
                BlockKind::Bullet if i == 0 => (
                    padding + indent - SANS_TABLE.measure_str(BULLET) * font_size,
                    format!("{BULLET}{segment}"),
                ),
                _ => (padding + indent, segment),
            };
            lines.push(RenderedLine {
                kind,
                text,
                x_px: x,
                top_px: y,
                font_size_px: font_size,
                line_height_px: line_height,
            });
            y += line_height;
        }
        y += style.space_after * scale;
    }

    RenderedDocument {
        width_px,
        height_px: y + padding,
        lines,
    }
}
