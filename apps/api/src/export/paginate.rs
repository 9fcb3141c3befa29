//! Cuts a tall element into A4 pages.
//!
//! The whole element is placed on every page at a decreasing vertical offset;
//! each page shows the band that falls inside its bounds. The first page is
//! always emitted, and another follows while element height is left over.

use serde::Serialize;

use super::render::RenderedDocument;

const EPSILON_MM: f32 = 1e-3;

/// Where the element sits on one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PagePlacement {
    pub page_index: usize,
    /// Element top relative to the page top, in mm. Zero on the first page,
    /// negative afterwards.
    pub image_top_mm: f32,
}

impl PagePlacement {
    /// Whether a point `y_mm` below the element top lands on this page.
    pub fn shows(&self, y_mm: f32, page_height_mm: f32) -> bool {
        let on_page = self.image_top_mm + y_mm;
        on_page >= -EPSILON_MM && on_page < page_height_mm - EPSILON_MM
    }
}

/// Element height once scaled to `page_width_mm`, preserving aspect ratio.
pub fn image_height_mm(document: &RenderedDocument, page_width_mm: f32) -> f32 {
    if document.width_px <= 0.0 {
        return 0.0;
    }
    document.height_px * page_width_mm / document.width_px
}

pub fn paginate(image_height_mm: f32, page_height_mm: f32) -> Vec<PagePlacement> {
    let mut placements = vec![PagePlacement {
        page_index: 0,
        image_top_mm: 0.0,
    }];
    if page_height_mm <= 0.0 {
        return placements;
    }

    let mut height_left = image_height_mm - page_height_mm;
    while height_left > EPSILON_MM {
        placements.push(PagePlacement {
            page_index: placements.len(),
            image_top_mm: height_left - image_height_mm,
        });
        height_left -= page_height_mm;
    }
    placements
}
