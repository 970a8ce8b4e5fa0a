//! Results of a comparison run.

use image::RgbaImage;
use serde::Serialize;

use crate::align::Side;
use crate::text::EditScript;

/// Everything a comparison run produced.
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    /// Whole-document edit script, semantically cleaned up.
    pub whole: EditScript,

    /// Whether the paginated stages ran.
    pub paginated: bool,

    /// Per-page diffs in ascending page order: pages with significant
    /// differences plus every leftover page.
    pub pages: Vec<PageDiff>,

    /// Visual comparison result, if that stage was enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualDiff>,

    /// Human-readable summary.
    pub summary: String,
}

impl DiffReport {
    /// Whether the whole-document texts differ at all.
    pub fn has_textual_differences(&self) -> bool {
        !self.whole.is_identical()
    }

    /// Whether any page differs visually.
    pub fn has_visual_differences(&self) -> bool {
        self.visual
            .as_ref()
            .is_some_and(|v| !v.differing_pages.is_empty())
    }
}

/// Where a page in the paginated report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrigin {
    /// Present in both documents at the same position.
    Matched,
    /// Present only in the first document.
    OnlyInA,
    /// Present only in the second document.
    OnlyInB,
}

impl From<Side> for PageOrigin {
    fn from(side: Side) -> Self {
        match side {
            Side::OnlyInA => PageOrigin::OnlyInA,
            Side::OnlyInB => PageOrigin::OnlyInB,
        }
    }
}

/// Text differences of a single page.
#[derive(Debug, Clone, Serialize)]
pub struct PageDiff {
    /// Page index (0-indexed).
    pub index: usize,
    pub origin: PageOrigin,
    pub script: EditScript,
}

impl PageDiff {
    /// Page number as shown to users (1-indexed).
    pub fn page_number(&self) -> usize {
        self.index + 1
    }
}

/// Result of the paginated visual stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VisualDiff {
    /// Indices of pages that differ visually (0-indexed, ascending).
    pub differing_pages: Vec<usize>,

    /// Highlight images for the differing pages that had raster data, ascending.
    #[serde(skip)]
    pub composites: Vec<Composite>,

    /// Matched pages that could not be compared because a raster was missing.
    pub skipped_pages: Vec<usize>,
}

/// Highlight image for one differing page.
#[derive(Debug, Clone)]
pub struct Composite {
    /// Page index (0-indexed).
    pub index: usize,
    pub image: RgbaImage,
}
