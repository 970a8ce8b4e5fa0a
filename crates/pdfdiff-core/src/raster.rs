//! Pixel-level page comparison.

use image::{Rgba, RgbaImage};
use tracing::trace;

use crate::align::Side;
use crate::models::config::RasterConfig;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Outcome of comparing two rasters.
#[derive(Debug, Clone)]
pub struct RasterVerdict {
    /// True iff no pixel differs.
    pub identical: bool,
    /// Number of differing pixels.
    pub differing_pixels: u64,
    /// Highlight image, present when the rasters differ. Matching pixels are
    /// copied from the inputs, differing pixels are tinted.
    pub composite: Option<RgbaImage>,
}

/// Raster comparison engine.
#[derive(Debug, Clone)]
pub struct RasterDiffEngine {
    tolerance: u8,
    added_color: [u8; 3],
    removed_color: [u8; 3],
}

impl RasterDiffEngine {
    /// Create an engine with exact matching and default colors.
    pub fn new() -> Self {
        Self::from_config(&RasterConfig::default())
    }

    /// Create an engine from configuration.
    pub fn from_config(config: &RasterConfig) -> Self {
        Self {
            tolerance: config.channel_tolerance,
            added_color: config.added_color,
            removed_color: config.removed_color,
        }
    }

    /// Set the maximum per-channel difference still treated as equal.
    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Compare two rasters.
    ///
    /// Rasters of different sizes differ everywhere: the composite covers the
    /// larger extent in both directions, and pixels outside the smaller image
    /// count as transparent.
    pub fn compare(&self, a: &RgbaImage, b: &RgbaImage) -> RasterVerdict {
        if a.dimensions() != b.dimensions() {
            let width = a.width().max(b.width());
            let height = a.height().max(b.height());
            trace!(
                "Dimension mismatch {}x{} vs {}x{}",
                a.width(), a.height(), b.width(), b.height()
            );
            let composite = RgbaImage::from_fn(width, height, |x, y| {
                let pa = a.get_pixel_checked(x, y).copied().unwrap_or(TRANSPARENT);
                let pb = b.get_pixel_checked(x, y).copied().unwrap_or(TRANSPARENT);
                self.mark(pa, pb)
            });
            return RasterVerdict {
                identical: false,
                differing_pixels: u64::from(width) * u64::from(height),
                composite: Some(composite),
            };
        }

        let differing_pixels = a
            .pixels()
            .zip(b.pixels())
            .filter(|(pa, pb)| !self.same(**pa, **pb))
            .count() as u64;

        if differing_pixels == 0 {
            return RasterVerdict {
                identical: true,
                differing_pixels,
                composite: None,
            };
        }

        let composite = RgbaImage::from_fn(a.width(), a.height(), |x, y| {
            let (pa, pb) = (*a.get_pixel(x, y), *b.get_pixel(x, y));
            if self.same(pa, pb) { pa } else { self.mark(pa, pb) }
        });

        RasterVerdict {
            identical: false,
            differing_pixels,
            composite: Some(composite),
        }
    }

    /// Highlight image for a page that exists in only one document.
    pub fn leftover(&self, page: &RgbaImage, side: Side) -> RgbaImage {
        let empty = RgbaImage::new(0, 0);
        let verdict = match side {
            Side::OnlyInA => self.compare(page, &empty),
            Side::OnlyInB => self.compare(&empty, page),
        };
        verdict.composite.unwrap_or_else(|| page.clone())
    }

    fn same(&self, a: Rgba<u8>, b: Rgba<u8>) -> bool {
        a.0.iter()
            .zip(b.0.iter())
            .all(|(x, y)| x.abs_diff(*y) <= self.tolerance)
    }

    /// Tint a differing pixel: green where the second raster is darker
    /// (content added), red otherwise (content removed).
    fn mark(&self, a: Rgba<u8>, b: Rgba<u8>) -> Rgba<u8> {
        let (a, b) = (flatten(a), flatten(b));
        let (base, tint) = if luma(b) < luma(a) {
            (b, self.added_color)
        } else {
            (a, self.removed_color)
        };
        Rgba([
            blend(base[0], tint[0]),
            blend(base[1], tint[1]),
            blend(base[2], tint[2]),
            255,
        ])
    }
}

impl Default for RasterDiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Composite a pixel over white.
pub(crate) fn flatten(p: Rgba<u8>) -> [u8; 3] {
    let alpha = u32::from(p[3]);
    let over_white = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
    [over_white(p[0]), over_white(p[1]), over_white(p[2])]
}

fn luma(rgb: [u8; 3]) -> u32 {
    (299 * u32::from(rgb[0]) + 587 * u32::from(rgb[1]) + 114 * u32::from(rgb[2])) / 1000
}

fn blend(base: u8, tint: u8) -> u8 {
    ((u16::from(base) + u16::from(tint)) / 2) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, WHITE)
    }

    #[test]
    fn test_identical_rasters() {
        let engine = RasterDiffEngine::new();
        let page = blank(4, 3);
        let verdict = engine.compare(&page, &page.clone());
        assert!(verdict.identical);
        assert_eq!(verdict.differing_pixels, 0);
        assert!(verdict.composite.is_none());
    }

    #[test]
    fn test_single_pixel_added() {
        let engine = RasterDiffEngine::new();
        let a = blank(4, 4);
        let mut b = blank(4, 4);
        b.put_pixel(1, 2, BLACK);

        let verdict = engine.compare(&a, &b);
        assert!(!verdict.identical);
        assert_eq!(verdict.differing_pixels, 1);

        let composite = verdict.composite.unwrap();
        assert_eq!(composite.dimensions(), (4, 4));
        assert_eq!(*composite.get_pixel(0, 0), WHITE);
        let marked = composite.get_pixel(1, 2);
        assert!(marked[1] > marked[0], "added content should be green: {:?}", marked);

        // Inputs are untouched.
        assert_eq!(*a.get_pixel(1, 2), WHITE);
        assert_eq!(*b.get_pixel(1, 2), BLACK);
    }

    #[test]
    fn test_single_pixel_removed() {
        let engine = RasterDiffEngine::new();
        let mut a = blank(2, 2);
        a.put_pixel(0, 0, BLACK);
        let b = blank(2, 2);

        let composite = engine.compare(&a, &b).composite.unwrap();
        let marked = composite.get_pixel(0, 0);
        assert!(marked[0] > marked[1], "removed content should be red: {:?}", marked);
    }

    #[test]
    fn test_dimension_mismatch_differs_everywhere() {
        let engine = RasterDiffEngine::new();
        let verdict = engine.compare(&blank(3, 5), &blank(4, 2));
        assert!(!verdict.identical);
        assert_eq!(verdict.differing_pixels, 20);
        assert_eq!(verdict.composite.unwrap().dimensions(), (4, 5));
    }

    #[test]
    fn test_tolerance() {
        let a = blank(1, 1);
        let b = RgbaImage::from_pixel(1, 1, Rgba([250, 255, 255, 255]));
        assert!(!RasterDiffEngine::new().compare(&a, &b).identical);
        assert!(RasterDiffEngine::new().with_tolerance(5).compare(&a, &b).identical);
    }

    #[test]
    fn test_compare_is_deterministic() {
        let engine = RasterDiffEngine::new();
        let a = blank(8, 8);
        let mut b = blank(8, 8);
        for x in 0..8 {
            b.put_pixel(x, x, BLACK);
        }
        let first = engine.compare(&a, &b).composite.unwrap();
        let second = engine.compare(&a, &b).composite.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_leftover_page_is_fully_tinted() {
        let engine = RasterDiffEngine::new();
        let mut page = blank(2, 2);
        page.put_pixel(1, 1, BLACK);

        let only_b = engine.leftover(&page, Side::OnlyInB);
        assert_eq!(only_b.dimensions(), (2, 2));
        let ink = only_b.get_pixel(1, 1);
        assert!(ink[1] > ink[0]);

        let only_a = engine.leftover(&page, Side::OnlyInA);
        let ink = only_a.get_pixel(1, 1);
        assert!(ink[0] > ink[1]);
    }
}
