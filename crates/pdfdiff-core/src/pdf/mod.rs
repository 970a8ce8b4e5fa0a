//! PDF page source.
//!
//! Text comes from `pdf-extract` (whole document) and lopdf (per page).
//! Rasters are lifted from the largest image embedded in each page, which
//! covers scanned documents; content streams are not rasterized.

mod extractor;

pub use extractor::PdfExtractor;
