//! Core library for comparing paginated documents.
//!
//! This crate provides:
//! - Character-level text diffing with semantic cleanup
//! - Pixel-level raster comparison with highlight composites
//! - Positional page alignment
//! - Report synthesis and artifact writing (HTML, PDF, text, JSON)
//! - Page sources for PDF files and rendered-page directories

pub mod align;
pub mod cancel;
pub mod error;
pub mod models;
pub mod pdf;
pub mod ranges;
pub mod raster;
pub mod report;
pub mod source;
pub mod text;

pub use align::{AlignmentResult, Side, Unmatched, align};
pub use cancel::Cancellation;
pub use error::{DiffError, PdfError, RenderError, Result, Stage};
pub use models::config::DiffConfig;
pub use models::page::{Page, SourceDocument};
pub use models::report::{Composite, DiffReport, PageDiff, PageOrigin, VisualDiff};
pub use pdf::PdfExtractor;
pub use ranges::compress_ranges;
pub use raster::{RasterDiffEngine, RasterVerdict};
pub use report::{ReportSynthesizer, ReportWriter, WrittenArtifacts};
pub use source::{DocumentSource, LoadOptions, RenderedDirectory, open_source};
pub use text::{DiffOp, EditScript, Operation, TextDiffEngine, is_significant};
