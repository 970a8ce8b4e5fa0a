//! Error types for the pdfdiff-core library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the pdfdiff library.
#[derive(Error, Debug)]
pub enum DiffError {
    /// One or both page sequences are unavailable.
    #[error("pagination error: {0}")]
    Pagination(String),

    /// Composing a raster page into the visual report failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Writing an output artifact failed.
    #[error("failed to write {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Page source error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The comparison was cancelled or ran past its deadline.
    #[error("comparison cancelled during {stage}")]
    Cancelled { stage: Stage },
}

/// Errors related to reading pages out of a source document.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract a page image.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The document is empty or has no pages.
    #[error("document has no pages")]
    NoPages,

    /// Invalid page index requested.
    #[error("invalid page index: {0}")]
    InvalidPage(usize),
}

/// Errors raised while composing the visual report.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Page content stream could not be encoded.
    #[error("failed to encode page {page}: {reason}")]
    Encode { page: usize, reason: String },

    /// Composite dimensions cannot be represented in the output container.
    #[error("page {page} has unsupported dimensions {width}x{height}")]
    Dimensions { page: usize, width: u32, height: u32 },

    /// The assembled document could not be saved.
    #[error("failed to save visual report: {0}")]
    Save(String),
}

/// Stage of a comparison run, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    WholeDocument,
    PaginatedText,
    PaginatedVisual,
    Summary,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::WholeDocument => "whole-document text comparison",
            Stage::PaginatedText => "paginated text comparison",
            Stage::PaginatedVisual => "paginated visual comparison",
            Stage::Summary => "summary",
        };
        f.write_str(name)
    }
}

/// Result type for the pdfdiff library.
pub type Result<T> = std::result::Result<T, DiffError>;
