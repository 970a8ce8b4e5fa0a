//! Page sources: where the engine's input documents come from.

mod rendered;

pub use rendered::RenderedDirectory;

use std::path::Path;

use image::RgbaImage;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::config::DiffConfig;
use crate::models::page::{Page, SourceDocument, join_page_texts};
use crate::pdf::PdfExtractor;

/// What to read from a source.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Render page rasters for the visual stage.
    pub with_raster: bool,
    /// Maximum pages to read (0 = all).
    pub max_pages: usize,
}

impl LoadOptions {
    pub fn from_config(config: &DiffConfig) -> Self {
        Self {
            with_raster: config.raster.enabled,
            max_pages: config.source.max_pages,
        }
    }
}

/// A document that can be read page by page.
pub trait DocumentSource {
    /// Display name, usually the input path.
    fn name(&self) -> String;

    /// Number of pages in the document.
    fn page_count(&self) -> Result<usize>;

    /// Text of the whole document.
    fn full_text(&self) -> Result<String>;

    /// Text of one page (0-indexed).
    fn page_text(&self, index: usize) -> Result<String>;

    /// Raster of one page (0-indexed).
    fn render_page(&self, index: usize) -> Result<RgbaImage>;

    /// Read the document into the form the engine compares.
    ///
    /// A page whose text cannot be extracted leaves the document
    /// unpaginated; a page that cannot be rendered just has no raster.
    fn load(&self, options: &LoadOptions) -> Result<SourceDocument> {
        let name = self.name();
        let total = self.page_count()?;
        let count = if options.max_pages > 0 {
            total.min(options.max_pages)
        } else {
            total
        };

        let mut pages = Vec::with_capacity(count);
        let mut paginated = true;
        for index in 0..count {
            let text = match self.page_text(index) {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "Could not extract text of page {} of {}: {}",
                        index + 1,
                        name,
                        e
                    );
                    paginated = false;
                    break;
                }
            };

            let mut page = Page::new(index, text);
            if options.with_raster {
                match self.render_page(index) {
                    Ok(raster) => page.raster = Some(raster),
                    Err(e) => warn!("Could not render page {} of {}: {}", index + 1, name, e),
                }
            }
            pages.push(page);
        }

        let joined = || join_page_texts(pages.iter().map(|p| p.text.as_str()));
        let text = if paginated && count < total {
            joined()
        } else {
            match self.full_text() {
                Ok(text) => text,
                Err(e) if paginated => {
                    warn!("Whole-document text of {} unavailable ({}), joining pages", name, e);
                    joined()
                }
                Err(e) => return Err(e),
            }
        };

        debug!("Loaded {}: {} of {} pages", name, pages.len(), total);
        Ok(SourceDocument {
            name,
            text,
            pages: paginated.then_some(pages),
        })
    }
}

/// Open a rendered-page directory or a PDF file.
pub fn open_source(path: &Path) -> Result<Box<dyn DocumentSource>> {
    if path.is_dir() {
        Ok(Box::new(RenderedDirectory::open(path)?))
    } else {
        Ok(Box::new(PdfExtractor::open(path)?))
    }
}
