//! Page and document representations handed to the engine.

use image::RgbaImage;

/// A single page of a source document.
#[derive(Debug, Clone)]
pub struct Page {
    /// Position in the source document (0-indexed).
    pub index: usize,
    /// Extracted plain text.
    pub text: String,
    /// Rendered page, if rendering succeeded.
    pub raster: Option<RgbaImage>,
}

impl Page {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            raster: None,
        }
    }

    pub fn with_raster(mut self, raster: RgbaImage) -> Self {
        self.raster = Some(raster);
        self
    }
}

/// One side of a comparison: the whole text plus, when pagination
/// succeeded, the ordered pages.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Display name (usually the input path).
    pub name: String,
    /// Text of the whole document.
    pub text: String,
    /// Pages in document order, or `None` if the document could not be paginated.
    pub pages: Option<Vec<Page>>,
}

impl SourceDocument {
    /// Build a document whose whole text is the concatenation of its pages,
    /// each terminated by a newline.
    pub fn from_pages(name: impl Into<String>, pages: Vec<Page>) -> Self {
        let text = join_page_texts(pages.iter().map(|page| page.text.as_str()));
        Self {
            name: name.into(),
            text,
            pages: Some(pages),
        }
    }

    /// Build a document that could not be paginated.
    pub fn unpaginated(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            pages: None,
        }
    }

    pub fn page_count(&self) -> Option<usize> {
        self.pages.as_ref().map(Vec::len)
    }
}

/// Concatenate page texts, terminating each with a newline.
pub fn join_page_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for text in texts {
        joined.push_str(text);
        if !text.ends_with('\n') {
            joined.push('\n');
        }
    }
    joined
}
