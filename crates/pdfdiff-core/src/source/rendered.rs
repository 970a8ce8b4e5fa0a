//! Pages already rendered by an external tool.
//!
//! Layout: `page-<n>.txt` holds the text of page `n` and `page-<n>.png` its
//! raster. Pages are ordered by `n`, not by file name, so `page-2` sorts
//! before `page-10`. An optional `document.txt` holds the whole-document text.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use image::RgbaImage;
use tracing::debug;

use super::DocumentSource;
use crate::error::{PdfError, Result};
use crate::models::page::join_page_texts;

const WHOLE_TEXT_FILE: &str = "document.txt";

/// Directory of rendered pages.
#[derive(Debug, Clone)]
pub struct RenderedDirectory {
    root: PathBuf,
    pages: Vec<PathBuf>,
}

impl RenderedDirectory {
    /// Scan `root` for page files.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(PdfError::Parse(format!("{} is not a directory", root.display())).into());
        }

        let pattern = format!(
            "{}/page-*.txt",
            Pattern::escape(&root.to_string_lossy())
        );
        let paths = glob(&pattern).map_err(|e| PdfError::Parse(e.to_string()))?;

        let mut numbered: Vec<(usize, PathBuf)> = paths
            .filter_map(|entry| entry.ok())
            .filter_map(|path| page_number(&path).map(|n| (n, path)))
            .collect();
        if numbered.is_empty() {
            return Err(PdfError::NoPages.into());
        }
        numbered.sort_by_key(|(n, _)| *n);

        debug!("Found {} rendered pages in {}", numbered.len(), root.display());
        Ok(Self {
            root: root.to_path_buf(),
            pages: numbered.into_iter().map(|(_, path)| path).collect(),
        })
    }

    fn page_path(&self, index: usize) -> Result<&PathBuf> {
        Ok(self.pages.get(index).ok_or(PdfError::InvalidPage(index))?)
    }
}

/// Numeric suffix of a `page-<n>.txt` path.
fn page_number(path: &Path) -> Option<usize> {
    path.file_stem()?
        .to_str()?
        .strip_prefix("page-")?
        .parse()
        .ok()
}

impl DocumentSource for RenderedDirectory {
    fn name(&self) -> String {
        self.root.display().to_string()
    }

    fn page_count(&self) -> Result<usize> {
        Ok(self.pages.len())
    }

    fn full_text(&self) -> Result<String> {
        let whole = self.root.join(WHOLE_TEXT_FILE);
        if whole.is_file() {
            return Ok(fs::read_to_string(whole)?);
        }
        let texts = (0..self.pages.len())
            .map(|index| self.page_text(index))
            .collect::<Result<Vec<_>>>()?;
        Ok(join_page_texts(texts.iter().map(String::as_str)))
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let path = self.page_path(index)?;
        fs::read_to_string(path)
            .map_err(|e| PdfError::TextExtraction(format!("{}: {}", path.display(), e)).into())
    }

    fn render_page(&self, index: usize) -> Result<RgbaImage> {
        let path = self.page_path(index)?.with_extension("png");
        Ok(image::open(&path)?.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;
    use crate::source::LoadOptions;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_page(dir: &Path, number: &str, text: &str, with_png: bool) {
        fs::write(dir.join(format!("page-{}.txt", number)), text).unwrap();
        if with_png {
            RgbaImage::from_pixel(3, 2, Rgba([255, 255, 255, 255]))
                .save(dir.join(format!("page-{}.png", number)))
                .unwrap();
        }
    }

    #[test]
    fn test_pages_sorted_numerically() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "10", "ten", false);
        write_page(dir.path(), "2", "two", false);
        write_page(dir.path(), "001", "one", false);
        fs::write(dir.path().join("page-cover.txt"), "ignored").unwrap();

        let source = RenderedDirectory::open(dir.path()).unwrap();
        assert_eq!(source.page_count().unwrap(), 3);
        assert_eq!(source.page_text(0).unwrap(), "one");
        assert_eq!(source.page_text(1).unwrap(), "two");
        assert_eq!(source.page_text(2).unwrap(), "ten");
        assert_eq!(source.full_text().unwrap(), "one\ntwo\nten\n");
    }

    #[test]
    fn test_whole_text_file_preferred() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "1", "one", false);
        fs::write(dir.path().join(WHOLE_TEXT_FILE), "whole document").unwrap();

        let source = RenderedDirectory::open(dir.path()).unwrap();
        assert_eq!(source.full_text().unwrap(), "whole document");
    }

    #[test]
    fn test_load_with_rasters() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "1", "one\n", true);
        write_page(dir.path(), "2", "two\n", false);

        let doc = RenderedDirectory::open(dir.path())
            .unwrap()
            .load(&LoadOptions { with_raster: true, max_pages: 0 })
            .unwrap();
        let pages = doc.pages.unwrap();
        assert_eq!(pages[0].raster.as_ref().map(|r| r.dimensions()), Some((3, 2)));
        assert!(pages[1].raster.is_none());
        assert_eq!(doc.text, "one\ntwo\n");
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let err = RenderedDirectory::open(dir.path()).unwrap_err();
        assert!(matches!(err, DiffError::Pdf(PdfError::NoPages)));
    }

    #[test]
    fn test_invalid_page_index() {
        let dir = TempDir::new().unwrap();
        write_page(dir.path(), "1", "one", false);
        let source = RenderedDirectory::open(dir.path()).unwrap();
        assert!(matches!(
            source.page_text(5),
            Err(DiffError::Pdf(PdfError::InvalidPage(5)))
        ));
    }
}
