//! Writes report artifacts next to a common path prefix.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::{error, info};

use crate::error::{DiffError, RenderError, Result};
use crate::models::config::ReportConfig;
use crate::models::report::{Composite, DiffReport, VisualDiff};
use crate::raster::flatten;

use super::html::{paginated_html, whole_document_html};

pub const WHOLE_SUFFIX: &str = "_whole_textual_diff.html";
pub const PAGINATED_SUFFIX: &str = "_paginated_textual_diff.html";
pub const VISUAL_SUFFIX: &str = "_visual_diff.pdf";
pub const SUMMARY_SUFFIX: &str = "_summary.txt";
pub const JSON_SUFFIX: &str = "_report.json";

/// Paths of the artifacts written for one report.
#[derive(Debug, Clone, Default)]
pub struct WrittenArtifacts {
    pub whole: PathBuf,
    pub paginated: Option<PathBuf>,
    pub visual: Option<VisualOutput>,
    pub summary: Option<PathBuf>,
}

/// Result of writing the visual report.
#[derive(Debug, Clone)]
pub struct VisualOutput {
    pub path: PathBuf,
    /// Page indices (0-indexed) included in the document.
    pub pages: Vec<usize>,
    /// Composition failure that stopped the document short, if any.
    pub aborted: Option<String>,
}

/// Writes the artifacts of a [`DiffReport`].
#[derive(Debug, Clone)]
pub struct ReportWriter {
    prefix: PathBuf,
    search_tag: String,
}

impl ReportWriter {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            search_tag: ReportConfig::default().search_tag,
        }
    }

    pub fn with_search_tag(mut self, tag: impl Into<String>) -> Self {
        self.search_tag = tag.into();
        self
    }

    /// `<prefix><suffix>`, e.g. `out/cmp_summary.txt` for prefix `out/cmp`.
    pub fn artifact_path(&self, suffix: &str) -> PathBuf {
        let mut path = self.prefix.clone().into_os_string();
        path.push(suffix);
        PathBuf::from(path)
    }

    /// Write every artifact the report calls for.
    ///
    /// The paginated report is written whenever the paginated stages ran,
    /// even with no differing pages. The visual report is written only when
    /// at least one composite exists.
    pub fn write_all(&self, report: &DiffReport, dump_summary: bool) -> Result<WrittenArtifacts> {
        let mut written = WrittenArtifacts {
            whole: self.write_whole(report)?,
            ..Default::default()
        };

        if report.paginated {
            written.paginated = Some(self.write_paginated(report)?);
        }
        if let Some(visual) = &report.visual {
            written.visual = self.write_visual(visual)?;
        }
        if dump_summary {
            written.summary = Some(self.write_summary(&report.summary)?);
        }
        Ok(written)
    }

    pub fn write_whole(&self, report: &DiffReport) -> Result<PathBuf> {
        let path = self.artifact_path(WHOLE_SUFFIX);
        write_file(&path, whole_document_html(&report.whole, &self.search_tag).as_bytes())?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn write_paginated(&self, report: &DiffReport) -> Result<PathBuf> {
        let path = self.artifact_path(PAGINATED_SUFFIX);
        write_file(&path, paginated_html(&report.pages).as_bytes())?;
        info!("Wrote {} ({} pages)", path.display(), report.pages.len());
        Ok(path)
    }

    pub fn write_summary(&self, summary: &str) -> Result<PathBuf> {
        let path = self.artifact_path(SUMMARY_SUFFIX);
        write_file(&path, summary.as_bytes())?;
        Ok(path)
    }

    /// Machine-readable dump of the report (composites excluded).
    pub fn write_json(&self, report: &DiffReport) -> Result<PathBuf> {
        let path = self.artifact_path(JSON_SUFFIX);
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| artifact_error(&path, std::io::Error::other(e)))?;
        write_file(&path, json.as_bytes())?;
        Ok(path)
    }

    /// Write one PDF page per composite, in page order.
    ///
    /// A page that fails to compose stops the document there; the pages
    /// already composed are still saved and the failure is reported in
    /// [`VisualOutput::aborted`]. Returns `None` when nothing was composed.
    pub fn write_visual(&self, visual: &VisualDiff) -> Result<Option<VisualOutput>> {
        if visual.composites.is_empty() {
            return Ok(None);
        }

        let (mut doc, pages, failure) = compose_visual_pdf(&visual.composites);
        if let Some(err) = &failure {
            error!("Visual report stopped early: {}", err);
        }
        if pages.is_empty() {
            return Ok(None);
        }

        let path = self.artifact_path(VISUAL_SUFFIX);
        let file = File::create(&path).map_err(|e| artifact_error(&path, e))?;
        let mut out = BufWriter::new(file);
        doc.save_to(&mut out)
            .map_err(|e| artifact_error(&path, std::io::Error::other(e.to_string())))?;
        out.flush().map_err(|e| artifact_error(&path, e))?;
        info!("Wrote {} ({} pages)", path.display(), pages.len());

        Ok(Some(VisualOutput {
            path,
            pages,
            aborted: failure.map(|e| e.to_string()),
        }))
    }
}

fn artifact_error(path: &Path, source: std::io::Error) -> DiffError {
    DiffError::Artifact {
        path: path.to_path_buf(),
        source,
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let file = File::create(path).map_err(|e| artifact_error(path, e))?;
    let mut out = BufWriter::new(file);
    out.write_all(contents)
        .and_then(|_| out.flush())
        .map_err(|e| artifact_error(path, e))
}

/// Build the visual document, stopping at the first page that fails.
fn compose_visual_pdf(composites: &[Composite]) -> (Document, Vec<usize>, Option<RenderError>) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    let mut written = Vec::new();
    let mut failure = None;

    for composite in composites {
        match add_image_page(&mut doc, pages_id, composite.index, &composite.image) {
            Ok(page_id) => {
                kids.push(Object::from(page_id));
                written.push(composite.index);
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    (doc, written, failure)
}

/// Add one page showing `image` at one point per pixel.
fn add_image_page(
    doc: &mut Document,
    pages_id: lopdf::ObjectId,
    index: usize,
    image: &RgbaImage,
) -> std::result::Result<lopdf::ObjectId, RenderError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::Dimensions {
            page: index + 1,
            width,
            height,
        });
    }
    let (w, h) = (i64::from(width), i64::from(height));

    let rgb: Vec<u8> = image.pixels().flat_map(|p| flatten(*p)).collect();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w,
            "Height" => h,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb,
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("cm", vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()]),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content.encode().map_err(|e| RenderError::Encode {
        page: index + 1,
        reason: e.to_string(),
    })?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    }))
}
