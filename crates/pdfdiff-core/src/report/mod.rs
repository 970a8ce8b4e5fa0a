//! Comparison pipeline and report artifacts.
//!
//! [`ReportSynthesizer::run`] drives the stages in order:
//!
//! 1. whole-document text diff,
//! 2. paginated text diff over positionally aligned pages,
//! 3. paginated visual diff (only when enabled in [`RasterConfig`]),
//! 4. summary.
//!
//! [`ReportWriter`] turns the resulting [`DiffReport`] into files.
//!
//! [`RasterConfig`]: crate::models::config::RasterConfig

mod html;
mod summary;
mod writer;

pub use html::{page_header, paginated_html, whole_document_html};
pub use summary::{PAGE_NUMBER_NOTE, summarize};
pub use writer::{ReportWriter, VisualOutput, WrittenArtifacts};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::align::{AlignmentResult, Side, align};
use crate::cancel::Cancellation;
use crate::error::{Result, Stage};
use crate::models::config::DiffConfig;
use crate::models::page::{Page, SourceDocument};
use crate::models::report::{Composite, DiffReport, PageDiff, PageOrigin, VisualDiff};
use crate::raster::RasterDiffEngine;
use crate::text::{EditScript, TextDiffEngine};

/// Visual outcome of one matched page pair.
enum PageVisual {
    Same,
    Different(Option<Composite>),
    Skipped,
}

/// Runs a full comparison of two documents.
pub struct ReportSynthesizer {
    config: DiffConfig,
    text: TextDiffEngine,
    raster: RasterDiffEngine,
    cancel: Cancellation,
}

impl ReportSynthesizer {
    pub fn new(config: DiffConfig) -> Self {
        let cancel = Cancellation::new().with_timeout(config.run.deadline());
        let text = TextDiffEngine::from_config(&config.text).with_cancellation(cancel.clone());
        let raster = RasterDiffEngine::from_config(&config.raster);
        Self {
            config,
            text,
            raster,
            cancel,
        }
    }

    /// Use an externally controlled cancellation token.
    ///
    /// The configured deadline, if any, is applied to the token unless the
    /// token already has an earlier one.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel.limited_to(self.config.run.deadline());
        self.text = self.text.with_cancellation(self.cancel.clone());
        self
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare two documents through every enabled stage.
    ///
    /// Fails with a pagination error if either document has no page
    /// sequence; callers can fall back to [`Self::whole_document_report`].
    pub fn run(&self, a: &SourceDocument, b: &SourceDocument) -> Result<DiffReport> {
        info!("Comparing {} with {}", a.name, b.name);

        let whole = self.whole_document(&a.text, &b.text)?;

        let alignment = align(a.pages.as_deref(), b.pages.as_deref())?;
        let pages_a = a.pages.as_deref().unwrap_or_default();
        let pages_b = b.pages.as_deref().unwrap_or_default();
        debug!(
            "Aligned {} page pairs, {} leftover pages",
            alignment.matched.len(),
            alignment.unmatched.len()
        );

        let pages = self.paginated_text(pages_a, pages_b, &alignment)?;

        let visual = if self.config.raster.enabled {
            Some(self.paginated_visual(pages_a, pages_b, &alignment)?)
        } else {
            debug!("Visual comparison disabled");
            None
        };

        self.cancel.check(Stage::Summary)?;
        let summary = summarize(&whole, visual.as_ref());

        info!(
            "Comparison finished: {} pages with text differences{}",
            pages.len(),
            visual
                .as_ref()
                .map(|v| format!(", {} pages with visual differences", v.differing_pages.len()))
                .unwrap_or_default()
        );

        Ok(DiffReport {
            whole,
            paginated: true,
            pages,
            visual,
            summary,
        })
    }

    /// Compare whole texts only, for documents that could not be paginated.
    pub fn whole_document_report(&self, a_text: &str, b_text: &str) -> Result<DiffReport> {
        let whole = self.whole_document(a_text, b_text)?;
        self.cancel.check(Stage::Summary)?;
        let summary = summarize(&whole, None);
        Ok(DiffReport {
            whole,
            paginated: false,
            pages: Vec::new(),
            visual: None,
            summary,
        })
    }

    /// Stage 1: semantic diff of the full texts.
    pub fn whole_document(&self, a_text: &str, b_text: &str) -> Result<EditScript> {
        self.cancel.check(Stage::WholeDocument)?;
        let script = self.text.diff_semantic(a_text, b_text);
        // A diff cut short by cancellation is not a result.
        self.cancel.check(Stage::WholeDocument)?;
        debug!("Whole-document diff has {} operations", script.len());
        Ok(script)
    }

    /// Stage 2: per-page text diffs.
    ///
    /// Matched pages are kept when their diff has a significant change (or
    /// any change, with `include_whitespace_only_pages`). Leftover pages are
    /// always kept, as a pure deletion or insertion of their text.
    pub fn paginated_text(
        &self,
        a: &[Page],
        b: &[Page],
        alignment: &AlignmentResult,
    ) -> Result<Vec<PageDiff>> {
        self.cancel.check(Stage::PaginatedText)?;

        let matched = self.map_pages(&alignment.matched, |&(i, j)| {
            self.cancel.check(Stage::PaginatedText)?;
            let script = self.diff_page(&a[i].text, &b[j].text);
            self.cancel.check(Stage::PaginatedText)?;
            Ok(self.keep_page(&script).then(|| PageDiff {
                index: i,
                origin: PageOrigin::Matched,
                script,
            }))
        })?;

        let mut pages: Vec<PageDiff> = matched.into_iter().flatten().collect();
        for leftover in &alignment.unmatched {
            let script = match leftover.side {
                Side::OnlyInA => EditScript::deletion(&a[leftover.index].text),
                Side::OnlyInB => EditScript::insertion(&b[leftover.index].text),
            };
            pages.push(PageDiff {
                index: leftover.index,
                origin: leftover.side.into(),
                script,
            });
        }

        debug!("{} pages with text differences", pages.len());
        Ok(pages)
    }

    /// Stage 3: per-page raster comparison.
    ///
    /// Matched pages missing a raster on either side are skipped and listed
    /// in [`VisualDiff::skipped_pages`]. Leftover pages always differ.
    pub fn paginated_visual(
        &self,
        a: &[Page],
        b: &[Page],
        alignment: &AlignmentResult,
    ) -> Result<VisualDiff> {
        self.cancel.check(Stage::PaginatedVisual)?;

        let outcomes = self.map_pages(&alignment.matched, |&(i, j)| {
            self.cancel.check(Stage::PaginatedVisual)?;
            let outcome = match (&a[i].raster, &b[j].raster) {
                (Some(ra), Some(rb)) => {
                    let verdict = self.raster.compare(ra, rb);
                    if verdict.identical {
                        PageVisual::Same
                    } else {
                        debug!("Page {}: {} pixels differ", i + 1, verdict.differing_pixels);
                        PageVisual::Different(
                            verdict.composite.map(|image| Composite { index: i, image }),
                        )
                    }
                }
                _ => {
                    warn!("Page {} has no raster, skipping visual comparison", i + 1);
                    PageVisual::Skipped
                }
            };
            Ok(outcome)
        })?;

        let mut visual = VisualDiff::default();
        for (&(i, _), outcome) in alignment.matched.iter().zip(outcomes) {
            match outcome {
                PageVisual::Same => {}
                PageVisual::Different(composite) => {
                    visual.differing_pages.push(i);
                    visual.composites.extend(composite);
                }
                PageVisual::Skipped => visual.skipped_pages.push(i),
            }
        }

        for leftover in &alignment.unmatched {
            let page = match leftover.side {
                Side::OnlyInA => &a[leftover.index],
                Side::OnlyInB => &b[leftover.index],
            };
            visual.differing_pages.push(leftover.index);
            if let Some(raster) = &page.raster {
                visual.composites.push(Composite {
                    index: leftover.index,
                    image: self.raster.leftover(raster, leftover.side),
                });
            }
        }

        info!(
            "Visual comparison: {} differing, {} skipped",
            visual.differing_pages.len(),
            visual.skipped_pages.len()
        );
        Ok(visual)
    }

    fn diff_page(&self, a: &str, b: &str) -> EditScript {
        if self.config.text.semantic_cleanup {
            self.text.diff_semantic(a, b)
        } else {
            self.text.diff(a, b)
        }
    }

    fn keep_page(&self, script: &EditScript) -> bool {
        if self.config.report.include_whitespace_only_pages {
            !script.is_identical()
        } else {
            script.has_significant()
        }
    }

    /// Map over page pairs, on the rayon pool when parallelism is enabled.
    /// Results keep the input order.
    fn map_pages<T, R, F>(&self, items: &[T], f: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        if self.config.run.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiffError;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    fn document(name: &str, texts: &[&str]) -> SourceDocument {
        let pages = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Page::new(i, *text))
            .collect();
        SourceDocument::from_pages(name, pages)
    }

    fn with_rasters(mut doc: SourceDocument, dark: &[usize]) -> SourceDocument {
        if let Some(pages) = doc.pages.as_mut() {
            for page in pages.iter_mut() {
                let mut raster = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
                if dark.contains(&page.index) {
                    raster.put_pixel(2, 2, Rgba([0, 0, 0, 255]));
                }
                page.raster = Some(raster);
            }
        }
        doc
    }

    fn visual_config() -> DiffConfig {
        let mut config = DiffConfig::default();
        config.raster.enabled = true;
        config
    }

    #[test]
    fn test_identical_documents() {
        let a = document("a", &["one\n", "two\n", "three\n"]);
        let report = ReportSynthesizer::new(DiffConfig::default())
            .run(&a, &a.clone())
            .unwrap();

        assert!(report.whole.is_identical());
        assert!(report.pages.is_empty());
        assert!(report.visual.is_none());
        assert!(report.summary.starts_with("No textual differences identified."));
    }

    #[test]
    fn test_change_on_second_page_only() {
        let a = document("a", &["alpha\n", "beta\n", "gamma\n"]);
        let b = document("b", &["alpha\n", "bravo\n", "gamma\n"]);
        let report = ReportSynthesizer::new(DiffConfig::default()).run(&a, &b).unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].index, 1);
        assert_eq!(report.pages[0].page_number(), 2);
        assert_eq!(report.pages[0].script.source_text(), "beta\n");
        assert_eq!(report.pages[0].script.target_text(), "bravo\n");
    }

    #[test]
    fn test_leftover_pages_are_always_reported() {
        let a = document("a", &["same\n", "same\n", "same\n"]);
        let b = document("b", &["same\n", "same\n", "same\n", "extra\n"]);
        let report = ReportSynthesizer::new(visual_config())
            .run(&with_rasters(a, &[]), &with_rasters(b, &[]))
            .unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].index, 3);
        assert_eq!(report.pages[0].origin, PageOrigin::OnlyInB);
        assert_eq!(report.pages[0].script, EditScript::insertion("extra\n"));

        let visual = report.visual.unwrap();
        assert_eq!(visual.differing_pages, vec![3]);
        assert_eq!(visual.composites.len(), 1);
        assert_eq!(visual.composites[0].index, 3);
    }

    #[test]
    fn test_whitespace_only_page_selection() {
        let a = document("a", &["word word\n", "other\n"]);
        let b = document("b", &["word\u{00A0}word\n", "other\n"]);

        let report = ReportSynthesizer::new(DiffConfig::default()).run(&a, &b).unwrap();
        assert!(report.pages.is_empty());
        assert!(report.summary.starts_with(
            "Textual differences found, but only in whitespace and/or non-printing characters."
        ));

        let mut config = DiffConfig::default();
        config.report.include_whitespace_only_pages = true;
        let report = ReportSynthesizer::new(config).run(&a, &b).unwrap();
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].index, 0);
    }

    #[test]
    fn test_visual_differences_and_skipped_pages() {
        let a = with_rasters(document("a", &["x\n", "y\n", "z\n"]), &[]);
        let mut b = with_rasters(document("b", &["x\n", "y\n", "z\n"]), &[0, 2]);
        if let Some(pages) = b.pages.as_mut() {
            pages[2].raster = None;
        }

        let report = ReportSynthesizer::new(visual_config()).run(&a, &b).unwrap();
        let visual = report.visual.unwrap();
        assert_eq!(visual.differing_pages, vec![0]);
        assert_eq!(visual.skipped_pages, vec![2]);
        assert!(report.summary.contains("Visual differences identified on the following pages:\n1\n"));
        assert!(report.summary.contains("Visual comparison skipped on the following pages:\n3\n"));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let a = document("a", &["a b c\n", "d e f\n", "g h i\n", "j\n"]);
        let b = document("b", &["a c\n", "d e f\n", "g x i\n"]);

        let parallel = ReportSynthesizer::new(DiffConfig::default()).run(&a, &b).unwrap();
        let mut config = DiffConfig::default();
        config.run.parallel = false;
        let sequential = ReportSynthesizer::new(config).run(&a, &b).unwrap();

        let indices = |r: &DiffReport| r.pages.iter().map(|p| p.index).collect::<Vec<_>>();
        assert_eq!(indices(&parallel), vec![0, 2, 3]);
        assert_eq!(indices(&parallel), indices(&sequential));
        assert_eq!(parallel.summary, sequential.summary);
    }

    #[test]
    fn test_unpaginated_document_fails_run() {
        let a = SourceDocument::unpaginated("a", "text");
        let b = document("b", &["text"]);
        let synth = ReportSynthesizer::new(DiffConfig::default());

        assert!(matches!(synth.run(&a, &b), Err(DiffError::Pagination(_))));

        let fallback = synth.whole_document_report(&a.text, &b.text).unwrap();
        assert!(!fallback.paginated);
        assert!(fallback.visual.is_none());
    }

    #[test]
    fn test_cancelled_run() {
        let cancel = Cancellation::new();
        cancel.cancel();
        let synth = ReportSynthesizer::new(DiffConfig::default()).with_cancellation(cancel);
        let a = document("a", &["one"]);

        let err = synth.run(&a, &a.clone()).unwrap_err();
        assert!(matches!(err, DiffError::Cancelled { stage: Stage::WholeDocument }));
    }

    #[test]
    fn test_caller_deadline_survives_config_without_one() {
        let expired = Cancellation::new().with_timeout(Some(std::time::Duration::ZERO));
        let synth = ReportSynthesizer::new(DiffConfig::default()).with_cancellation(expired);
        let a = document("a", &["one"]);

        let err = synth.run(&a, &a.clone()).unwrap_err();
        assert!(matches!(err, DiffError::Cancelled { stage: Stage::WholeDocument }));
    }

    #[test]
    fn test_huge_deadline_does_not_overflow() {
        let mut config = DiffConfig::default();
        config.run.deadline_secs = u64::MAX;
        let a = document("a", &["one"]);

        let report = ReportSynthesizer::new(config.clone()).run(&a, &a.clone()).unwrap();
        assert!(report.whole.is_identical());

        let report = ReportSynthesizer::new(config)
            .with_cancellation(Cancellation::new())
            .run(&a, &a.clone())
            .unwrap();
        assert!(report.whole.is_identical());
    }
}
