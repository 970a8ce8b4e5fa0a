//! Plain-text summary of a comparison.

use crate::models::report::VisualDiff;
use crate::ranges::compress_ranges;
use crate::text::EditScript;

/// Trailing note explaining which document page numbers refer to.
pub const PAGE_NUMBER_NOTE: &str = "NOTE: Page numbers are based on File 1 (the \"original\" document). \
If File 2 is longer or shorter than File 1, these page numbers will not necessarily match File 2.";

pub const NO_TEXT_DIFFERENCES: &str = "No textual differences identified.";
pub const WHITESPACE_ONLY_DIFFERENCES: &str =
    "Textual differences found, but only in whitespace and/or non-printing characters.";
pub const TEXT_DIFFERENCES: &str = "Textual differences identified.";
pub const NO_VISUAL_DIFFERENCES: &str = "No visual differences identified.";
pub const VISUAL_DIFFERENCES: &str = "Visual differences identified on the following pages:";
pub const VISUAL_SKIPPED: &str = "Visual comparison skipped on the following pages:";

/// Build the summary from the whole-document script and, if the visual stage
/// ran, its result.
///
/// Pages the visual stage skipped are listed on their own and never counted
/// as identical.
pub fn summarize(whole: &EditScript, visual: Option<&VisualDiff>) -> String {
    let mut sections = vec![text_section(whole)];
    if let Some(visual) = visual {
        sections.extend(visual_sections(visual));
    }
    sections.push(PAGE_NUMBER_NOTE.to_string());
    sections.join("\n\n")
}

fn text_section(whole: &EditScript) -> String {
    if whole.is_identical() {
        return NO_TEXT_DIFFERENCES.to_string();
    }

    let lines: Vec<String> = whole
        .significant()
        .map(|op| format!("{}, \"{}\"", op.operation().as_str(), op.text().trim()))
        .collect();
    if lines.is_empty() {
        return WHITESPACE_ONLY_DIFFERENCES.to_string();
    }

    let mut section = String::from(TEXT_DIFFERENCES);
    for line in lines {
        section.push('\n');
        section.push_str(&line);
    }
    section
}

fn visual_sections(visual: &VisualDiff) -> Vec<String> {
    if visual.differing_pages.is_empty() && visual.skipped_pages.is_empty() {
        return vec![NO_VISUAL_DIFFERENCES.to_string()];
    }
    let mut sections = Vec::new();
    if !visual.differing_pages.is_empty() {
        sections.push(page_list(VISUAL_DIFFERENCES, &visual.differing_pages));
    }
    if !visual.skipped_pages.is_empty() {
        sections.push(page_list(VISUAL_SKIPPED, &visual.skipped_pages));
    }
    sections
}

fn page_list(heading: &str, pages: &[usize]) -> String {
    // Page numbers are presented 1-indexed.
    let numbers: Vec<usize> = pages.iter().map(|index| index + 1).collect();
    let ranges = compress_ranges(&numbers).unwrap_or_else(|| {
        numbers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    });
    format!("{}\n{}", heading, ranges)
}
