//! Markup for the textual reports.

use crate::models::report::PageDiff;
use crate::text::{EditScript, render, tag_changed_lines};

/// Whole-document report with every changed line tagged for searching.
pub fn whole_document_html(script: &EditScript, search_tag: &str) -> String {
    tag_changed_lines(&render(script), search_tag)
}

/// Per-page report: one block per page, each headed by its page number.
pub fn paginated_html(pages: &[PageDiff]) -> String {
    let mut html = String::new();
    for page in pages {
        html.push_str(&page_header(page.page_number()));
        html.push_str(&render(&page.script));
    }
    html
}

/// Page-break header naming a 1-indexed page.
pub fn page_header(page_number: usize) -> String {
    format!(
        "<br><p style=\"page-break-before:always; font-weight:bold; text-indent:20em;\">\
         -----Page {}-----</p><br>",
        page_number
    )
}
