//! HTML-like rendering of edit scripts.

use super::{DiffOp, EditScript};

const INSERT_OPEN: &str = "<ins style=\"background:#e6ffe6;\">";
const DELETE_OPEN: &str = "<del style=\"background:#ffe6e6;\">";

/// Render an edit script as highlighted markup.
///
/// Deletions are wrapped in `<del>`, insertions in `<ins>`, and equal text in
/// `<span>`. Newlines become `<br>`.
pub fn render(script: &EditScript) -> String {
    let mut html = String::new();
    for op in script {
        let text = escape(op.text());
        match op {
            DiffOp::Insert(_) => {
                html.push_str(INSERT_OPEN);
                html.push_str(&text);
                html.push_str("</ins>");
            }
            DiffOp::Delete(_) => {
                html.push_str(DELETE_OPEN);
                html.push_str(&text);
                html.push_str("</del>");
            }
            DiffOp::Equal(_) => {
                html.push_str("<span>");
                html.push_str(&text);
                html.push_str("</span>");
            }
        }
    }
    html
}

/// Prefix every rendered line that contains a change marker with `tag`.
///
/// Lines are split after each `<br>`, so a tag lands at the start of each
/// visual line a reader can search for.
pub fn tag_changed_lines(html: &str, tag: &str) -> String {
    let mut tagged = String::with_capacity(html.len());
    for line in html.split_inclusive("<br>") {
        if line.contains("<ins") || line.contains("<del") {
            tagged.push_str("<pre>");
            tagged.push_str(tag);
            tagged.push_str("</pre>");
        }
        tagged.push_str(line);
    }
    tagged
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' => escaped.push_str("<br>"),
            _ => escaped.push(c),
        }
    }
    escaped
}
