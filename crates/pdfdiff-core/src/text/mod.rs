//! Character-level text diffing.
//!
//! The edit script is computed once by [`TextDiffEngine::diff`] and can then
//! be cleaned up for human consumption with [`TextDiffEngine::diff_semantic`].
//! Both the whole-document and the per-page views of a comparison call the
//! same engine with different inputs.

mod cleanup;
mod myers;
mod render;

pub use render::{render, tag_changed_lines};

use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cancel::Cancellation;
use crate::models::config::TextConfig;

lazy_static! {
    // Whitespace and non-printing characters, including NBSP, em space,
    // ideographic space, zero-width space and BOM.
    static ref INSIGNIFICANT: Regex = Regex::new(
        r"^[\s\u{00A0}\u{2003}\u{3000}\u{200B}\u{FEFF}\p{Cc}]*$"
    ).unwrap();
}

/// Kind of an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Equal,
    Insert,
    Delete,
}

impl Operation {
    /// Upper-case name used in summaries.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Equal => "EQUAL",
            Operation::Insert => "INSERT",
            Operation::Delete => "DELETE",
        }
    }
}

/// A single edit operation carrying its text span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffOp {
    /// Text present in both documents.
    Equal(String),
    /// Text present only in the second document.
    Insert(String),
    /// Text present only in the first document.
    Delete(String),
}

impl DiffOp {
    pub fn operation(&self) -> Operation {
        match self {
            DiffOp::Equal(_) => Operation::Equal,
            DiffOp::Insert(_) => Operation::Insert,
            DiffOp::Delete(_) => Operation::Delete,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DiffOp::Equal(text) | DiffOp::Insert(text) | DiffOp::Delete(text) => text,
        }
    }

    /// Whether this operation is a change worth reporting.
    ///
    /// Equalities are never significant, and neither are edits consisting
    /// only of whitespace or non-printing characters.
    pub fn is_significant(&self) -> bool {
        self.operation() != Operation::Equal && !INSIGNIFICANT.is_match(self.text())
    }

    fn from_chunk(chunk: Chunk) -> Self {
        let text: String = chunk.text.into_iter().collect();
        match chunk.op {
            Operation::Equal => DiffOp::Equal(text),
            Operation::Insert => DiffOp::Insert(text),
            Operation::Delete => DiffOp::Delete(text),
        }
    }
}

/// Free-function form of [`DiffOp::is_significant`].
pub fn is_significant(op: &DiffOp) -> bool {
    op.is_significant()
}

/// Ordered sequence of edit operations transforming one text into another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditScript(Vec<DiffOp>);

impl EditScript {
    pub fn new(ops: Vec<DiffOp>) -> Self {
        Self(ops)
    }

    /// Script inserting the whole of `text`.
    pub fn insertion(text: &str) -> Self {
        Self(vec![DiffOp::Insert(text.to_string())])
    }

    /// Script deleting the whole of `text`.
    pub fn deletion(text: &str) -> Self {
        Self(vec![DiffOp::Delete(text.to_string())])
    }

    pub fn ops(&self) -> &[DiffOp] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DiffOp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the script contains no insertions or deletions.
    pub fn is_identical(&self) -> bool {
        self.0.iter().all(|op| op.operation() == Operation::Equal)
    }

    /// Whether any operation is significant.
    pub fn has_significant(&self) -> bool {
        self.0.iter().any(DiffOp::is_significant)
    }

    /// Significant operations, in order.
    pub fn significant(&self) -> impl Iterator<Item = &DiffOp> {
        self.0.iter().filter(|op| op.is_significant())
    }

    /// Rebuild the first text from equal and deleted spans.
    pub fn source_text(&self) -> String {
        self.0
            .iter()
            .filter(|op| op.operation() != Operation::Insert)
            .map(DiffOp::text)
            .collect()
    }

    /// Rebuild the second text from equal and inserted spans.
    pub fn target_text(&self) -> String {
        self.0
            .iter()
            .filter(|op| op.operation() != Operation::Delete)
            .map(DiffOp::text)
            .collect()
    }

    fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self(
            chunks
                .into_iter()
                .filter(|c| !c.text.is_empty())
                .map(DiffOp::from_chunk)
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a DiffOp;
    type IntoIter = std::slice::Iter<'a, DiffOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Working representation used by the diff algorithms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Chunk {
    pub op: Operation,
    pub text: Vec<char>,
}

impl Chunk {
    pub fn new(op: Operation, text: &[char]) -> Self {
        Self { op, text: text.to_vec() }
    }
}

/// Character-granularity diff engine.
#[derive(Debug, Clone, Default)]
pub struct TextDiffEngine {
    /// Time budget per diff; `None` means unlimited.
    timeout: Option<Duration>,
    cancel: Cancellation,
}

impl TextDiffEngine {
    /// Create an engine without a time budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine from configuration.
    ///
    /// A non-positive, non-finite or out-of-range `timeout_secs` means no
    /// budget.
    pub fn from_config(config: &TextConfig) -> Self {
        let timeout = (config.timeout_secs > 0.0)
            .then(|| Duration::try_from_secs_f32(config.timeout_secs).ok())
            .flatten();
        Self::new().with_timeout(timeout)
    }

    /// Set the time budget for a single diff.
    ///
    /// Past the budget the remaining work degrades to whole-chunk
    /// delete/insert pairs, which still reconstruct both texts.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stop diffing early once `cancel` fires, the same way the time budget
    /// does. Callers check the token afterwards to tell a cut-short script
    /// from a complete one.
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Compute a minimal edit script between two texts.
    pub fn diff(&self, a: &str, b: &str) -> EditScript {
        EditScript::from_chunks(self.diff_chunks(a, b))
    }

    /// Compute an edit script cleaned up for human readers.
    pub fn diff_semantic(&self, a: &str, b: &str) -> EditScript {
        let mut chunks = self.diff_chunks(a, b);
        cleanup::cleanup_semantic(&mut chunks);
        cleanup::coalesce(&mut chunks);
        EditScript::from_chunks(chunks)
    }

    fn diff_chunks(&self, a: &str, b: &str) -> Vec<Chunk> {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let stop = self.cancel.limited_to(self.timeout);
        myers::diff_main(&a, &b, &stop)
    }
}
