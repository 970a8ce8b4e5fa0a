//! Positional page alignment.
//!
//! Pages are paired by position only: page `i` of the first document is
//! compared with page `i` of the second. A page inserted or removed in the
//! middle of a document therefore shifts every later pairing. Content-based
//! re-alignment is not attempted.

use serde::Serialize;

use crate::error::{DiffError, Result};

/// Which document a leftover page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    OnlyInA,
    OnlyInB,
}

/// A page present in only one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Unmatched {
    /// Page index in its own document (0-indexed).
    pub index: usize,
    pub side: Side,
}

/// Pairing of two page sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentResult {
    /// Matched `(a, b)` index pairs, ascending.
    pub matched: Vec<(usize, usize)>,
    /// Pages of the longer document past the end of the shorter one, ascending.
    pub unmatched: Vec<Unmatched>,
}

impl AlignmentResult {
    /// Align two sequences of the given lengths.
    pub fn from_lengths(len_a: usize, len_b: usize) -> Self {
        let common = len_a.min(len_b);
        let matched = (0..common).map(|i| (i, i)).collect();
        let unmatched = if len_a > common {
            (common..len_a)
                .map(|index| Unmatched { index, side: Side::OnlyInA })
                .collect()
        } else {
            (common..len_b)
                .map(|index| Unmatched { index, side: Side::OnlyInB })
                .collect()
        };
        Self { matched, unmatched }
    }
}

/// Align two page sequences positionally.
///
/// Fails with [`DiffError::Pagination`] when either sequence is missing.
pub fn align<T>(a: Option<&[T]>, b: Option<&[T]>) -> Result<AlignmentResult> {
    match (a, b) {
        (Some(a), Some(b)) => Ok(AlignmentResult::from_lengths(a.len(), b.len())),
        (None, None) => Err(DiffError::Pagination(
            "neither document could be paginated".to_string(),
        )),
        (None, _) => Err(DiffError::Pagination(
            "first document could not be paginated".to_string(),
        )),
        (_, None) => Err(DiffError::Pagination(
            "second document could not be paginated".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_align_longer_second_document() {
        let a = vec![(); 5];
        let b = vec![(); 7];
        let result = align(Some(&a[..]), Some(&b[..])).unwrap();

        assert_eq!(result.matched.len(), 5);
        assert_eq!(result.matched.last(), Some(&(4, 4)));
        assert_eq!(
            result.unmatched,
            vec![
                Unmatched { index: 5, side: Side::OnlyInB },
                Unmatched { index: 6, side: Side::OnlyInB },
            ]
        );
    }

    #[test]
    fn test_align_longer_first_document() {
        let result = AlignmentResult::from_lengths(3, 1);
        assert_eq!(result.matched, vec![(0, 0)]);
        assert!(result.unmatched.iter().all(|u| u.side == Side::OnlyInA));
        assert_eq!(result.unmatched.iter().map(|u| u.index).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_align_equal_and_empty() {
        let result = AlignmentResult::from_lengths(4, 4);
        assert_eq!(result.matched.len(), 4);
        assert!(result.unmatched.is_empty());

        assert_eq!(AlignmentResult::from_lengths(0, 0), AlignmentResult::default());
    }

    #[test]
    fn test_align_missing_sequence() {
        let pages = vec![(); 2];
        let err = align(None, Some(&pages[..])).unwrap_err();
        assert!(matches!(err, DiffError::Pagination(_)));
        assert!(err.to_string().contains("first document"));
        assert!(align::<()>(None, None).is_err());
    }
}
