//! Compact page-range notation.

/// Compress a strictly increasing list of numbers into ranges.
///
/// Runs of three or more consecutive numbers collapse to `start-end`, runs of
/// two are written `start,end`, and singletons are written bare, so
/// `[1, 2, 3, 4, 6, 7, 8, 10]` becomes `"1-4,6-8,10"`.
///
/// Returns `None` when `nums` is empty or not strictly increasing; both are
/// caller errors.
pub fn compress_ranges(nums: &[usize]) -> Option<String> {
    let (&first, rest) = nums.split_first()?;
    if nums.windows(2).any(|w| w[0] >= w[1]) {
        return None;
    }

    let mut runs = Vec::new();
    let (mut start, mut previous) = (first, first);
    for &next in rest {
        if next != previous + 1 {
            runs.push(format_run(start, previous));
            start = next;
        }
        previous = next;
    }
    runs.push(format_run(start, previous));

    Some(runs.join(","))
}

fn format_run(start: usize, end: usize) -> String {
    match end - start {
        0 => start.to_string(),
        1 => format!("{},{}", start, end),
        _ => format!("{}-{}", start, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compress_mixed_runs() {
        assert_eq!(
            compress_ranges(&[1, 2, 3, 4, 6, 7, 8, 10]).as_deref(),
            Some("1-4,6-8,10")
        );
    }

    #[test]
    fn test_compress_short_runs() {
        assert_eq!(compress_ranges(&[5]).as_deref(), Some("5"));
        assert_eq!(compress_ranges(&[5, 6]).as_deref(), Some("5,6"));
        assert_eq!(compress_ranges(&[5, 6, 7]).as_deref(), Some("5-7"));
        assert_eq!(compress_ranges(&[1, 3, 5]).as_deref(), Some("1,3,5"));
        assert_eq!(compress_ranges(&[1, 2, 4, 5]).as_deref(), Some("1,2,4,5"));
    }

    #[test]
    fn test_compress_rejects_caller_errors() {
        // Empty and unsorted input are undefined for the notation itself.
        assert_eq!(compress_ranges(&[]), None);
        assert_eq!(compress_ranges(&[3, 2, 1]), None);
        assert_eq!(compress_ranges(&[1, 1, 2]), None);
    }
}
