//! Myers O(ND) difference algorithm with linear-space middle-snake bisection.

use super::cleanup::cleanup_merge;
use crate::cancel::Cancellation;
use super::{Chunk, Operation};

/// Diff two character sequences, stripping shared prefix and suffix first.
///
/// Once `stop` is cancelled the remaining work degrades to delete/insert
/// pairs.
pub(crate) fn diff_main(a: &[char], b: &[char], stop: &Cancellation) -> Vec<Chunk> {
    if a == b {
        return if a.is_empty() {
            Vec::new()
        } else {
            vec![Chunk::new(Operation::Equal, a)]
        };
    }

    let prefix = common_prefix(a, b);
    let (a_rest, b_rest) = (&a[prefix..], &b[prefix..]);
    let suffix = common_suffix(a_rest, b_rest);
    let a_mid = &a_rest[..a_rest.len() - suffix];
    let b_mid = &b_rest[..b_rest.len() - suffix];

    let mut diffs = compute(a_mid, b_mid, stop);

    if prefix > 0 {
        diffs.insert(0, Chunk::new(Operation::Equal, &a[..prefix]));
    }
    if suffix > 0 {
        diffs.push(Chunk::new(Operation::Equal, &a[a.len() - suffix..]));
    }

    cleanup_merge(&mut diffs);
    diffs
}

/// Diff two sequences known to share no prefix or suffix.
fn compute(a: &[char], b: &[char], stop: &Cancellation) -> Vec<Chunk> {
    if a.is_empty() {
        return vec![Chunk::new(Operation::Insert, b)];
    }
    if b.is_empty() {
        return vec![Chunk::new(Operation::Delete, a)];
    }

    let a_longer = a.len() > b.len();
    let (long, short) = if a_longer { (a, b) } else { (b, a) };

    if let Some(start) = find(long, short) {
        // The shorter text sits inside the longer one.
        let op = if a_longer { Operation::Delete } else { Operation::Insert };
        let mut diffs = Vec::with_capacity(3);
        if start > 0 {
            diffs.push(Chunk::new(op, &long[..start]));
        }
        diffs.push(Chunk::new(Operation::Equal, short));
        if start + short.len() < long.len() {
            diffs.push(Chunk::new(op, &long[start + short.len()..]));
        }
        return diffs;
    }

    if short.len() == 1 {
        // Single character not contained in the other text.
        return vec![
            Chunk::new(Operation::Delete, a),
            Chunk::new(Operation::Insert, b),
        ];
    }

    bisect(a, b, stop)
}

/// Find the middle snake and split the problem in two.
fn bisect(a: &[char], b: &[char], stop: &Cancellation) -> Vec<Chunk> {
    let len_a = a.len() as isize;
    let len_b = b.len() as isize;
    let max_d = (len_a + len_b + 1) / 2;
    let v_offset = max_d;
    let v_length = 2 * max_d + 2;
    let mut v1 = vec![-1isize; v_length as usize];
    let mut v2 = vec![-1isize; v_length as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;

    let delta = len_a - len_b;
    // With an odd delta the forward path will collide with the reverse path.
    let front = delta % 2 != 0;

    let (mut k1_start, mut k1_end) = (0isize, 0isize);
    let (mut k2_start, mut k2_end) = (0isize, 0isize);

    for d in 0..max_d {
        if stop.is_cancelled() {
            break;
        }

        // Walk the front path one step.
        let mut k1 = -d + k1_start;
        while k1 <= d - k1_end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < len_a && y1 < len_b && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;

            if x1 > len_a {
                // Ran off the right of the graph.
                k1_end += 2;
            } else if y1 > len_b {
                // Ran off the bottom of the graph.
                k1_start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                    let x2 = len_a - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize, stop);
                    }
                }
            }
            k1 += 2;
        }

        // Walk the reverse path one step.
        let mut k2 = -d + k2_start;
        while k2 <= d - k2_end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < len_a
                && y2 < len_b
                && a[(len_a - x2 - 1) as usize] == b[(len_b - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;

            if x2 > len_a {
                k2_end += 2;
            } else if y2 > len_b {
                k2_start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    // Mirror x2 onto the top-left coordinate system.
                    if x1 >= len_a - x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize, stop);
                    }
                }
            }
            k2 += 2;
        }
    }

    // Cancelled, out of time, or no commonality at all.
    vec![
        Chunk::new(Operation::Delete, a),
        Chunk::new(Operation::Insert, b),
    ]
}

fn bisect_split(
    a: &[char],
    b: &[char],
    x: usize,
    y: usize,
    stop: &Cancellation,
) -> Vec<Chunk> {
    let mut diffs = diff_main(&a[..x], &b[..y], stop);
    diffs.extend(diff_main(&a[x..], &b[y..], stop));
    diffs
}

/// Length of the shared prefix.
pub(crate) fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Length of the shared suffix.
pub(crate) fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Length of the longest suffix of `a` that is a prefix of `b`.
pub(crate) fn common_overlap(a: &[char], b: &[char]) -> usize {
    let length = a.len().min(b.len());
    if length == 0 {
        return 0;
    }
    let a = &a[a.len() - length..];
    let b = &b[..length];
    if a == b {
        return length;
    }

    // Grow the candidate overlap by jumping to the next place the current
    // suffix of `a` occurs in `b`.
    let mut best = 0;
    let mut size = 1;
    loop {
        let pattern = &a[length - size..];
        let Some(found) = find(b, pattern) else {
            return best;
        };
        size += found;
        if size > length {
            return best;
        }
        if found == 0 || a[length - size..] == b[..size] {
            best = size;
            size += 1;
            if size > length {
                return best;
            }
        }
    }
}

/// Position (in chars) of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    let haystack_str: String = haystack.iter().collect();
    let needle_str: String = needle.iter().collect();
    let byte_pos = haystack_str.find(&needle_str)?;
    Some(haystack_str[..byte_pos].chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_common_prefix_and_suffix() {
        assert_eq!(common_prefix(&chars("abc"), &chars("xyz")), 0);
        assert_eq!(common_prefix(&chars("1234abcdef"), &chars("1234xyz")), 4);
        assert_eq!(common_prefix(&chars("1234"), &chars("1234xyz")), 4);
        assert_eq!(common_suffix(&chars("abcdef1234"), &chars("xyz1234")), 4);
        assert_eq!(common_suffix(&chars("1234"), &chars("xyz1234")), 4);
    }

    #[test]
    fn test_common_overlap() {
        assert_eq!(common_overlap(&chars(""), &chars("abcd")), 0);
        assert_eq!(common_overlap(&chars("abc"), &chars("abcd")), 3);
        assert_eq!(common_overlap(&chars("123456"), &chars("abcd")), 0);
        assert_eq!(common_overlap(&chars("123456xxx"), &chars("xxxabcd")), 3);
        assert_eq!(common_overlap(&chars("fi"), &chars("\u{FB01}i")), 0);
    }

    #[test]
    fn test_find_counts_chars_not_bytes() {
        assert_eq!(find(&chars("\u{00E9}t\u{00E9} abc"), &chars("abc")), Some(4));
        assert_eq!(find(&chars("abc"), &chars("abcd")), None);
    }

    #[test]
    fn test_bisect_without_deadline() {
        let diffs = bisect(&chars("cat"), &chars("map"), &Cancellation::new());
        let ops: Vec<(Operation, String)> = diffs
            .into_iter()
            .map(|c| (c.op, c.text.into_iter().collect()))
            .collect();
        assert_eq!(
            ops,
            vec![
                (Operation::Delete, "c".to_string()),
                (Operation::Insert, "m".to_string()),
                (Operation::Equal, "a".to_string()),
                (Operation::Delete, "t".to_string()),
                (Operation::Insert, "p".to_string()),
            ]
        );
    }
}
