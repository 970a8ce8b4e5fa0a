//! Post-processing passes over raw edit scripts.

use super::myers::{common_overlap, common_prefix, common_suffix};
use super::{Chunk, Operation};

/// Merge adjacent runs, factor shared text out of delete/insert pairs, and
/// slide single edits sideways to absorb neighbouring equalities.
pub(crate) fn cleanup_merge(diffs: &mut Vec<Chunk>) {
    diffs.retain(|c| !c.text.is_empty());
    // Sentinel equality so the final run is flushed.
    diffs.push(Chunk::new(Operation::Equal, &[]));

    let mut pointer = 0;
    let mut count_delete = 0;
    let mut count_insert = 0;
    let mut text_delete: Vec<char> = Vec::new();
    let mut text_insert: Vec<char> = Vec::new();

    while pointer < diffs.len() {
        match diffs[pointer].op {
            Operation::Insert => {
                count_insert += 1;
                text_insert.extend_from_slice(&diffs[pointer].text);
                pointer += 1;
            }
            Operation::Delete => {
                count_delete += 1;
                text_delete.extend_from_slice(&diffs[pointer].text);
                pointer += 1;
            }
            Operation::Equal => {
                if count_delete + count_insert > 1 {
                    if count_delete != 0 && count_insert != 0 {
                        let prefix = common_prefix(&text_insert, &text_delete);
                        if prefix != 0 {
                            let run_start = pointer - count_delete - count_insert;
                            if run_start > 0 && diffs[run_start - 1].op == Operation::Equal {
                                diffs[run_start - 1]
                                    .text
                                    .extend_from_slice(&text_insert[..prefix]);
                            } else {
                                diffs.insert(0, Chunk::new(Operation::Equal, &text_insert[..prefix]));
                                pointer += 1;
                            }
                            text_insert.drain(..prefix);
                            text_delete.drain(..prefix);
                        }

                        let suffix = common_suffix(&text_insert, &text_delete);
                        if suffix != 0 {
                            let tail = text_insert[text_insert.len() - suffix..].to_vec();
                            diffs[pointer].text.splice(0..0, tail);
                            text_insert.truncate(text_insert.len() - suffix);
                            text_delete.truncate(text_delete.len() - suffix);
                        }
                    }

                    let mut merged = Vec::with_capacity(2);
                    if !text_delete.is_empty() {
                        merged.push(Chunk::new(Operation::Delete, &text_delete));
                    }
                    if !text_insert.is_empty() {
                        merged.push(Chunk::new(Operation::Insert, &text_insert));
                    }
                    pointer -= count_delete + count_insert;
                    let inserted = merged.len();
                    diffs.splice(pointer..pointer + count_delete + count_insert, merged);
                    pointer += inserted + 1;
                } else if pointer != 0 && diffs[pointer - 1].op == Operation::Equal {
                    let text = diffs.remove(pointer).text;
                    diffs[pointer - 1].text.extend(text);
                } else {
                    pointer += 1;
                }
                count_insert = 0;
                count_delete = 0;
                text_delete.clear();
                text_insert.clear();
            }
        }
    }
    if diffs.last().is_some_and(|c| c.text.is_empty()) {
        diffs.pop();
    }

    // Second pass: a single edit between two equalities may shift so that
    // one of the equalities disappears, e.g. A<ins>BA</ins>C -> <ins>AB</ins>AC.
    let mut changes = false;
    let mut pointer = 1;
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Operation::Equal && diffs[pointer + 1].op == Operation::Equal {
            let previous = diffs[pointer - 1].text.clone();
            let next = diffs[pointer + 1].text.clone();
            let current = &diffs[pointer].text;

            if current.ends_with(&previous) {
                let mut shifted = previous.clone();
                shifted.extend_from_slice(&current[..current.len() - previous.len()]);
                diffs[pointer].text = shifted;
                diffs[pointer + 1].text.splice(0..0, previous);
                diffs.remove(pointer - 1);
                changes = true;
            } else if current.starts_with(&next) {
                let mut shifted = current[next.len()..].to_vec();
                shifted.extend_from_slice(&next);
                diffs[pointer - 1].text.extend_from_slice(&next);
                diffs[pointer].text = shifted;
                diffs.remove(pointer + 1);
                changes = true;
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(diffs);
    }
}

/// Remove equalities that are semantically trivial, then realign edit
/// boundaries to word and line breaks and extract delete/insert overlaps.
pub(crate) fn cleanup_semantic(diffs: &mut Vec<Chunk>) {
    let mut changes = false;
    // Indices of equalities seen so far.
    let mut equalities: Vec<usize> = Vec::new();
    let mut last_equality: Option<usize> = None;
    let mut pointer = 0;
    // Edit lengths before and after the last equality.
    let (mut inserted_before, mut deleted_before) = (0usize, 0usize);
    let (mut inserted_after, mut deleted_after) = (0usize, 0usize);

    while pointer < diffs.len() {
        if diffs[pointer].op == Operation::Equal {
            equalities.push(pointer);
            inserted_before = inserted_after;
            deleted_before = deleted_after;
            inserted_after = 0;
            deleted_after = 0;
            last_equality = Some(diffs[pointer].text.len());
        } else {
            if diffs[pointer].op == Operation::Insert {
                inserted_after += diffs[pointer].text.len();
            } else {
                deleted_after += diffs[pointer].text.len();
            }

            let eliminate = last_equality.is_some_and(|len| {
                len > 0
                    && len <= inserted_before.max(deleted_before)
                    && len <= inserted_after.max(deleted_after)
            });
            if let (true, Some(&index)) = (eliminate, equalities.last()) {
                // Replace the equality with a delete followed by an insert.
                let text = diffs[index].text.clone();
                diffs.insert(index, Chunk::new(Operation::Delete, &text));
                diffs[index + 1].op = Operation::Insert;

                equalities.pop();
                // The previous equality needs to be re-evaluated too.
                equalities.pop();
                inserted_before = 0;
                deleted_before = 0;
                inserted_after = 0;
                deleted_after = 0;
                last_equality = None;
                changes = true;

                pointer = equalities.last().map_or(0, |&p| p + 1);
                continue;
            }
        }
        pointer += 1;
    }

    if changes {
        cleanup_merge(diffs);
    }
    cleanup_semantic_lossless(diffs);
    extract_overlaps(diffs);
}

/// Find delete/insert pairs whose texts overlap by at least half of either
/// edit, and turn the overlap into an equality.
fn extract_overlaps(diffs: &mut Vec<Chunk>) {
    let mut pointer = 1;
    while pointer < diffs.len() {
        if diffs[pointer - 1].op == Operation::Delete && diffs[pointer].op == Operation::Insert {
            let deletion = diffs[pointer - 1].text.clone();
            let insertion = diffs[pointer].text.clone();
            let forward = common_overlap(&deletion, &insertion);
            let backward = common_overlap(&insertion, &deletion);

            if forward >= backward {
                if forward * 2 >= deletion.len() || forward * 2 >= insertion.len() {
                    diffs.insert(pointer, Chunk::new(Operation::Equal, &insertion[..forward]));
                    diffs[pointer - 1].text = deletion[..deletion.len() - forward].to_vec();
                    diffs[pointer + 1].text = insertion[forward..].to_vec();
                    pointer += 1;
                }
            } else if backward * 2 >= deletion.len() || backward * 2 >= insertion.len() {
                // Reverse overlap: the insertion moves in front of the deletion.
                diffs.insert(pointer, Chunk::new(Operation::Equal, &deletion[..backward]));
                diffs[pointer - 1] =
                    Chunk::new(Operation::Insert, &insertion[..insertion.len() - backward]);
                diffs[pointer + 1] = Chunk::new(Operation::Delete, &deletion[backward..]);
                pointer += 1;
            }
            pointer += 1;
        }
        pointer += 1;
    }
}

/// Shift single edits surrounded by equalities so that their boundaries fall
/// on the most natural break, e.g. `The c<ins>at c</ins>ame.` becomes
/// `The <ins>cat </ins>came.`.
pub(crate) fn cleanup_semantic_lossless(diffs: &mut Vec<Chunk>) {
    let mut pointer = 1;
    while pointer + 1 < diffs.len() {
        if diffs[pointer - 1].op == Operation::Equal && diffs[pointer + 1].op == Operation::Equal {
            let mut equality1 = diffs[pointer - 1].text.clone();
            let mut edit = diffs[pointer].text.clone();
            let mut equality2 = diffs[pointer + 1].text.clone();

            // Shift the edit as far left as possible.
            let offset = common_suffix(&equality1, &edit);
            if offset > 0 {
                let common = edit[edit.len() - offset..].to_vec();
                equality1.truncate(equality1.len() - offset);
                edit.truncate(edit.len() - offset);
                edit.splice(0..0, common.iter().copied());
                equality2.splice(0..0, common);
            }

            // Step right one character at a time, keeping the best fit.
            let mut best_equality1 = equality1.clone();
            let mut best_edit = edit.clone();
            let mut best_equality2 = equality2.clone();
            let mut best_score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
            while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                let moved = edit.remove(0);
                equality1.push(moved);
                edit.push(equality2.remove(0));
                let score = boundary_score(&equality1, &edit) + boundary_score(&edit, &equality2);
                // >= prefers trailing over leading whitespace on edits.
                if score >= best_score {
                    best_score = score;
                    best_equality1 = equality1.clone();
                    best_edit = edit.clone();
                    best_equality2 = equality2.clone();
                }
            }

            if diffs[pointer - 1].text != best_equality1 {
                if best_equality1.is_empty() {
                    diffs.remove(pointer - 1);
                    pointer -= 1;
                } else {
                    diffs[pointer - 1].text = best_equality1;
                }
                diffs[pointer].text = best_edit;
                if best_equality2.is_empty() {
                    diffs.remove(pointer + 1);
                    pointer = pointer.saturating_sub(1);
                } else {
                    diffs[pointer + 1].text = best_equality2;
                }
            }
        }
        pointer += 1;
    }
}

/// Score how natural a boundary between `one` and `two` is, from 6 (edge of
/// text) down to 0 (middle of a word).
fn boundary_score(one: &[char], two: &[char]) -> u8 {
    let (Some(&char1), Some(&char2)) = (one.last(), two.first()) else {
        return 6;
    };

    let non_alphanumeric1 = !char1.is_alphanumeric();
    let non_alphanumeric2 = !char2.is_alphanumeric();
    let whitespace1 = non_alphanumeric1 && char1.is_whitespace();
    let whitespace2 = non_alphanumeric2 && char2.is_whitespace();
    let line_break1 = whitespace1 && (char1 == '\r' || char1 == '\n');
    let line_break2 = whitespace2 && (char2 == '\r' || char2 == '\n');
    let blank_line1 = line_break1 && ends_with_blank_line(one);
    let blank_line2 = line_break2 && starts_with_blank_line(two);

    if blank_line1 || blank_line2 {
        5
    } else if line_break1 || line_break2 {
        4
    } else if non_alphanumeric1 && !whitespace1 && whitespace2 {
        // End of a sentence.
        3
    } else if whitespace1 || whitespace2 {
        2
    } else if non_alphanumeric1 || non_alphanumeric2 {
        1
    } else {
        0
    }
}

/// Matches `\n\r?\n$`.
fn ends_with_blank_line(text: &[char]) -> bool {
    text.ends_with(&['\n', '\n']) || text.ends_with(&['\n', '\r', '\n'])
}

/// Matches `^\r?\n\r?\n`.
fn starts_with_blank_line(text: &[char]) -> bool {
    let rest = text.strip_prefix(&['\r']).unwrap_or(text);
    let Some(rest) = rest.strip_prefix(&['\n']) else {
        return false;
    };
    let rest = rest.strip_prefix(&['\r']).unwrap_or(rest);
    rest.starts_with(&['\n'])
}

/// Drop empty chunks and join neighbours of the same kind.
pub(crate) fn coalesce(diffs: &mut Vec<Chunk>) {
    let mut merged: Vec<Chunk> = Vec::with_capacity(diffs.len());
    for chunk in diffs.drain(..) {
        if chunk.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.op == chunk.op => last.text.extend(chunk.text),
            _ => merged.push(chunk),
        }
    }
    *diffs = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(op: Operation, text: &str) -> Chunk {
        Chunk { op, text: text.chars().collect() }
    }

    fn render(diffs: &[Chunk]) -> Vec<(Operation, String)> {
        diffs
            .iter()
            .map(|c| (c.op, c.text.iter().collect()))
            .collect()
    }

    #[test]
    fn test_merge_joins_runs_and_factors_prefix() {
        let mut diffs = vec![
            chunk(Operation::Equal, "a"),
            chunk(Operation::Delete, "b"),
            chunk(Operation::Insert, "c"),
            chunk(Operation::Delete, "d"),
            chunk(Operation::Insert, "e"),
        ];
        cleanup_merge(&mut diffs);
        assert_eq!(
            render(&diffs),
            vec![
                (Operation::Equal, "a".into()),
                (Operation::Delete, "bd".into()),
                (Operation::Insert, "ce".into()),
            ]
        );

        let mut diffs = vec![
            chunk(Operation::Delete, "a"),
            chunk(Operation::Insert, "abc"),
            chunk(Operation::Delete, "dc"),
        ];
        cleanup_merge(&mut diffs);
        assert_eq!(
            render(&diffs),
            vec![
                (Operation::Equal, "a".into()),
                (Operation::Delete, "d".into()),
                (Operation::Insert, "b".into()),
                (Operation::Equal, "c".into()),
            ]
        );
    }

    #[test]
    fn test_merge_slides_single_edit() {
        let mut diffs = vec![
            chunk(Operation::Equal, "a"),
            chunk(Operation::Insert, "ba"),
            chunk(Operation::Equal, "c"),
        ];
        cleanup_merge(&mut diffs);
        assert_eq!(
            render(&diffs),
            vec![(Operation::Insert, "ab".into()), (Operation::Equal, "ac".into())]
        );
    }

    #[test]
    fn test_lossless_snaps_to_word_boundary() {
        let mut diffs = vec![
            chunk(Operation::Equal, "The c"),
            chunk(Operation::Insert, "at c"),
            chunk(Operation::Equal, "ame."),
        ];
        cleanup_semantic_lossless(&mut diffs);
        assert_eq!(
            render(&diffs),
            vec![
                (Operation::Equal, "The ".into()),
                (Operation::Insert, "cat ".into()),
                (Operation::Equal, "came.".into()),
            ]
        );
    }

    #[test]
    fn test_lossless_prefers_blank_lines() {
        let mut diffs = vec![
            chunk(Operation::Equal, "AAA\r\n\r\nBBB"),
            chunk(Operation::Insert, "\r\nDDD\r\n\r\nBBB"),
            chunk(Operation::Equal, "\r\nEEE"),
        ];
        cleanup_semantic_lossless(&mut diffs);
        assert_eq!(
            render(&diffs),
            vec![
                (Operation::Equal, "AAA\r\n\r\n".into()),
                (Operation::Insert, "BBB\r\nDDD\r\n\r\n".into()),
                (Operation::Equal, "BBB\r\nEEE".into()),
            ]
        );
    }

    #[test]
    fn test_semantic_extracts_overlap() {
        let mut diffs = vec![
            chunk(Operation::Delete, "abcxxx"),
            chunk(Operation::Insert, "xxxdef"),
        ];
        cleanup_semantic(&mut diffs);
        assert_eq!(
            render(&diffs),
            vec![
                (Operation::Delete, "abc".into()),
                (Operation::Equal, "xxx".into()),
                (Operation::Insert, "def".into()),
            ]
        );
    }

    #[test]
    fn test_boundary_scores() {
        let c = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(boundary_score(&c(""), &c("x")), 6);
        assert_eq!(boundary_score(&c("a\n\n"), &c("b")), 5);
        assert_eq!(boundary_score(&c("a\n"), &c("b")), 4);
        assert_eq!(boundary_score(&c("end."), &c(" Next")), 3);
        assert_eq!(boundary_score(&c("word "), &c("next")), 2);
        assert_eq!(boundary_score(&c("a-"), &c("b")), 1);
        assert_eq!(boundary_score(&c("ab"), &c("cd")), 0);
    }
}
