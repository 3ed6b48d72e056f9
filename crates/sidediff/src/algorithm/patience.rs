//! Patience diff over line signatures.
//!
//! Lines whose [`line_key`](crate::signature::line_key) occurs exactly once
//! on each side are anchor candidates; the longest run of candidates that is
//! increasing on both sides becomes the backbone, and the gaps between
//! backbone anchors are diffed recursively. Segments without candidates go to
//! the Myers base case.

use std::collections::HashMap;

use super::{all_deletes, all_inserts, myers, offset_edits, Edit, KeyedLine};

const MAX_RECURSION: usize = 64;

/// Compute a diff using the patience strategy.
pub fn diff(left: &[KeyedLine<'_>], right: &[KeyedLine<'_>]) -> Vec<Edit> {
    recurse(left, right, 0)
}

fn recurse(left: &[KeyedLine<'_>], right: &[KeyedLine<'_>], depth: usize) -> Vec<Edit> {
    if left.is_empty() && right.is_empty() {
        return Vec::new();
    }
    if left.is_empty() {
        return all_inserts(right.len());
    }
    if right.is_empty() {
        return all_deletes(left.len());
    }
    if depth >= MAX_RECURSION {
        tracing::trace!(
            depth,
            left = left.len(),
            right = right.len(),
            "patience depth limit, using myers"
        );
        return myers::diff(left, right);
    }

    // Trim literally identical prefix and suffix
    let prefix_len = left
        .iter()
        .zip(right.iter())
        .take_while(|(a, b)| a.text == b.text)
        .count();
    let suffix_len = left[prefix_len..]
        .iter()
        .rev()
        .zip(right[prefix_len..].iter().rev())
        .take_while(|(a, b)| a.text == b.text)
        .count();

    let left_mid = &left[prefix_len..left.len() - suffix_len];
    let right_mid = &right[prefix_len..right.len() - suffix_len];

    let mut edits: Vec<Edit> = (0..prefix_len).map(|i| Edit::equal(i, i)).collect();
    edits.extend(offset_edits(
        diff_middle(left_mid, right_mid, depth),
        prefix_len,
        prefix_len,
    ));
    let left_tail = left.len() - suffix_len;
    let right_tail = right.len() - suffix_len;
    edits.extend((0..suffix_len).map(|i| Edit::equal(left_tail + i, right_tail + i)));
    edits
}

fn diff_middle(left: &[KeyedLine<'_>], right: &[KeyedLine<'_>], depth: usize) -> Vec<Edit> {
    if left.is_empty() {
        return all_inserts(right.len());
    }
    if right.is_empty() {
        return all_deletes(left.len());
    }

    let candidates = find_unique_matches(left, right);
    let exact: Vec<bool> = candidates
        .iter()
        .map(|&(li, ri)| left[li].text == right[ri].text)
        .collect();
    let backbone = longest_increasing(&candidates, &exact);
    if backbone.is_empty() {
        return myers::diff(left, right);
    }

    let mut edits = Vec::with_capacity(left.len() + right.len());
    let mut prev_left = 0;
    let mut prev_right = 0;

    for &(li, ri) in &backbone {
        let gap = recurse(&left[prev_left..li], &right[prev_right..ri], depth + 1);
        edits.extend(offset_edits(gap, prev_left, prev_right));
        edits.extend(offset_edits(anchor_pair(&left[li], &right[ri]), li, ri));
        prev_left = li + 1;
        prev_right = ri + 1;
    }

    let tail = recurse(&left[prev_left..], &right[prev_right..], depth + 1);
    edits.extend(offset_edits(tail, prev_left, prev_right));
    edits
}

/// Edits for one backbone anchor pair, relative to the pair itself.
fn anchor_pair(left: &KeyedLine<'_>, right: &KeyedLine<'_>) -> Vec<Edit> {
    if left.text == right.text {
        vec![Edit::equal(0, 0)]
    } else if left.cmp == right.cmp {
        // Same key does not imply same content
        vec![Edit::delete(0, 0), Edit::insert(1, 0)]
    } else {
        myers::diff(std::slice::from_ref(left), std::slice::from_ref(right))
    }
}

/// Lines whose signature occurs exactly once on each side.
/// Returns pairs (left_index, right_index) sorted by left_index.
fn find_unique_matches(left: &[KeyedLine<'_>], right: &[KeyedLine<'_>]) -> Vec<(usize, usize)> {
    let left_counts = occurrences(left);
    let right_counts = occurrences(right);

    let mut matches: Vec<(usize, usize)> = left_counts
        .iter()
        .filter_map(|(sig, &(lc, li))| {
            let &(rc, ri) = right_counts.get(sig)?;
            (lc == 1 && rc == 1).then_some((li, ri))
        })
        .collect();
    matches.sort_unstable();
    matches
}

/// signature -> (count, last index)
fn occurrences<'s>(lines: &'s [KeyedLine<'_>]) -> HashMap<&'s str, (usize, usize)> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(sig) = line.sig.as_deref() {
            let entry = counts.entry(sig).or_insert((0, i));
            entry.0 += 1;
            entry.1 = i;
        }
    }
    counts
}

/// Chain rank: length first, then the number of textually identical pairs.
type Rank = (usize, usize);

/// Longest subsequence of `matches` (sorted by left index) whose right
/// indices are strictly increasing, with predecessor links.
///
/// Among chains of equal length the one holding more identical lines wins;
/// remaining ties go to the chain found first. A Fenwick tree over right
/// indices keeps the best chain ending below each right index.
fn longest_increasing(matches: &[(usize, usize)], exact: &[bool]) -> Vec<(usize, usize)> {
    let width = matches.iter().map(|&(_, ri)| ri + 1).max().unwrap_or(0);
    let mut tree: Vec<Option<(Rank, usize)>> = vec![None; width + 1];
    let mut prev: Vec<Option<usize>> = vec![None; matches.len()];
    let mut best: Option<(Rank, usize)> = None;

    for (idx, &(_, ri)) in matches.iter().enumerate() {
        // best chain whose last right index is below ri
        let mut below = None;
        let mut pos = ri;
        while pos > 0 {
            below = better(below, tree[pos]);
            pos &= pos - 1;
        }
        let (len, same) = below.map_or((0, 0), |(rank, _)| rank);
        let entry = Some(((len + 1, same + usize::from(exact[idx])), idx));
        prev[idx] = below.map(|(_, p)| p);

        let mut pos = ri + 1;
        while pos <= width {
            tree[pos] = better(tree[pos], entry);
            pos += pos & pos.wrapping_neg();
        }
        best = better(best, entry);
    }

    let mut result = Vec::new();
    let mut current = best.map(|(_, idx)| idx);
    while let Some(idx) = current {
        result.push(matches[idx]);
        current = prev[idx];
    }
    result.reverse();
    result
}

fn better(a: Option<(Rank, usize)>, b: Option<(Rank, usize)>) -> Option<(Rank, usize)> {
    match (a, b) {
        (Some((ra, _)), Some((rb, _))) if rb > ra => b,
        (None, _) => b,
        _ => a,
    }
}
