//! Character-level highlighting within one replaced line pair.
//!
//! Ranges are half-open byte ranges into the original line, always on char
//! boundaries. The alignment itself is computed on chars.

use std::ops::Range;

use crate::features::template::{self, LiteralPayload};

/// Changed spans within the two lines of a `Replace` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineDiff {
    pub left_ranges: Vec<Range<usize>>,
    pub right_ranges: Vec<Range<usize>>,
}

impl InlineDiff {
    /// True if neither side has a changed span.
    pub fn is_empty(&self) -> bool {
        self.left_ranges.is_empty() && self.right_ranges.is_empty()
    }
}

/// Unmatched ranges closer than this many chars are merged.
const MERGE_GAP: usize = 1;

/// Past this many LCS table cells the differing middle is reported as one
/// changed span per side.
const MAX_TABLE_CELLS: usize = 4_000_000;

/// Changed spans between two lines.
pub fn inline_diff(left: &str, right: &str) -> InlineDiff {
    if left == right {
        return InlineDiff::default();
    }
    let a: Vec<char> = left.chars().collect();
    let b: Vec<char> = right.chars().collect();
    let (left_chars, right_chars) = changed_char_ranges(&a, &b);
    InlineDiff {
        left_ranges: to_byte_ranges(left, &left_chars),
        right_ranges: to_byte_ranges(right, &right_chars),
    }
}

/// Like [`inline_diff`], but when either line is a builder call the string
/// literal payloads are compared instead, and the result is mapped back onto
/// the original lines. Quotes and call syntax are never highlighted.
pub fn inline_diff_with_literal_unwrap(left: &str, right: &str) -> InlineDiff {
    if left == right {
        return InlineDiff::default();
    }
    if !template::is_builder_call(left) && !template::is_builder_call(right) {
        return inline_diff(left, right);
    }

    let left_payload = template::extract_literal_payload(left);
    let right_payload = template::extract_literal_payload(right);
    let a: Vec<char> = left_payload.text.chars().collect();
    let b: Vec<char> = right_payload.text.chars().collect();
    let (left_chars, right_chars) = changed_char_ranges(&a, &b);

    InlineDiff {
        left_ranges: remap(&left_payload, &left_chars),
        right_ranges: remap(&right_payload, &right_chars),
    }
}

/// Unmatched char ranges on each side, gaps of at most [`MERGE_GAP`] merged.
fn changed_char_ranges(a: &[char], b: &[char]) -> (Vec<Range<usize>>, Vec<Range<usize>>) {
    // A common prefix and suffix always belong to some longest alignment
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let mut a_matched = vec![false; a_mid.len()];
    let mut b_matched = vec![false; b_mid.len()];
    if (a_mid.len() + 1).saturating_mul(b_mid.len() + 1) <= MAX_TABLE_CELLS {
        for (i, j) in lcs_chars(a_mid, b_mid) {
            a_matched[i] = true;
            b_matched[j] = true;
        }
    }

    let shift = |r: Range<usize>| r.start + prefix..r.end + prefix;
    (
        merge_close(unmatched(&a_matched)).into_iter().map(shift).collect(),
        merge_close(unmatched(&b_matched)).into_iter().map(shift).collect(),
    )
}

/// Compute the LCS of two char sequences, returning matched index pairs.
fn lcs_chars(old: &[char], new: &[char]) -> Vec<(usize, usize)> {
    let m = old.len();
    let n = new.len();

    // DP table
    let mut dp = vec![vec![0u32; n + 1]; m + 1];
    for i in (0..m).rev() {
        for j in (0..n).rev() {
            dp[i][j] = if old[i] == new[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    // Backtrack one alignment
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < m && j < n {
        if old[i] == new[j] {
            result.push((i, j));
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    result
}

/// Maximal runs of `false` as half-open ranges.
fn unmatched(matched: &[bool]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (i, &m) in matched.iter().enumerate() {
        match (m, start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                ranges.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        ranges.push(s..matched.len());
    }
    ranges
}

fn merge_close(ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for r in ranges {
        match merged.last_mut() {
            Some(last) if r.start - last.end <= MERGE_GAP => last.end = r.end,
            _ => merged.push(r),
        }
    }
    merged
}

/// Char-index ranges to byte ranges of `text`.
fn to_byte_ranges(text: &str, ranges: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    offsets.push(text.len());
    ranges
        .iter()
        .map(|r| offsets[r.start]..offsets[r.end])
        .collect()
}

/// Payload char ranges to byte ranges of the source line, merging ranges that
/// touch once mapped.
fn remap(payload: &LiteralPayload, ranges: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut out: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for r in ranges {
        if r.is_empty() {
            continue;
        }
        let mapped = payload.map[r.start].start..payload.map[r.end - 1].end;
        match out.last_mut() {
            Some(last) if mapped.start <= last.end => last.end = last.end.max(mapped.end),
            _ => out.push(mapped),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slices<'a>(text: &'a str, ranges: &[Range<usize>]) -> Vec<&'a str> {
        ranges.iter().map(|r| &text[r.clone()]).collect()
    }

    #[test]
    fn identical_is_empty() {
        assert!(inline_diff("same", "same").is_empty());
        let line = r#"sb.Append("x");"#;
        assert!(inline_diff_with_literal_unwrap(line, line).is_empty());
    }

    #[test]
    fn single_word_change() {
        let d = inline_diff("let total = 1;", "let total = 2;");
        assert_eq!(slices("let total = 1;", &d.left_ranges), vec!["1"]);
        assert_eq!(slices("let total = 2;", &d.right_ranges), vec!["2"]);
    }

    #[test]
    fn one_side_empty() {
        let d = inline_diff("", "abc");
        assert!(d.left_ranges.is_empty());
        assert_eq!(d.right_ranges, vec![0..3]);
    }

    #[test]
    fn close_gaps_merge() {
        // The shared "y" is a one-char gap between two changes
        let d = inline_diff("xaybzx", "xqyrzx");
        assert_eq!(d.left_ranges.len(), 1);
        assert_eq!(d.right_ranges.len(), 1);
    }

    #[test]
    fn multibyte_offsets() {
        let left = "naïve café";
        let right = "naïve cafè";
        let d = inline_diff(left, right);
        assert_eq!(slices(left, &d.left_ranges), vec!["é"]);
        assert_eq!(slices(right, &d.right_ranges), vec!["è"]);
    }

    #[test]
    fn attribute_spacing() {
        let left = r#"<div class="foo bar">"#;
        let right = r#"<div class="foo  bar">"#;
        let d = inline_diff(left, right);
        assert!(d.left_ranges.is_empty());
        assert_eq!(d.right_ranges.len(), 1);
        let value_start = right.find("foo").unwrap();
        let value_end = right.find("bar").unwrap() + 3;
        let r = &d.right_ranges[0];
        assert!(r.start >= value_start && r.end <= value_end);
        assert_eq!(right[r.clone()].trim(), "");
    }

    #[test]
    fn literal_unwrap_highlights_inside_payload() {
        let left = r#"sb.Append("<td>old</td>");"#;
        let right = r#"<td>new</td>"#;
        let d = inline_diff_with_literal_unwrap(left, right);
        assert_eq!(slices(left, &d.left_ranges), vec!["old"]);
        assert_eq!(slices(right, &d.right_ranges), vec!["new"]);
    }

    #[test]
    fn literal_unwrap_maps_across_escapes() {
        let left = r#"sb.Append("<a href=\"x\">");"#;
        let right = r#"sb.Append("<a href=\"y\">");"#;
        let d = inline_diff_with_literal_unwrap(left, right);
        assert_eq!(slices(left, &d.left_ranges), vec!["x"]);
        assert_eq!(slices(right, &d.right_ranges), vec!["y"]);
    }
}
