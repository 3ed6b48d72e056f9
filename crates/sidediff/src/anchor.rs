//! Forced alignment points.
//!
//! A valid anchor set partitions both texts into segments that are diffed
//! independently; each anchor itself becomes one `Equal` or `Replace` row.
//! A DOCTYPE line present on both sides can be injected as an automatic
//! anchor unless the caller has suppressed it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::{normalize, split_lines};
use crate::options::DiffOptions;
use crate::{algorithm, pairing, Anchor, LineRef, PairedOp};

/// Why an anchor was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidReason {
    /// A line number is at or past its side's line count.
    OutOfRange,
    /// Another anchor uses the same left line.
    DuplicateLeft,
    /// Another anchor uses the same right line.
    DuplicateRight,
    /// The right line does not increase past an anchor earlier on the left.
    OrderReversal,
}

impl InvalidReason {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidReason::OutOfRange => "out-of-range",
            InvalidReason::DuplicateLeft => "duplicate-left",
            InvalidReason::DuplicateRight => "duplicate-right",
            InvalidReason::OrderReversal => "order-reversal",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An anchor with every reason it was rejected for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidAnchor {
    pub anchor: Anchor,
    pub reasons: Vec<InvalidReason>,
}

/// Partition of an anchor set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorValidation {
    /// Anchors with no reason against them, sorted by left line.
    pub valid: Vec<Anchor>,
    /// Rejected anchors, in input order.
    pub invalid: Vec<InvalidAnchor>,
}

impl AnchorValidation {
    pub fn is_all_valid(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Validate `anchors` against the line counts of both sides.
///
/// An anchor may collect several reasons. Order reversal is checked after a
/// stable sort by left line: each anchor's right line must be strictly
/// greater than every right line seen before it, so equal right lines on
/// different left lines are reversals too.
pub fn validate_anchors(
    anchors: &[Anchor],
    left_count: usize,
    right_count: usize,
) -> AnchorValidation {
    let mut left_uses: HashMap<usize, usize> = HashMap::new();
    let mut right_uses: HashMap<usize, usize> = HashMap::new();
    for a in anchors {
        *left_uses.entry(a.left_no).or_default() += 1;
        *right_uses.entry(a.right_no).or_default() += 1;
    }

    let mut reasons: Vec<Vec<InvalidReason>> = anchors
        .iter()
        .map(|a| {
            let mut r = Vec::new();
            if a.left_no >= left_count || a.right_no >= right_count {
                r.push(InvalidReason::OutOfRange);
            }
            if left_uses[&a.left_no] > 1 {
                r.push(InvalidReason::DuplicateLeft);
            }
            if right_uses[&a.right_no] > 1 {
                r.push(InvalidReason::DuplicateRight);
            }
            r
        })
        .collect();

    let mut order: Vec<usize> = (0..anchors.len()).collect();
    order.sort_by_key(|&i| anchors[i].left_no);
    let mut max_right: Option<usize> = None;
    for &i in &order {
        let right = anchors[i].right_no;
        if max_right.is_some_and(|m| right <= m) {
            reasons[i].push(InvalidReason::OrderReversal);
        }
        max_right = Some(max_right.map_or(right, |m| m.max(right)));
    }

    let valid = order
        .iter()
        .filter(|&&i| reasons[i].is_empty())
        .map(|&i| anchors[i])
        .collect();
    let invalid = anchors
        .iter()
        .zip(reasons)
        .filter(|(_, r)| !r.is_empty())
        .map(|(&anchor, reasons)| InvalidAnchor { anchor, reasons })
        .collect();

    AnchorValidation { valid, invalid }
}

/// The first DOCTYPE line of each side, when both sides have one.
pub fn detect_auto_anchor(left_lines: &[&str], right_lines: &[&str]) -> Option<Anchor> {
    let doctype = regex!(r"(?i)<!doctype\b");
    let left = left_lines.iter().position(|l| doctype.is_match(l))?;
    let right = right_lines.iter().position(|l| doctype.is_match(l))?;
    Some(Anchor::new(left, right))
}

/// Key under which a removed automatic anchor is remembered.
pub fn auto_anchor_key(anchor: Anchor) -> String {
    format!("doctype:{}:{}", anchor.left_no, anchor.right_no)
}

/// User anchors merged with the automatic anchor, if it was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnchors {
    /// Candidate set to diff with: the user anchors, plus the automatic one.
    pub anchors: Vec<Anchor>,
    /// The automatic anchor that was injected.
    pub auto_anchor: Option<Anchor>,
    pub validation: AnchorValidation,
}

/// Merge the user's anchors with the automatic DOCTYPE anchor.
///
/// The automatic anchor is dropped when its key equals `suppressed_key`,
/// when the user already declared it, when it would be invalid itself, or
/// when adding it would invalidate an anchor that was valid without it.
pub fn resolve_anchors(
    user: &[Anchor],
    left_lines: &[&str],
    right_lines: &[&str],
    suppressed_key: Option<&str>,
) -> ResolvedAnchors {
    let (left_count, right_count) = (left_lines.len(), right_lines.len());
    let base = validate_anchors(user, left_count, right_count);
    let unchanged = |validation| ResolvedAnchors {
        anchors: user.to_vec(),
        auto_anchor: None,
        validation,
    };

    let Some(auto) = detect_auto_anchor(left_lines, right_lines) else {
        return unchanged(base);
    };
    let key = auto_anchor_key(auto);
    if suppressed_key == Some(key.as_str()) {
        tracing::debug!(%key, "automatic anchor suppressed");
        return unchanged(base);
    }
    if user.contains(&auto) {
        return unchanged(base);
    }

    let mut merged = user.to_vec();
    merged.push(auto);
    let with_auto = validate_anchors(&merged, left_count, right_count);
    let keeps_all = with_auto.valid.contains(&auto)
        && base.valid.iter().all(|a| with_auto.valid.contains(a));
    if !keeps_all {
        tracing::debug!(%auto, "automatic anchor conflicts with user anchors, dropped");
        return unchanged(base);
    }

    tracing::debug!(%auto, "automatic anchor injected");
    ResolvedAnchors {
        anchors: merged,
        auto_anchor: Some(auto),
        validation: with_auto,
    }
}

/// [`resolve_anchors`] when `options.auto_anchor` is set, otherwise the user
/// anchors validated as they are.
pub fn resolve_anchors_with(
    user: &[Anchor],
    left_lines: &[&str],
    right_lines: &[&str],
    suppressed_key: Option<&str>,
    options: &DiffOptions,
) -> ResolvedAnchors {
    if options.auto_anchor {
        return resolve_anchors(user, left_lines, right_lines, suppressed_key);
    }
    ResolvedAnchors {
        anchors: user.to_vec(),
        auto_anchor: None,
        validation: validate_anchors(user, left_lines.len(), right_lines.len()),
    }
}

/// Rows of an anchored diff with the anchor set they were aligned on.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredDiff {
    pub ops: Vec<PairedOp>,
    /// User anchors plus the automatic anchor, if it was injected. Its
    /// `validation` lists the anchors that were ignored.
    pub resolved: ResolvedAnchors,
}

/// Diff two texts around `anchors`, using the default options.
///
/// The DOCTYPE anchor is injected when both sides have one.
pub fn diff_with_anchors(left: &str, right: &str, anchors: &[Anchor]) -> Vec<PairedOp> {
    diff_with_anchors_with(left, right, anchors, None, &DiffOptions::default())
}

/// Diff two texts around `anchors`.
///
/// With `options.auto_anchor` the DOCTYPE anchor joins the user anchors
/// unless its key equals `suppressed_key` or it conflicts with them. Invalid
/// anchors are ignored. The segment before, between and after the valid
/// anchors each go through the line diff and pairing on their own; every
/// valid anchor yields exactly one row holding both its lines.
pub fn diff_with_anchors_with(
    left: &str,
    right: &str,
    anchors: &[Anchor],
    suppressed_key: Option<&str>,
    options: &DiffOptions,
) -> Vec<PairedOp> {
    diff_with_resolved_anchors(left, right, anchors, suppressed_key, options).ops
}

/// [`diff_with_anchors_with`], also returning the resolved anchor set.
pub fn diff_with_resolved_anchors(
    left: &str,
    right: &str,
    anchors: &[Anchor],
    suppressed_key: Option<&str>,
    options: &DiffOptions,
) -> AnchoredDiff {
    let left = normalize(left);
    let right = normalize(right);
    let left_lines = split_lines(&left);
    let right_lines = split_lines(&right);

    let resolved =
        resolve_anchors_with(anchors, &left_lines, &right_lines, suppressed_key, options);
    let validation = &resolved.validation;
    if !validation.invalid.is_empty() {
        tracing::debug!(
            invalid = validation.invalid.len(),
            "ignoring invalid anchors"
        );
    }

    let mut out = Vec::with_capacity(left_lines.len().max(right_lines.len()));
    let (mut prev_left, mut prev_right) = (0, 0);
    for anchor in &validation.valid {
        let (l, r) = (anchor.left_no, anchor.right_no);
        out.extend(diff_segment(
            &left_lines[prev_left..l],
            &right_lines[prev_right..r],
            prev_left,
            prev_right,
            options,
        ));
        let left_ref = LineRef::new(l, left_lines[l]);
        let right_ref = LineRef::new(r, right_lines[r]);
        out.push(if left_ref.text == right_ref.text {
            PairedOp::Equal {
                left: left_ref,
                right: right_ref,
            }
        } else {
            PairedOp::Replace {
                left: left_ref,
                right: right_ref,
            }
        });
        prev_left = l + 1;
        prev_right = r + 1;
    }
    out.extend(diff_segment(
        &left_lines[prev_left..],
        &right_lines[prev_right..],
        prev_left,
        prev_right,
        options,
    ));
    AnchoredDiff { ops: out, resolved }
}

fn diff_segment(
    left: &[&str],
    right: &[&str],
    left_offset: usize,
    right_offset: usize,
    options: &DiffOptions,
) -> Vec<PairedOp> {
    tracing::trace!(
        left_offset,
        right_offset,
        left = left.len(),
        right = right.len(),
        "diffing anchored segment"
    );
    pairing::pair_with(algorithm::diff(left, right), &options.pairing)
        .into_iter()
        .map(|op| op.offset(left_offset, right_offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OpKind;

    fn a(l: usize, r: usize) -> Anchor {
        Anchor::new(l, r)
    }

    #[test]
    fn out_of_range() {
        let v = validate_anchors(&[a(0, 0), a(3, 1)], 2, 2);
        assert_eq!(v.valid, vec![a(0, 0)]);
        assert_eq!(v.invalid.len(), 1);
        assert_eq!(v.invalid[0].anchor, a(3, 1));
        assert_eq!(v.invalid[0].reasons, vec![InvalidReason::OutOfRange]);
    }

    #[test]
    fn duplicates_collect_reasons() {
        let v = validate_anchors(&[a(1, 1), a(1, 1)], 5, 5);
        assert!(v.valid.is_empty());
        assert_eq!(
            v.invalid[0].reasons,
            vec![InvalidReason::DuplicateLeft, InvalidReason::DuplicateRight]
        );
        assert_eq!(
            v.invalid[1].reasons,
            vec![
                InvalidReason::DuplicateLeft,
                InvalidReason::DuplicateRight,
                InvalidReason::OrderReversal
            ]
        );
    }

    #[test]
    fn order_reversal_uses_running_max() {
        let v = validate_anchors(&[a(4, 1), a(0, 5), a(2, 3)], 10, 10);
        assert_eq!(v.valid, vec![a(0, 5)]);
        let reversed: Vec<Anchor> = v.invalid.iter().map(|i| i.anchor).collect();
        assert_eq!(reversed, vec![a(4, 1), a(2, 3)]);
        assert!(v
            .invalid
            .iter()
            .all(|i| i.reasons == vec![InvalidReason::OrderReversal]));
    }

    #[test]
    fn valid_sorted_by_left() {
        let v = validate_anchors(&[a(5, 6), a(1, 2)], 10, 10);
        assert_eq!(v.valid, vec![a(1, 2), a(5, 6)]);
        assert!(v.is_all_valid());
    }

    #[test]
    fn reason_strings() {
        assert_eq!(InvalidReason::OutOfRange.to_string(), "out-of-range");
        assert_eq!(InvalidReason::OrderReversal.to_string(), "order-reversal");
    }

    #[test]
    fn detects_doctype() {
        let left = ["x", "<!DOCTYPE html>", "<html>"];
        let right = [r#"sb.AppendLine("<!doctype html>");"#];
        assert_eq!(detect_auto_anchor(&left, &right), Some(a(1, 0)));
        assert_eq!(detect_auto_anchor(&left, &["<html>"]), None);
    }

    #[test]
    fn resolve_injects_and_suppresses() {
        let left = ["<!DOCTYPE html>", "<p>"];
        let right = ["// header", "<!DOCTYPE html>", "<p>"];

        let resolved = resolve_anchors(&[], &left, &right, None);
        assert_eq!(resolved.auto_anchor, Some(a(0, 1)));
        assert_eq!(resolved.validation.valid, vec![a(0, 1)]);

        let key = auto_anchor_key(a(0, 1));
        assert_eq!(key, "doctype:0:1");
        let resolved = resolve_anchors(&[], &left, &right, Some(&key));
        assert_eq!(resolved.auto_anchor, None);
        assert!(resolved.anchors.is_empty());
    }

    #[test]
    fn resolve_drops_conflicting_auto_anchor() {
        let left = ["<!DOCTYPE html>", "<p>"];
        let right = ["<p>", "<!DOCTYPE html>"];
        // The user anchor (1, 0) would become an order reversal
        let resolved = resolve_anchors(&[a(1, 0)], &left, &right, None);
        assert_eq!(resolved.auto_anchor, None);
        assert_eq!(resolved.anchors, vec![a(1, 0)]);
        assert_eq!(resolved.validation.valid, vec![a(1, 0)]);
    }

    #[test]
    fn anchor_forces_alignment() {
        let ops = diff_with_anchors("a\nb\nc", "c\nb\na", &[a(0, 2)]);
        let kinds: Vec<OpKind> = ops.iter().map(PairedOp::kind).collect();
        assert_eq!(
            kinds,
            vec![
                OpKind::Insert,
                OpKind::Insert,
                OpKind::Equal,
                OpKind::Delete,
                OpKind::Delete
            ]
        );
        assert_eq!(ops[2].left_no(), Some(0));
        assert_eq!(ops[2].right_no(), Some(2));
    }

    #[test]
    fn differing_anchor_lines_replace() {
        let ops = diff_with_anchors("x\nfoo\ny", "x\nbar\ny", &[a(1, 1)]);
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[1].kind(), OpKind::Replace);
        assert_eq!(ops[2].left_no(), Some(2));
        assert_eq!(ops[2].right_no(), Some(2));
    }

    #[test]
    fn invalid_anchors_ignored() {
        let with = diff_with_anchors("a\nb", "a\nb", &[a(7, 7)]);
        let without = crate::diff_texts("a\nb", "a\nb");
        assert_eq!(with, without);
    }

    #[test]
    fn doctype_anchor_applied_without_user_anchors() {
        let left = "<!DOCTYPE html>\nA\nB";
        let right = "A\nB\n<!DOCTYPE html>";
        let ops = diff_with_anchors(left, right, &[]);
        let row = ops
            .iter()
            .find(|op| op.left_no() == Some(0))
            .expect("doctype row");
        assert_eq!(row.right_no(), Some(2));
        assert_eq!(row.kind(), OpKind::Equal);
    }

    #[test]
    fn doctype_anchor_suppressed_or_disabled() {
        let left = "<!DOCTYPE html>\nA\nB";
        let right = "A\nB\n<!DOCTYPE html>";
        let anchored = |op: &PairedOp| op.left_no() == Some(0) && op.right_no() == Some(2);

        let opts = DiffOptions::default();
        let diff = diff_with_resolved_anchors(left, right, &[], None, &opts);
        assert_eq!(diff.resolved.auto_anchor, Some(a(0, 2)));
        assert!(diff.ops.iter().any(anchored));

        let ops = diff_with_anchors_with(left, right, &[], Some("doctype:0:2"), &opts);
        assert!(!ops.iter().any(anchored));

        let opts = DiffOptions {
            auto_anchor: false,
            ..DiffOptions::default()
        };
        let diff = diff_with_resolved_anchors(left, right, &[], None, &opts);
        assert_eq!(diff.resolved.auto_anchor, None);
        assert!(!diff.ops.iter().any(anchored));
    }

    #[test]
    fn resolved_anchors_report_invalid() {
        let opts = DiffOptions::default();
        let diff = diff_with_resolved_anchors("a\nb", "a\nb", &[a(7, 7)], None, &opts);
        assert_eq!(diff.resolved.validation.invalid.len(), 1);
        assert_eq!(diff.resolved.validation.invalid[0].anchor, a(7, 7));
    }
}
