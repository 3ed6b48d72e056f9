//! Property-based tests for the diff pipeline laws.

use proptest::prelude::*;
use sidediff::algorithm::diff;
use sidediff::anchor::{diff_with_anchors, validate_anchors};
use sidediff::inline::inline_diff;
use sidediff::normalize::{normalize, split_lines};
use sidediff::pairing::pair;
use sidediff::{Anchor, LineOp, OpKind, PairedOp};

/// Lines drawn from a small pool so that matches, duplicates and
/// cross-syntax look-alikes are common.
fn line() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "",
        "a",
        "b",
        "}",
        "    }",
        "<% } %>",
        "<tr>",
        "    <tr>",
        r#"sb.Append("<tr>");"#,
        "$html = '';",
        "string html = \"\";",
        "render(row);",
        "function render($row) {",
        "<!DOCTYPE html>",
    ])
}

fn lines() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(line(), 0..24)
}

proptest! {
    /// Normalizing twice is the same as normalizing once.
    #[test]
    fn normalize_idempotent(s in "[a-c\r\n]{0,40}") {
        let once = normalize(&s);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!once.contains('\r'));
    }

    /// Text without carriage returns is left untouched.
    #[test]
    fn normalize_identity_on_lf(s in "[a-c\n]{0,40}") {
        prop_assert_eq!(normalize(&s), s);
    }

    /// Each line number of each side appears exactly once, in order.
    #[test]
    fn diff_totality(left in lines(), right in lines()) {
        let ops = diff(&left, &right);
        let lefts: Vec<usize> = ops.iter().filter_map(LineOp::left_no).collect();
        let rights: Vec<usize> = ops.iter().filter_map(LineOp::right_no).collect();
        prop_assert_eq!(lefts, (0..left.len()).collect::<Vec<_>>());
        prop_assert_eq!(rights, (0..right.len()).collect::<Vec<_>>());
        for op in &ops {
            if let LineOp::Equal { left, right } = op {
                prop_assert_eq!(&left.text, &right.text);
            }
        }
    }

    /// Diffing a sequence against itself yields only aligned `Equal` rows.
    #[test]
    fn diff_identity(side in lines()) {
        let ops = diff(&side, &side);
        prop_assert_eq!(ops.len(), side.len());
        for (i, op) in ops.iter().enumerate() {
            prop_assert_eq!(op.kind(), OpKind::Equal);
            prop_assert_eq!(op.left_no(), Some(i));
            prop_assert_eq!(op.right_no(), Some(i));
        }
    }

    /// Pairing never drops or duplicates a changed line.
    #[test]
    fn pairing_conserves_lines(left in lines(), right in lines()) {
        let ops = diff(&left, &right);
        let deletes = ops.iter().filter(|op| op.kind() == OpKind::Delete).count();
        let inserts = ops.iter().filter(|op| op.kind() == OpKind::Insert).count();
        let equals = ops.iter().filter(|op| op.kind() == OpKind::Equal).count();

        let paired = pair(ops);
        let count = |kind| paired.iter().filter(|op| op.kind() == kind).count();
        prop_assert_eq!(count(OpKind::Equal), equals);
        prop_assert_eq!(count(OpKind::Delete) + count(OpKind::Replace), deletes);
        prop_assert_eq!(count(OpKind::Insert) + count(OpKind::Replace), inserts);

        let lefts: Vec<usize> = paired.iter().filter_map(PairedOp::left_no).collect();
        let rights: Vec<usize> = paired.iter().filter_map(PairedOp::right_no).collect();
        prop_assert_eq!(lefts, (0..left.len()).collect::<Vec<_>>());
        prop_assert_eq!(rights, (0..right.len()).collect::<Vec<_>>());
    }

    /// Every valid anchor yields exactly one row holding both its lines.
    #[test]
    fn anchor_inclusion(
        left in lines(),
        right in lines(),
        raw in prop::collection::vec((0usize..30, 0usize..30), 0..5),
    ) {
        let left_text = left.join("\n");
        let right_text = right.join("\n");
        let left_count = split_lines(&left_text).len();
        let right_count = split_lines(&right_text).len();
        let anchors: Vec<Anchor> = raw.iter().map(|&(l, r)| Anchor::new(l, r)).collect();

        let validation = validate_anchors(&anchors, left_count, right_count);
        let ops = diff_with_anchors(&left_text, &right_text, &anchors);
        for a in &validation.valid {
            let hits = ops
                .iter()
                .filter(|op| op.left_no() == Some(a.left_no) && op.right_no() == Some(a.right_no))
                .count();
            prop_assert_eq!(hits, 1);
        }
        let lefts: Vec<usize> = ops.iter().filter_map(PairedOp::left_no).collect();
        prop_assert_eq!(lefts, (0..left_count).collect::<Vec<_>>());
    }

    /// A line compared with itself has no changed spans.
    #[test]
    fn inline_equal_inputs_empty(s in "\\PC{0,60}") {
        prop_assert!(inline_diff(&s, &s).is_empty());
    }

    /// Changed spans are in bounds, on char boundaries, and ordered.
    #[test]
    fn inline_ranges_well_formed(a in "\\PC{0,30}", b in "\\PC{0,30}") {
        let d = inline_diff(&a, &b);
        for (text, ranges) in [(&a, &d.left_ranges), (&b, &d.right_ranges)] {
            let mut prev_end = 0;
            for r in ranges {
                prop_assert!(r.start < r.end);
                prop_assert!(r.start >= prev_end);
                prop_assert!(r.end <= text.len());
                prop_assert!(text.is_char_boundary(r.start) && text.is_char_boundary(r.end));
                prev_end = r.end;
            }
        }
    }
}
