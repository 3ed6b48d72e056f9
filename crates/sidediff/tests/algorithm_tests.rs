//! Line diff laws and literal scenarios.
//!
//! Every result must account for each input line exactly once on its side,
//! in order, and identical inputs must produce only `Equal` rows.

use sidediff::algorithm::diff;
use sidediff::normalize::{normalize, split_lines};
use sidediff::{diff_texts, LineOp, OpKind, PairedOp};

/// Rebuild both sides from the ops and compare with the inputs.
fn verify_line_ops(left: &[&str], right: &[&str]) {
    let ops = diff(left, right);

    let rebuilt_left: Vec<&str> = ops
        .iter()
        .filter_map(|op| op.left().map(|l| l.text.as_str()))
        .collect();
    let rebuilt_right: Vec<&str> = ops
        .iter()
        .filter_map(|op| op.right().map(|r| r.text.as_str()))
        .collect();
    assert_eq!(rebuilt_left, left, "left side not reconstructed");
    assert_eq!(rebuilt_right, right, "right side not reconstructed");

    let left_nos: Vec<usize> = ops.iter().filter_map(LineOp::left_no).collect();
    let right_nos: Vec<usize> = ops.iter().filter_map(LineOp::right_no).collect();
    assert_eq!(left_nos, (0..left.len()).collect::<Vec<_>>());
    assert_eq!(right_nos, (0..right.len()).collect::<Vec<_>>());

    for op in &ops {
        if let LineOp::Equal { left, right } = op {
            assert_eq!(left.text, right.text, "Equal only for identical lines");
        }
    }
}

/// Same checks on the paired output of the whole pipeline.
fn verify_paired(left: &str, right: &str) {
    let ops = diff_texts(left, right);
    let left_norm = normalize(left);
    let right_norm = normalize(right);
    let left_lines = split_lines(&left_norm);
    let right_lines = split_lines(&right_norm);

    let rebuilt_left: Vec<&str> = ops
        .iter()
        .filter_map(|op| op.left().map(|l| l.text.as_str()))
        .collect();
    let rebuilt_right: Vec<&str> = ops
        .iter()
        .filter_map(|op| op.right().map(|r| r.text.as_str()))
        .collect();
    assert_eq!(rebuilt_left, left_lines);
    assert_eq!(rebuilt_right, right_lines);

    let left_nos: Vec<usize> = ops.iter().filter_map(PairedOp::left_no).collect();
    assert_eq!(left_nos, (0..left_lines.len()).collect::<Vec<_>>());
    let right_nos: Vec<usize> = ops.iter().filter_map(PairedOp::right_no).collect();
    assert_eq!(right_nos, (0..right_lines.len()).collect::<Vec<_>>());
}

fn kinds(ops: &[PairedOp]) -> Vec<OpKind> {
    ops.iter().map(PairedOp::kind).collect()
}

#[test]
fn empty_to_empty() {
    verify_line_ops(&[], &[]);
    assert!(diff(&[], &[]).is_empty());
}

#[test]
fn empty_to_content() {
    verify_line_ops(&[], &["hello", "world"]);
}

#[test]
fn content_to_empty() {
    verify_line_ops(&["hello", "world"], &[]);
}

#[test]
fn single_differing_line() {
    verify_line_ops(&["a"], &["b"]);
}

#[test]
fn interleaved_changes() {
    verify_line_ops(
        &["a", "b", "c", "d", "e", "f", "g"],
        &["a", "x", "c", "y", "e", "z", "g"],
    );
}

#[test]
fn repeated_lines() {
    verify_line_ops(
        &["}", "}", "x", "}", "y", "}"],
        &["}", "x", "}", "}", "y", "}", "}"],
    );
}

#[test]
fn identity_law() {
    let lines = ["<html>", "  <body>", "  }", "", "  }", "</html>"];
    let ops = diff(&lines, &lines);
    assert_eq!(ops.len(), lines.len());
    for (i, op) in ops.iter().enumerate() {
        assert_eq!(op.kind(), OpKind::Equal);
        assert_eq!(op.left_no(), Some(i));
        assert_eq!(op.right_no(), Some(i));
    }
}

#[test]
fn two_identical_lines() {
    let ops = diff_texts("a\nb", "a\nb");
    assert_eq!(kinds(&ops), vec![OpKind::Equal, OpKind::Equal]);
    assert_eq!(ops[0].left_no(), Some(0));
    assert_eq!(ops[1].left_no(), Some(1));
    assert_eq!(ops[1].right_no(), Some(1));
}

#[test]
fn appended_line() {
    let ops = diff_texts("a", "a\nb");
    assert_eq!(kinds(&ops), vec![OpKind::Equal, OpKind::Insert]);
    assert_eq!(ops[0].left_no(), Some(0));
    assert_eq!(ops[0].right_no(), Some(0));
    assert_eq!(ops[1].right_no(), Some(1));
}

#[test]
fn indentation_only_change_is_replace() {
    let ops = diff_texts("if (a) {\n  run();\n}", "if (a) {\n    run();\n}");
    assert_eq!(
        kinds(&ops),
        vec![OpKind::Equal, OpKind::Replace, OpKind::Equal]
    );
}

#[test]
fn same_comparison_key_never_equal() {
    let ops = diff(&["x", "  $html = '';", "y"], &["x", "var html = \"\";", "y"]);
    assert!(ops
        .iter()
        .filter(|op| op.kind() == OpKind::Equal)
        .all(|op| op.left().map(|l| &l.text) == op.right().map(|r| &r.text)));
    assert_eq!(ops.len(), 4);
}

#[test]
fn cross_syntax_table() {
    let left = r#"sb.Append("<table>");
foreach (var row in rows) {
    sb.Append("<tr>");
    sb.Append("<td>" + row.Name + "</td>");
    sb.Append("</tr>");
}
sb.Append("</table>");"#;
    let right = r#"<table>
<?php foreach ($rows as $row) { ?>
    <tr>
    <td><?= $row->name ?></td>
    </tr>
<?php } ?>
</table>"#;
    verify_paired(left, right);
    let ops = diff_texts(left, right);
    // Every line has a counterpart on the other side
    assert!(ops.iter().all(|op| op.kind() == OpKind::Replace));
}

#[test]
fn crlf_input_reconstructs() {
    verify_paired("one\r\ntwo\r\nthree\r\n", "one\ntwo\nfour\n");
}
