use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use sidediff::anchor::diff_with_resolved_anchors;
use sidediff::fold::{build_fold_ranges, FoldRange};
use sidediff::navigation::DiffStats;
use sidediff::{OpKind, PairedOp};

use super::{display_anchor, load_options, AnchorArgs, SideArgs};
use crate::color::{colorize, highlight_spans, use_color_stdout, Color, ColorMode};

#[derive(Args)]
pub struct DiffArgs {
    #[command(flatten)]
    sides: SideArgs,

    #[command(flatten)]
    anchors: AnchorArgs,

    /// JSON file with pairing and fold options
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Show every unchanged line
    #[arg(long)]
    no_fold: bool,

    /// Minimum run of unchanged lines to fold
    #[arg(long, value_name = "N")]
    fold_threshold: Option<usize>,

    /// Unchanged lines kept visible above a fold
    #[arg(long, value_name = "N")]
    keep_head: Option<usize>,

    /// Unchanged lines kept visible below a fold
    #[arg(long, value_name = "N")]
    keep_tail: Option<usize>,

    /// Print row counts instead of the rows
    #[arg(long)]
    stat: bool,
}

pub fn run(args: &DiffArgs, color: ColorMode) -> Result<i32> {
    let mut options = load_options(args.options.as_deref())?;
    if let Some(n) = args.fold_threshold {
        options.fold.threshold = n;
    }
    if let Some(n) = args.keep_head {
        options.fold.keep_head = n;
    }
    if let Some(n) = args.keep_tail {
        options.fold.keep_tail = n;
    }
    if args.anchors.no_auto_anchor {
        options.auto_anchor = false;
    }
    options.validate()?;

    let (left, right) = args.sides.load()?;
    let (user_anchors, suppressed) = args.anchors.load()?;

    let diff = diff_with_resolved_anchors(
        &left,
        &right,
        &user_anchors,
        suppressed.as_deref(),
        &options,
    );
    for invalid in &diff.resolved.validation.invalid {
        let reasons: Vec<&str> = invalid.reasons.iter().map(|r| r.as_str()).collect();
        eprintln!(
            "warning: ignoring anchor {}: {}",
            display_anchor(&invalid.anchor),
            reasons.join(", ")
        );
    }
    if let Some(auto) = diff.resolved.auto_anchor {
        tracing::info!(anchor = %display_anchor(&auto), "aligned on DOCTYPE");
    }

    let ops = diff.ops;
    let stats = DiffStats::from_ops(&ops);
    tracing::info!(rows = ops.len(), changed = stats.changed(), "diff complete");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.stat {
        writeln!(
            out,
            "{} unchanged, {} replaced, {} deleted, {} inserted",
            stats.equal, stats.replaced, stats.deleted, stats.inserted
        )?;
    } else {
        let folds = if args.no_fold {
            Vec::new()
        } else {
            build_fold_ranges(&ops, &options.fold)
        };
        let colored = use_color_stdout(color);
        write_rows(&mut out, &ops, &folds, colored)?;
    }
    out.flush()?;

    Ok(if stats.is_identical() { 0 } else { 1 })
}

/// Write the rows, replacing each fold's hidden rows with one marker line.
pub fn write_rows(
    out: &mut impl Write,
    ops: &[PairedOp],
    folds: &[FoldRange],
    colored: bool,
) -> io::Result<()> {
    let mut folds = folds.iter().peekable();
    let mut row = 0;
    while row < ops.len() {
        if let Some(fold) = folds.next_if(|f| f.hidden_start_row == row) {
            let line = format!("@@ {} unchanged lines hidden @@", fold.hidden_count);
            writeln!(out, "{}", colorize(&line, Color::Cyan, colored))?;
            row = fold.hidden_end_row;
            continue;
        }
        write_row(out, &ops[row], colored)?;
        row += 1;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, op: &PairedOp, colored: bool) -> io::Result<()> {
    let mark = marker(op.kind());
    let left_no = line_no(op.left_no());
    let right_no = line_no(op.right_no());
    match op {
        PairedOp::Equal { left, .. } => {
            writeln!(out, "{mark} {left_no} {right_no}  {}", left.text)
        }
        PairedOp::Delete { left } => {
            let line = format!("{mark} {left_no} {right_no}  {}", left.text);
            writeln!(out, "{}", colorize(&line, Color::Red, colored))
        }
        PairedOp::Insert { right } => {
            let line = format!("{mark} {left_no} {right_no}  {}", right.text);
            writeln!(out, "{}", colorize(&line, Color::Green, colored))
        }
        PairedOp::Replace { left, right } => {
            let inline = op.inline_diff();
            let blank = line_no(None);
            let prefix = colorize(&format!("{mark} {left_no} {blank}  "), Color::Yellow, colored);
            let text = highlight_spans(
                &left.text,
                &inline.left_ranges,
                Color::Red,
                Color::HighlightRed,
                colored,
            );
            writeln!(out, "{prefix}{text}")?;
            let prefix = colorize(&format!("{mark} {blank} {right_no}  "), Color::Yellow, colored);
            let text = highlight_spans(
                &right.text,
                &inline.right_ranges,
                Color::Green,
                Color::HighlightGreen,
                colored,
            );
            writeln!(out, "{prefix}{text}")
        }
    }
}

/// A 1-based line number right-aligned in a fixed column, or blanks.
fn line_no(no: Option<usize>) -> String {
    match no {
        Some(n) => format!("{:>5}", n + 1),
        None => " ".repeat(5),
    }
}

/// Row marker in the first column.
fn marker(kind: OpKind) -> char {
    match kind {
        OpKind::Equal => ' ',
        OpKind::Delete => '-',
        OpKind::Insert => '+',
        OpKind::Replace => '~',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidediff::fold::FoldOptions;
    use sidediff::{LineOp, LineRef};

    fn render(ops: &[PairedOp], folds: &[FoldRange]) -> String {
        let mut buf = Vec::new();
        write_rows(&mut buf, ops, folds, false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_rows() {
        let ops: Vec<PairedOp> = vec![
            LineOp::equal(0, 0, "a").into(),
            LineOp::delete(1, "b").into(),
            LineOp::insert(1, "c").into(),
            PairedOp::Replace {
                left: LineRef::new(2, "x = 1"),
                right: LineRef::new(2, "x = 2"),
            },
        ];
        let text = render(&ops, &[]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "      1     1  a");
        assert_eq!(lines[1], "-     2        b");
        assert_eq!(lines[2], "+           2  c");
        assert_eq!(lines[3], "~     3        x = 1");
        assert_eq!(lines[4], "~           3  x = 2");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn fold_marker_replaces_hidden_rows() {
        let ops: Vec<PairedOp> = (0..12).map(|i| LineOp::equal(i, i, "x").into()).collect();
        let folds = build_fold_ranges(&ops, &FoldOptions::default());
        let text = render(&ops, &folds);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3 + 1 + 3);
        assert_eq!(lines[3], "@@ 6 unchanged lines hidden @@");
        assert_eq!(lines[4], "     10    10  x");
    }

    #[test]
    fn markers() {
        assert_eq!(marker(OpKind::Replace), '~');
        assert_eq!(marker(OpKind::Equal), ' ');
    }
}
