use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use sidediff::anchor::{resolve_anchors_with, AnchorValidation};
use sidediff::normalize::split_lines;
use sidediff::DiffOptions;

use super::{display_anchor, AnchorArgs, SideArgs};

#[derive(Args)]
pub struct AnchorsArgs {
    #[command(flatten)]
    sides: SideArgs,

    #[command(flatten)]
    anchors: AnchorArgs,

    /// Print the validation result as JSON (0-based line numbers)
    #[arg(long)]
    json: bool,
}

pub fn run(args: &AnchorsArgs) -> Result<i32> {
    let (left, right) = args.sides.load()?;
    let (user_anchors, suppressed) = args.anchors.load()?;
    let left_lines = split_lines(&left);
    let right_lines = split_lines(&right);

    let options = DiffOptions {
        auto_anchor: !args.anchors.no_auto_anchor,
        ..DiffOptions::default()
    };
    let resolved = resolve_anchors_with(
        &user_anchors,
        &left_lines,
        &right_lines,
        suppressed.as_deref(),
        &options,
    );
    let (validation, auto_anchor) = (resolved.validation, resolved.auto_anchor);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &validation)?;
        writeln!(out)?;
    } else {
        write_report(&mut out, &validation, auto_anchor.as_ref())?;
    }
    out.flush()?;

    Ok(if validation.is_all_valid() { 0 } else { 1 })
}

fn write_report(
    out: &mut impl Write,
    validation: &AnchorValidation,
    auto_anchor: Option<&sidediff::Anchor>,
) -> io::Result<()> {
    for anchor in &validation.valid {
        let note = if Some(anchor) == auto_anchor {
            " (doctype)"
        } else {
            ""
        };
        writeln!(out, "valid {}{note}", display_anchor(anchor))?;
    }
    for invalid in &validation.invalid {
        let reasons: Vec<&str> = invalid.reasons.iter().map(|r| r.as_str()).collect();
        writeln!(
            out,
            "invalid {}: {}",
            display_anchor(&invalid.anchor),
            reasons.join(", ")
        )?;
    }
    Ok(())
}
