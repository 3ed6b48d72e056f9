pub mod anchors;
pub mod diff;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use sidediff::normalize::concat_sources;
use sidediff::{Anchor, DiffOptions};

use crate::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the aligned line-by-line comparison of two sides
    Diff(diff::DiffArgs),
    /// Validate an anchor set against two sides
    Anchors(anchors::AnchorsArgs),
}

pub fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Diff(ref args) => diff::run(args, cli.color),
        Commands::Anchors(ref args) => anchors::run(args),
    }
}

/// The two sides of a comparison, each one or more files.
#[derive(Args)]
pub struct SideArgs {
    /// Files making up the left side, concatenated in order
    #[arg(required = true, value_name = "LEFT")]
    pub left: Vec<PathBuf>,

    /// Files making up the right side, concatenated in order
    #[arg(long, short = 'r', required = true, num_args = 1.., value_name = "RIGHT")]
    pub right: Vec<PathBuf>,
}

impl SideArgs {
    pub fn load(&self) -> Result<(String, String)> {
        Ok((read_side(&self.left)?, read_side(&self.right)?))
    }
}

/// Anchor sources shared by the subcommands.
#[derive(Args)]
pub struct AnchorArgs {
    /// Force LEFT_LINE:RIGHT_LINE (1-based) to align; may be repeated
    #[arg(long = "anchor", value_name = "L:R", value_parser = parse_cli_anchor)]
    pub anchors: Vec<Anchor>,

    /// JSON file with an anchor set and a suppressed automatic anchor key
    #[arg(long = "anchors", value_name = "FILE")]
    pub anchor_file: Option<PathBuf>,

    /// Do not inject the DOCTYPE anchor
    #[arg(long)]
    pub no_auto_anchor: bool,
}

impl AnchorArgs {
    /// Anchors from the file followed by those from the command line, and
    /// the suppressed automatic anchor key, if any.
    pub fn load(&self) -> Result<(Vec<Anchor>, Option<String>)> {
        let mut anchors = Vec::new();
        let mut suppressed = None;
        if let Some(path) = &self.anchor_file {
            let file = read_anchor_file(path)?;
            anchors.extend(file.anchors);
            suppressed = file.suppressed_auto_anchor;
        }
        anchors.extend(self.anchors.iter().copied());
        Ok((anchors, suppressed))
    }
}

/// On-disk anchor set. Line numbers are 0-based, as in the library.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnchorFile {
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    #[serde(default)]
    pub suppressed_auto_anchor: Option<String>,
}

fn read_anchor_file(path: &Path) -> Result<AnchorFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read anchor file '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid anchor file '{}'", path.display()))
}

/// Read one side: every file normalized and concatenated.
pub fn read_side(paths: &[PathBuf]) -> Result<String> {
    let mut texts = Vec::with_capacity(paths.len());
    for path in paths {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read '{}'", path.display()))?;
        texts.push(text);
    }
    Ok(concat_sources(texts.iter().map(String::as_str)))
}

/// Load options from a JSON file, or the defaults.
pub fn load_options(path: Option<&Path>) -> Result<DiffOptions> {
    let options = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read options file '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid options file '{}'", path.display()))?
        }
        None => DiffOptions::default(),
    };
    Ok(options)
}

/// Parse a command-line anchor `L:R` with 1-based line numbers.
fn parse_cli_anchor(s: &str) -> Result<Anchor> {
    let anchor: Anchor = s.parse()?;
    if anchor.left_no == 0 || anchor.right_no == 0 {
        bail!("line numbers start at 1, got '{s}'");
    }
    Ok(Anchor::new(anchor.left_no - 1, anchor.right_no - 1))
}

/// Render an anchor with 1-based line numbers.
pub fn display_anchor(anchor: &Anchor) -> String {
    format!("{}:{}", anchor.left_no + 1, anchor.right_no + 1)
}
