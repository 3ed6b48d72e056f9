//! Diff engine for comparing paired text artifacts that are semantically
//! related but syntactically drifted.
//!
//! The pipeline is: [`normalize`] the line endings, run the hybrid
//! patience/Myers line diff in [`algorithm`], turn delete/insert runs into
//! replace rows in [`pairing`], and annotate replace rows with character
//! ranges from [`inline`]. [`anchor`] partitions the whole computation at
//! forced alignment points, and [`fold`] reduces the final row list to
//! collapsible ranges of unchanged lines.
//!
//! Every entry point is a pure function of its arguments.

/// A lazily compiled, process-wide regex for a pattern literal.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).expect("invalid built-in regex"))
    }};
}

pub mod algorithm;
pub mod anchor;
pub mod error;
pub mod features;
pub mod fold;
pub mod inline;
pub mod navigation;
pub mod normalize;
pub mod options;
pub mod pairing;
pub mod signature;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::DiffError;
pub use inline::InlineDiff;
pub use options::DiffOptions;

pub type Result<T> = std::result::Result<T, DiffError>;

/// One line of one side: its 0-based number in the normalized, split text
/// and its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineRef {
    pub no: usize,
    pub text: String,
}

impl LineRef {
    pub fn new(no: usize, text: impl Into<String>) -> Self {
        Self {
            no,
            text: text.into(),
        }
    }
}

/// Kind of a row in a diff result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Equal,
    Insert,
    Delete,
    Replace,
}

/// One line-level edit step, as produced by [`algorithm::diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOp {
    /// The line is literally identical on both sides.
    Equal { left: LineRef, right: LineRef },
    /// The line exists only on the right.
    Insert { right: LineRef },
    /// The line exists only on the left.
    Delete { left: LineRef },
}

impl LineOp {
    pub fn equal(left_no: usize, right_no: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        LineOp::Equal {
            left: LineRef::new(left_no, text.clone()),
            right: LineRef::new(right_no, text),
        }
    }

    pub fn insert(right_no: usize, text: impl Into<String>) -> Self {
        LineOp::Insert {
            right: LineRef::new(right_no, text),
        }
    }

    pub fn delete(left_no: usize, text: impl Into<String>) -> Self {
        LineOp::Delete {
            left: LineRef::new(left_no, text),
        }
    }

    pub fn kind(&self) -> OpKind {
        match self {
            LineOp::Equal { .. } => OpKind::Equal,
            LineOp::Insert { .. } => OpKind::Insert,
            LineOp::Delete { .. } => OpKind::Delete,
        }
    }

    pub fn left(&self) -> Option<&LineRef> {
        match self {
            LineOp::Equal { left, .. } | LineOp::Delete { left } => Some(left),
            LineOp::Insert { .. } => None,
        }
    }

    pub fn right(&self) -> Option<&LineRef> {
        match self {
            LineOp::Equal { right, .. } | LineOp::Insert { right } => Some(right),
            LineOp::Delete { .. } => None,
        }
    }

    pub fn left_no(&self) -> Option<usize> {
        self.left().map(|l| l.no)
    }

    pub fn right_no(&self) -> Option<usize> {
        self.right().map(|r| r.no)
    }

    /// Shift the embedded line numbers by a segment offset.
    pub(crate) fn offset(mut self, left_offset: usize, right_offset: usize) -> Self {
        match &mut self {
            LineOp::Equal { left, right } => {
                left.no += left_offset;
                right.no += right_offset;
            }
            LineOp::Insert { right } => right.no += right_offset,
            LineOp::Delete { left } => left.no += left_offset,
        }
        self
    }
}

/// A row of the final diff: a [`LineOp`] or a `Replace` pairing one deleted
/// and one inserted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairedOp {
    Equal { left: LineRef, right: LineRef },
    Insert { right: LineRef },
    Delete { left: LineRef },
    /// The left line was changed into the right line.
    Replace { left: LineRef, right: LineRef },
}

impl PairedOp {
    pub fn kind(&self) -> OpKind {
        match self {
            PairedOp::Equal { .. } => OpKind::Equal,
            PairedOp::Insert { .. } => OpKind::Insert,
            PairedOp::Delete { .. } => OpKind::Delete,
            PairedOp::Replace { .. } => OpKind::Replace,
        }
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, PairedOp::Equal { .. })
    }

    pub fn left(&self) -> Option<&LineRef> {
        match self {
            PairedOp::Equal { left, .. }
            | PairedOp::Delete { left }
            | PairedOp::Replace { left, .. } => Some(left),
            PairedOp::Insert { .. } => None,
        }
    }

    pub fn right(&self) -> Option<&LineRef> {
        match self {
            PairedOp::Equal { right, .. }
            | PairedOp::Insert { right }
            | PairedOp::Replace { right, .. } => Some(right),
            PairedOp::Delete { .. } => None,
        }
    }

    pub fn left_no(&self) -> Option<usize> {
        self.left().map(|l| l.no)
    }

    pub fn right_no(&self) -> Option<usize> {
        self.right().map(|r| r.no)
    }

    /// Character ranges that changed within a `Replace` row.
    ///
    /// Uses the literal-aware variant so builder-call lines highlight inside
    /// their string payload. Rows of any other kind yield an empty diff.
    pub fn inline_diff(&self) -> InlineDiff {
        match self {
            PairedOp::Replace { left, right } => {
                inline::inline_diff_with_literal_unwrap(&left.text, &right.text)
            }
            _ => InlineDiff::default(),
        }
    }

    pub(crate) fn offset(mut self, left_offset: usize, right_offset: usize) -> Self {
        match &mut self {
            PairedOp::Equal { left, right } | PairedOp::Replace { left, right } => {
                left.no += left_offset;
                right.no += right_offset;
            }
            PairedOp::Insert { right } => right.no += right_offset,
            PairedOp::Delete { left } => left.no += left_offset,
        }
        self
    }
}

impl From<LineOp> for PairedOp {
    fn from(op: LineOp) -> Self {
        match op {
            LineOp::Equal { left, right } => PairedOp::Equal { left, right },
            LineOp::Insert { right } => PairedOp::Insert { right },
            LineOp::Delete { left } => PairedOp::Delete { left },
        }
    }
}

/// A forced alignment between a left line and a right line (both 0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Anchor {
    #[serde(alias = "left")]
    pub left_no: usize,
    #[serde(alias = "right")]
    pub right_no: usize,
}

impl Anchor {
    pub fn new(left_no: usize, right_no: usize) -> Self {
        Self { left_no, right_no }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.left_no, self.right_no)
    }
}

impl FromStr for Anchor {
    type Err = DiffError;

    /// Parse `left:right` (0-based line numbers).
    fn from_str(s: &str) -> Result<Self> {
        let (l, r) = s
            .split_once(':')
            .ok_or_else(|| DiffError::InvalidAnchor(format!("expected <left>:<right>, got '{s}'")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| DiffError::InvalidAnchor(format!("'{s}': {e}")))
        };
        Ok(Anchor::new(parse(l)?, parse(r)?))
    }
}

/// Diff two raw texts without anchors, using the default options.
pub fn diff_texts(left: &str, right: &str) -> Vec<PairedOp> {
    diff_texts_with(left, right, &DiffOptions::default())
}

/// Diff two raw texts without anchors: normalize, split, line diff, pairing.
///
/// No anchor, automatic or not, is applied; see
/// [`anchor::diff_with_anchors_with`] for that.
pub fn diff_texts_with(left: &str, right: &str, options: &DiffOptions) -> Vec<PairedOp> {
    let left = normalize::normalize(left);
    let right = normalize::normalize(right);
    let left_lines = normalize::split_lines(&left);
    let right_lines = normalize::split_lines(&right);
    let ops = algorithm::diff(&left_lines, &right_lines);
    pairing::pair_with(ops, &options.pairing)
}
