//! Line-level diff: unique-anchor (patience) recursion over a Myers
//! shortest-edit-script base case.
//!
//! Only literally identical lines are ever reported as [`EditOp::Equal`].
//! Lines that merely share a comparison key are aligned next to each other
//! as a delete immediately followed by an insert, and left for the pairing
//! stage to merge.

pub mod myers;
pub mod patience;

use crate::signature;
use crate::LineOp;

/// An edit operation in the edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Line present in both left and right.
    Equal,
    /// Line present only in right.
    Insert,
    /// Line present only in left.
    Delete,
}

/// A single edit, referencing lines by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub op: EditOp,
    /// Index into the left sequence (meaningful for Equal and Delete).
    pub left_index: usize,
    /// Index into the right sequence (meaningful for Equal and Insert).
    pub right_index: usize,
}

impl Edit {
    pub fn equal(left_index: usize, right_index: usize) -> Self {
        Self {
            op: EditOp::Equal,
            left_index,
            right_index,
        }
    }

    pub fn insert(left_index: usize, right_index: usize) -> Self {
        Self {
            op: EditOp::Insert,
            left_index,
            right_index,
        }
    }

    pub fn delete(left_index: usize, right_index: usize) -> Self {
        Self {
            op: EditOp::Delete,
            left_index,
            right_index,
        }
    }

    fn offset(self, left: usize, right: usize) -> Self {
        Self {
            op: self.op,
            left_index: self.left_index + left,
            right_index: self.right_index + right,
        }
    }
}

/// A line with its keys, computed once per diff call.
#[derive(Debug, Clone)]
pub struct KeyedLine<'a> {
    pub text: &'a str,
    /// [`signature::comparison_key`]: decides textual match candidates.
    pub cmp: String,
    /// [`signature::line_key`]: tie-breaker and patience uniqueness key.
    pub sig: Option<String>,
}

impl<'a> KeyedLine<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cmp: signature::comparison_key(text),
            sig: signature::line_key(text),
        }
    }
}

pub fn keyed_lines<'a>(lines: &[&'a str]) -> Vec<KeyedLine<'a>> {
    lines.iter().map(|l| KeyedLine::new(l)).collect()
}

/// Compute the edit script between two line sequences.
pub fn diff_edits(left: &[&str], right: &[&str]) -> Vec<Edit> {
    let left = keyed_lines(left);
    let right = keyed_lines(right);
    patience::diff(&left, &right)
}

/// Compute the line operations between two line sequences.
///
/// Line numbers are 0-based indices into `left` and `right`.
pub fn diff(left: &[&str], right: &[&str]) -> Vec<LineOp> {
    diff_edits(left, right)
        .into_iter()
        .map(|e| match e.op {
            EditOp::Equal => LineOp::equal(e.left_index, e.right_index, left[e.left_index]),
            EditOp::Insert => LineOp::insert(e.right_index, right[e.right_index]),
            EditOp::Delete => LineOp::delete(e.left_index, left[e.left_index]),
        })
        .collect()
}

/// Shift every edit by a segment offset.
pub(crate) fn offset_edits(edits: Vec<Edit>, left: usize, right: usize) -> Vec<Edit> {
    edits.into_iter().map(|e| e.offset(left, right)).collect()
}

pub(crate) fn all_inserts(len: usize) -> Vec<Edit> {
    (0..len).map(|j| Edit::insert(0, j)).collect()
}

pub(crate) fn all_deletes(len: usize) -> Vec<Edit> {
    (0..len).map(|i| Edit::delete(i, 0)).collect()
}
