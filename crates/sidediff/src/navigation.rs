//! Row lookups over a finished op list: line numbers per row, difference
//! blocks for jump-to-next/previous, and summary counts.

use serde::Serialize;

use crate::{DiffError, OpKind, PairedOp, Result};

/// Line numbers shown on one row (0-based); `None` for a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowLines {
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// Line numbers of the row at `row`.
pub fn map_row_to_line_numbers(ops: &[PairedOp], row: usize) -> Result<RowLines> {
    let op = ops.get(row).ok_or(DiffError::RowOutOfRange {
        row,
        len: ops.len(),
    })?;
    Ok(RowLines {
        left: op.left_no(),
        right: op.right_no(),
    })
}

/// Rows where a run of non-`Equal` rows begins.
pub fn diff_block_starts(ops: &[PairedOp]) -> Vec<usize> {
    ops.iter()
        .enumerate()
        .filter(|(i, op)| !op.is_equal() && (*i == 0 || ops[*i - 1].is_equal()))
        .map(|(i, _)| i)
        .collect()
}

/// First block start after `row`.
pub fn next_diff_block(starts: &[usize], row: usize) -> Option<usize> {
    let idx = starts.partition_point(|&s| s <= row);
    starts.get(idx).copied()
}

/// Last block start before `row`.
pub fn prev_diff_block(starts: &[usize], row: usize) -> Option<usize> {
    let idx = starts.partition_point(|&s| s < row);
    idx.checked_sub(1).map(|i| starts[i])
}

/// Row counts per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub equal: usize,
    pub inserted: usize,
    pub deleted: usize,
    pub replaced: usize,
}

impl DiffStats {
    pub fn from_ops(ops: &[PairedOp]) -> Self {
        let mut stats = Self::default();
        for op in ops {
            match op.kind() {
                OpKind::Equal => stats.equal += 1,
                OpKind::Insert => stats.inserted += 1,
                OpKind::Delete => stats.deleted += 1,
                OpKind::Replace => stats.replaced += 1,
            }
        }
        stats
    }

    /// True if every row is `Equal`.
    pub fn is_identical(&self) -> bool {
        self.inserted == 0 && self.deleted == 0 && self.replaced == 0
    }

    pub fn changed(&self) -> usize {
        self.inserted + self.deleted + self.replaced
    }
}
