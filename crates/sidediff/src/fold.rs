//! Collapsible ranges of unchanged rows.

use serde::{Deserialize, Serialize};

pub use crate::options::FoldOptions;
use crate::PairedOp;

/// A run of `Equal` rows long enough to be partly hidden.
///
/// All bounds are row indices into the op list, end-exclusive. The hidden
/// range lies strictly inside the run, leaving the configured head and tail
/// rows visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldRange {
    pub start_row: usize,
    pub end_row: usize,
    pub hidden_start_row: usize,
    pub hidden_end_row: usize,
    pub hidden_count: usize,
    pub total_count: usize,
}

impl FoldRange {
    /// Whether `row` is one of the hidden rows.
    pub fn hides(&self, row: usize) -> bool {
        (self.hidden_start_row..self.hidden_end_row).contains(&row)
    }
}

/// Fold every maximal run of `Equal` rows at least `threshold` long.
///
/// Runs whose hidden part would be one row or less are left alone.
pub fn build_fold_ranges(ops: &[PairedOp], options: &FoldOptions) -> Vec<FoldRange> {
    let mut folds = Vec::new();
    let mut row = 0;
    while row < ops.len() {
        if !ops[row].is_equal() {
            row += 1;
            continue;
        }
        let start = row;
        while row < ops.len() && ops[row].is_equal() {
            row += 1;
        }
        let total = row - start;
        if total < options.threshold {
            continue;
        }
        let hidden = total
            .saturating_sub(options.keep_head)
            .saturating_sub(options.keep_tail);
        if hidden <= 1 {
            continue;
        }
        let hidden_start = start + options.keep_head;
        folds.push(FoldRange {
            start_row: start,
            end_row: row,
            hidden_start_row: hidden_start,
            hidden_end_row: hidden_start + hidden,
            hidden_count: hidden,
            total_count: total,
        });
    }
    folds
}

/// The fold whose hidden range contains `row`.
pub fn find_fold_containing_row(folds: &[FoldRange], row: usize) -> Option<&FoldRange> {
    folds.iter().find(|f| f.hides(row))
}
