//! Tunables of the diff pipeline.

use serde::{Deserialize, Serialize};

use crate::{DiffError, Result};

/// Options controlling the replace-pairing stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingOptions {
    /// How many insert indices on either side of a delete's own position are
    /// always considered as candidates (default 40).
    pub window: usize,
    /// Scores below this are rejected (default 4).
    pub min_score: f64,
}

impl Default for PairingOptions {
    fn default() -> Self {
        Self {
            window: 40,
            min_score: 4.0,
        }
    }
}

/// Options controlling fold-range reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldOptions {
    /// Minimum length of an unchanged run before it is folded (default 10).
    pub threshold: usize,
    /// Rows kept visible at the start of a folded run (default 3).
    pub keep_head: usize,
    /// Rows kept visible at the end of a folded run (default 3).
    pub keep_tail: usize,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            threshold: 10,
            keep_head: 3,
            keep_tail: 3,
        }
    }
}

/// Options for a whole diff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub pairing: PairingOptions,
    pub fold: FoldOptions,
    /// Inject a DOCTYPE anchor into anchored diffs when both sides have one.
    pub auto_anchor: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            pairing: PairingOptions::default(),
            fold: FoldOptions::default(),
            auto_anchor: true,
        }
    }
}

impl DiffOptions {
    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.pairing.window == 0 {
            return Err(DiffError::InvalidOptions(
                "pairing window must be at least 1".into(),
            ));
        }
        let min = self.pairing.min_score;
        if !min.is_finite() || min < 0.0 {
            return Err(DiffError::InvalidOptions(format!(
                "minimum pairing score must be a non-negative number, got {min}"
            )));
        }
        Ok(())
    }
}
