//! Replace pairing.
//!
//! Turns runs of deleted and inserted lines into `Replace` rows when a
//! deleted line and an inserted line look like the same line, edited or
//! rewritten in another syntax. Candidates are scored from [`LineFeatures`]
//! and committed greedily in a fixed tie-break order: score, indent distance,
//! index distance, original order.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::features::{self, LineCategory, LineFeatures};
pub use crate::options::PairingOptions;
use crate::{LineOp, LineRef, PairedOp};

/// Score given to a pure indentation change. Bypasses the minimum score.
pub const INDENT_ONLY_SCORE: f64 = 100.0;

const PRIMARY_ID_BONUS: f64 = 6.0;
const LITERAL_WEIGHT: f64 = 4.0;
const NUMBER_WEIGHT: f64 = 1.0;
const IDENT_WEIGHT: f64 = 2.0;
const LITERAL_AND_IDENT_BONUS: f64 = 2.0;
const CODE_FRAGMENT_BONUS: f64 = 10.0;
const BRACE_BONUS: f64 = 8.0;
const ELSE_BONUS: f64 = 8.0;
const INIT_BONUS: f64 = 10.0;
const DATE_FORMAT_ARG_BONUS: f64 = 10.0;
const DATE_FORMAT_BONUS: f64 = 3.0;
const HINT_WEIGHT: f64 = 0.5;
const CATEGORY_MATCH_BONUS: f64 = 1.0;
const DECL_CALL_PENALTY: f64 = 3.0;

/// Pair delete/insert runs using the default options.
pub fn pair(ops: Vec<LineOp>) -> Vec<PairedOp> {
    pair_with(ops, &PairingOptions::default())
}

/// Pair delete/insert runs.
///
/// `Equal` ops pass through unchanged. Every maximal run of non-equal ops is
/// split into its deletes and inserts, which are paired; unpaired lines keep
/// their relative order, deletes first. A final pass merges an adjacent
/// brace-only delete/insert that follows an `Equal` or `Replace` row.
pub fn pair_with(ops: Vec<LineOp>, options: &PairingOptions) -> Vec<PairedOp> {
    let mut out = Vec::with_capacity(ops.len());
    let mut deletes: Vec<LineRef> = Vec::new();
    let mut inserts: Vec<LineRef> = Vec::new();

    for op in ops {
        match op {
            LineOp::Equal { left, right } => {
                flush_run(&mut deletes, &mut inserts, options, &mut out);
                out.push(PairedOp::Equal { left, right });
            }
            LineOp::Delete { left } => deletes.push(left),
            LineOp::Insert { right } => inserts.push(right),
        }
    }
    flush_run(&mut deletes, &mut inserts, options, &mut out);

    merge_brace_pairs(out)
}

/// Score a deleted line against an inserted line.
///
/// Returns `None` when the pair is rejected outright. A pure indentation
/// change scores [`INDENT_ONLY_SCORE`]. The minimum score is not applied.
pub fn score_candidate(left: &str, right: &str) -> Option<f64> {
    let left = Side::new(left);
    let right = Side::new(right);
    score(&left, &right).map(|s| s.value)
}

/// One line of a run with its features.
struct Side<'a> {
    text: &'a str,
    features: LineFeatures,
}

impl<'a> Side<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            features: features::features(text),
        }
    }

    /// Tokens used to find candidates sharing any signal with this line.
    fn index_tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.features
            .identifiers
            .iter()
            .cloned()
            .chain(self.features.literals.iter().map(|l| format!("lit:{l}")))
    }
}

#[derive(Debug, Clone, Copy)]
struct Score {
    value: f64,
    indent_only: bool,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f64,
    indent_dist: usize,
    index_dist: usize,
    delete: usize,
    insert: usize,
}

fn flush_run(
    deletes: &mut Vec<LineRef>,
    inserts: &mut Vec<LineRef>,
    options: &PairingOptions,
    out: &mut Vec<PairedOp>,
) {
    if deletes.is_empty() && inserts.is_empty() {
        return;
    }
    let deletes = std::mem::take(deletes);
    let inserts = std::mem::take(inserts);

    if deletes.is_empty() || inserts.is_empty() {
        out.extend(deletes.into_iter().map(|left| PairedOp::Delete { left }));
        out.extend(inserts.into_iter().map(|right| PairedOp::Insert { right }));
        return;
    }

    // A lone delete facing a lone insert is always a change of that line
    if deletes.len() == 1 && inserts.len() == 1 {
        let (left, right) = (deletes.into_iter().next(), inserts.into_iter().next());
        if let (Some(left), Some(right)) = (left, right) {
            out.push(PairedOp::Replace { left, right });
        }
        return;
    }

    let pairs = pair_run(&deletes, &inserts, options);
    tracing::debug!(
        deletes = deletes.len(),
        inserts = inserts.len(),
        paired = pairs.len(),
        "paired replace run"
    );
    emit_run(deletes, inserts, &pairs, out);
}

/// Choose the (delete, insert) pairs of one run, sorted by delete index.
fn pair_run(
    deletes: &[LineRef],
    inserts: &[LineRef],
    options: &PairingOptions,
) -> Vec<(usize, usize)> {
    let del_sides: Vec<Side<'_>> = deletes.iter().map(|l| Side::new(&l.text)).collect();
    let ins_sides: Vec<Side<'_>> = inserts.iter().map(|l| Side::new(&l.text)).collect();

    // token -> insert indices
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (j, side) in ins_sides.iter().enumerate() {
        for token in side.index_tokens() {
            let slots = index.entry(token).or_default();
            if slots.last() != Some(&j) {
                slots.push(j);
            }
        }
    }

    let mut candidates = Vec::new();
    for (i, del) in del_sides.iter().enumerate() {
        let lo = i.saturating_sub(options.window);
        let hi = (i + options.window + 1).min(ins_sides.len());
        let mut pool: BTreeSet<usize> = (lo..hi).collect();
        for token in del.index_tokens() {
            if let Some(slots) = index.get(&token) {
                pool.extend(slots.iter().copied());
            }
        }

        for j in pool {
            let ins = &ins_sides[j];
            let Some(s) = score(del, ins) else {
                continue;
            };
            if !s.indent_only && s.value < options.min_score {
                continue;
            }
            candidates.push(Candidate {
                score: s.value,
                indent_dist: del.features.indent.abs_diff(ins.features.indent),
                index_dist: i.abs_diff(j),
                delete: i,
                insert: j,
            });
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.indent_dist.cmp(&b.indent_dist))
            .then(a.index_dist.cmp(&b.index_dist))
            .then(a.delete.cmp(&b.delete))
            .then(a.insert.cmp(&b.insert))
    });

    // Greedy commit. A pair may not cross an already committed one, so both
    // sides stay in ascending line order in the emitted rows.
    let mut committed: BTreeMap<usize, usize> = BTreeMap::new();
    let mut used_inserts: HashSet<usize> = HashSet::new();
    for c in &candidates {
        if committed.contains_key(&c.delete) || used_inserts.contains(&c.insert) {
            continue;
        }
        let before_ok = committed
            .range(..c.delete)
            .next_back()
            .map_or(true, |(_, &j)| j < c.insert);
        let after_ok = committed
            .range(c.delete + 1..)
            .next()
            .map_or(true, |(_, &j)| j > c.insert);
        if before_ok && after_ok {
            committed.insert(c.delete, c.insert);
            used_inserts.insert(c.insert);
        }
    }

    committed.into_iter().collect()
}

/// Emit a run: before each pair, the unpaired deletes then the unpaired
/// inserts preceding it; after the last pair, the remaining deletes then
/// inserts.
fn emit_run(
    deletes: Vec<LineRef>,
    inserts: Vec<LineRef>,
    pairs: &[(usize, usize)],
    out: &mut Vec<PairedOp>,
) {
    let mut deletes = deletes.into_iter().enumerate().peekable();
    let mut inserts = inserts.into_iter().enumerate().peekable();

    for &(di, ii) in pairs {
        while let Some((_, left)) = deletes.next_if(|(i, _)| *i < di) {
            out.push(PairedOp::Delete { left });
        }
        while let Some((_, right)) = inserts.next_if(|(j, _)| *j < ii) {
            out.push(PairedOp::Insert { right });
        }
        if let (Some((_, left)), Some((_, right))) = (deletes.next(), inserts.next()) {
            out.push(PairedOp::Replace { left, right });
        }
    }
    out.extend(deletes.map(|(_, left)| PairedOp::Delete { left }));
    out.extend(inserts.map(|(_, right)| PairedOp::Insert { right }));
}

fn score(left: &Side<'_>, right: &Side<'_>) -> Option<Score> {
    let (lf, rf) = (&left.features, &right.features);

    if lf.trimmed == rf.trimmed && left.text != right.text {
        return Some(Score {
            value: INDENT_ONLY_SCORE,
            indent_only: true,
        });
    }

    let literal_overlap = shared(
        lf.literals.iter().map(String::as_str),
        rf.literals.iter().map(String::as_str),
    );
    let number_overlap = shared(
        lf.numbers.iter().map(String::as_str),
        rf.numbers.iter().map(String::as_str),
    );
    let ident_overlap = shared(lf.overlap_tokens(), rf.overlap_tokens());
    let same_fragment = lf.code_fragment.is_some() && lf.code_fragment == rf.code_fragment;
    let same_init = lf.init.is_some() && lf.init == rf.init;
    let same_date_arg = match (&lf.date_format, &rf.date_format) {
        (Some(a), Some(b)) => a.arg == b.arg,
        _ => false,
    };
    let has_base_overlap = literal_overlap + number_overlap + ident_overlap > 0
        || same_fragment
        || same_init
        || same_date_arg;

    match (&lf.primary_id, &rf.primary_id) {
        (Some(a), Some(b)) if a != b && !has_base_overlap => return None,
        (None, None) if !has_base_overlap => return None,
        _ => {}
    }

    if (lf.is_date_format_call() || rf.is_date_format_call())
        && literal_overlap == 0
        && !same_date_arg
    {
        return None;
    }

    let mut value = 0.0;
    if lf.primary_id.is_some() && lf.primary_id == rf.primary_id {
        value += PRIMARY_ID_BONUS;
    }
    value += literal_overlap as f64 * LITERAL_WEIGHT;
    value += number_overlap as f64 * NUMBER_WEIGHT;
    value += ident_overlap as f64 * IDENT_WEIGHT;
    if literal_overlap > 0 && ident_overlap > 0 {
        value += LITERAL_AND_IDENT_BONUS;
    }
    if same_fragment {
        value += CODE_FRAGMENT_BONUS;
    }
    if lf.brace.is_some() && lf.brace == rf.brace {
        value += BRACE_BONUS;
    }
    if lf.has_else && rf.has_else {
        value += ELSE_BONUS;
    }
    if same_init {
        value += INIT_BONUS;
    }
    if let (Some(a), Some(b)) = (&lf.date_format, &rf.date_format) {
        if a.format == b.format {
            value += if a.arg == b.arg {
                DATE_FORMAT_ARG_BONUS
            } else {
                DATE_FORMAT_BONUS
            };
        }
    }
    value += shared(lf.hints(), rf.hints()) as f64 * HINT_WEIGHT;

    value += match (lf.category, rf.category) {
        (LineCategory::Decl, LineCategory::Call) | (LineCategory::Call, LineCategory::Decl) => {
            -DECL_CALL_PENALTY
        }
        (a, b) if a == b => CATEGORY_MATCH_BONUS,
        _ => 0.0,
    };
    value += jaccard(lf, rf);

    Some(Score {
        value,
        indent_only: false,
    })
}

/// Number of distinct tokens present on both sides.
fn shared<'a>(left: impl Iterator<Item = &'a str>, right: impl Iterator<Item = &'a str>) -> usize {
    let left: HashSet<&str> = left.collect();
    let right: HashSet<&str> = right.collect();
    left.intersection(&right).count()
}

fn jaccard(left: &LineFeatures, right: &LineFeatures) -> f64 {
    let a: HashSet<&str> = left.core_identifiers().collect();
    let b: HashSet<&str> = right.core_identifiers().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

fn is_brace_only(text: &str) -> bool {
    regex!(r"^\s*\}\s*;?\s*$").is_match(text)
}

/// Merge an adjacent brace-only `Delete`/`Insert` (either order) into a
/// `Replace` when the row before it is `Equal` or `Replace`.
fn merge_brace_pairs(ops: Vec<PairedOp>) -> Vec<PairedOp> {
    let mut out: Vec<PairedOp> = Vec::with_capacity(ops.len());
    let mut iter = ops.into_iter().peekable();

    while let Some(op) = iter.next() {
        let anchored = matches!(
            out.last(),
            Some(PairedOp::Equal { .. } | PairedOp::Replace { .. })
        );
        if anchored {
            let merged = match (&op, iter.peek()) {
                (PairedOp::Delete { left }, Some(PairedOp::Insert { right }))
                | (PairedOp::Insert { right }, Some(PairedOp::Delete { left }))
                    if is_brace_only(&left.text) && is_brace_only(&right.text) =>
                {
                    Some(PairedOp::Replace {
                        left: left.clone(),
                        right: right.clone(),
                    })
                }
                _ => None,
            };
            if let Some(replace) = merged {
                iter.next();
                out.push(replace);
                continue;
            }
        }
        out.push(op);
    }
    out
}
