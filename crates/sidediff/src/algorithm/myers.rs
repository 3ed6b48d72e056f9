//! Myers diff algorithm implementation.
//!
//! Implements Eugene Myers' O(ND) difference algorithm as described in
//! "An O(ND) Difference Algorithm and Its Variations" (1986), over
//! comparison keys: a snake follows lines whose keys agree, and the
//! backtrack reports such a step as `Equal` only when the two lines are
//! literally identical (otherwise a delete immediately followed by an
//! insert). Line signatures break ties between equally far-reaching moves.

use super::{all_deletes, all_inserts, Edit, KeyedLine};

/// Compute a diff using the Myers algorithm.
pub fn diff(left: &[KeyedLine<'_>], right: &[KeyedLine<'_>]) -> Vec<Edit> {
    if left.is_empty() && right.is_empty() {
        return Vec::new();
    }
    if left.is_empty() {
        return all_inserts(right.len());
    }
    if right.is_empty() {
        return all_deletes(left.len());
    }

    let max_d = left.len() + right.len();
    let v_offset = max_d as isize;
    let trace = search(left, right, max_d, v_offset);
    backtrack(&trace, left, right, v_offset)
}

/// Forward pass: record the furthest-reaching x per diagonal for every d.
fn search(
    left: &[KeyedLine<'_>],
    right: &[KeyedLine<'_>],
    max_d: usize,
    v_offset: isize,
) -> Vec<Vec<usize>> {
    let n = left.len();
    let m = right.len();
    let mut trace: Vec<Vec<usize>> = Vec::new();
    let mut v = vec![0usize; 2 * max_d + 1];

    for d in 0..=max_d {
        let mut next = v.clone();
        let d_i = d as isize;
        let mut k = -d_i;
        let mut done = false;

        while k <= d_i {
            let mut x = if came_from_down(&v, k, d_i, v_offset, left, right) {
                v[(k + 1 + v_offset) as usize]
            } else {
                v[(k - 1 + v_offset) as usize] + 1
            };
            let mut y = (x as isize - k) as usize;

            // Follow the diagonal (snake)
            while x < n && y < m && left[x].cmp == right[y].cmp {
                x += 1;
                y += 1;
            }

            next[(k + v_offset) as usize] = x;

            if x >= n && y >= m {
                done = true;
                break;
            }
            k += 2;
        }

        trace.push(next.clone());
        v = next;
        if done {
            break;
        }
    }

    trace
}

/// Whether diagonal `k` at step `d` is entered by a move down (insert) from
/// diagonal `k + 1` rather than right (delete) from `k - 1`.
///
/// When both moves land on the same point, the delete is preferred if the
/// line it removes has no signature while the inserted line has one: unkeyed
/// lines are consumed first and keyed delete/insert pairs stay adjacent.
fn came_from_down(
    v: &[usize],
    k: isize,
    d: isize,
    v_offset: isize,
    left: &[KeyedLine<'_>],
    right: &[KeyedLine<'_>],
) -> bool {
    if k == -d {
        return true;
    }
    if k == d {
        return false;
    }
    let from_left = v[(k - 1 + v_offset) as usize];
    let from_top = v[(k + 1 + v_offset) as usize];
    if from_left + 1 != from_top {
        return from_left < from_top;
    }
    // Tie: both moves reach x = from_top on diagonal k
    let x = from_top;
    let y = x as isize - k;
    if x == 0 || y <= 0 || x > left.len() || y as usize > right.len() {
        return true;
    }
    let deleted = &left[x - 1];
    let inserted = &right[y as usize - 1];
    !(deleted.sig.is_none() && inserted.sig.is_some())
}

/// Backtrack through the trace to produce the edit script.
fn backtrack(
    trace: &[Vec<usize>],
    left: &[KeyedLine<'_>],
    right: &[KeyedLine<'_>],
    v_offset: isize,
) -> Vec<Edit> {
    let mut edits = Vec::new();
    let mut x = left.len();
    let mut y = right.len();

    for d in (0..trace.len()).rev() {
        let k = x as isize - y as isize;

        let (prev_x, prev_y) = if d == 0 {
            (0, 0)
        } else {
            let prev = &trace[d - 1];
            let prev_k = if came_from_down(prev, k, d as isize, v_offset, left, right) {
                k + 1
            } else {
                k - 1
            };
            let px = prev[(prev_k + v_offset) as usize];
            (px, (px as isize - prev_k) as usize)
        };

        // Snake, walked from its end back to its start
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            if left[x].text == right[y].text {
                edits.push(Edit::equal(x, y));
            } else {
                // Reversed below: the delete comes first
                edits.push(Edit::insert(x + 1, y));
                edits.push(Edit::delete(x, y));
            }
        }

        if d > 0 {
            if x == prev_x && y > 0 {
                // Insert: y advanced
                y -= 1;
                edits.push(Edit::insert(x, y));
            } else if x > 0 {
                // Delete: x advanced
                x -= 1;
                edits.push(Edit::delete(x, y));
            }
        }
    }

    edits.reverse();
    edits
}
