//! Reverse operators: given a target `Cs`, enumerate operand(s) whose forward application
//! reproduces it. Each has an exhaustive-structured form; the heavier ones additionally accept
//! a sampling cap, past which candidates are drawn at random via the seeded RNG rather than
//! enumerated exhaustively.

use guacamole::combinators::range_to;
use guacamole::Guacamole;

use crate::cs::Cs;
use crate::guide::GuideTable;
use crate::ops::forward;

/// `revert_question(t)`: `x?` produced `t` iff `x = t` already contains `eps`, since `x? = x |
/// eps`. The only candidate operand is `t` itself (with `eps` forced back in, a no-op here).
pub fn revert_question(t: Cs) -> Vec<Cs> {
    if t.get(0) {
        vec![t.union(&Cs::one())]
    } else {
        Vec::new()
    }
}

/// `revert_star(t)`: collect every IC bit whose precomputed star-closure is a subset of `t`,
/// then recursively search subsets of those candidate bits whose combined star-closures union
/// to exactly `t`. Each accepted subset's *own* bits (not their closures) form a valid operand.
pub fn revert_star(t: Cs, gt: &GuideTable) -> Vec<Cs> {
    let candidates: Vec<(usize, Cs)> = (0..gt.ic_size())
        .filter(|&i| gt.star_lookup[i].subset_of(&t))
        .map(|i| (i, gt.star_lookup[i]))
        .collect();

    let mut out = Vec::new();
    let mut picks = Cs::zero();
    revert_star_rec(&candidates, 0, t, Cs::zero(), &mut picks, &mut out);
    out
}

fn revert_star_rec(
    candidates: &[(usize, Cs)],
    index: usize,
    target: Cs,
    accumulated: Cs,
    picks: &mut Cs,
    out: &mut Vec<Cs>,
) {
    if accumulated == target {
        out.push(*picks);
    }
    if index == candidates.len() {
        return;
    }
    // skip candidate[index]
    revert_star_rec(candidates, index + 1, target, accumulated, picks, out);
    // take candidate[index]
    let (bit, closure) = candidates[index];
    picks.set(bit);
    revert_star_rec(
        candidates,
        index + 1,
        target,
        accumulated.union(&closure),
        picks,
        out,
    );
    picks_clear(picks, bit);
}

fn picks_clear(picks: &mut Cs, bit: usize) {
    // Cs has no bit-clear primitive exposed (search never needs one elsewhere); rebuild minus
    // the single bit via xor, which is safe since we only ever clear a bit we just set.
    *picks = picks.xor(&Cs::bit(bit));
}

/// Random-sampled variant of `revert_star`, used when the candidate powerset would be too large
/// to enumerate exhaustively. Draws up to `max_samples` random subsets of the candidate bits and
/// keeps those whose combined closure equals `t` exactly.
pub fn revert_star_random(t: Cs, gt: &GuideTable, max_samples: usize, guac: &mut Guacamole) -> Vec<Cs> {
    let candidates: Vec<(usize, Cs)> = (0..gt.ic_size())
        .filter(|&i| gt.star_lookup[i].subset_of(&t))
        .map(|i| (i, gt.star_lookup[i]))
        .collect();
    if candidates.is_empty() {
        return Vec::new();
    }
    let mut coin = range_to(2u32);
    let mut out = Vec::new();
    for _ in 0..max_samples {
        let mut picks = Cs::zero();
        let mut accumulated = Cs::zero();
        for &(bit, closure) in &candidates {
            if coin(guac) == 1 {
                picks.set(bit);
                accumulated = accumulated.union(&closure);
            }
        }
        if accumulated == t {
            out.push(picks);
        }
    }
    out
}

/// `revert_concat(t)`: per-bit candidate rows, depth-first cross product with pruning.
pub fn revert_concat(t: Cs, gt: &GuideTable) -> Vec<(Cs, Cs)> {
    let mut target_rows: Vec<Vec<(Cs, Cs)>> = Vec::new();

    if t.get(0) {
        target_rows.push(vec![(Cs::one(), Cs::one())]);
    }
    for i in (gt.alphabet_size + 1).max(1)..gt.ic_size() {
        if !t.get(i) {
            continue;
        }
        let bit = Cs::bit(i);
        let mut row = vec![(bit, Cs::one()), (Cs::one(), bit)];
        for pair in gt.row(i) {
            row.push((Cs::bit(pair.left), Cs::bit(pair.right)));
        }
        target_rows.push(row);
    }
    // Also cover single-letter bits (alphabet_size+1 above skips letters themselves; letters
    // have no guide-table row, but may still need a bare `(bit, eps)`/`(eps, bit)` candidate).
    for i in 1..=gt.alphabet_size {
        if !t.get(i) {
            continue;
        }
        let bit = Cs::bit(i);
        target_rows.push(vec![(bit, Cs::one()), (Cs::one(), bit)]);
    }

    let mut out = Vec::new();
    revert_concat_rec(&target_rows, 0, t, gt, Cs::zero(), Cs::zero(), &mut out);
    out
}

#[allow(clippy::too_many_arguments)]
fn revert_concat_rec(
    rows: &[Vec<(Cs, Cs)>],
    index: usize,
    target: Cs,
    gt: &GuideTable,
    left: Cs,
    right: Cs,
    out: &mut Vec<(Cs, Cs)>,
) {
    if index == rows.len() {
        if !(left == Cs::one() && right == Cs::one()) {
            out.push((left, right));
        }
        return;
    }
    for &(pl, pr) in &rows[index] {
        let nl = left.union(&pl);
        let nr = right.union(&pr);
        let produced = forward::concat(gt, nl, nr);
        if !produced.subset_of(&target) {
            continue;
        }
        revert_concat_rec(rows, index + 1, target, gt, nl, nr, out);
    }
}

/// `revert_or(t)`: canonical two-way bit partitions of `t`. `None` means `t` has too many set
/// bits to enumerate exhaustively (see [`crate::cs::MAX_EXHAUSTIVE_OR_BITS`]); callers must fall
/// back to [`revert_or_random`] instead of treating `None` as "no splits".
pub fn revert_or(t: Cs) -> Option<Vec<(Cs, Cs)>> {
    t.canonical_or_splits()
}

/// Random-sampled variant of `revert_or`: draw random non-trivial submasks until `max_samples`
/// accepted splits are found or the attempt budget is exhausted.
pub fn revert_or_random(t: Cs, max_samples: usize, guac: &mut Guacamole) -> Vec<(Cs, Cs)> {
    let bits: Vec<usize> = t.iter_bits().collect();
    if bits.len() < 2 {
        return Vec::new();
    }
    let mut coin = range_to(2u32);
    let mut out = Vec::new();
    let attempts = max_samples.saturating_mul(4).max(16);
    for _ in 0..attempts {
        if out.len() >= max_samples {
            break;
        }
        let mut s = Cs::zero();
        for &bit in &bits {
            if coin(guac) == 1 {
                s.set(bit);
            }
        }
        let rest = t.xor(&s);
        if s.is_zero() || rest.is_zero() {
            continue;
        }
        let (lo, hi) = if s <= rest { (s, rest) } else { (rest, s) };
        out.push((lo, hi));
    }
    out
}
