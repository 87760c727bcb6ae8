// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Agglomerative Seriation
// ─────────────────────────────────────────────────────────────────────
//! Self-contained pairwise merging that produces an element order.
//!
//! Loop until one cluster is live:
//!   1. Scan live pairs for the minimum distance (first found wins)
//!   2. Append a merged cluster whose distances are the sum or mean of
//!      its parents' distances
//!   3. Orient the two member sequences so their closest boundary
//!      elements become adjacent
//!   4. Tombstone both parents
//!
//! Clusters live in an index-stable arena: cluster `k` keeps id `k` for
//! the whole run and its distance row only ever grows at the end.

use insight_types::{is_permutation, InsightError, InsightResult, MergeMode};

use crate::distance::DistanceMatrix;

/// Append-only cluster storage.
///
/// `rows[k][i]` is the distance from cluster `k` to cluster `i < k`.
struct Arena {
    rows: Vec<Vec<f64>>,
    alive: Vec<bool>,
    members: Vec<Vec<usize>>,
    live: usize,
}

impl Arena {
    fn new(dist: &DistanceMatrix) -> Self {
        let n = dist.len();
        let capacity = (2 * n).saturating_sub(1);
        let mut rows = Vec::with_capacity(capacity);
        for k in 0..n {
            rows.push((0..k).map(|i| dist.get(k, i)).collect());
        }
        let mut members = Vec::with_capacity(capacity);
        members.extend((0..n).map(|i| vec![i]));
        let mut alive = Vec::with_capacity(capacity);
        alive.resize(n, true);
        Self {
            rows,
            alive,
            members,
            live: n,
        }
    }

    fn distance(&self, a: usize, b: usize) -> f64 {
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => 0.0,
            std::cmp::Ordering::Greater => self.rows[a][b],
            std::cmp::Ordering::Less => self.rows[b][a],
        }
    }

    fn live_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter_map(|(id, &alive)| alive.then_some(id))
    }

    /// Live pair `(lo, hi)` with minimum distance, scanning `hi`
    /// ascending and `lo < hi` ascending within it.
    fn closest_pair(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for j in self.live_ids() {
            for i in self.live_ids().take_while(|&i| i < j) {
                let d = self.rows[j][i];
                if best.map_or(true, |(_, _, min)| d < min) {
                    best = Some((i, j, d));
                }
            }
        }
        best.map(|(i, j, _)| (i, j))
    }

    /// Merge live clusters `p < q` into a new cluster; returns its id.
    fn merge(&mut self, p: usize, q: usize, mode: MergeMode, dist: &DistanceMatrix) -> usize {
        let id = self.rows.len();
        let row: Vec<f64> = (0..id)
            .map(|k| {
                if !self.alive[k] || k == p || k == q {
                    return f64::INFINITY;
                }
                let total = self.distance(p, k) + self.distance(q, k);
                match mode {
                    MergeMode::Sum => total,
                    MergeMode::Average => total / 2.0,
                }
            })
            .collect();

        let sequence = orient(&self.members[p], &self.members[q], dist);
        self.rows.push(row);
        self.members.push(sequence);
        self.alive.push(true);
        self.alive[p] = false;
        self.alive[q] = false;
        self.members[p] = Vec::new();
        self.members[q] = Vec::new();
        self.live -= 1;
        id
    }
}

/// Concatenate two member sequences so that their closest boundary
/// elements are adjacent.
///
/// Two singletons are placed higher id first, `q, p`. Otherwise the
/// boundary pairs first/first, first/last, last/first, last/last are
/// compared on the original element distances and the first minimum
/// decides the splice.
pub fn orient(p: &[usize], q: &[usize], dist: &DistanceMatrix) -> Vec<usize> {
    let mut out = Vec::with_capacity(p.len() + q.len());
    let (Some(&pf), Some(&pl), Some(&qf), Some(&ql)) = (p.first(), p.last(), q.first(), q.last())
    else {
        out.extend_from_slice(p);
        out.extend_from_slice(q);
        return out;
    };
    if p.len() == 1 && q.len() == 1 {
        out.extend([qf, pf]);
        return out;
    }

    let candidates = [
        dist.get(pf, qf),
        dist.get(pf, ql),
        dist.get(pl, qf),
        dist.get(pl, ql),
    ];
    let mut best = 0;
    for (k, &d) in candidates.iter().enumerate().skip(1) {
        if d < candidates[best] {
            best = k;
        }
    }

    match best {
        // first-first: reverse p so its first element leads into q
        0 => {
            out.extend(p.iter().rev());
            out.extend_from_slice(q);
        }
        // first-last: q then p
        1 => {
            out.extend_from_slice(q);
            out.extend_from_slice(p);
        }
        // last-first
        2 => {
            out.extend_from_slice(p);
            out.extend_from_slice(q);
        }
        // last-last
        _ => {
            out.extend_from_slice(p);
            out.extend(q.iter().rev());
        }
    }
    out
}

/// Element order from agglomerative merging of `dist`.
///
/// Empty and single-element inputs yield the identity order.
pub fn agglomerate(dist: &DistanceMatrix, mode: MergeMode) -> InsightResult<Vec<usize>> {
    let n = dist.len();
    if n <= 1 {
        return Ok((0..n).collect());
    }

    let mut arena = Arena::new(dist);
    while arena.live > 1 {
        let (p, q) = arena.closest_pair().ok_or_else(|| {
            InsightError::Seriation(format!("{} live clusters but no pair", arena.live))
        })?;
        let d = arena.distance(p, q);
        let id = arena.merge(p, q, mode, dist);
        log::debug!(
            "merge {p} + {q} -> {id} at {d:.4} ({} elements, {} clusters live)",
            arena.members[id].len(),
            arena.live
        );
    }

    let order = arena
        .live_ids()
        .next()
        .map(|id| arena.members[id].clone())
        .unwrap_or_default();
    if !is_permutation(&order, n) {
        return Err(InsightError::Seriation(format!(
            "agglomerative order {order:?} is not a permutation of 0..{n}"
        )));
    }
    Ok(order)
}
