// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Linkage Seriation
// ─────────────────────────────────────────────────────────────────────
//! Hierarchical clustering via `kodama`, flattened to a leaf order.
//!
//! The dendrogram is walked depth-first from the root. At each branch
//! the child with the strictly greater merge height is visited first
//! (leaves have height 0); on a tie the second child goes first.

use kodama::{linkage, Dendrogram, Method};

use insight_types::{is_permutation, InsightError, InsightResult, LinkageMethod};

use crate::distance::DistanceMatrix;

fn kodama_method(method: LinkageMethod) -> Method {
    match method {
        LinkageMethod::Single => Method::Single,
        LinkageMethod::Complete => Method::Complete,
        LinkageMethod::Average => Method::Average,
        LinkageMethod::Weighted => Method::Weighted,
        LinkageMethod::Median => Method::Median,
        LinkageMethod::Ward => Method::Ward,
        LinkageMethod::Centroid => Method::Centroid,
    }
}

/// Leaf order of the dendrogram built from `dist` with `method`.
///
/// `Ward`, `Centroid` and `Median` assume Euclidean distances.
pub fn leaf_order(dist: &DistanceMatrix, method: LinkageMethod) -> InsightResult<Vec<usize>> {
    let n = dist.len();
    if n <= 1 {
        return Ok((0..n).collect());
    }

    let mut condensed = dist.condensed();
    let dendrogram = linkage(&mut condensed, n, kodama_method(method));
    log::debug!(
        "{method} linkage over {n} elements: {} merges, root height {:.4}",
        dendrogram.len(),
        dendrogram.steps().last().map_or(0.0, |s| s.dissimilarity)
    );

    let order = leaves(&dendrogram, n);
    if !is_permutation(&order, n) {
        return Err(InsightError::Seriation(format!(
            "{method} linkage order {order:?} is not a permutation of 0..{n}"
        )));
    }
    Ok(order)
}

/// Depth-first leaf sequence; cluster `n + k` is created by step `k`.
fn leaves(dendrogram: &Dendrogram<f64>, n: usize) -> Vec<usize> {
    let steps = dendrogram.steps();
    let height = |node: usize| {
        if node < n {
            0.0
        } else {
            steps[node - n].dissimilarity
        }
    };

    let mut order = Vec::with_capacity(n);
    let mut stack = vec![n + steps.len() - 1];
    while let Some(node) = stack.pop() {
        if node < n {
            order.push(node);
            continue;
        }
        let step = &steps[node - n];
        let (first, second) = if height(step.cluster1) > height(step.cluster2) {
            (step.cluster1, step.cluster2)
        } else {
            (step.cluster2, step.cluster1)
        };
        stack.push(second);
        stack.push(first);
    }
    order
}
