// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Seriation Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Seriation: reorder matrix rows and columns so that similar elements
//! sit next to each other.
//!
//! Two strategies share one contract (a permutation of `0..n`):
//!
//! - [`linkage::leaf_order`]: hierarchical clustering through `kodama`,
//!   flattened depth-first with the taller subtree first.
//! - [`agglomerative::agglomerate`]: pairwise merging with boundary
//!   orientation over an index-stable arena.
//!
//! Any order that is not a permutation fails with
//! `InsightError::Seriation`; the matrix is never left half-reordered.

pub mod agglomerative;
pub mod distance;
pub mod engine;
pub mod linkage;

pub use distance::{Axis, DistanceMatrix, ProfileMetric};
pub use engine::{SeriationOrder, Seriator};
