// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Scoring & Matrix Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Score producers, the labeled matrix container and its render
//! adapters.
//!
//! Data flows one way: a [`ScoreTable`] producer fills a [`Matrix`],
//! the matrix is reordered (by `insight-seriation` or `randomize`), then
//! rendered as text, Graphviz source or delimited text.
//!
//! # Invariants
//!
//! 1. **Scores live in [0, 1]**: producers return affinity in the unit
//!    interval and `Matrix::from_scores` clamps whatever comes back.
//!    Non-finite values are logged and clamped, never propagated.
//!
//! 2. **Zero denominators are errors**: Jaccard, interaction, balance
//!    and record-similarity ratios fail with `DivisionDegenerate`
//!    instead of yielding NaN.
//!
//! 3. **Matrix mutations are atomic**: `fill` and `reorder` validate
//!    shape and permutations before touching any cell.
//!
//! 4. **The interaction table is compile-time data**: every variation's
//!    pair sets, including the `+/-` unions, are built in `const`
//!    context and shared read-only.

pub mod cardsort;
mod delimited;
pub mod interactions;
pub mod matrix;
pub mod render;
pub mod scorer;
pub mod similarity;

pub use cardsort::CardSort;
pub use interactions::{InteractionScorer, Interactions, PairSet, Sign, SignPair, Variable};
pub use matrix::{CellFailure, Matrix, MatrixBuild};
pub use render::HistogramBin;
pub use scorer::{ExternalScores, ScoreTable};
pub use similarity::{FieldSimilarity, FieldSpec, FieldType, FieldValue, SimilarityDocument};
