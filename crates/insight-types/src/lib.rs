// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy shared by the
//! Insight Matrix scoring, matrix and seriation crates.

pub mod config;
pub mod error;
pub mod methods;
pub mod score;

pub use config::InsightConfig;
pub use error::{InsightError, InsightResult};
pub use methods::{
    CombinationRule, LinkageMethod, Measure, MergeMode, Polarity, SeriationStrategy, Variation,
};
pub use score::{checked_ratio, clamp_score, is_permutation};
