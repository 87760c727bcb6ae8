// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Score Table Interface
// ─────────────────────────────────────────────────────────────────────
//! The capability shared by every score producer: enumerate an element
//! universe and score any two of its members.
//!
//! Field similarity, card-sort Jaccard and signed-variable interaction
//! all implement [`ScoreTable`]; the matrix container consumes it.

use std::collections::HashSet;

use insight_types::score::clamp_score;
use insight_types::{InsightError, InsightResult};

/// Trait for pairwise score producers.
///
/// `score` returns affinity ∈ [0, 1]:
/// - 0.0 = no affinity
/// - 1.0 = identical / maximal interaction
///
/// Labels outside [`ScoreTable::elements`] must fail with
/// [`InsightError::LabelNotFound`].
pub trait ScoreTable: Send + Sync {
    /// Element universe, in the order matrix axes should use.
    fn elements(&self) -> Vec<String>;

    fn score(&self, a: &str, b: &str) -> InsightResult<f64>;
}

/// External score producer that calls a scoring function pointer.
///
/// Used by the PyO3 FFI layer to score with a Python callable while the
/// matrix and seriation work stays in Rust. A failing call surfaces as
/// the cell's error, so matrix builds report it as a failed cell.
type ScoreFn = Box<dyn Fn(&str, &str) -> InsightResult<f64> + Send + Sync>;

pub struct ExternalScores {
    elements: Vec<String>,
    known: HashSet<String>,
    score_fn: ScoreFn,
}

impl ExternalScores {
    pub fn new(
        elements: Vec<String>,
        score_fn: impl Fn(&str, &str) -> InsightResult<f64> + Send + Sync + 'static,
    ) -> Self {
        let known = elements.iter().cloned().collect();
        Self {
            elements,
            known,
            score_fn: Box::new(score_fn),
        }
    }
}

impl ScoreTable for ExternalScores {
    fn elements(&self) -> Vec<String> {
        self.elements.clone()
    }

    fn score(&self, a: &str, b: &str) -> InsightResult<f64> {
        for label in [a, b] {
            if !self.known.contains(label) {
                return Err(InsightError::LabelNotFound(label.to_string()));
            }
        }
        Ok(clamp_score((self.score_fn)(a, b)?, 0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_external_scores() {
        let table =
            ExternalScores::new(labels(&["a", "b"]), |a, b| Ok(if a == b { 1.0 } else { 0.42 }));
        assert_eq!(table.elements(), labels(&["a", "b"]));
        assert!((table.score("a", "b").unwrap() - 0.42).abs() < 1e-9);
        assert!((table.score("b", "b").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_external_unknown_label() {
        let table = ExternalScores::new(labels(&["a"]), |_, _| Ok(0.5));
        assert!(matches!(
            table.score("a", "z"),
            Err(InsightError::LabelNotFound(l)) if l == "z"
        ));
    }

    #[test]
    fn test_external_clamps_non_finite() {
        let table = ExternalScores::new(labels(&["a"]), |_, _| Ok(f64::NAN));
        assert_eq!(table.score("a", "a").unwrap(), 0.0);
        let table = ExternalScores::new(labels(&["a"]), |_, _| Ok(3.0));
        assert_eq!(table.score("a", "a").unwrap(), 1.0);
    }

    #[test]
    fn test_external_callback_error() {
        let table = ExternalScores::new(labels(&["a", "b"]), |a, b| {
            if a != b {
                Err(InsightError::External(format!("no score for {a}/{b}")))
            } else {
                Ok(1.0)
            }
        });
        assert!(matches!(table.score("a", "b"), Err(InsightError::External(_))));
        assert_eq!(table.score("b", "b").unwrap(), 1.0);
    }
}
