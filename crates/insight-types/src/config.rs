// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Runtime Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, InsightResult};
use crate::methods::{CombinationRule, LinkageMethod, MergeMode, SeriationStrategy, Variation};

/// Runtime configuration for one analysis run.
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Seriation strategy used by `cluster`.
    /// Default: agglomerative.
    pub strategy: SeriationStrategy,

    /// Linkage method for the library-assisted strategy.
    /// Default: complete.
    pub linkage_method: LinkageMethod,

    /// Distance update for the agglomerative strategy.
    /// Default: average.
    pub merge_mode: MergeMode,

    /// Record-similarity combination rule for field similarity.
    /// Default: balanced, `match / (match + no_match)`.
    pub combination_rule: CombinationRule,

    /// Interaction variation scored when building an interaction matrix.
    /// Default: "conflict + reinforcement".
    pub variation: Variation,

    /// Edge threshold for graph rendering: edge iff value >= cutoff.
    /// Default: 0.5.
    pub graph_cutoff: f64,

    /// Number of frequency classes in the coefficient histogram.
    /// Default: 101 (one per hundredth, 1.0 included in the last).
    pub histogram_bins: usize,

    /// Seed for `randomize`. `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            strategy: SeriationStrategy::default(),
            linkage_method: LinkageMethod::default(),
            merge_mode: MergeMode::default(),
            combination_rule: CombinationRule::default(),
            variation: Variation::default(),
            graph_cutoff: 0.5,
            histogram_bins: 101,
            seed: None,
        }
    }
}

impl InsightConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> InsightResult<()> {
        if !(0.0..=1.0).contains(&self.graph_cutoff) {
            return Err(InsightError::Config(format!(
                "graph_cutoff must be in [0, 1], got {}",
                self.graph_cutoff
            )));
        }
        if self.histogram_bins < 1 {
            return Err(InsightError::Config(format!(
                "histogram_bins must be >= 1, got {}",
                self.histogram_bins
            )));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> InsightResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| InsightError::Config(format!("JSON parse error: {e}")))
    }

    pub fn to_json(&self) -> InsightResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| InsightError::Config(format!("JSON encode error: {e}")))
    }
}
