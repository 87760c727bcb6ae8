// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Method & Variation Names
// ─────────────────────────────────────────────────────────────────────
//! Named choices that cross the configuration boundary: hierarchical
//! linkage methods, agglomerative merge modes, record-similarity
//! combination rules and interaction variations.
//!
//! Every enum parses from its user-facing name via `FromStr` and fails
//! with [`InsightError::UnknownVariation`] for anything else.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InsightError;

/// Rule for inter-cluster distance in library-assisted seriation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkageMethod {
    Single,
    #[default]
    Complete,
    Average,
    Weighted,
    Median,
    Ward,
    Centroid,
}

impl LinkageMethod {
    pub const ALL: [LinkageMethod; 7] = [
        LinkageMethod::Single,
        LinkageMethod::Complete,
        LinkageMethod::Average,
        LinkageMethod::Weighted,
        LinkageMethod::Median,
        LinkageMethod::Ward,
        LinkageMethod::Centroid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LinkageMethod::Single => "single",
            LinkageMethod::Complete => "complete",
            LinkageMethod::Average => "average",
            LinkageMethod::Weighted => "weighted",
            LinkageMethod::Median => "median",
            LinkageMethod::Ward => "ward",
            LinkageMethod::Centroid => "centroid",
        }
    }
}

impl FromStr for LinkageMethod {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        LinkageMethod::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| InsightError::UnknownVariation(format!("linkage method '{s}'")))
    }
}

impl fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the self-contained agglomerative algorithm derives the distance
/// from a freshly merged cluster to every other live cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// `d(i, k) + d(j, k)`
    Sum,
    /// `(d(i, k) + d(j, k)) / 2`
    #[default]
    Average,
}

impl FromStr for MergeMode {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(MergeMode::Sum),
            "average" | "avg" => Ok(MergeMode::Average),
            _ => Err(InsightError::UnknownVariation(format!("merge mode '{s}'"))),
        }
    }
}

/// Which seriation strategy the [`crate::InsightConfig`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriationStrategy {
    /// Hierarchical clustering library call + dendrogram leaf order.
    Linkage,
    /// Self-contained agglomerative merge over a live distance matrix.
    #[default]
    Agglomerative,
}

impl FromStr for SeriationStrategy {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linkage" => Ok(SeriationStrategy::Linkage),
            "agglomerative" => Ok(SeriationStrategy::Agglomerative),
            _ => Err(InsightError::UnknownVariation(format!(
                "seriation strategy '{s}'"
            ))),
        }
    }
}

/// Combination of weighted match / no-match totals into one similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationRule {
    /// `match / (match + no_match)`
    #[default]
    #[serde(alias = "01")]
    Balanced,
    /// `match / (match + 2·no_match)`
    #[serde(alias = "02")]
    PenalizeMismatch,
    /// `2·match / (2·match + no_match)`
    #[serde(alias = "03")]
    RewardMatch,
}

impl CombinationRule {
    /// Combine weighted totals. Returns `None` on a zero denominator.
    pub fn combine(self, matched: f64, unmatched: f64) -> Option<f64> {
        let (num, den) = match self {
            CombinationRule::Balanced => (matched, matched + unmatched),
            CombinationRule::PenalizeMismatch => (matched, matched + 2.0 * unmatched),
            CombinationRule::RewardMatch => (2.0 * matched, 2.0 * matched + unmatched),
        };
        if den == 0.0 {
            None
        } else {
            Some(num / den)
        }
    }
}

impl FromStr for CombinationRule {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "01" | "balanced" => Ok(CombinationRule::Balanced),
            "02" | "penalize_mismatch" => Ok(CombinationRule::PenalizeMismatch),
            "03" | "reward_match" => Ok(CombinationRule::RewardMatch),
            _ => Err(InsightError::UnknownVariation(format!(
                "combination rule '{s}'"
            ))),
        }
    }
}

/// Base interaction measure, before polarity is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    Conflict,
    Reinforcement,
    Independence,
    ConflictReinforcement,
    ConflictIndependence,
    ReinforcementIndependence,
}

impl Measure {
    pub const ALL: [Measure; 6] = [
        Measure::Conflict,
        Measure::Reinforcement,
        Measure::Independence,
        Measure::ConflictReinforcement,
        Measure::ConflictIndependence,
        Measure::ReinforcementIndependence,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Measure::Conflict => "conflict",
            Measure::Reinforcement => "reinforcement",
            Measure::Independence => "independence",
            Measure::ConflictReinforcement => "conflict + reinforcement",
            Measure::ConflictIndependence => "conflict + independence",
            Measure::ReinforcementIndependence => "reinforcement + independence",
        }
    }
}

/// Which side of the scale a variation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Positive supports (no prefix).
    Positive,
    /// Negative supports (`- ` prefix).
    Negative,
    /// Union of both (`+/- ` prefix).
    Both,
}

impl Polarity {
    pub const ALL: [Polarity; 3] = [Polarity::Positive, Polarity::Negative, Polarity::Both];

    fn prefix(self) -> &'static str {
        match self {
            Polarity::Positive => "",
            Polarity::Negative => "- ",
            Polarity::Both => "+/- ",
        }
    }
}

/// A named interaction variation, e.g. `"- conflict + independence"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Variation {
    pub measure: Measure,
    pub polarity: Polarity,
}

impl Variation {
    pub const fn new(measure: Measure, polarity: Polarity) -> Self {
        Self { measure, polarity }
    }

    /// All 18 variations: six measures × three polarities.
    pub fn all() -> impl Iterator<Item = Variation> {
        Polarity::ALL
            .into_iter()
            .flat_map(|p| Measure::ALL.into_iter().map(move |m| Variation::new(m, p)))
    }
}

impl Default for Variation {
    fn default() -> Self {
        Variation::new(Measure::ConflictReinforcement, Polarity::Positive)
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.polarity.prefix(), self.measure.name())
    }
}

impl FromStr for Variation {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (polarity, rest) = if let Some(rest) = s.strip_prefix("+/- ") {
            (Polarity::Both, rest)
        } else if let Some(rest) = s.strip_prefix("- ") {
            (Polarity::Negative, rest)
        } else {
            (Polarity::Positive, s)
        };
        Measure::ALL
            .into_iter()
            .find(|m| m.name() == rest)
            .map(|m| Variation::new(m, polarity))
            .ok_or_else(|| InsightError::UnknownVariation(format!("variation '{s}'")))
    }
}

impl TryFrom<String> for Variation {
    type Error = InsightError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Variation> for String {
    fn from(v: Variation) -> Self {
        v.to_string()
    }
}
