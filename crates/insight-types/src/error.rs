// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Insight Matrix failures.
///
/// Every variant is a data or configuration error: nothing here is
/// transient, so callers should report rather than retry.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Operation needs a different matrix shape, or an order/label set
    /// does not line up with the matrix it is applied to.
    #[error("shape error: {0}")]
    Shape(String),

    /// Unrecognised interaction variation, combination rule or method name.
    #[error("unknown variation: {0}")]
    UnknownVariation(String),

    /// A ratio with a zero denominator (Jaccard, interaction, balance, ...).
    #[error("degenerate division: {0}")]
    DivisionDegenerate(String),

    /// Score requested for an element outside the producer's universe.
    #[error("label not found: {0}")]
    LabelNotFound(String),

    /// Missing, empty or unparseable field in an input record.
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// A caller-supplied scoring function raised or returned a non-number.
    #[error("external scorer error: {0}")]
    External(String),

    /// A seriation strategy produced something other than a permutation.
    #[error("seriation error: {0}")]
    Seriation(String),

    /// Underlying reader failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type InsightResult<T> = Result<T, InsightError>;
