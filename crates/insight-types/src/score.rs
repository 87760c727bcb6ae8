// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Score Helpers
// ─────────────────────────────────────────────────────────────────────

use crate::error::{InsightError, InsightResult};

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to nearest bound.
#[inline]
pub fn clamp_score(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_score: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_score: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// `numerator / denominator`, failing instead of producing NaN or Inf.
///
/// `what` names the quantity for the error message.
#[inline]
pub fn checked_ratio(numerator: f64, denominator: f64, what: &str) -> InsightResult<f64> {
    if denominator == 0.0 {
        return Err(InsightError::DivisionDegenerate(format!(
            "{what}: denominator is zero"
        )));
    }
    Ok(numerator / denominator)
}

/// True when `order` holds every index in `0..n` exactly once.
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &i in order {
        if i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_nan() {
        assert_eq!(clamp_score(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_clamp_pos_inf() {
        assert_eq!(clamp_score(f64::INFINITY, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_clamp_neg_inf() {
        assert_eq!(clamp_score(f64::NEG_INFINITY, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_clamp_normal() {
        assert_eq!(clamp_score(0.75, 0.0, 1.0), 0.75);
    }

    #[test]
    fn test_clamp_out_of_range() {
        assert_eq!(clamp_score(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp_score(-0.3, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_checked_ratio() {
        assert!((checked_ratio(1.0, 4.0, "x").unwrap() - 0.25).abs() < 1e-12);
        assert!(matches!(
            checked_ratio(1.0, 0.0, "x"),
            Err(InsightError::DivisionDegenerate(_))
        ));
    }

    #[test]
    fn test_is_permutation() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(is_permutation(&[], 0));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
    }
}
