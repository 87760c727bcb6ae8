// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Profile Distance Matrices
// ─────────────────────────────────────────────────────────────────────
//! Symmetric, zero-diagonal distances between the row or column
//! profiles of a [`Matrix`].
//!
//! `Manhattan` over column profiles is the classic "delta matrix": for
//! a 3×5 matrix it yields a 5×5 distance matrix, over rows a 3×3 one.

use insight_core::Matrix;
use insight_types::{InsightError, InsightResult};

/// Which profiles are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Row `y` is the vector `matrix[y][..]`.
    Rows,
    /// Column `x` is the vector `matrix[..][x]`.
    Columns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMetric {
    /// Σ |Δ|
    Manhattan,
    /// √Σ Δ²
    Euclidean,
}

impl ProfileMetric {
    fn distance(self, a: &[f64], b: &[f64]) -> f64 {
        let deltas = a.iter().zip(b).map(|(x, y)| x - y);
        match self {
            ProfileMetric::Manhattan => deltas.map(f64::abs).sum(),
            ProfileMetric::Euclidean => deltas.map(|d| d * d).sum::<f64>().sqrt(),
        }
    }
}

/// Dense `n × n` distance matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Validate and wrap row-major distances: finite, non-negative,
    /// symmetric, zero diagonal.
    pub fn new(n: usize, values: Vec<f64>) -> InsightResult<Self> {
        if values.len() != n * n {
            return Err(InsightError::Shape(format!(
                "{} distances for {n} elements",
                values.len()
            )));
        }
        for i in 0..n {
            if values[i * n + i] != 0.0 {
                return Err(InsightError::Shape(format!(
                    "distance diagonal must be zero, d[{i}][{i}] = {}",
                    values[i * n + i]
                )));
            }
            for j in 0..i {
                let d = values[i * n + j];
                if !d.is_finite() || d < 0.0 {
                    return Err(InsightError::Shape(format!(
                        "d[{i}][{j}] = {d} is not a finite non-negative distance"
                    )));
                }
                if d != values[j * n + i] {
                    return Err(InsightError::Shape(format!(
                        "distance matrix not symmetric at ({i}, {j})"
                    )));
                }
            }
        }
        Ok(Self { n, values })
    }

    /// Pairwise distances between the profiles of `matrix` along `axis`.
    pub fn from_profiles(
        matrix: &Matrix,
        axis: Axis,
        metric: ProfileMetric,
    ) -> InsightResult<Self> {
        let profiles: Vec<Vec<f64>> = match axis {
            Axis::Rows => (0..matrix.height())
                .filter_map(|y| matrix.row(y).map(<[f64]>::to_vec))
                .collect(),
            Axis::Columns => (0..matrix.width())
                .filter_map(|x| matrix.column(x))
                .collect(),
        };
        let n = profiles.len();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..i {
                let d = metric.distance(&profiles[i], &profiles[j]);
                if !d.is_finite() {
                    return Err(InsightError::Seriation(format!(
                        "non-finite {metric:?} distance between {axis:?} profiles {i} and {j}"
                    )));
                }
                values[i * n + j] = d;
                values[j * n + i] = d;
            }
        }
        Ok(Self { n, values })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between elements `i` and `j`. Panics when out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Upper triangle without the diagonal, row by row:
    /// `d(0,1), d(0,2), …, d(0,n−1), d(1,2), …`.
    pub fn condensed(&self) -> Vec<f64> {
        let n = self.n;
        let mut out = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            out.extend_from_slice(&self.values[i * n + i + 1..(i + 1) * n]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        let labels = |n: usize| (0..n).map(|i| i.to_string()).collect::<Vec<_>>();
        Matrix::new(
            labels(3),
            labels(5),
            vec![
                vec![1.0, 3.0, 2.0, 3.0, 3.0],
                vec![2.0, 1.0, 1.0, 3.0, 3.0],
                vec![3.0, 3.0, 2.0, 1.0, 2.0],
            ],
        )
        .unwrap()
    }

    fn flat(rows: &[&[f64]]) -> Vec<f64> {
        rows.iter().flat_map(|r| r.iter().copied()).collect()
    }

    #[test]
    fn test_delta_matrix_columns() {
        let d = DistanceMatrix::from_profiles(&sample(), Axis::Columns, ProfileMetric::Manhattan)
            .unwrap();
        assert_eq!(d.len(), 5);
        assert_eq!(
            d.values(),
            flat(&[
                &[0.0, 3.0, 3.0, 5.0, 4.0],
                &[3.0, 0.0, 2.0, 4.0, 3.0],
                &[3.0, 2.0, 0.0, 4.0, 3.0],
                &[5.0, 4.0, 4.0, 0.0, 1.0],
                &[4.0, 3.0, 3.0, 1.0, 0.0],
            ])
        );
    }

    #[test]
    fn test_delta_matrix_rows() {
        let d =
            DistanceMatrix::from_profiles(&sample(), Axis::Rows, ProfileMetric::Manhattan).unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(
            d.values(),
            flat(&[&[0.0, 4.0, 5.0], &[4.0, 0.0, 7.0], &[5.0, 7.0, 0.0]])
        );
    }

    #[test]
    fn test_euclidean_rows() {
        let d =
            DistanceMatrix::from_profiles(&sample(), Axis::Rows, ProfileMetric::Euclidean).unwrap();
        // rows 0 and 1 differ by (1, 2, 1, 0, 0)
        assert!((d.get(0, 1) - 6.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(d.get(1, 0), d.get(0, 1));
    }

    #[test]
    fn test_condensed_order() {
        let d =
            DistanceMatrix::from_profiles(&sample(), Axis::Rows, ProfileMetric::Manhattan).unwrap();
        assert_eq!(d.condensed(), vec![4.0, 5.0, 7.0]);
        let empty = DistanceMatrix::new(0, vec![]).unwrap();
        assert!(empty.is_empty());
        assert!(empty.condensed().is_empty());
    }

    #[test]
    fn test_new_validates() {
        assert!(DistanceMatrix::new(2, vec![0.0, 1.0, 1.0, 0.0]).is_ok());
        assert!(DistanceMatrix::new(2, vec![0.0, 1.0, 2.0, 0.0]).is_err());
        assert!(DistanceMatrix::new(2, vec![1.0, 1.0, 1.0, 0.0]).is_err());
        assert!(DistanceMatrix::new(2, vec![0.0, -1.0, -1.0, 0.0]).is_err());
        assert!(DistanceMatrix::new(2, vec![0.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_non_finite_profile_distance() {
        let m = Matrix::new(
            vec!["a".into(), "b".into()],
            vec!["x".into()],
            vec![vec![f64::NAN], vec![1.0]],
        )
        .unwrap();
        assert!(matches!(
            DistanceMatrix::from_profiles(&m, Axis::Rows, ProfileMetric::Euclidean),
            Err(InsightError::Seriation(_))
        ));
    }
}
