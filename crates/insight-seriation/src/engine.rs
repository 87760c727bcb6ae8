// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Seriator
// ─────────────────────────────────────────────────────────────────────
//! Applies a seriation strategy to a [`Matrix`] in place.
//!
//! Symmetric matrices get one order from their row profiles, applied to
//! both axes. Asymmetric matrices get a row order from row profiles and
//! an independent column order from column profiles.

use serde::{Deserialize, Serialize};

use insight_core::Matrix;
use insight_types::{
    is_permutation, InsightConfig, InsightError, InsightResult, LinkageMethod, MergeMode,
    SeriationStrategy,
};

use crate::agglomerative::agglomerate;
use crate::distance::{Axis, DistanceMatrix, ProfileMetric};
use crate::linkage::leaf_order;

/// The permutation a [`Seriator`] applied: new row `y` was old row
/// `rows[y]`, likewise for columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriationOrder {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

/// Seriation strategy with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seriator {
    /// `kodama` hierarchical clustering over Euclidean profile distances.
    Linkage(LinkageMethod),
    /// Pairwise merging over Manhattan profile distances.
    Agglomerative(MergeMode),
}

impl Default for Seriator {
    fn default() -> Self {
        Self::from_config(&InsightConfig::default())
    }
}

impl Seriator {
    pub fn from_config(config: &InsightConfig) -> Self {
        match config.strategy {
            SeriationStrategy::Linkage => Seriator::Linkage(config.linkage_method),
            SeriationStrategy::Agglomerative => Seriator::Agglomerative(config.merge_mode),
        }
    }

    pub fn metric(&self) -> ProfileMetric {
        match self {
            Seriator::Linkage(_) => ProfileMetric::Euclidean,
            Seriator::Agglomerative(_) => ProfileMetric::Manhattan,
        }
    }

    /// Order for a prepared distance matrix.
    pub fn order_distances(&self, dist: &DistanceMatrix) -> InsightResult<Vec<usize>> {
        let order = match *self {
            Seriator::Linkage(method) => leaf_order(dist, method)?,
            Seriator::Agglomerative(mode) => agglomerate(dist, mode)?,
        };
        if !is_permutation(&order, dist.len()) {
            return Err(InsightError::Seriation(format!(
                "{self:?} produced {order:?}, not a permutation of 0..{}",
                dist.len()
            )));
        }
        Ok(order)
    }

    /// Order for the profiles of `matrix` along `axis`.
    pub fn leaf_order(&self, matrix: &Matrix, axis: Axis) -> InsightResult<Vec<usize>> {
        let dist = DistanceMatrix::from_profiles(matrix, axis, self.metric())?;
        self.order_distances(&dist)
    }

    /// Reorder `matrix` in place and return the applied order.
    pub fn seriate(&self, matrix: &mut Matrix) -> InsightResult<SeriationOrder> {
        let rows = self.leaf_order(matrix, Axis::Rows)?;
        let order = if matrix.is_symmetric() {
            matrix.reorder(&rows, None)?;
            SeriationOrder {
                cols: rows.clone(),
                rows,
            }
        } else {
            let cols = self.leaf_order(matrix, Axis::Columns)?;
            matrix.reorder(&rows, Some(&cols))?;
            SeriationOrder { rows, cols }
        };
        log::debug!(
            "seriated {}x{} matrix with {self:?}",
            matrix.height(),
            matrix.width()
        );
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn strategies() -> Vec<Seriator> {
        vec![
            Seriator::Agglomerative(MergeMode::Average),
            Seriator::Agglomerative(MergeMode::Sum),
            Seriator::Linkage(LinkageMethod::Complete),
            Seriator::Linkage(LinkageMethod::Ward),
        ]
    }

    #[test]
    fn test_from_config() {
        let mut config = InsightConfig::default();
        assert_eq!(
            Seriator::from_config(&config),
            Seriator::Agglomerative(MergeMode::Average)
        );
        config.strategy = SeriationStrategy::Linkage;
        config.linkage_method = LinkageMethod::Single;
        assert_eq!(
            Seriator::from_config(&config),
            Seriator::Linkage(LinkageMethod::Single)
        );
    }

    #[test]
    fn test_seriate_symmetric() {
        let names = labels(&["a", "x", "b", "y"]);
        let rows = vec![
            vec![1.0, 0.1, 0.9, 0.1],
            vec![0.1, 1.0, 0.1, 0.9],
            vec![0.9, 0.1, 1.0, 0.1],
            vec![0.1, 0.9, 0.1, 1.0],
        ];
        for s in strategies() {
            let mut m = Matrix::new(names.clone(), names.clone(), rows.clone()).unwrap();
            let order = s.seriate(&mut m).unwrap();
            assert_eq!(order.rows, order.cols);
            assert!(m.is_symmetric());
            let pos = |l: &str| m.row_labels().iter().position(|r| r == l).unwrap();
            assert_eq!(pos("a").abs_diff(pos("b")), 1, "{s:?}: {:?}", m.row_labels());
            assert_eq!(pos("x").abs_diff(pos("y")), 1, "{s:?}: {:?}", m.row_labels());
        }
    }

    #[test]
    fn test_seriate_asymmetric() {
        let rows = vec![
            vec![1.0, 0.0, 1.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.9],
        ];
        for s in strategies() {
            let mut m = Matrix::new(
                labels(&["r0", "r1", "r2"]),
                labels(&["c0", "c1", "c2"]),
                rows.clone(),
            )
            .unwrap();
            let order = s.seriate(&mut m).unwrap();
            assert!(is_permutation(&order.rows, 3));
            assert!(is_permutation(&order.cols, 3));
            let row_pos = |l: &str| m.row_labels().iter().position(|r| r == l).unwrap();
            let col_pos = |l: &str| m.col_labels().iter().position(|c| c == l).unwrap();
            assert_eq!(row_pos("r0").abs_diff(row_pos("r2")), 1, "{s:?}");
            assert_eq!(col_pos("c0").abs_diff(col_pos("c2")), 1, "{s:?}");
        }
    }

    #[test]
    fn test_seriate_trivial() {
        for s in strategies() {
            let mut empty = Matrix::new(vec![], vec![], vec![]).unwrap();
            let order = s.seriate(&mut empty).unwrap();
            assert!(order.rows.is_empty() && order.cols.is_empty());

            let mut one = Matrix::new(labels(&["a"]), labels(&["a"]), vec![vec![1.0]]).unwrap();
            assert_eq!(s.seriate(&mut one).unwrap().rows, vec![0]);
        }
    }

    #[test]
    fn test_reported_order_matches_labels() {
        let names = labels(&["p", "q", "r"]);
        let original = Matrix::new(
            names.clone(),
            names,
            vec![
                vec![1.0, 0.2, 0.8],
                vec![0.2, 1.0, 0.3],
                vec![0.8, 0.3, 1.0],
            ],
        )
        .unwrap();
        let mut m = original.clone();
        let order = Seriator::default().seriate(&mut m).unwrap();
        for (y, &old) in order.rows.iter().enumerate() {
            assert_eq!(m.row_labels()[y], original.row_labels()[old]);
            let expected: Vec<f64> = order
                .cols
                .iter()
                .map(|&x| original.get(old, x).unwrap())
                .collect();
            assert_eq!(m.row(y).unwrap(), expected.as_slice());
        }
    }
}
