// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Labeled Matrix Container
// ─────────────────────────────────────────────────────────────────────
//! Row-major `height × width` grid of scores with row and column labels.
//!
//! Built from a [`ScoreTable`] or imported from delimited text, mutated
//! in place by `fill`/`reorder`/`randomize`, then rendered or exported.

use std::io::Read;

use rand::seq::SliceRandom;
use rand::Rng;

use insight_types::score::{clamp_score, is_permutation};
use insight_types::{InsightError, InsightResult};

use crate::delimited::{read_rows, write_rows};
use crate::scorer::ScoreTable;

/// A labeled score matrix. `data[y * width + x]` is row `y`, column `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    data: Vec<f64>,
}

/// A cell whose score could not be computed during [`Matrix::from_scores`].
#[derive(Debug)]
pub struct CellFailure {
    pub row: String,
    pub col: String,
    pub error: InsightError,
}

/// Result of building a matrix from a score table.
#[derive(Debug)]
pub struct MatrixBuild {
    pub matrix: Matrix,
    /// Cells left at 0.0 because scoring failed.
    pub failures: Vec<CellFailure>,
}

impl MatrixBuild {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Matrix {
    /// Build from labels and one `Vec` per row.
    pub fn new(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> InsightResult<Self> {
        if rows.len() != row_labels.len() {
            return Err(InsightError::Shape(format!(
                "{} row labels but {} rows",
                row_labels.len(),
                rows.len()
            )));
        }
        let width = col_labels.len();
        let mut data = Vec::with_capacity(rows.len() * width);
        for (label, row) in row_labels.iter().zip(rows) {
            if row.len() != width {
                return Err(InsightError::Shape(format!(
                    "row {label:?} has {} cells, expected {width}",
                    row.len()
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            row_labels,
            col_labels,
            data,
        })
    }

    /// Build from labels and row-major data.
    pub fn from_flat(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        data: Vec<f64>,
    ) -> InsightResult<Self> {
        if data.len() != row_labels.len() * col_labels.len() {
            return Err(InsightError::Shape(format!(
                "{} values for a {}x{} matrix",
                data.len(),
                row_labels.len(),
                col_labels.len()
            )));
        }
        Ok(Self {
            row_labels,
            col_labels,
            data,
        })
    }

    /// Score every pair of the table's universe.
    ///
    /// A failing cell is left at 0.0 and reported; the rest of the grid
    /// is still built.
    pub fn from_scores(table: &dyn ScoreTable) -> MatrixBuild {
        let labels = table.elements();
        let n = labels.len();
        let mut data = vec![0.0; n * n];
        let mut failures = Vec::new();

        for (y, a) in labels.iter().enumerate() {
            for (x, b) in labels.iter().enumerate() {
                match table.score(a, b) {
                    Ok(v) => data[y * n + x] = clamp_score(v, 0.0, 1.0),
                    Err(error) => {
                        log::warn!("score({a}, {b}) failed, cell set to 0.0: {error}");
                        failures.push(CellFailure {
                            row: a.clone(),
                            col: b.clone(),
                            error,
                        });
                    }
                }
            }
        }

        MatrixBuild {
            matrix: Self {
                row_labels: labels.clone(),
                col_labels: labels,
                data,
            },
            failures,
        }
    }

    pub fn width(&self) -> usize {
        self.col_labels.len()
    }

    pub fn height(&self) -> usize {
        self.row_labels.len()
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Row-major cell values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height() && col < self.width() {
            Some(self.data[row * self.width() + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> InsightResult<()> {
        if row >= self.height() || col >= self.width() {
            return Err(InsightError::Shape(format!(
                "cell ({row}, {col}) outside {}x{} matrix",
                self.height(),
                self.width()
            )));
        }
        let w = self.width();
        self.data[row * w + col] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let w = self.width();
        (row < self.height()).then(|| &self.data[row * w..(row + 1) * w])
    }

    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        (col < self.width()).then(|| {
            (0..self.height())
                .map(|y| self.data[y * self.width() + col])
                .collect()
        })
    }

    /// Largest value, `None` for an empty matrix.
    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::max)
    }

    pub fn is_square(&self) -> bool {
        self.width() == self.height()
    }

    /// Square, identical label vectors, and `data[y][x] == data[x][y]`.
    pub fn is_symmetric(&self) -> bool {
        if !self.is_square() || self.row_labels != self.col_labels {
            return false;
        }
        let n = self.width();
        (0..n).all(|y| (0..y).all(|x| self.data[y * n + x] == self.data[x * n + y]))
    }

    fn require_square(&self, what: &str) -> InsightResult<usize> {
        if self.is_square() {
            Ok(self.width())
        } else {
            Err(InsightError::Shape(format!(
                "{what} needs a square matrix, got {}x{}",
                self.height(),
                self.width()
            )))
        }
    }

    /// `(row, col)` pairs of one triangle including the diagonal,
    /// in row-major order.
    pub fn triangle_indices(&self, upper: bool) -> InsightResult<Vec<(usize, usize)>> {
        let n = self.require_square("triangle_indices")?;
        let mut pairs = Vec::with_capacity(n * (n + 1) / 2);
        for r in 0..n {
            if upper {
                pairs.extend((r..n).map(|c| (r, c)));
            } else {
                pairs.extend((0..=r).map(|c| (r, c)));
            }
        }
        Ok(pairs)
    }

    /// Mirror one triangle onto the other.
    ///
    /// `upper = true` overwrites the upper triangle with the lower one,
    /// `false` the reverse.
    pub fn fill(&mut self, upper: bool) -> InsightResult<()> {
        let n = self.require_square("fill")?;
        for (r, c) in self.triangle_indices(upper)? {
            self.data[r * n + c] = self.data[c * n + r];
        }
        Ok(())
    }

    /// Permute rows and columns: new row `y` is old row `row_order[y]`.
    ///
    /// With `col_order = None` the matrix must be symmetric and
    /// `row_order` is applied to both axes. Nothing changes on error.
    pub fn reorder(
        &mut self,
        row_order: &[usize],
        col_order: Option<&[usize]>,
    ) -> InsightResult<()> {
        let col_order = match col_order {
            Some(order) => order,
            None if self.is_symmetric() => row_order,
            None => {
                return Err(InsightError::Shape(
                    "asymmetric matrix needs an explicit column order".into(),
                ))
            }
        };
        if !is_permutation(row_order, self.height()) {
            return Err(InsightError::Shape(format!(
                "row order {row_order:?} is not a permutation of 0..{}",
                self.height()
            )));
        }
        if !is_permutation(col_order, self.width()) {
            return Err(InsightError::Shape(format!(
                "column order {col_order:?} is not a permutation of 0..{}",
                self.width()
            )));
        }

        let w = self.width();
        let mut data = Vec::with_capacity(self.data.len());
        for &y in row_order {
            data.extend(col_order.iter().map(|&x| self.data[y * w + x]));
        }
        self.data = data;
        self.row_labels = row_order.iter().map(|&i| self.row_labels[i].clone()).collect();
        self.col_labels = col_order.iter().map(|&i| self.col_labels[i].clone()).collect();
        Ok(())
    }

    /// Shuffle into a uniformly random order; asymmetric matrices get
    /// independent row and column permutations.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> InsightResult<()> {
        let mut rows: Vec<usize> = (0..self.height()).collect();
        rows.shuffle(rng);
        if self.is_symmetric() {
            self.reorder(&rows, None)
        } else {
            let mut cols: Vec<usize> = (0..self.width()).collect();
            cols.shuffle(rng);
            self.reorder(&rows, Some(&cols))
        }
    }

    /// Parse delimited text: a header of `""` plus column labels, then
    /// one row per label. Non-numeric cells import as 0.0.
    pub fn from_csv<R: Read>(reader: R) -> InsightResult<Self> {
        let rows = read_rows(reader)?;
        let Some((header, body)) = rows.split_first() else {
            return Self::from_flat(Vec::new(), Vec::new(), Vec::new());
        };
        let col_labels: Vec<String> = header.iter().skip(1).cloned().collect();
        let width = col_labels.len();

        let mut row_labels = Vec::with_capacity(body.len());
        let mut data = Vec::with_capacity(body.len() * width);
        for (line, row) in body.iter().enumerate() {
            if row.len() != width + 1 {
                return Err(InsightError::Shape(format!(
                    "matrix line {}: {} cells, expected {}",
                    line + 2,
                    row.len(),
                    width + 1
                )));
            }
            row_labels.push(row[0].clone());
            data.extend(row[1..].iter().map(|c| c.trim().parse::<f64>().unwrap_or(0.0)));
        }
        Self::from_flat(row_labels, col_labels, data)
    }

    pub fn from_csv_str(text: &str) -> InsightResult<Self> {
        Self::from_csv(text.as_bytes())
    }

    /// Delimited text in the layout [`Matrix::from_csv`] reads.
    pub fn to_csv(&self) -> InsightResult<String> {
        let header = std::iter::once(String::new()).chain(self.col_labels.iter().cloned());
        let body = self.row_labels.iter().enumerate().map(|(y, label)| {
            std::iter::once(label.clone())
                .chain(self.row(y).unwrap_or(&[]).iter().map(|v| format!("{v:?}")))
                .collect::<Vec<String>>()
        });
        write_rows(std::iter::once(header.collect::<Vec<String>>()).chain(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::scorer::ExternalScores;

    const FRUIT: &str = ",apples,oranges,lemons\n\
                         apples,1.0,0.5,0.0\n\
                         oranges,0.5,1.0,0.5\n\
                         lemons,0.0,0.5,1.0\n";

    const STORES: &str = ",cheap,good\n\
                          aldi,1.0,0.5\n\
                          trader joes,0.5,1.0\n\
                          whole foods,0.0,1.0\n";

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_import_symmetric() {
        let m = Matrix::from_csv_str(FRUIT).unwrap();
        assert_eq!(m.width(), 3);
        assert_eq!(m.height(), 3);
        assert!(m.is_symmetric());
        assert_eq!(m.get(0, 1), Some(0.5));
        assert_eq!(m.max(), Some(1.0));
    }

    #[test]
    fn test_import_asymmetric() {
        let m = Matrix::from_csv_str(STORES).unwrap();
        assert_eq!(m.width(), 2);
        assert_eq!(m.height(), 3);
        assert!(!m.is_symmetric());
        assert_eq!(m.row(2).unwrap(), &[0.0, 1.0]);
        assert_eq!(m.column(1).unwrap(), vec![0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_import_non_numeric_and_ragged() {
        let m = Matrix::from_csv_str(",a,b\na,1.0,n/a\nb,,1.0\n").unwrap();
        assert_eq!(m.get(0, 1), Some(0.0));
        assert_eq!(m.get(1, 0), Some(0.0));
        assert!(matches!(
            Matrix::from_csv_str(",a,b\na,1.0\n"),
            Err(InsightError::Shape(_))
        ));
    }

    #[test]
    fn test_csv_round_trip() {
        let m = Matrix::from_csv_str(STORES).unwrap();
        let text = m.to_csv().unwrap();
        assert_eq!(text, STORES);
        assert_eq!(Matrix::from_csv_str(&text).unwrap(), m);
    }

    #[test]
    fn test_symmetry_needs_equal_labels() {
        let m = Matrix::new(
            labels(&["a", "b"]),
            labels(&["b", "a"]),
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        )
        .unwrap();
        assert!(!m.is_symmetric());
    }

    #[test]
    fn test_new_rejects_bad_shape() {
        assert!(Matrix::new(labels(&["a"]), labels(&["a", "b"]), vec![vec![1.0]]).is_err());
        assert!(Matrix::new(labels(&["a", "b"]), labels(&["a"]), vec![vec![1.0]]).is_err());
        assert!(Matrix::from_flat(labels(&["a"]), labels(&["a"]), vec![]).is_err());
    }

    #[test]
    fn test_triangle_indices() {
        let m = Matrix::from_csv_str(FRUIT).unwrap();
        assert_eq!(
            m.triangle_indices(true).unwrap(),
            vec![(0, 0), (0, 1), (0, 2), (1, 1), (1, 2), (2, 2)]
        );
        assert_eq!(
            m.triangle_indices(false).unwrap(),
            vec![(0, 0), (1, 0), (1, 1), (2, 0), (2, 1), (2, 2)]
        );
        let stores = Matrix::from_csv_str(STORES).unwrap();
        assert!(matches!(stores.triangle_indices(true), Err(InsightError::Shape(_))));
    }

    #[test]
    fn test_fill_upper_and_lower() {
        let abc = labels(&["a", "b", "c"]);
        let lower_only = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.3, 1.0, 0.0],
            vec![0.2, 0.7, 1.0],
        ];
        let mut m = Matrix::new(abc.clone(), abc.clone(), lower_only).unwrap();
        assert!(!m.is_symmetric());
        m.fill(true).unwrap();
        assert!(m.is_symmetric());
        assert_eq!(m.get(0, 2), Some(0.2));
        assert_eq!(m.get(1, 2), Some(0.7));

        let before = m.clone();
        m.fill(false).unwrap();
        assert_eq!(m, before);
        m.fill(true).unwrap();
        assert_eq!(m, before);

        let upper_only = vec![
            vec![1.0, 0.4, 0.6],
            vec![0.0, 1.0, 0.9],
            vec![0.0, 0.0, 1.0],
        ];
        let mut m = Matrix::new(abc.clone(), abc, upper_only).unwrap();
        m.fill(false).unwrap();
        assert!(m.is_symmetric());
        assert_eq!(m.get(2, 1), Some(0.9));
    }

    #[test]
    fn test_fill_requires_square() {
        let mut m = Matrix::from_csv_str(STORES).unwrap();
        let before = m.clone();
        assert!(matches!(m.fill(true), Err(InsightError::Shape(_))));
        assert_eq!(m, before);
    }

    #[test]
    fn test_reorder_symmetric() {
        let mut m = Matrix::from_csv_str(FRUIT).unwrap();
        m.reorder(&[2, 0, 1], None).unwrap();
        assert_eq!(m.row_labels(), &["lemons", "apples", "oranges"]);
        assert_eq!(m.col_labels(), m.row_labels());
        assert_eq!(m.row(0).unwrap(), &[1.0, 0.0, 0.5]);
        assert!(m.is_symmetric());
    }

    #[test]
    fn test_reorder_asymmetric() {
        let mut m = Matrix::from_csv_str(STORES).unwrap();
        assert!(matches!(m.reorder(&[2, 1, 0], None), Err(InsightError::Shape(_))));
        m.reorder(&[2, 1, 0], Some(&[1, 0])).unwrap();
        assert_eq!(m.row_labels(), &["whole foods", "trader joes", "aldi"]);
        assert_eq!(m.col_labels(), &["good", "cheap"]);
        assert_eq!(m.row(0).unwrap(), &[1.0, 0.0]);
        assert_eq!(m.row(2).unwrap(), &[0.5, 1.0]);
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let mut m = Matrix::from_csv_str(FRUIT).unwrap();
        let before = m.clone();
        for bad in [&[0, 0, 1][..], &[0, 1][..], &[0, 1, 3][..]] {
            assert!(matches!(m.reorder(bad, None), Err(InsightError::Shape(_))));
            assert_eq!(m, before);
        }
        let mut s = Matrix::from_csv_str(STORES).unwrap();
        let before = s.clone();
        assert!(s.reorder(&[0, 1, 2], Some(&[0, 0])).is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn test_randomize_keeps_contents() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut m = Matrix::from_csv_str(FRUIT).unwrap();
        m.randomize(&mut rng).unwrap();
        assert!(m.is_symmetric());
        let mut sorted = m.row_labels().to_vec();
        sorted.sort();
        assert_eq!(sorted, labels(&["apples", "lemons", "oranges"]));

        let mut s = Matrix::from_csv_str(STORES).unwrap();
        s.randomize(&mut rng).unwrap();
        let total: f64 = s.data().iter().sum();
        assert!((total - 4.0).abs() < 1e-9);
        assert_eq!(s.height(), 3);
    }

    #[test]
    fn test_from_scores() {
        let table =
            ExternalScores::new(labels(&["x", "y"]), |a, b| Ok(if a == b { 1.0 } else { 0.25 }));
        let build = Matrix::from_scores(&table);
        assert!(build.is_complete());
        assert!(build.matrix.is_symmetric());
        assert_eq!(build.matrix.get(0, 1), Some(0.25));
    }

    struct Flaky;

    impl ScoreTable for Flaky {
        fn elements(&self) -> Vec<String> {
            labels(&["a", "b"])
        }

        fn score(&self, a: &str, b: &str) -> InsightResult<f64> {
            if a == "a" && b == "b" {
                Err(InsightError::DivisionDegenerate("a/b".into()))
            } else {
                Ok(0.6)
            }
        }
    }

    #[test]
    fn test_from_scores_reports_failed_cells() {
        let build = Matrix::from_scores(&Flaky);
        assert_eq!(build.failures.len(), 1);
        assert_eq!(build.failures[0].row, "a");
        assert_eq!(build.failures[0].col, "b");
        assert_eq!(build.matrix.get(0, 1), Some(0.0));
        assert_eq!(build.matrix.get(1, 0), Some(0.6));
    }

    #[test]
    fn test_from_scores_external_failures() {
        let table = ExternalScores::new(labels(&["x", "y", "z"]), |a, b| {
            if a == "z" || b == "z" {
                Err(InsightError::External("callable raised".into()))
            } else {
                Ok(0.5)
            }
        });
        let build = Matrix::from_scores(&table);
        assert!(!build.is_complete());
        assert!(build
            .failures
            .iter()
            .all(|f| matches!(f.error, InsightError::External(_))));
        assert!(build.failures.iter().any(|f| f.row == "z" && f.col == "x"));
        assert_eq!(build.matrix.get(2, 0), Some(0.0));
        assert_eq!(build.matrix.get(1, 0), Some(0.5));
    }

    #[test]
    fn test_empty_matrix() {
        let m = Matrix::from_csv_str("").unwrap();
        assert_eq!(m.max(), None);
        assert!(m.is_symmetric());
        assert!(m.triangle_indices(true).unwrap().is_empty());
    }
}
