// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied: PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the Insight Matrix kernel.
//!
//! Exposes `InsightConfig`, `Matrix`, the three built-in scorers
//! (`CardSort`, `Interactions`, `FieldSimilarity`) and `build_matrix`
//! for scoring with an arbitrary Python callable.
//!
//! # FFI Safety
//!
//! - GIL acquired via `Python::with_gil` before every Python callback.
//! - Python exceptions and non-float results become failed cells
//!   (`strict=True` raises on them).
//! - Matrix state sits behind a `parking_lot::Mutex`; no borrow of it
//!   escapes a method call.
//! - Config validated before storage (`InsightConfig::validate()`).
//!
//! Usage from Python:
//! ```python
//! from insight_kernel import CardSort, InsightConfig
//!
//! sort = CardSort.from_csv(open("sorts.csv").read())
//! m = sort.build()
//! rows, cols = m.cluster(InsightConfig(strategy="linkage", linkage_method="ward"))
//! print(m.ascii())
//! ```

use parking_lot::Mutex;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rand::rngs::StdRng;
use rand::SeedableRng;

use insight_core::render;
use insight_core::{
    CardSort, ExternalScores, FieldSimilarity, Interactions, Matrix, MatrixBuild, ScoreTable,
};
use insight_seriation::Seriator;
use insight_types::{InsightConfig, InsightError};

fn py_err(e: InsightError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Turn a build into a Python matrix, failing on any unscored cell when
/// `strict` is set.
fn finish(build: MatrixBuild, strict: bool) -> PyResult<PyMatrix> {
    if strict {
        if let Some(first) = build.failures.first() {
            return Err(PyValueError::new_err(format!(
                "{} cells failed to score, first ({}, {}): {}",
                build.failures.len(),
                first.row,
                first.col,
                first.error
            )));
        }
    }
    Ok(PyMatrix::wrap(build.matrix))
}

/// The caller's run configuration, or the defaults.
fn config_or_default(config: Option<PyRef<'_, PyInsightConfig>>) -> InsightConfig {
    config.map(|c| c.inner.clone()).unwrap_or_default()
}

// ─── InsightConfig ──────────────────────────────────────────────────

/// Python-visible run configuration.
#[pyclass(name = "InsightConfig")]
#[derive(Clone)]
struct PyInsightConfig {
    inner: InsightConfig,
}

#[pymethods]
impl PyInsightConfig {
    #[new]
    #[pyo3(signature = (
        strategy = "agglomerative",
        linkage_method = "complete",
        merge_mode = "average",
        combination_rule = "balanced",
        variation = "conflict + reinforcement",
        graph_cutoff = 0.5,
        histogram_bins = 101,
        seed = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        strategy: &str,
        linkage_method: &str,
        merge_mode: &str,
        combination_rule: &str,
        variation: &str,
        graph_cutoff: f64,
        histogram_bins: usize,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let config = InsightConfig {
            strategy: strategy.parse().map_err(py_err)?,
            linkage_method: linkage_method.parse().map_err(py_err)?,
            merge_mode: merge_mode.parse().map_err(py_err)?,
            combination_rule: combination_rule.parse().map_err(py_err)?,
            variation: variation.parse().map_err(py_err)?,
            graph_cutoff,
            histogram_bins,
            seed,
        };
        config.validate().map_err(py_err)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = InsightConfig::from_json(json).map_err(py_err)?;
        config.validate().map_err(py_err)?;
        Ok(Self { inner: config })
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(py_err)
    }

    #[getter]
    fn variation(&self) -> String {
        self.inner.variation.to_string()
    }

    #[getter]
    fn combination_rule(&self) -> String {
        format!("{:?}", self.inner.combination_rule)
    }

    #[getter]
    fn linkage_method(&self) -> &'static str {
        self.inner.linkage_method.name()
    }

    #[getter]
    fn graph_cutoff(&self) -> f64 {
        self.inner.graph_cutoff
    }

    #[getter]
    fn histogram_bins(&self) -> usize {
        self.inner.histogram_bins
    }

    #[getter]
    fn seed(&self) -> Option<u64> {
        self.inner.seed
    }

    fn __repr__(&self) -> String {
        format!(
            "InsightConfig(strategy={:?}, linkage_method={}, merge_mode={:?}, variation={:?})",
            self.inner.strategy,
            self.inner.linkage_method,
            self.inner.merge_mode,
            self.inner.variation.to_string()
        )
    }
}

// ─── Matrix ─────────────────────────────────────────────────────────

/// Labeled score matrix with seriation and rendering.
#[pyclass(name = "Matrix")]
struct PyMatrix {
    inner: Mutex<Matrix>,
}

impl PyMatrix {
    fn wrap(matrix: Matrix) -> Self {
        Self {
            inner: Mutex::new(matrix),
        }
    }
}

#[pymethods]
impl PyMatrix {
    /// Args:
    ///     row_labels: One label per row.
    ///     col_labels: One label per column.
    ///     rows: List of rows, each as long as `col_labels`.
    #[new]
    fn new(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> PyResult<Self> {
        Matrix::new(row_labels, col_labels, rows)
            .map(Self::wrap)
            .map_err(py_err)
    }

    /// Parse CSV text: a header of column labels, then one labeled row
    /// per line.
    #[staticmethod]
    fn from_csv(text: &str) -> PyResult<Self> {
        Matrix::from_csv_str(text).map(Self::wrap).map_err(py_err)
    }

    fn to_csv(&self) -> PyResult<String> {
        self.inner.lock().to_csv().map_err(py_err)
    }

    #[getter]
    fn width(&self) -> usize {
        self.inner.lock().width()
    }

    #[getter]
    fn height(&self) -> usize {
        self.inner.lock().height()
    }

    #[getter]
    fn row_labels(&self) -> Vec<String> {
        self.inner.lock().row_labels().to_vec()
    }

    #[getter]
    fn col_labels(&self) -> Vec<String> {
        self.inner.lock().col_labels().to_vec()
    }

    fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.inner.lock().get(row, col)
    }

    fn set(&self, row: usize, col: usize, value: f64) -> PyResult<()> {
        self.inner.lock().set(row, col, value).map_err(py_err)
    }

    /// All rows as a list of lists.
    fn rows(&self) -> Vec<Vec<f64>> {
        let m = self.inner.lock();
        (0..m.height())
            .filter_map(|y| m.row(y).map(<[f64]>::to_vec))
            .collect()
    }

    fn max(&self) -> Option<f64> {
        self.inner.lock().max()
    }

    fn is_symmetric(&self) -> bool {
        self.inner.lock().is_symmetric()
    }

    #[pyo3(signature = (upper = false))]
    fn triangle_indices(&self, upper: bool) -> PyResult<Vec<(usize, usize)>> {
        self.inner.lock().triangle_indices(upper).map_err(py_err)
    }

    /// Mirror one triangle onto the other. `upper=True` writes the
    /// upper triangle from the lower.
    #[pyo3(signature = (upper = true))]
    fn fill(&self, upper: bool) -> PyResult<()> {
        self.inner.lock().fill(upper).map_err(py_err)
    }

    /// Permute rows, and columns too (same order unless `col_order`).
    #[pyo3(signature = (row_order, col_order = None))]
    fn reorder(&self, row_order: Vec<usize>, col_order: Option<Vec<usize>>) -> PyResult<()> {
        self.inner
            .lock()
            .reorder(&row_order, col_order.as_deref())
            .map_err(py_err)
    }

    /// Shuffle into a random order. `seed` overrides the config seed.
    #[pyo3(signature = (seed = None, config = None))]
    fn randomize(
        &self,
        seed: Option<u64>,
        config: Option<PyRef<'_, PyInsightConfig>>,
    ) -> PyResult<()> {
        let seed = seed.or_else(|| config.and_then(|c| c.inner.seed));
        let mut m = self.inner.lock();
        let shuffled = match seed {
            Some(s) => m.randomize(&mut StdRng::seed_from_u64(s)),
            None => m.randomize(&mut rand::thread_rng()),
        };
        shuffled.map_err(py_err)
    }

    /// Seriate in place. Returns `(row_order, col_order)` in terms of
    /// the positions before the call.
    #[pyo3(signature = (config = None))]
    fn cluster(
        &self,
        config: Option<PyRef<'_, PyInsightConfig>>,
    ) -> PyResult<(Vec<usize>, Vec<usize>)> {
        let seriator = match config {
            Some(c) => Seriator::from_config(&c.inner),
            None => Seriator::default(),
        };
        let order = seriator.seriate(&mut self.inner.lock()).map_err(py_err)?;
        Ok((order.rows, order.cols))
    }

    /// Character heat map, one glyph per cell.
    fn ascii(&self) -> String {
        render::ascii(&self.inner.lock())
    }

    /// Label pairs whose coefficient is at least `cutoff`, which
    /// defaults to the config's `graph_cutoff`.
    #[pyo3(signature = (cutoff = None, config = None))]
    fn edges(
        &self,
        cutoff: Option<f64>,
        config: Option<PyRef<'_, PyInsightConfig>>,
    ) -> PyResult<Vec<(String, String)>> {
        let cutoff = cutoff.unwrap_or(config_or_default(config).graph_cutoff);
        render::threshold_edges(&self.inner.lock(), cutoff).map_err(py_err)
    }

    /// Graphviz DOT text for the thresholded graph.
    #[pyo3(signature = (cutoff = None, engine = "neato", config = None))]
    fn graph(
        &self,
        cutoff: Option<f64>,
        engine: &str,
        config: Option<PyRef<'_, PyInsightConfig>>,
    ) -> PyResult<String> {
        let cutoff = cutoff.unwrap_or(config_or_default(config).graph_cutoff);
        render::to_dot(&self.inner.lock(), cutoff, engine).map_err(py_err)
    }

    /// Frequency classes of the lower-triangle coefficients, as dicts.
    #[pyo3(signature = (bins = None, config = None))]
    fn histogram<'py>(
        &self,
        py: Python<'py>,
        bins: Option<usize>,
        config: Option<PyRef<'_, PyInsightConfig>>,
    ) -> PyResult<Vec<Bound<'py, PyDict>>> {
        let bins = bins.unwrap_or(config_or_default(config).histogram_bins);
        let classes = render::histogram(&self.inner.lock(), bins).map_err(py_err)?;
        classes
            .iter()
            .map(|bin| {
                let dict = PyDict::new(py);
                dict.set_item("start", bin.start)?;
                dict.set_item("count", bin.count)?;
                dict.set_item("percent", bin.percent)?;
                dict.set_item("cumulative_percent", bin.cumulative_percent)?;
                dict.set_item("cumulative_remainder", bin.cumulative_remainder)?;
                Ok(dict)
            })
            .collect()
    }

    /// Tab-separated histogram table.
    #[pyo3(signature = (bins = None, config = None))]
    fn histogram_table(
        &self,
        bins: Option<usize>,
        config: Option<PyRef<'_, PyInsightConfig>>,
    ) -> PyResult<String> {
        let bins = bins.unwrap_or(config_or_default(config).histogram_bins);
        let classes = render::histogram(&self.inner.lock(), bins).map_err(py_err)?;
        Ok(render::histogram_table(&classes))
    }

    fn __repr__(&self) -> String {
        let m = self.inner.lock();
        format!(
            "Matrix(height={}, width={}, symmetric={})",
            m.height(),
            m.width(),
            m.is_symmetric()
        )
    }
}

// ─── Scorers ────────────────────────────────────────────────────────

/// Card-sort co-occurrence scorer (Jaccard over shared groups).
#[pyclass(name = "CardSort")]
struct PyCardSort {
    inner: CardSort,
}

#[pymethods]
impl PyCardSort {
    #[new]
    fn new() -> Self {
        Self {
            inner: CardSort::new(),
        }
    }

    #[staticmethod]
    fn from_csv(text: &str) -> PyResult<Self> {
        CardSort::from_csv(text.as_bytes())
            .map(|inner| Self { inner })
            .map_err(py_err)
    }

    fn add(&mut self, test: &str, group: &str, element: &str) -> PyResult<()> {
        self.inner.add(test, group, element).map_err(py_err)
    }

    fn elements(&self) -> Vec<String> {
        self.inner.elements()
    }

    fn score(&self, a: &str, b: &str) -> PyResult<f64> {
        self.inner.jaccard(a, b).map_err(py_err)
    }

    #[pyo3(signature = (strict = false))]
    fn build(&self, strict: bool) -> PyResult<PyMatrix> {
        finish(Matrix::from_scores(&self.inner), strict)
    }

    fn __repr__(&self) -> String {
        format!(
            "CardSort(elements={}, groups={})",
            self.inner.elements().len(),
            self.inner.groups().len()
        )
    }
}

/// Signed-support interaction scorer.
#[pyclass(name = "Interactions")]
struct PyInteractions {
    inner: Interactions,
}

#[pymethods]
impl PyInteractions {
    #[staticmethod]
    fn from_csv(text: &str) -> PyResult<Self> {
        Interactions::from_csv(text.as_bytes())
            .map(|inner| Self { inner })
            .map_err(py_err)
    }

    fn elements(&self) -> Vec<String> {
        self.inner.element_labels().to_vec()
    }

    /// Interaction of `a` and `b` under the named variation.
    #[pyo3(signature = (a, b, variation = "conflict + reinforcement"))]
    fn score(&self, a: &str, b: &str, variation: &str) -> PyResult<f64> {
        let variation = variation.parse().map_err(py_err)?;
        self.inner.interaction(a, b, variation).map_err(py_err)
    }

    fn balance(&self, a: &str, b: &str) -> PyResult<f64> {
        self.inner.balance(a, b).map_err(py_err)
    }

    /// Interaction matrix. An explicit `variation` wins over the
    /// config's.
    #[pyo3(signature = (variation = None, strict = false, config = None))]
    fn build(
        &self,
        variation: Option<&str>,
        strict: bool,
        config: Option<PyRef<'_, PyInsightConfig>>,
    ) -> PyResult<PyMatrix> {
        let mut config = config_or_default(config);
        if let Some(name) = variation {
            config.variation = name.parse().map_err(py_err)?;
        }
        finish(
            Matrix::from_scores(&self.inner.configured_scorer(&config)),
            strict,
        )
    }

    fn __repr__(&self) -> String {
        format!(
            "Interactions(elements={}, variables={})",
            self.inner.element_labels().len(),
            self.inner.variables().len()
        )
    }
}

/// Weighted per-field record similarity.
#[pyclass(name = "FieldSimilarity")]
struct PyFieldSimilarity {
    inner: FieldSimilarity,
}

#[pymethods]
impl PyFieldSimilarity {
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        FieldSimilarity::from_json(json)
            .map(|inner| Self { inner })
            .map_err(py_err)
    }

    #[staticmethod]
    fn from_csv(text: &str) -> PyResult<Self> {
        FieldSimilarity::from_csv(text.as_bytes())
            .map(|inner| Self { inner })
            .map_err(py_err)
    }

    /// Replace the combination rule ("balanced", "penalize_mismatch",
    /// "reward_match" or "01".."03").
    fn set_rule(&mut self, rule: &str) -> PyResult<()> {
        let rule = rule.parse().map_err(py_err)?;
        self.inner = self.inner.clone().with_rule(rule);
        Ok(())
    }

    fn elements(&self) -> Vec<String> {
        self.inner.elements()
    }

    fn field(&self, a: &str, b: &str, field: &str) -> PyResult<f64> {
        self.inner.field_similarity(a, b, field).map_err(py_err)
    }

    fn score(&self, a: &str, b: &str) -> PyResult<f64> {
        self.inner.record_similarity(a, b).map_err(py_err)
    }

    /// Similarity matrix. A `config` replaces the scorer's own
    /// combination rule with its `combination_rule`.
    #[pyo3(signature = (strict = false, config = None))]
    fn build(
        &self,
        strict: bool,
        config: Option<PyRef<'_, PyInsightConfig>>,
    ) -> PyResult<PyMatrix> {
        match config {
            Some(c) => finish(
                Matrix::from_scores(&self.inner.configured(&c.inner)),
                strict,
            ),
            None => finish(Matrix::from_scores(&self.inner), strict),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "FieldSimilarity(records={}, fields={}, rule={:?})",
            self.inner.document().records.len(),
            self.inner.document().fields.len(),
            self.inner.rule()
        )
    }
}

// ─── Free functions ─────────────────────────────────────────────────

/// Build a square matrix over `elements` by calling `score_fn(a, b)`.
///
/// Args:
///     elements: Element labels, in axis order.
///     score_fn: Callable[[str, str], float]; results are clamped to [0, 1].
///     strict: Raise when `score_fn` raises or returns a non-float,
///         instead of leaving those cells at 0.0.
#[pyfunction]
#[pyo3(signature = (elements, score_fn, strict = false))]
fn build_matrix(elements: Vec<String>, score_fn: PyObject, strict: bool) -> PyResult<PyMatrix> {
    let table = ExternalScores::new(elements, move |a: &str, b: &str| {
        Python::with_gil(|py| {
            score_fn
                .call1(py, (a, b))
                .and_then(|result| result.extract::<f64>(py))
                .map_err(|e| InsightError::External(format!("score_fn({a:?}, {b:?}): {e}")))
        })
    });
    finish(Matrix::from_scores(&table), strict)
}

/// Python module: `import insight_kernel`
#[pymodule]
fn insight_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyInsightConfig>()?;
    m.add_class::<PyMatrix>()?;
    m.add_class::<PyCardSort>()?;
    m.add_class::<PyInteractions>()?;
    m.add_class::<PyFieldSimilarity>()?;
    m.add_function(wrap_pyfunction!(build_matrix, m)?)?;
    Ok(())
}
