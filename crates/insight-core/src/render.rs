// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Render Adapters
// ─────────────────────────────────────────────────────────────────────
//! Text views of a [`Matrix`]: a glyph grid for terminals, thresholded
//! edges and Graphviz text for an external layout engine, and a
//! frequency table of coefficients for choosing the graph cutoff.

use std::fmt::Write as _;

use insight_types::score::clamp_score;
use insight_types::{InsightError, InsightResult};

use crate::matrix::Matrix;

/// Glyphs from 0.0 (blank) to 1.0 (`@`).
pub const GLYPH_RAMP: [char; 11] = [' ', '.', ',', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Glyph for one value: bucket `⌊v·10⌋`.
pub fn glyph(value: f64) -> char {
    let bucket = (clamp_score(value, 0.0, 1.0) * 10.0).floor() as usize;
    GLYPH_RAMP[bucket.min(GLYPH_RAMP.len() - 1)]
}

/// Render the matrix as a character grid.
///
/// Column labels run vertically above the grid, bottom-aligned; row
/// labels are right-aligned to its left. Every cell is two characters.
pub fn ascii(matrix: &Matrix) -> String {
    let chars = |labels: &[String]| -> Vec<Vec<char>> {
        labels.iter().map(|l| l.chars().collect()).collect()
    };
    let col_labels = chars(matrix.col_labels());
    let row_labels = chars(matrix.row_labels());
    let label_h = col_labels.iter().map(Vec::len).max().unwrap_or(0);
    let label_w = row_labels.iter().map(Vec::len).max().unwrap_or(0);

    let rows = label_h + 1 + matrix.height();
    let cols = label_w + 1 + matrix.width();
    let mut grid = vec![vec![' '; cols]; rows];

    for (x, label) in col_labels.iter().enumerate() {
        let top = label_h - label.len();
        for (i, &c) in label.iter().enumerate() {
            grid[top + i][label_w + 1 + x] = c;
        }
    }
    for (y, label) in row_labels.iter().enumerate() {
        let left = label_w - label.len();
        for (i, &c) in label.iter().enumerate() {
            grid[label_h + 1 + y][left + i] = c;
        }
        for (x, &v) in matrix.row(y).unwrap_or(&[]).iter().enumerate() {
            grid[label_h + 1 + y][label_w + 1 + x] = glyph(v);
        }
    }

    let mut out = String::with_capacity(rows * (cols * 2 + 1));
    for line in grid {
        for c in line {
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out
}

/// Undirected edges `(row label, column label)` for lower-triangle
/// cells at or above `cutoff`.
pub fn threshold_edges(matrix: &Matrix, cutoff: f64) -> InsightResult<Vec<(String, String)>> {
    if !matrix.is_square() {
        return Err(InsightError::Shape(format!(
            "graph needs a square matrix, got {}x{}",
            matrix.height(),
            matrix.width()
        )));
    }
    let n = matrix.width();
    let mut edges = Vec::new();
    for x in 0..n {
        for y in x + 1..n {
            if matrix.get(y, x).map_or(false, |v| v >= cutoff) {
                edges.push((
                    matrix.row_labels()[y].clone(),
                    matrix.col_labels()[x].clone(),
                ));
            }
        }
    }
    Ok(edges)
}

fn quoted(label: &str) -> String {
    format!("\"{}\"", label.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Graphviz source for the thresholded graph, laid out by `engine`
/// (`neato`, `fdp`, `sfdp`, ...).
pub fn to_dot(matrix: &Matrix, cutoff: f64, engine: &str) -> InsightResult<String> {
    let edges = threshold_edges(matrix, cutoff)?;
    let mut out = String::from("graph {\n");
    let _ = writeln!(out, "    layout={};", quoted(engine));
    out.push_str("    overlap=false;\n");
    for (a, b) in &edges {
        let _ = writeln!(out, "    {} -- {};", quoted(a), quoted(b));
    }
    out.push_str("}\n");
    log::debug!("graph at cutoff {cutoff}: {} edges", edges.len());
    Ok(out)
}

/// One frequency class of [`histogram`]. Percentages are 0-100.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub count: usize,
    pub percent: f64,
    pub cumulative_percent: f64,
    pub cumulative_remainder: f64,
}

/// Frequency classes over the strictly-lower-triangle coefficients.
///
/// `bins` equal classes cover [0, 1]; 1.0 lands in the last one.
/// Coefficients outside [0, 1] are not counted.
pub fn histogram(matrix: &Matrix, bins: usize) -> InsightResult<Vec<HistogramBin>> {
    if bins == 0 {
        return Err(InsightError::Config("histogram needs at least one bin".into()));
    }
    if !matrix.is_square() {
        return Err(InsightError::Shape(format!(
            "histogram needs a square matrix, got {}x{}",
            matrix.height(),
            matrix.width()
        )));
    }

    let n = matrix.width();
    let mut counts = vec![0usize; bins];
    for y in 0..n {
        for &v in &matrix.row(y).unwrap_or(&[])[..y] {
            if (0.0..=1.0).contains(&v) {
                let i = ((v * bins as f64).floor() as usize).min(bins - 1);
                counts[i] += 1;
            }
        }
    }

    let total: usize = counts.iter().sum();
    let pct = |c: usize| {
        if total == 0 {
            0.0
        } else {
            100.0 * c as f64 / total as f64
        }
    };
    let mut running = 0;
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            running += count;
            HistogramBin {
                start: i as f64 / bins as f64,
                count,
                percent: pct(count),
                cumulative_percent: pct(running),
                cumulative_remainder: if total == 0 { 0.0 } else { 100.0 - pct(running) },
            }
        })
        .collect())
}

/// Tabulate histogram bins, one class per line.
pub fn histogram_table(bins: &[HistogramBin]) -> String {
    let mut out = String::from("class    count  percent  cumulative  remainder\n");
    for b in bins {
        let _ = writeln!(
            out,
            "{:<6.2} {:>7} {:>8.2} {:>11.2} {:>10.2}",
            b.start, b.count, b.percent, b.cumulative_percent, b.cumulative_remainder
        );
    }
    out
}
