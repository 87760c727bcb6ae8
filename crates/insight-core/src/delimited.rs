// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Delimited Text Helpers
// ─────────────────────────────────────────────────────────────────────
//! Shared reading/writing of comma-delimited rows for the matrix,
//! card-sort, interaction and field-similarity formats.

use std::io::Read;

use insight_types::{InsightError, InsightResult};

/// Read every row as owned cells. Rows may differ in length.
pub(crate) fn read_rows<R: Read>(reader: R) -> InsightResult<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(from_csv_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Write rows to a string.
pub(crate) fn write_rows<I, R, S>(rows: I) -> InsightResult<String>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        wtr.write_record(row).map_err(from_csv_error)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| InsightError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| InsightError::MalformedRecord(format!("output is not UTF-8: {e}")))
}

/// A separator row: no cells, or only empty ones.
pub(crate) fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Cells after the label column, with trailing empty cells dropped.
pub(crate) fn trailer_cells(row: &[String]) -> &[String] {
    let cells = row.get(1..).unwrap_or(&[]);
    let end = cells
        .iter()
        .rposition(|c| !c.trim().is_empty())
        .map_or(0, |i| i + 1);
    &cells[..end]
}

fn from_csv_error(e: csv::Error) -> InsightError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => InsightError::Io(io),
        other => InsightError::MalformedRecord(format!("delimited text: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_flexible_rows() {
        let rows = read_rows(",a,b\nx,1\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["", "a", "b"]);
        assert_eq!(rows[1], vec!["x", "1"]);
    }

    #[test]
    fn test_quoted_cells() {
        let rows = read_rows("\"whole, foods\",1\n".as_bytes()).unwrap();
        assert_eq!(rows[0][0], "whole, foods");
    }

    #[test]
    fn test_blank_row() {
        let rows = read_rows(",,,\n".as_bytes()).unwrap();
        assert!(is_blank(&rows[0]));
        assert!(!is_blank(&["".to_string(), "1".to_string()]));
    }

    #[test]
    fn test_trailer_cells() {
        let row: Vec<String> = ["", "1", "2", "", ""].iter().map(|s| s.to_string()).collect();
        assert_eq!(trailer_cells(&row), &["1".to_string(), "2".to_string()]);
        assert!(trailer_cells(&[]).is_empty());
    }

    #[test]
    fn test_write_rows() {
        let out = write_rows(vec![vec!["", "a"], vec!["x", "1.0"]]).unwrap();
        assert_eq!(out, ",a\nx,1.0\n");
    }
}
