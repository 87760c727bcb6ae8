// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Card Sort (Group Overlap Similarity)
// ─────────────────────────────────────────────────────────────────────
//! Jaccard similarity over card-sort groupings.
//!
//! A card sort is a set of independent *tests*; each test partitions
//! evidence into named groups of element labels. Two elements are
//! similar in proportion to how often they land in the same group:
//!
//!   jaccard(a, b) = |groups ∋ a and b| / |groups ∋ a or b|

use std::collections::BTreeSet;
use std::io::Read;

use insight_types::score::checked_ratio;
use insight_types::{InsightError, InsightResult};

use crate::delimited::read_rows;
use crate::scorer::ScoreTable;

/// One named group inside a test.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub members: BTreeSet<String>,
}

/// One card-sort session: its groups in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct SortTest {
    pub id: String,
    pub groups: Vec<Group>,
}

/// Card-sort data for all tests.
#[derive(Debug, Clone, Default)]
pub struct CardSort {
    tests: Vec<SortTest>,
}

impl CardSort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `element` was placed in `group` during `test`.
    pub fn add(&mut self, test: &str, group: &str, element: &str) -> InsightResult<()> {
        if test.is_empty() || group.is_empty() || element.is_empty() {
            return Err(InsightError::MalformedRecord(format!(
                "card sort entry needs test, group and element, got ({test:?}, {group:?}, {element:?})"
            )));
        }
        let t = match self.tests.iter().position(|t| t.id == test) {
            Some(i) => i,
            None => {
                self.tests.push(SortTest {
                    id: test.to_string(),
                    groups: Vec::new(),
                });
                self.tests.len() - 1
            }
        };
        let groups = &mut self.tests[t].groups;
        let g = match groups.iter().position(|g| g.id == group) {
            Some(i) => i,
            None => {
                groups.push(Group {
                    id: group.to_string(),
                    members: BTreeSet::new(),
                });
                groups.len() - 1
            }
        };
        groups[g].members.insert(element.to_string());
        Ok(())
    }

    /// Load rows of `test id, group id, element`.
    ///
    /// Every row must have exactly three non-empty cells.
    pub fn from_csv<R: Read>(reader: R) -> InsightResult<Self> {
        let mut sort = Self::new();
        for (line, row) in read_rows(reader)?.iter().enumerate() {
            let cells: Vec<&str> = row.iter().map(|c| c.trim()).collect();
            match cells.as_slice() {
                [test, group, element]
                    if !test.is_empty() && !group.is_empty() && !element.is_empty() =>
                {
                    sort.add(test, group, element)?;
                }
                _ => {
                    return Err(InsightError::MalformedRecord(format!(
                        "card sort line {}: expected 3 non-empty fields (test, group, element), got {:?}",
                        line + 1,
                        row
                    )))
                }
            }
        }
        log::debug!(
            "card sort loaded: {} tests, {} groups, {} elements",
            sort.tests.len(),
            sort.groups().len(),
            sort.universe().len()
        );
        Ok(sort)
    }

    pub fn tests(&self) -> &[SortTest] {
        &self.tests
    }

    /// Flat list of groups from all tests, in insertion order.
    pub fn groups(&self) -> Vec<&BTreeSet<String>> {
        self.tests
            .iter()
            .flat_map(|t| t.groups.iter().map(|g| &g.members))
            .collect()
    }

    fn universe(&self) -> BTreeSet<&str> {
        self.groups()
            .into_iter()
            .flat_map(|g| g.iter().map(String::as_str))
            .collect()
    }

    fn contains(&self, element: &str) -> bool {
        self.groups().iter().any(|g| g.contains(element))
    }

    /// Jaccard index of two elements.
    ///
    /// Self-similarity is 1.0 by convention.
    pub fn jaccard(&self, a: &str, b: &str) -> InsightResult<f64> {
        for label in [a, b] {
            if !self.contains(label) {
                return Err(InsightError::LabelNotFound(label.to_string()));
            }
        }
        if a == b {
            return Ok(1.0);
        }
        let (mut both, mut either) = (0usize, 0usize);
        for g in self.groups() {
            let (has_a, has_b) = (g.contains(a), g.contains(b));
            if has_a && has_b {
                both += 1;
            }
            if has_a || has_b {
                either += 1;
            }
        }
        checked_ratio(
            both as f64,
            either as f64,
            &format!("jaccard({a}, {b})"),
        )
    }
}

impl ScoreTable for CardSort {
    /// Sorted union of all group members.
    fn elements(&self) -> Vec<String> {
        self.universe().into_iter().map(str::to_string).collect()
    }

    fn score(&self, a: &str, b: &str) -> InsightResult<f64> {
        self.jaccard(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHISKY: &str = "A,01,sherry\n\
                          A,01,tobacco\n\
                          A,02,leather\n\
                          B,01,sherry\n\
                          B,02,tobacco\n\
                          B,02,leather\n\
                          C,01,sherry\n";

    fn whisky() -> CardSort {
        CardSort::from_csv(WHISKY.as_bytes()).unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_groups_in_order() {
        let sort = whisky();
        let groups: Vec<BTreeSet<String>> = sort.groups().into_iter().cloned().collect();
        assert_eq!(
            groups,
            vec![
                set(&["sherry", "tobacco"]),
                set(&["leather"]),
                set(&["sherry"]),
                set(&["tobacco", "leather"]),
                set(&["sherry"]),
            ]
        );
        assert_eq!(sort.tests().len(), 3);
    }

    #[test]
    fn test_elements_sorted() {
        assert_eq!(whisky().elements(), vec!["leather", "sherry", "tobacco"]);
    }

    #[test]
    fn test_jaccard_scenario() {
        let sort = whisky();
        assert!((sort.jaccard("sherry", "tobacco").unwrap() - 0.25).abs() < 1e-12);
        assert!((sort.jaccard("leather", "tobacco").unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(sort.jaccard("leather", "sherry").unwrap(), 0.0);
    }

    #[test]
    fn test_jaccard_symmetric_and_self() {
        let sort = whisky();
        assert_eq!(
            sort.jaccard("tobacco", "sherry").unwrap(),
            sort.jaccard("sherry", "tobacco").unwrap()
        );
        assert_eq!(sort.jaccard("leather", "leather").unwrap(), 1.0);
    }

    #[test]
    fn test_unknown_label() {
        assert!(matches!(
            whisky().jaccard("sherry", "peat"),
            Err(InsightError::LabelNotFound(l)) if l == "peat"
        ));
        assert!(matches!(
            whisky().jaccard("peat", "peat"),
            Err(InsightError::LabelNotFound(_))
        ));
    }

    #[test]
    fn test_malformed_rows() {
        for bad in ["A,01\n", "A,,sherry\n", "A,01,sherry,extra\n", "A,01, \n"] {
            assert!(
                matches!(
                    CardSort::from_csv(bad.as_bytes()),
                    Err(InsightError::MalformedRecord(_))
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_add_rejects_empty() {
        let mut sort = CardSort::new();
        assert!(sort.add("A", "", "x").is_err());
        assert!(sort.add("A", "g", "x").is_ok());
        assert_eq!(sort.elements(), vec!["x"]);
    }

    #[test]
    fn test_duplicate_entries_collapse() {
        let sort = CardSort::from_csv("A,01,x\nA,01,x\nA,01,y\n".as_bytes()).unwrap();
        assert_eq!(sort.groups().len(), 1);
        assert_eq!(sort.jaccard("x", "y").unwrap(), 1.0);
    }
}
