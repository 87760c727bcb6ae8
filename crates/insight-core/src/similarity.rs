// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Field Similarity Scorer
// ─────────────────────────────────────────────────────────────────────
//! Weighted record similarity over discrete and continuous fields.
//!
//! Each field contributes an unweighted score ∈ [0, 1]:
//!
//! - discrete: 1.0 on equal values, else 0.0
//! - continuous: linear ramp between `match_difference` (score 1.0)
//!   and `no_match_difference` (score 0.0) on `|va − vb|`
//!
//! The weighted totals `match = Σ w·s` and `no_match = Σ w·(1 − s)` are
//! combined by a [`CombinationRule`].

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use insight_types::{CombinationRule, InsightConfig, InsightError, InsightResult};

use crate::delimited::{is_blank, read_rows};
use crate::scorer::ScoreTable;

const TRAILER_KEYS: [&str; 4] = [
    "field_type",
    "weight",
    "match_difference",
    "no_match_difference",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Discrete,
    Continuous,
}

/// Definition of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field_type: FieldType,
    pub weight: f64,
    /// Difference at or below which two values fully match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_difference: Option<f64>,
    /// Difference at or above which two values do not match at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_match_difference: Option<f64>,
}

impl FieldSpec {
    pub fn discrete(weight: f64) -> Self {
        Self {
            field_type: FieldType::Discrete,
            weight,
            match_difference: None,
            no_match_difference: None,
        }
    }

    pub fn continuous(weight: f64, match_difference: f64, no_match_difference: f64) -> Self {
        Self {
            field_type: FieldType::Continuous,
            weight,
            match_difference: Some(match_difference),
            no_match_difference: Some(no_match_difference),
        }
    }
}

/// A record's value for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        match cell.parse::<f64>() {
            Ok(v) => FieldValue::Number(v),
            Err(_) => FieldValue::Text(cell.to_string()),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Serialized form: records plus field definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityDocument {
    pub records: BTreeMap<String, BTreeMap<String, FieldValue>>,
    pub fields: BTreeMap<String, FieldSpec>,
}

/// Field-similarity score producer.
#[derive(Debug, Clone)]
pub struct FieldSimilarity {
    doc: SimilarityDocument,
    rule: CombinationRule,
}

impl FieldSimilarity {
    /// Validate a document and score it with the balanced rule.
    pub fn new(doc: SimilarityDocument) -> InsightResult<Self> {
        validate(&doc)?;
        log::debug!(
            "field similarity loaded: {} records, {} fields",
            doc.records.len(),
            doc.fields.len()
        );
        Ok(Self {
            doc,
            rule: CombinationRule::default(),
        })
    }

    pub fn with_rule(mut self, rule: CombinationRule) -> Self {
        self.rule = rule;
        self
    }

    /// A copy scored with the run configuration's combination rule.
    pub fn configured(&self, config: &InsightConfig) -> Self {
        self.clone().with_rule(config.combination_rule)
    }

    pub fn rule(&self) -> CombinationRule {
        self.rule
    }

    pub fn document(&self) -> &SimilarityDocument {
        &self.doc
    }

    /// Parse a JSON document `{"records": {...}, "fields": {...}}`.
    pub fn from_json(json: &str) -> InsightResult<Self> {
        let doc: SimilarityDocument = serde_json::from_str(json).map_err(|e| {
            InsightError::MalformedRecord(format!("similarity document: {e}"))
        })?;
        Self::new(doc)
    }

    /// Load the delimited-text layout:
    ///
    /// ```text
    /// ,color,size                 <- field names
    /// apple,red,3                 <- one row per record
    /// ,,                          <- blank separator
    /// field_type,discrete,continuous
    /// weight,2,1
    /// match_difference,,0
    /// no_match_difference,,4
    /// ```
    ///
    /// An empty record cell means the record has no value for that field.
    pub fn from_csv<R: Read>(reader: R) -> InsightResult<Self> {
        let rows = read_rows(reader)?;
        let (header, body) = rows
            .split_first()
            .ok_or_else(|| InsightError::MalformedRecord("similarity input is empty".into()))?;
        let names: Vec<&str> = header.iter().skip(1).map(|c| c.trim()).collect();

        let is_trailer = |row: &Vec<String>| {
            row.first()
                .map_or(false, |c| TRAILER_KEYS.contains(&c.trim()))
        };
        let split = match body.iter().position(|r| is_blank(r)) {
            Some(sep) => sep,
            None => body.len() - body.iter().rev().take_while(|r| is_trailer(*r)).count(),
        };
        let (data, trailer) = body.split_at(split);

        let mut keyed: BTreeMap<&str, &[String]> = BTreeMap::new();
        for row in trailer.iter().filter(|r| !is_blank(r)) {
            let key = row[0].trim();
            if !TRAILER_KEYS.contains(&key) {
                return Err(InsightError::MalformedRecord(format!(
                    "unknown similarity trailer row {key:?}"
                )));
            }
            keyed.insert(key, row.get(1..).unwrap_or(&[]));
        }
        let cell = |key: &str, i: usize| -> Option<&str> {
            keyed
                .get(key)
                .and_then(|cells| cells.get(i))
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
        };

        let mut fields = BTreeMap::new();
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let field_type = match cell("field_type", i) {
                Some("discrete") => FieldType::Discrete,
                Some("continuous") => FieldType::Continuous,
                other => {
                    return Err(InsightError::MalformedRecord(format!(
                        "field {name:?}: field_type must be discrete or continuous, got {other:?}"
                    )))
                }
            };
            let number = |key: &str| -> InsightResult<Option<f64>> {
                cell(key, i)
                    .map(|c| {
                        c.parse::<f64>().map_err(|_| {
                            InsightError::MalformedRecord(format!(
                                "field {name:?}: {key} {c:?} is not a number"
                            ))
                        })
                    })
                    .transpose()
            };
            let weight = number("weight")?.ok_or_else(|| {
                InsightError::MalformedRecord(format!("field {name:?}: missing weight"))
            })?;
            fields.insert(
                name.to_string(),
                FieldSpec {
                    field_type,
                    weight,
                    match_difference: number("match_difference")?,
                    no_match_difference: number("no_match_difference")?,
                },
            );
        }

        let mut records = BTreeMap::new();
        for row in data {
            let label = row.first().map(|c| c.trim()).unwrap_or_default();
            if label.is_empty() {
                return Err(InsightError::MalformedRecord(format!(
                    "similarity row without record label: {row:?}"
                )));
            }
            let values: BTreeMap<String, FieldValue> = row
                .iter()
                .skip(1)
                .zip(&names)
                .filter(|(c, n)| !c.trim().is_empty() && !n.is_empty())
                .map(|(c, n)| (n.to_string(), FieldValue::parse(c)))
                .collect();
            if records.insert(label.to_string(), values).is_some() {
                return Err(InsightError::MalformedRecord(format!(
                    "duplicate record label {label:?}"
                )));
            }
        }

        Self::new(SimilarityDocument { records, fields })
    }

    fn record(&self, label: &str) -> InsightResult<&BTreeMap<String, FieldValue>> {
        self.doc
            .records
            .get(label)
            .ok_or_else(|| InsightError::LabelNotFound(label.to_string()))
    }

    /// Unweighted similarity of two records on one field, ∈ [0, 1].
    pub fn field_similarity(&self, a: &str, b: &str, field: &str) -> InsightResult<f64> {
        let spec = self.doc.fields.get(field).ok_or_else(|| {
            InsightError::MalformedRecord(format!("field {field:?} is not defined"))
        })?;
        let va = value_of(self.record(a)?, a, field)?;
        let vb = value_of(self.record(b)?, b, field)?;

        match spec.field_type {
            FieldType::Discrete => Ok(if va == vb { 1.0 } else { 0.0 }),
            FieldType::Continuous => {
                let (lo, hi) = continuous_bounds(field, spec)?;
                let span = hi - lo;
                if span == 0.0 {
                    return Err(InsightError::DivisionDegenerate(format!(
                        "field {field:?}: match_difference equals no_match_difference"
                    )));
                }
                let (xa, xb) = (numeric(va, a, field)?, numeric(vb, b, field)?);
                let n = (hi - (xa - xb).abs()).clamp(0.0, span);
                Ok(n / span)
            }
        }
    }

    /// Weighted similarity over the fields of record `a`.
    pub fn record_similarity(&self, a: &str, b: &str) -> InsightResult<f64> {
        self.record(b)?;
        let mut matched = 0.0;
        let mut unmatched = 0.0;
        for field in self.record(a)?.keys() {
            let score = self.field_similarity(a, b, field)?;
            let weight = self.doc.fields[field].weight;
            matched += weight * score;
            unmatched += weight * (1.0 - score);
        }
        self.rule.combine(matched, unmatched).ok_or_else(|| {
            InsightError::DivisionDegenerate(format!(
                "record similarity ({a}, {b}): no weighted fields"
            ))
        })
    }
}

impl ScoreTable for FieldSimilarity {
    fn elements(&self) -> Vec<String> {
        self.doc.records.keys().cloned().collect()
    }

    fn score(&self, a: &str, b: &str) -> InsightResult<f64> {
        self.record_similarity(a, b)
    }
}

fn value_of<'a>(
    record: &'a BTreeMap<String, FieldValue>,
    label: &str,
    field: &str,
) -> InsightResult<&'a FieldValue> {
    record.get(field).ok_or_else(|| {
        InsightError::MalformedRecord(format!("record {label:?} has no value for field {field:?}"))
    })
}

fn numeric(value: &FieldValue, label: &str, field: &str) -> InsightResult<f64> {
    value.as_number().ok_or_else(|| {
        InsightError::MalformedRecord(format!(
            "record {label:?}: continuous field {field:?} holds non-numeric {value:?}"
        ))
    })
}

fn continuous_bounds(field: &str, spec: &FieldSpec) -> InsightResult<(f64, f64)> {
    match (spec.match_difference, spec.no_match_difference) {
        (Some(lo), Some(hi)) => Ok((lo, hi)),
        _ => Err(InsightError::MalformedRecord(format!(
            "continuous field {field:?} needs match_difference and no_match_difference"
        ))),
    }
}

fn validate(doc: &SimilarityDocument) -> InsightResult<()> {
    for (name, spec) in &doc.fields {
        if !spec.weight.is_finite() || spec.weight <= 0.0 {
            return Err(InsightError::MalformedRecord(format!(
                "field {name:?}: weight must be positive and finite, got {}",
                spec.weight
            )));
        }
        if spec.field_type == FieldType::Continuous {
            let (lo, hi) = continuous_bounds(name, spec)?;
            if !lo.is_finite() || !hi.is_finite() || hi < lo {
                return Err(InsightError::MalformedRecord(format!(
                    "field {name:?}: no_match_difference ({hi}) below match_difference ({lo})"
                )));
            }
        }
    }
    for (label, record) in &doc.records {
        if let Some(field) = record.keys().find(|f| !doc.fields.contains_key(*f)) {
            return Err(InsightError::MalformedRecord(format!(
                "record {label:?} uses undefined field {field:?}"
            )));
        }
    }
    Ok(())
}
