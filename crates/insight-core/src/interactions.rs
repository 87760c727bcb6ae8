// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Signed-Variable Interaction Scorer
// ─────────────────────────────────────────────────────────────────────
//! Conflict / reinforcement / independence interactions between
//! elements rated on signed integer variables (Owens, *Structured
//! Planning*).
//!
//! Each element carries one value per variable in `[neg_min, pos_max]`.
//! Values are classified as negative, nil or positive; a pair of
//! classes `(a_x, b_y)` selects one `var_int` formula. A [`Variation`]
//! names which class pairs feed the numerator and which only feed the
//! denominator of the weighted ratio.
//!
//! The variation table is `const` data computed at compile time: the
//! effective denominator of every row already contains its numerator,
//! and the `+/-` rows are unions of their positive and negative rows.

use std::collections::HashMap;
use std::io::Read;

use insight_types::score::checked_ratio;
use insight_types::{InsightConfig, InsightError, InsightResult, Measure, Polarity, Variation};

use crate::delimited::{is_blank, read_rows, trailer_cells};
use crate::scorer::ScoreTable;

// ── Sign classes ────────────────────────────────────────────────────

/// Classification of one variable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Neg,
    Nil,
    Pos,
}

impl Sign {
    pub const ALL: [Sign; 3] = [Sign::Neg, Sign::Nil, Sign::Pos];

    pub fn of(value: i64) -> Sign {
        match value {
            v if v < 0 => Sign::Neg,
            0 => Sign::Nil,
            _ => Sign::Pos,
        }
    }

    const fn index(self) -> u16 {
        match self {
            Sign::Neg => 0,
            Sign::Nil => 1,
            Sign::Pos => 2,
        }
    }
}

/// A class pair `(a_x, b_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignPair {
    pub a: Sign,
    pub b: Sign,
}

impl SignPair {
    pub const fn new(a: Sign, b: Sign) -> Self {
        Self { a, b }
    }

    /// The same pair with the roles of `a` and `b` swapped.
    pub const fn mirrored(self) -> Self {
        Self::new(self.b, self.a)
    }

    const fn bit(self) -> u16 {
        1 << (self.a.index() * 3 + self.b.index())
    }
}

use Sign::{Neg as N, Nil as Z, Pos as P};

const fn pair(a: Sign, b: Sign) -> SignPair {
    SignPair::new(a, b)
}

/// Set of class pairs, one bit per pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PairSet(u16);

impl PairSet {
    pub const EMPTY: PairSet = PairSet(0);

    pub const fn of(pairs: &[SignPair]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < pairs.len() {
            bits |= pairs[i].bit();
            i += 1;
        }
        PairSet(bits)
    }

    pub const fn union(self, other: PairSet) -> Self {
        PairSet(self.0 | other.0)
    }

    pub const fn difference(self, other: PairSet) -> Self {
        PairSet(self.0 & !other.0)
    }

    pub const fn contains(self, p: SignPair) -> bool {
        self.0 & p.bit() != 0
    }

    pub const fn is_subset(self, other: PairSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub const fn is_disjoint(self, other: PairSet) -> bool {
        self.0 & other.0 == 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = SignPair> {
        Sign::ALL
            .into_iter()
            .flat_map(|a| Sign::ALL.into_iter().map(move |b| SignPair::new(a, b)))
            .filter(move |p| self.contains(*p))
    }
}

/// Pairs dropped when element `a` dominates.
pub const SKEW_A_FILTER: PairSet = PairSet::of(&[pair(N, P), pair(Z, P), pair(Z, N)]);

/// Pairs dropped when element `b` dominates.
pub const SKEW_B_FILTER: PairSet = PairSet::of(&[pair(N, Z), pair(P, Z), pair(P, N)]);

// ── Variation table ─────────────────────────────────────────────────

/// Numerator and denominator pair sets of one variation.
///
/// `denominator_only` never overlaps `numerator`; the effective
/// denominator is their union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariationTerms {
    pub numerator: PairSet,
    pub denominator_only: PairSet,
}

impl VariationTerms {
    const fn declare(numerator: PairSet, denominator: PairSet) -> Self {
        Self {
            numerator,
            denominator_only: denominator.difference(numerator),
        }
    }

    const fn union(self, other: VariationTerms) -> Self {
        Self::declare(
            self.numerator.union(other.numerator),
            self.denominator_only.union(other.denominator_only),
        )
    }

    pub const fn denominator(self) -> PairSet {
        self.numerator.union(self.denominator_only)
    }
}

const fn declare(numerator: &[SignPair], denominator: &[SignPair]) -> VariationTerms {
    VariationTerms::declare(PairSet::of(numerator), PairSet::of(denominator))
}

const fn positive_terms(m: Measure) -> VariationTerms {
    match m {
        Measure::Conflict => declare(&[pair(P, N), pair(N, P)], &[pair(P, Z), pair(Z, P)]),
        Measure::Reinforcement => declare(
            &[pair(P, P)],
            &[pair(P, Z), pair(P, N), pair(N, P), pair(Z, P)],
        ),
        Measure::Independence => declare(
            &[pair(P, Z), pair(Z, P)],
            &[pair(P, N), pair(P, P), pair(N, P)],
        ),
        Measure::ConflictReinforcement => declare(
            &[pair(P, N), pair(P, P), pair(N, P)],
            &[pair(P, Z), pair(Z, P)],
        ),
        Measure::ConflictIndependence => declare(
            &[pair(P, Z), pair(P, N), pair(N, P), pair(Z, P)],
            &[pair(P, P)],
        ),
        Measure::ReinforcementIndependence => declare(
            &[pair(P, Z), pair(P, P), pair(Z, P)],
            &[pair(P, N), pair(N, P)],
        ),
    }
}

const fn negative_terms(m: Measure) -> VariationTerms {
    match m {
        Measure::Conflict => declare(
            &[pair(P, N), pair(N, P)],
            &[pair(N, Z), pair(N, N), pair(Z, N)],
        ),
        Measure::Reinforcement => declare(
            &[pair(N, N)],
            &[pair(N, Z), pair(P, N), pair(N, P), pair(Z, N)],
        ),
        Measure::Independence => declare(
            &[pair(N, Z), pair(Z, N)],
            &[pair(P, N), pair(N, N), pair(N, P)],
        ),
        Measure::ConflictReinforcement => declare(
            &[pair(P, N), pair(N, N), pair(N, P)],
            &[pair(N, Z), pair(Z, N)],
        ),
        Measure::ConflictIndependence => declare(
            &[pair(N, Z), pair(P, N), pair(N, P), pair(Z, N)],
            &[pair(N, N)],
        ),
        Measure::ReinforcementIndependence => declare(
            &[pair(N, Z), pair(N, N), pair(Z, N)],
            &[pair(P, N), pair(N, P)],
        ),
    }
}

const fn measure_index(m: Measure) -> usize {
    match m {
        Measure::Conflict => 0,
        Measure::Reinforcement => 1,
        Measure::Independence => 2,
        Measure::ConflictReinforcement => 3,
        Measure::ConflictIndependence => 4,
        Measure::ReinforcementIndependence => 5,
    }
}

const fn polarity_index(p: Polarity) -> usize {
    match p {
        Polarity::Positive => 0,
        Polarity::Negative => 1,
        Polarity::Both => 2,
    }
}

const fn build_table() -> [[VariationTerms; 6]; 3] {
    let blank = VariationTerms::declare(PairSet::EMPTY, PairSet::EMPTY);
    let mut table = [[blank; 6]; 3];
    let mut i = 0;
    while i < Measure::ALL.len() {
        let m = Measure::ALL[i];
        let pos = positive_terms(m);
        let neg = negative_terms(m);
        let col = measure_index(m);
        table[polarity_index(Polarity::Positive)][col] = pos;
        table[polarity_index(Polarity::Negative)][col] = neg;
        table[polarity_index(Polarity::Both)][col] = pos.union(neg);
        i += 1;
    }
    table
}

static VARIATION_TABLE: [[VariationTerms; 6]; 3] = build_table();

/// Pair sets for a variation.
pub fn terms(variation: Variation) -> VariationTerms {
    VARIATION_TABLE[polarity_index(variation.polarity)][measure_index(variation.measure)]
}

// ── var_int ─────────────────────────────────────────────────────────

/// Unweighted interaction of two values on one variable, ∈ [0, 1].
///
/// Returns 0.0 when either value does not belong to its class in
/// `classes`. `r = pos_max − neg_min`.
pub fn var_int(a: i64, b: i64, neg_min: i64, pos_max: i64, classes: SignPair) -> f64 {
    if Sign::of(a) != classes.a || Sign::of(b) != classes.b {
        return 0.0;
    }

    let r = pos_max as f64 - neg_min as f64;
    let half = r / 2.0;
    let (a, b) = (a as f64, b as f64);

    match (classes.a, classes.b) {
        (Sign::Neg, Sign::Nil) | (Sign::Pos, Sign::Nil) => 1.0 - ((half - a.abs()) / half),
        (Sign::Pos, Sign::Neg) | (Sign::Neg, Sign::Pos) => (a - b).abs() / r,
        (Sign::Pos, Sign::Pos) | (Sign::Neg, Sign::Neg) => (a + b).abs() / r,
        (Sign::Nil, Sign::Pos) | (Sign::Nil, Sign::Neg) => 1.0 - ((half - b.abs()) / half),
        (Sign::Nil, Sign::Nil) => 0.0,
    }
}

// ── Interactions ────────────────────────────────────────────────────

/// One rated variable: its weight and declared value range.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub label: String,
    pub weight: f64,
    pub neg_min: i64,
    pub pos_max: i64,
}

/// Element × variable table of signed ratings.
#[derive(Debug, Clone)]
pub struct Interactions {
    variables: Vec<Variable>,
    elements: Vec<String>,
    values: Vec<Vec<i64>>,
    index: HashMap<String, usize>,
}

impl Interactions {
    /// Build from element labels, variable specs and one row of values
    /// per element.
    pub fn new(
        elements: Vec<String>,
        variables: Vec<Variable>,
        values: Vec<Vec<i64>>,
    ) -> InsightResult<Self> {
        if elements.len() != values.len() {
            return Err(InsightError::Shape(format!(
                "{} element labels but {} value rows",
                elements.len(),
                values.len()
            )));
        }
        for v in &variables {
            if !v.weight.is_finite() || v.weight < 0.0 {
                return Err(InsightError::MalformedRecord(format!(
                    "variable {:?}: weight must be finite and >= 0, got {}",
                    v.label, v.weight
                )));
            }
            if v.pos_max <= v.neg_min {
                return Err(InsightError::MalformedRecord(format!(
                    "variable {:?}: pos_max ({}) must exceed neg_min ({})",
                    v.label, v.pos_max, v.neg_min
                )));
            }
        }
        let mut index = HashMap::with_capacity(elements.len());
        for (i, (label, row)) in elements.iter().zip(&values).enumerate() {
            if row.len() != variables.len() {
                return Err(InsightError::Shape(format!(
                    "element {label:?}: {} values for {} variables",
                    row.len(),
                    variables.len()
                )));
            }
            if index.insert(label.clone(), i).is_some() {
                return Err(InsightError::MalformedRecord(format!(
                    "duplicate element label {label:?}"
                )));
            }
        }
        Ok(Self {
            variables,
            elements,
            values,
            index,
        })
    }

    /// Load the delimited-text layout:
    ///
    /// ```text
    /// ,v1,v2,v3        <- variable names
    /// s1,2,0,-1        <- one row per element
    /// ,,,              <- blank separator
    /// ,1,2,1           <- weights
    /// ,-2,-2,-2        <- neg_min
    /// ,2,2,2           <- pos_max
    /// ```
    ///
    /// The trailer decides how many variables are scored; extra value
    /// columns are ignored.
    pub fn from_csv<R: Read>(reader: R) -> InsightResult<Self> {
        let rows = read_rows(reader)?;
        let (header, body) = rows
            .split_first()
            .ok_or_else(|| InsightError::MalformedRecord("interaction input is empty".into()))?;

        // A wholly empty separator line never reaches us as a row, so
        // without a blank row the last three rows are the trailer.
        let (data, trailer) = match body.iter().position(|r| is_blank(r)) {
            Some(sep) => {
                let trailer: Vec<&Vec<String>> =
                    body[sep + 1..].iter().filter(|r| !is_blank(r)).collect();
                (&body[..sep], trailer)
            }
            None if body.len() >= 3 => {
                let split = body.len() - 3;
                (&body[..split], body[split..].iter().collect())
            }
            None => {
                return Err(InsightError::MalformedRecord(
                    "interaction input has no weight/neg_min/pos_max trailer".into(),
                ))
            }
        };
        if trailer.len() < 3 {
            return Err(InsightError::MalformedRecord(format!(
                "interaction trailer needs weight, neg_min and pos_max rows, got {}",
                trailer.len()
            )));
        }

        let weights: Vec<f64> = parse_cells(trailer_cells(trailer[0]), "weight")?;
        let neg_min: Vec<i64> = parse_cells(trailer_cells(trailer[1]), "neg_min")?;
        let pos_max: Vec<i64> = parse_cells(trailer_cells(trailer[2]), "pos_max")?;
        let n = weights.len();
        if neg_min.len() != n || pos_max.len() != n {
            return Err(InsightError::MalformedRecord(format!(
                "trailer rows disagree: {} weights, {} neg_min, {} pos_max",
                n,
                neg_min.len(),
                pos_max.len()
            )));
        }

        let names = header.get(1..).unwrap_or(&[]);
        if names.len() > n {
            log::warn!(
                "interaction input names {} variables but the trailer covers {}; ignoring the rest",
                names.len(),
                n
            );
        }
        let variables = (0..n)
            .map(|i| Variable {
                label: names.get(i).cloned().unwrap_or_else(|| format!("v{}", i + 1)),
                weight: weights[i],
                neg_min: neg_min[i],
                pos_max: pos_max[i],
            })
            .collect();

        let mut elements = Vec::with_capacity(data.len());
        let mut values: Vec<Vec<i64>> = Vec::with_capacity(data.len());
        for row in data {
            let label = row.first().map(|s| s.trim()).unwrap_or_default();
            if label.is_empty() {
                return Err(InsightError::MalformedRecord(format!(
                    "interaction row without element label: {row:?}"
                )));
            }
            let cells = row.get(1..).unwrap_or(&[]);
            if cells.len() < n {
                return Err(InsightError::MalformedRecord(format!(
                    "element {label:?}: {} values for {} variables",
                    cells.len(),
                    n
                )));
            }
            elements.push(label.to_string());
            values.push(parse_cells(&cells[..n], label)?);
        }

        log::debug!(
            "interactions loaded: {} elements x {} variables",
            elements.len(),
            n
        );
        Self::new(elements, variables, values)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn element_labels(&self) -> &[String] {
        &self.elements
    }

    /// Ratings of one element, one per variable.
    pub fn values_of(&self, element: &str) -> InsightResult<&[i64]> {
        Ok(&self.values[self.lookup(element)?])
    }

    fn lookup(&self, element: &str) -> InsightResult<usize> {
        self.index
            .get(element)
            .copied()
            .ok_or_else(|| InsightError::LabelNotFound(element.to_string()))
    }

    /// Number of variables an element rates positively.
    pub fn support_count(&self, element: &str) -> InsightResult<usize> {
        Ok(self.values_of(element)?.iter().filter(|&&v| v > 0).count())
    }

    /// Balancing factor `|sa − sb| / (sa + sb)` ∈ [0, 1].
    pub fn balance(&self, a: &str, b: &str) -> InsightResult<f64> {
        let sa = self.support_count(a)? as f64;
        let sb = self.support_count(b)? as f64;
        checked_ratio((sa - sb).abs(), sa + sb, &format!("balance({a}, {b})"))
    }

    /// Weighted interaction over the variation's pairs minus `excluded`.
    ///
    /// Numerator pairs contribute `w·var_int` to the numerator and
    /// `w·⌈var_int⌉` to the denominator; denominator-only pairs
    /// contribute `w·var_int` to the denominator.
    pub fn filtered_interaction(
        &self,
        a: &str,
        b: &str,
        variation: Variation,
        excluded: PairSet,
    ) -> InsightResult<f64> {
        let va = &self.values[self.lookup(a)?];
        let vb = &self.values[self.lookup(b)?];
        let t = terms(variation);
        let numerator_pairs = t.numerator.difference(excluded);
        let denominator_pairs = t.denominator_only.difference(excluded);

        let mut num = 0.0;
        let mut den = 0.0;
        for (i, var) in self.variables.iter().enumerate() {
            for p in numerator_pairs.iter() {
                let v = var_int(va[i], vb[i], var.neg_min, var.pos_max, p);
                num += var.weight * v;
                den += var.weight * v.ceil();
            }
            for p in denominator_pairs.iter() {
                den += var.weight * var_int(va[i], vb[i], var.neg_min, var.pos_max, p);
            }
        }
        checked_ratio(
            num,
            den,
            &format!("filtered interaction '{variation}' ({a}, {b})"),
        )
    }

    /// Balanced interaction:
    /// `((1−bal)·neutral + bal·skew_a + bal·skew_b) / (1 + bal)`.
    pub fn interaction(&self, a: &str, b: &str, variation: Variation) -> InsightResult<f64> {
        let neutral = self.filtered_interaction(a, b, variation, PairSet::EMPTY)?;
        let skew_a = self.filtered_interaction(a, b, variation, SKEW_A_FILTER)?;
        let skew_b = self.filtered_interaction(a, b, variation, SKEW_B_FILTER)?;
        let bal = self.balance(a, b)?;
        Ok(((1.0 - bal) * neutral + bal * skew_a + bal * skew_b) / (1.0 + bal))
    }

    /// Score table view for one variation.
    pub fn scorer(&self, variation: Variation) -> InteractionScorer<'_> {
        InteractionScorer {
            table: self,
            variation,
        }
    }

    /// Score table view for the run configuration's variation.
    pub fn configured_scorer(&self, config: &InsightConfig) -> InteractionScorer<'_> {
        self.scorer(config.variation)
    }
}

fn parse_cells<T: std::str::FromStr>(cells: &[String], what: &str) -> InsightResult<Vec<T>> {
    cells
        .iter()
        .map(|c| {
            c.trim().parse::<T>().map_err(|_| {
                InsightError::MalformedRecord(format!("{what}: cannot parse {c:?} as a number"))
            })
        })
        .collect()
}

/// [`Interactions`] scored under one fixed variation.
pub struct InteractionScorer<'a> {
    table: &'a Interactions,
    variation: Variation,
}

impl ScoreTable for InteractionScorer<'_> {
    fn elements(&self) -> Vec<String> {
        self.table.elements.clone()
    }

    fn score(&self, a: &str, b: &str) -> InsightResult<f64> {
        self.table.interaction(a, b, self.variation)
    }
}
