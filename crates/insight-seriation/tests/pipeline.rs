// ─────────────────────────────────────────────────────────────────────
// Insight Matrix — Randomize / Seriate Recovery
// ─────────────────────────────────────────────────────────────────────
//! End-to-end: build a matrix from a score producer, shuffle it, and
//! check that every strategy brings the blocks back together.

use rand::rngs::StdRng;
use rand::SeedableRng;

use insight_core::{render, CardSort, ExternalScores, Matrix};
use insight_seriation::Seriator;
use insight_types::{LinkageMethod, MergeMode};

const FRUIT: [&str; 3] = ["apple", "cherry", "plum"];
const VEG: [&str; 3] = ["carrot", "leek", "parsnip"];

fn block_scores() -> ExternalScores {
    let elements = FRUIT.iter().chain(VEG.iter()).map(|s| s.to_string()).collect();
    ExternalScores::new(elements, |a, b| {
        let fruit = |x: &str| FRUIT.contains(&x);
        Ok(if a == b {
            1.0
        } else if fruit(a) == fruit(b) {
            0.9
        } else {
            0.1
        })
    })
}

fn strategies() -> Vec<Seriator> {
    let mut all: Vec<Seriator> = LinkageMethod::ALL.into_iter().map(Seriator::Linkage).collect();
    all.push(Seriator::Agglomerative(MergeMode::Sum));
    all.push(Seriator::Agglomerative(MergeMode::Average));
    all
}

fn blocks_contiguous(labels: &[String]) -> bool {
    let fruit: Vec<bool> = labels.iter().map(|l| FRUIT.contains(&l.as_str())).collect();
    fruit.windows(2).filter(|w| w[0] != w[1]).count() == 1
}

#[test]
fn test_randomize_then_seriate_recovers_blocks() {
    let build = Matrix::from_scores(&block_scores());
    assert!(build.is_complete());

    for (seed, seriator) in strategies().into_iter().enumerate() {
        let mut m = build.matrix.clone();
        let mut rng = StdRng::seed_from_u64(seed as u64 + 11);
        m.randomize(&mut rng).unwrap();
        assert!(m.is_symmetric());

        let order = seriator.seriate(&mut m).unwrap();
        assert_eq!(order.rows, order.cols);
        assert!(m.is_symmetric());
        assert!(
            blocks_contiguous(m.row_labels()),
            "{seriator:?}: {:?}",
            m.row_labels()
        );
    }
}

#[test]
fn test_cardsort_pipeline() {
    let sort = CardSort::from_csv(
        "t1,g1,apple\nt1,g1,plum\nt1,g2,leek\nt1,g2,carrot\n\
         t2,g1,apple\nt2,g1,plum\nt2,g2,leek\nt2,g3,carrot\n"
            .as_bytes(),
    )
    .unwrap();
    let build = Matrix::from_scores(&sort);
    assert!(build.is_complete());

    let mut m = build.matrix;
    let mut rng = StdRng::seed_from_u64(3);
    m.randomize(&mut rng).unwrap();
    Seriator::default().seriate(&mut m).unwrap();

    let pos = |l: &str| m.row_labels().iter().position(|r| r == l).unwrap();
    assert_eq!(pos("apple").abs_diff(pos("plum")), 1, "{:?}", m.row_labels());

    let grid = render::ascii(&m);
    assert_eq!(grid.lines().count(), 6 + 1 + 4);
    let csv = m.to_csv().unwrap();
    assert_eq!(Matrix::from_csv_str(&csv).unwrap(), m);
}
