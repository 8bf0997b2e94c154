// Property-based tests for diffing, scoring and matrix assembly.
// CI: 128 cases (default). Soak: PROPTEST_CASES=5000 cargo test --release

use docdrift_core::{ChangeKind, Modification, Snapshot};
use docdrift_engine::differ::RowAlignment;
use docdrift_engine::{diff, equivalent, Aggregator, DiffOptions, MatrixBuilder, RowCounts, ScoringConfig, Taxonomy};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn headers() -> Vec<String> {
    ["序号", "负责人", "重要程度", "完成进度", "备注"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Cell text: digits, star ratings, short words, blanks.
fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => r"0{0,2}[0-9]{1,3}",
        2 => r"★{0,5}☆{0,2}",
        2 => r"[a-z张李王]{1,6}",
        1 => Just(String::new()),
    ]
}

fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    prop::collection::vec(prop::collection::vec(arb_value(), 5), 0..12)
        .prop_map(|rows| Snapshot::from_rows(&headers(), &rows))
}

fn arb_alignment() -> impl Strategy<Value = RowAlignment> {
    prop_oneof![Just(RowAlignment::Auto), Just(RowAlignment::Positional)]
}

fn modification(row: usize, column: &str) -> Modification {
    Modification {
        row,
        column: column.to_string(),
        old_value: "x".into(),
        new_value: "y".into(),
        kind: ChangeKind::ContentChanged,
        cell: String::new(),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_128())]

    #[test]
    fn identical_snapshots_never_differ(snap in arb_snapshot(), alignment in arb_alignment()) {
        let options = DiffOptions { alignment, ..DiffOptions::default() };
        let result = diff(&snap, &snap.clone(), &options).unwrap();
        prop_assert!(result.modifications.is_empty());
        prop_assert_eq!(result.summary.similarity, 1.0);
    }

    #[test]
    fn equivalence_is_symmetric(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(equivalent(&a, &b), equivalent(&b, &a));
        prop_assert!(equivalent(&a, &a));
    }

    #[test]
    fn content_changes_are_never_equivalent(a in arb_snapshot(), b in arb_snapshot()) {
        let options = DiffOptions { alignment: RowAlignment::Positional, ..DiffOptions::default() };
        let result = diff(&a, &b, &options).unwrap();
        for m in result.modifications.iter().filter(|m| m.kind == ChangeKind::ContentChanged) {
            prop_assert!(!equivalent(&m.old_value, &m.new_value));
        }
        // row-then-column order within content changes
        let rows: Vec<usize> = result
            .modifications
            .iter()
            .filter(|m| m.kind == ChangeKind::ContentChanged)
            .map(|m| m.row)
            .collect();
        prop_assert!(rows.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn matrix_shape_holds(counts in prop::collection::vec(prop::collection::vec(0usize..9, 19), 0..6)) {
        let taxonomy = Taxonomy::reference();
        let scoring = ScoringConfig::default();
        let agg = Aggregator::new(&taxonomy, &scoring);
        let scores: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(t, per_column)| {
                let mods = per_column
                    .iter()
                    .enumerate()
                    .flat_map(|(c, &n)| {
                        let name = taxonomy.columns[c].name.clone();
                        (0..n).map(move |r| modification(r, &name))
                    })
                    .collect();
                agg.score(&format!("table-{t}"), RowCounts::same(10), &[], mods)
            })
            .collect();
        let m = MatrixBuilder::new(&taxonomy, scoring.floor).build(&scores).unwrap();
        prop_assert_eq!(m.heatmap_data.matrix.len(), counts.len());
        prop_assert!(m.heatmap_data.matrix.iter().all(|r| r.len() == 19));
        prop_assert_eq!(m.column_names.len(), 19);
    }

    #[test]
    fn heat_is_monotonic(a in 0usize..20, b in 0usize..20) {
        let scoring = ScoringConfig::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(scoring.heat_for(lo) <= scoring.heat_for(hi));
        prop_assert!(scoring.heat_for(lo) >= scoring.floor);
    }
}
