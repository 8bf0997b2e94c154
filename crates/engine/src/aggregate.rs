use std::collections::{BTreeMap, BTreeSet};

use docdrift_core::{ChangeKind, Modification};

use crate::model::{ColumnScore, TableScore};
use crate::resolver::ColumnResolver;
use crate::scoring::ScoringConfig;
use crate::taxonomy::Taxonomy;

/// Record counts on both sides of one comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub baseline: usize,
    pub target: usize,
}

impl RowCounts {
    pub fn new(baseline: usize, target: usize) -> Self {
        Self { baseline, target }
    }

    /// Both snapshots hold `rows` records.
    pub fn same(rows: usize) -> Self {
        Self::new(rows, rows)
    }

    pub fn total(&self) -> usize {
        self.baseline.max(self.target)
    }

    /// Row index in the scoring space: baseline records first, added target
    /// records after them.
    pub fn scoring_row(&self, m: &Modification) -> usize {
        match m.kind {
            ChangeKind::RowAdded => self.baseline + m.row,
            ChangeKind::ContentChanged | ChangeKind::RowDeleted => m.row,
        }
    }
}

/// Turns a table's modifications into a full heat vector.
///
/// Holds only read-only configuration, so one aggregator can score any number
/// of tables, from any number of threads.
#[derive(Debug, Clone)]
pub struct Aggregator<'a> {
    taxonomy: &'a Taxonomy,
    scoring: &'a ScoringConfig,
    resolver: ColumnResolver,
}

impl<'a> Aggregator<'a> {
    pub fn new(taxonomy: &'a Taxonomy, scoring: &'a ScoringConfig) -> Self {
        Self {
            taxonomy,
            scoring,
            resolver: ColumnResolver::new(taxonomy),
        }
    }

    pub fn resolver(&self) -> &ColumnResolver {
        &self.resolver
    }

    /// Score one table.
    ///
    /// `header` lists the raw labels of the table (both snapshots); labels that
    /// appear only in modifications are resolved too. Every canonical column
    /// gets an entry, at the floor when untouched.
    pub fn score(
        &self,
        table_name: &str,
        rows: RowCounts,
        header: &[String],
        modifications: Vec<Modification>,
    ) -> TableScore {
        let mut labels: Vec<&str> = Vec::new();
        for label in header.iter().chain(modifications.iter().map(|m| &m.column)) {
            if !labels.contains(&label.as_str()) {
                labels.push(label);
            }
        }

        let mapping = self.resolver.map_columns(labels.as_slice());
        let column_mapping: BTreeMap<String, usize> = mapping
            .resolved
            .iter()
            .map(|m| (m.label.clone(), m.column))
            .collect();

        let mut touched: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); self.taxonomy.column_count()];
        for m in &modifications {
            if let Some(&i) = column_mapping.get(&m.column) {
                touched[i].insert(rows.scoring_row(m));
            }
        }

        let columns: Vec<ColumnScore> = self
            .taxonomy
            .columns
            .iter()
            .zip(touched)
            .map(|(column, touched)| {
                let modified_rows: Vec<usize> = touched.into_iter().collect();
                let count = modified_rows.len();
                ColumnScore {
                    column: column.name.clone(),
                    tier: column.tier,
                    modification_count: count,
                    heat: self.scoring.heat_for(count),
                    modified_rows,
                }
            })
            .collect();

        let dropped = modifications
            .iter()
            .filter(|m| !column_mapping.contains_key(&m.column))
            .count();
        if dropped > 0 {
            log::warn!("table '{table_name}': {dropped} modification(s) in unmapped columns excluded from scoring");
        }
        log::debug!(
            "table '{table_name}': {} modification(s), {} of {} columns touched",
            modifications.len(),
            columns.iter().filter(|c| c.modification_count > 0).count(),
            columns.len()
        );

        TableScore {
            table_name: table_name.to_string(),
            total_rows: rows.total(),
            modifications,
            columns,
            column_mapping,
            unmapped_columns: mapping.unmapped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdrift_core::RiskTier;

    fn modification(row: usize, column: &str) -> Modification {
        Modification {
            row,
            column: column.into(),
            old_value: "a".into(),
            new_value: "b".into(),
            kind: ChangeKind::ContentChanged,
            cell: String::new(),
        }
    }

    fn header(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn untouched_table_sits_at_floor() {
        let t = Taxonomy::reference();
        let s = ScoringConfig::default();
        let score = Aggregator::new(&t, &s).score("empty", RowCounts::same(0), &[], Vec::new());
        assert_eq!(score.columns.len(), 19);
        assert!(score.heat_vector().iter().all(|h| *h == 0.05));
    }

    #[test]
    fn breakpoints_by_distinct_rows() {
        let t = Taxonomy::reference();
        let s = ScoringConfig::default();
        let agg = Aggregator::new(&t, &s);

        let three: Vec<Modification> = (0..3).map(|r| modification(r, "负责人")).collect();
        let score = agg.score("t", RowCounts::same(10), &header(&["负责人"]), three);
        assert_eq!(score.column("负责人").map(|c| c.heat), Some(0.60));

        let six: Vec<Modification> = (0..6).map(|r| modification(r, "负责人")).collect();
        let score = agg.score("t", RowCounts::same(10), &header(&["负责人"]), six);
        assert_eq!(score.column("负责人").map(|c| c.heat), Some(0.90));
    }

    #[test]
    fn same_row_counts_once() {
        let t = Taxonomy::reference();
        let s = ScoringConfig::default();
        // "owner" and "执行人" both resolve to 负责人
        let mods = vec![modification(4, "owner"), modification(4, "执行人"), modification(1, "owner")];
        let score = Aggregator::new(&t, &s).score("t", RowCounts::same(10), &header(&["owner", "执行人"]), mods);
        let col = score.column("负责人").unwrap();
        assert_eq!(col.modified_rows, vec![1, 4]);
        assert_eq!(col.modification_count, 2);
        assert_eq!(col.heat, 0.30);
        assert_eq!(col.tier, RiskTier::L1);
    }

    #[test]
    fn unmapped_labels_are_tracked_not_scored() {
        let t = Taxonomy::reference();
        let s = ScoringConfig::default();
        let mods = vec![modification(0, "rating")];
        let score = Aggregator::new(&t, &s).score("t", RowCounts::same(1), &header(&["序号", "rating"]), mods);
        assert_eq!(score.unmapped_columns, vec!["rating".to_string()]);
        assert!(score.heat_vector().iter().all(|h| *h == 0.05));
        assert_eq!(score.modifications.len(), 1);
    }

    #[test]
    fn tier_filter_feeds_l2_consumers() {
        let t = Taxonomy::reference();
        let s = ScoringConfig::default();
        let mods = vec![
            modification(0, "负责人"),
            modification(0, "具体计划内容"),
            modification(1, "协助人"),
            modification(2, "rating"),
        ];
        let score = Aggregator::new(&t, &s).score("t", RowCounts::same(3), &[], mods);
        let l2: Vec<&str> = score
            .modifications_in_tier(RiskTier::L2)
            .map(|m| m.column.as_str())
            .collect();
        assert_eq!(l2, vec!["具体计划内容", "协助人"]);
        assert_eq!(score.modifications_in_tier(RiskTier::L1).count(), 1);
        assert_eq!(score.modifications_in_tier(RiskTier::L3).count(), 0);
    }

    fn added(row: usize, column: &str) -> Modification {
        Modification {
            kind: ChangeKind::RowAdded,
            old_value: String::new(),
            ..modification(row, column)
        }
    }

    #[test]
    fn added_rows_do_not_merge_with_baseline_rows() {
        let t = Taxonomy::reference();
        let s = ScoringConfig::default();
        // baseline row 1 deleted, target row 1 added: two distinct rows
        let deleted = Modification {
            kind: ChangeKind::RowDeleted,
            ..modification(1, "负责人")
        };
        let mods = vec![deleted, added(1, "负责人")];
        let score = Aggregator::new(&t, &s).score("t", RowCounts::new(2, 2), &header(&["负责人"]), mods);
        let col = score.column("负责人").unwrap();
        assert_eq!(col.modified_rows, vec![1, 3]);
        assert_eq!(col.modification_count, 2);
        assert_eq!(col.heat, 0.30);
        assert_eq!(score.total_rows, 2);
    }

    #[test]
    fn three_replaced_rows_reach_second_breakpoint() {
        let t = Taxonomy::reference();
        let s = ScoringConfig::default();
        let mut mods = Vec::new();
        for r in 0..3 {
            mods.push(Modification {
                kind: ChangeKind::RowDeleted,
                ..modification(r, "负责人")
            });
        }
        mods.extend((0..3).map(|r| added(r, "负责人")));
        let score = Aggregator::new(&t, &s).score("t", RowCounts::same(3), &header(&["负责人"]), mods);
        let col = score.column("负责人").unwrap();
        assert_eq!(col.modification_count, 6);
        assert_eq!(col.heat, 0.90);
    }
}
