use docdrift_cluster::{ReorderOptions, StrategyKind};
use docdrift_core::Snapshot;
use serde::Serialize;

use crate::aggregate::{Aggregator, RowCounts};
use crate::differ::{diff, DiffOptions, DiffSummary};
use crate::error::DriftError;
use crate::matrix::MatrixBuilder;
use crate::model::{ComprehensiveScoreMatrix, SourceFile, TableScore};
use crate::scoring::ScoringConfig;
use crate::taxonomy::Taxonomy;

/// One table of a batch: both snapshots, already loaded.
#[derive(Debug, Clone)]
pub struct TableInput {
    pub name: String,
    pub baseline: Snapshot,
    pub target: Snapshot,
    /// Provenance of the snapshots, copied into the artifact metadata.
    pub sources: Vec<SourceFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOptions {
    pub strategy: StrategyKind,
    pub max_passes: usize,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            max_passes: ReorderOptions::default().max_passes,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub diff: DiffOptions,
    /// Reorder the finished matrix with this strategy.
    pub cluster: Option<ClusterOptions>,
    /// Fixed artifact timestamp (reproducible output).
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableDiff {
    pub table: String,
    pub summary: DiffSummary,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table_scores: Vec<TableScore>,
    pub diffs: Vec<TableDiff>,
    pub matrix: ComprehensiveScoreMatrix,
}

/// Differ → Aggregator → Matrix Builder (→ Clustering), one table at a time,
/// in input order.
pub fn run(
    taxonomy: &Taxonomy,
    scoring: &ScoringConfig,
    tables: &[TableInput],
    options: &RunOptions,
) -> Result<RunOutput, DriftError> {
    let aggregator = Aggregator::new(taxonomy, scoring);
    let mut table_scores = Vec::with_capacity(tables.len());
    let mut diffs = Vec::with_capacity(tables.len());
    let mut sources = Vec::new();

    for table in tables {
        let result = diff(&table.baseline, &table.target, &options.diff)?;
        log::info!(
            "table '{}': {} modification(s), similarity {:.3}, aligned by {}",
            table.name,
            result.summary.modified_cells,
            result.summary.similarity,
            result.summary.alignment_used
        );

        let mut header = table.baseline.columns.clone();
        for column in &table.target.columns {
            if !header.contains(column) {
                header.push(column.clone());
            }
        }
        let rows = RowCounts::new(table.baseline.row_count(), table.target.row_count());

        table_scores.push(aggregator.score(&table.name, rows, &header, result.modifications));
        diffs.push(TableDiff {
            table: table.name.clone(),
            summary: result.summary,
        });
        sources.extend(table.sources.iter().cloned());
    }

    let mut builder = MatrixBuilder::new(taxonomy, scoring.floor).source_files(sources);
    if let Some(ts) = &options.timestamp {
        builder = builder.timestamp(ts.clone());
    }
    let mut matrix = builder.build(&table_scores)?;

    if let Some(cluster) = &options.cluster {
        let reorder_options = ReorderOptions {
            floor: scoring.floor,
            max_passes: cluster.max_passes,
        };
        let ordering = docdrift_cluster::reorder_with_cols(
            matrix.matrix(),
            matrix.heatmap_data.cols,
            cluster.strategy,
            &reorder_options,
        );
        log::info!(
            "clustered with {}: metric {:.4} (identity {:.4})",
            ordering.strategy,
            ordering.metric,
            ordering.identity_metric
        );
        matrix = matrix.with_cluster_ordering(ordering);
    }

    Ok(RunOutput {
        table_scores,
        diffs,
        matrix,
    })
}
