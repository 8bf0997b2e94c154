use std::collections::{BTreeMap, HashSet};

use docdrift_cluster::ClusterOrdering;

use crate::error::DriftError;
use crate::model::{
    ColumnModifications, ComprehensiveScoreMatrix, HeatmapData, MatrixMetadata, MatrixStatistics, RiskDistribution,
    SourceFile, TableModifications, TableScore, TierBreakdown,
};
use crate::taxonomy::Taxonomy;

/// Cells at or above this heat count as high risk.
pub const HIGH_RISK: f64 = 0.6;
/// Cells at or above this heat (and below `HIGH_RISK`) count as medium risk.
pub const MEDIUM_RISK: f64 = 0.3;

/// Assembles table scores into the dense tables × canonical-columns matrix.
#[derive(Debug, Clone)]
pub struct MatrixBuilder<'a> {
    taxonomy: &'a Taxonomy,
    floor: f64,
    source_files: Vec<SourceFile>,
    timestamp: Option<String>,
}

impl<'a> MatrixBuilder<'a> {
    pub fn new(taxonomy: &'a Taxonomy, floor: f64) -> Self {
        Self {
            taxonomy,
            floor,
            source_files: Vec::new(),
            timestamp: None,
        }
    }

    pub fn source_files(mut self, files: Vec<SourceFile>) -> Self {
        self.source_files = files;
        self
    }

    /// Fixed generation timestamp instead of the current time.
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// One matrix row per table score, in input order; always as wide as the
    /// taxonomy. Columns a score does not mention stay at the floor.
    pub fn build(&self, scores: &[TableScore]) -> Result<ComprehensiveScoreMatrix, DriftError> {
        let width = self.taxonomy.column_count();
        let mut seen_tables = HashSet::new();
        let mut matrix = Vec::with_capacity(scores.len());
        let mut by_table = BTreeMap::new();
        let mut unmapped = BTreeMap::new();
        let mut tiers = TierBreakdown::default();
        let mut total_cells = 0;
        let mut modified_cells = 0;

        for score in scores {
            if !seen_tables.insert(score.table_name.as_str()) {
                return Err(DriftError::DuplicateTable(score.table_name.clone()));
            }
            if score.columns.len() > width {
                return Err(DriftError::DimensionMismatch {
                    table: score.table_name.clone(),
                    expected: width,
                    found: score.columns.len(),
                });
            }

            let mut row = vec![self.floor; width];
            let mut filled = vec![false; width];
            let mut column_modifications = BTreeMap::new();
            for column in &score.columns {
                let index = self
                    .taxonomy
                    .column_index(&column.column)
                    .ok_or_else(|| DriftError::UnknownColumn {
                        table: score.table_name.clone(),
                        column: column.column.clone(),
                    })?;
                if filled[index] {
                    return Err(DriftError::DuplicateColumn {
                        table: score.table_name.clone(),
                        column: column.column.clone(),
                    });
                }
                filled[index] = true;
                row[index] = column.heat;

                if column.modification_count > 0 {
                    modified_cells += column.modification_count;
                    tiers.add(self.taxonomy.columns[index].tier);
                    column_modifications.insert(
                        column.column.clone(),
                        ColumnModifications {
                            modified_rows: column.modified_rows.clone(),
                            modification_count: column.modification_count,
                        },
                    );
                }
            }

            total_cells += score.total_rows * width;
            matrix.push(row);
            by_table.insert(
                score.table_name.clone(),
                TableModifications {
                    total_rows: score.total_rows,
                    column_modifications,
                },
            );
            if !score.unmapped_columns.is_empty() {
                unmapped.insert(score.table_name.clone(), score.unmapped_columns.clone());
            }
        }

        let modification_rate = if total_cells == 0 {
            0.0
        } else {
            // replaced rows count on both sides and can outnumber total_rows
            (modified_cells as f64 / total_cells as f64).min(1.0)
        };

        let statistics = MatrixStatistics {
            total_cells,
            modified_cells,
            modification_rate,
            unmapped_columns: unmapped,
            risk_distribution: risk_distribution(&matrix),
            tier_breakdown: tiers,
        };

        log::info!(
            "built {}x{} score matrix: {modified_cells} modified of {total_cells} cells",
            matrix.len(),
            width
        );

        Ok(ComprehensiveScoreMatrix {
            metadata: MatrixMetadata {
                timestamp: self
                    .timestamp
                    .clone()
                    .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
                table_count: scores.len(),
                column_count: width,
                taxonomy_version: self.taxonomy.version.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                source_files: self.source_files.clone(),
            },
            table_names: scores.iter().map(|s| s.table_name.clone()).collect(),
            column_names: self.taxonomy.column_names(),
            column_tiers: self.taxonomy.tiers(),
            heatmap_data: HeatmapData {
                rows: matrix.len(),
                cols: width,
                matrix,
            },
            column_modifications_by_table: by_table,
            statistics,
            cluster_ordering: None,
        })
    }
}

impl ComprehensiveScoreMatrix {
    pub fn with_cluster_ordering(mut self, ordering: ClusterOrdering) -> Self {
        self.cluster_ordering = Some(ordering);
        self
    }
}

fn risk_distribution(matrix: &[Vec<f64>]) -> RiskDistribution {
    let mut dist = RiskDistribution::default();
    for &heat in matrix.iter().flatten() {
        if heat >= HIGH_RISK {
            dist.high += 1;
        } else if heat >= MEDIUM_RISK {
            dist.medium += 1;
        } else {
            dist.low += 1;
        }
    }
    dist
}
