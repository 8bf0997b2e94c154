use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use docdrift_cluster::ClusterOrdering;
use docdrift_core::{Modification, RiskTier};

// ---------------------------------------------------------------------------
// Table score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScore {
    /// Canonical column name.
    pub column: String,
    pub tier: RiskTier,
    /// Distinct modified row indices, ascending. Baseline records keep their
    /// index; an added target record `t` sits at `baseline_rows + t`.
    pub modified_rows: Vec<usize>,
    pub modification_count: usize,
    pub heat: f64,
}

/// Score of one table. One entry per canonical column, in canonical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableScore {
    pub table_name: String,
    pub total_rows: usize,
    pub modifications: Vec<Modification>,
    pub columns: Vec<ColumnScore>,
    /// Raw label → canonical column index, for every label that resolved.
    #[serde(default)]
    pub column_mapping: BTreeMap<String, usize>,
    /// Raw labels that resolved to nothing; excluded from the heat vector.
    #[serde(default)]
    pub unmapped_columns: Vec<String>,
}

impl TableScore {
    pub fn heat_vector(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.heat).collect()
    }

    pub fn modified_cells(&self) -> usize {
        self.columns.iter().map(|c| c.modification_count).sum()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnScore> {
        self.columns.iter().find(|c| c.column == name)
    }

    /// Modifications whose raw label resolves to a column of `tier`.
    pub fn modifications_in_tier(&self, tier: RiskTier) -> impl Iterator<Item = &Modification> + '_ {
        self.modifications.iter().filter(move |m| {
            self.column_mapping
                .get(&m.column)
                .and_then(|&i| self.columns.get(i))
                .is_some_and(|c| c.tier == tier)
        })
    }
}

// ---------------------------------------------------------------------------
// Comprehensive score matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceRole {
    Baseline,
    Target,
}

/// Identifies one input file of a run. Filled by the IO collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub table: String,
    pub role: SourceRole,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixMetadata {
    pub timestamp: String,
    pub table_count: usize,
    pub column_count: usize,
    #[serde(default)]
    pub taxonomy_version: String,
    #[serde(default)]
    pub engine_version: String,
    #[serde(default)]
    pub source_files: Vec<SourceFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapData {
    pub matrix: Vec<Vec<f64>>,
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnModifications {
    /// Same index space as [`ColumnScore::modified_rows`].
    pub modified_rows: Vec<usize>,
    pub modification_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableModifications {
    pub total_rows: usize,
    /// Only columns with at least one modification.
    pub column_modifications: BTreeMap<String, ColumnModifications>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// (table, column) cells with at least one modification, per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBreakdown {
    #[serde(rename = "L1")]
    pub l1: usize,
    #[serde(rename = "L2")]
    pub l2: usize,
    #[serde(rename = "L3")]
    pub l3: usize,
}

impl TierBreakdown {
    pub fn add(&mut self, tier: RiskTier) {
        match tier {
            RiskTier::L1 => self.l1 += 1,
            RiskTier::L2 => self.l2 += 1,
            RiskTier::L3 => self.l3 += 1,
        }
    }

    pub fn get(&self, tier: RiskTier) -> usize {
        match tier {
            RiskTier::L1 => self.l1,
            RiskTier::L2 => self.l2,
            RiskTier::L3 => self.l3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixStatistics {
    pub total_cells: usize,
    pub modified_cells: usize,
    pub modification_rate: f64,
    #[serde(default)]
    pub unmapped_columns: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub risk_distribution: RiskDistribution,
    #[serde(default)]
    pub tier_breakdown: TierBreakdown,
}

/// Exchange artifact handed to renderers and colorizers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveScoreMatrix {
    pub metadata: MatrixMetadata,
    /// Row order.
    pub table_names: Vec<String>,
    /// Canonical column order.
    pub column_names: Vec<String>,
    #[serde(default)]
    pub column_tiers: Vec<RiskTier>,
    pub heatmap_data: HeatmapData,
    pub column_modifications_by_table: BTreeMap<String, TableModifications>,
    pub statistics: MatrixStatistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_ordering: Option<ClusterOrdering>,
}

/// A matrix with both axes permuted, labels permuted alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReorderedMatrix {
    pub strategy: String,
    pub table_names: Vec<String>,
    pub column_names: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    pub metric: f64,
    pub identity_metric: f64,
}

impl ComprehensiveScoreMatrix {
    pub fn matrix(&self) -> &[Vec<f64>] {
        &self.heatmap_data.matrix
    }

    pub fn reordered(&self, ordering: &ClusterOrdering) -> ReorderedMatrix {
        ReorderedMatrix {
            strategy: ordering.strategy.clone(),
            table_names: docdrift_cluster::permute(&self.table_names, &ordering.row_order),
            column_names: docdrift_cluster::permute(&self.column_names, &ordering.col_order),
            matrix: docdrift_cluster::apply_ordering(&self.heatmap_data.matrix, ordering),
            metric: ordering.metric,
            identity_metric: ordering.identity_metric,
        }
    }
}
