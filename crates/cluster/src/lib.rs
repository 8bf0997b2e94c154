//! `docdrift-cluster` — reorders a heat matrix so hot regions become contiguous.
//!
//! Pure numeric crate: receives a dense matrix, returns row/column permutations
//! plus the clustering-quality metric. Stateless and deterministic; no IO.

pub mod barycenter;
pub mod grid;
pub mod hierarchical;
pub mod metric;
pub mod refine;
pub mod signature;
pub mod spectral;
pub mod strategy;

use serde::{Deserialize, Serialize};

pub use grid::Grid;
pub use metric::{clustering_metric, identity, is_permutation};
pub use strategy::{ReorderOptions, ReorderStrategy, StrategyKind};

/// Row and column permutations produced by one strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterOrdering {
    pub strategy: String,
    pub row_order: Vec<usize>,
    pub col_order: Vec<usize>,
    /// Clustering metric of the returned ordering.
    pub metric: f64,
    /// Clustering metric of the identity ordering, for comparison.
    pub identity_metric: f64,
}

impl ClusterOrdering {
    pub fn improvement(&self) -> f64 {
        self.metric - self.identity_metric
    }
}

/// Run `kind` over `matrix`.
///
/// Never fails: empty and degenerate matrices get the identity ordering, and
/// the result is never scored below the identity ordering.
pub fn reorder(matrix: &[Vec<f64>], kind: StrategyKind, options: &ReorderOptions) -> ClusterOrdering {
    let grid = Grid::new(matrix);
    reorder_grid(&grid, kind.build(options).as_ref(), options)
}

/// Like [`reorder`], for a matrix whose width is known even when it has no rows.
pub fn reorder_with_cols(
    matrix: &[Vec<f64>],
    n_cols: usize,
    kind: StrategyKind,
    options: &ReorderOptions,
) -> ClusterOrdering {
    let grid = Grid::with_cols(matrix, n_cols);
    reorder_grid(&grid, kind.build(options).as_ref(), options)
}

/// Same as [`reorder`] for a caller-supplied strategy implementation.
pub fn reorder_grid(grid: &Grid<'_>, strategy: &dyn ReorderStrategy, options: &ReorderOptions) -> ClusterOrdering {
    let identity_rows = identity(grid.n_rows());
    let identity_cols = identity(grid.n_cols());
    let identity_metric = clustering_metric(grid, &identity_rows, &identity_cols);

    let (mut rows, mut cols) = strategy.reorder(grid);
    if !is_permutation(&rows, grid.n_rows()) || !is_permutation(&cols, grid.n_cols()) {
        log::warn!(
            "strategy '{}' returned an invalid permutation for a {}x{} matrix; using identity",
            strategy.name(),
            grid.n_rows(),
            grid.n_cols()
        );
        rows = identity_rows.clone();
        cols = identity_cols.clone();
    }

    if strategy.refines() {
        refine::adjacent_swaps(grid, &mut rows, &mut cols, options.max_passes);
    }

    let mut metric = clustering_metric(grid, &rows, &cols);
    if metric < identity_metric {
        log::debug!(
            "strategy '{}' scored {metric:.6} below identity {identity_metric:.6}; keeping identity",
            strategy.name()
        );
        rows = identity_rows;
        cols = identity_cols;
        metric = identity_metric;
    }

    log::debug!(
        "reordered {}x{} matrix with '{}': metric {:.6} (identity {:.6})",
        grid.n_rows(),
        grid.n_cols(),
        strategy.name(),
        metric,
        identity_metric
    );

    ClusterOrdering {
        strategy: strategy.name().to_string(),
        row_order: rows,
        col_order: cols,
        metric,
        identity_metric,
    }
}

/// Materialize the reordered matrix. Missing cells of ragged rows read as 0.0.
pub fn apply_ordering(matrix: &[Vec<f64>], ordering: &ClusterOrdering) -> Vec<Vec<f64>> {
    let grid = Grid::new(matrix);
    ordering
        .row_order
        .iter()
        .map(|&r| ordering.col_order.iter().map(|&c| grid.get(r, c)).collect())
        .collect()
}

/// Permute labels by an order produced for the same axis.
pub fn permute<T: Clone>(items: &[T], order: &[usize]) -> Vec<T> {
    order.iter().filter_map(|&i| items.get(i).cloned()).collect()
}
