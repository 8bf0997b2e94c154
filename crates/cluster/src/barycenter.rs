//! Iterated barycenter ordering.
//!
//! Each sweep places every row at the heat-weighted mean position of its
//! columns, then every column at the weighted mean position of its rows.
//! The best ordering seen across sweeps wins; sweeping stops once a sweep
//! fails to improve on it.

use ordered_float::OrderedFloat;

use crate::grid::Grid;
use crate::metric::{clustering_metric, identity, positions};
use crate::strategy::{weight, ReorderStrategy};

pub struct Barycenter {
    floor: f64,
    max_sweeps: usize,
}

impl Barycenter {
    pub fn new(floor: f64, max_sweeps: usize) -> Self {
        Self {
            floor,
            max_sweeps: max_sweeps.max(1),
        }
    }
}

impl ReorderStrategy for Barycenter {
    fn name(&self) -> &'static str {
        "barycenter"
    }

    fn reorder(&self, grid: &Grid<'_>) -> (Vec<usize>, Vec<usize>) {
        let mut rows = identity(grid.n_rows());
        let mut cols = identity(grid.n_cols());
        if grid.is_empty() {
            return (rows, cols);
        }

        let mut best = (rows.clone(), cols.clone());
        let mut best_metric = clustering_metric(grid, &rows, &cols);

        for sweep in 0..self.max_sweeps {
            let col_pos = positions(&cols);
            rows = sort_by_barycenter(&rows, |r| {
                barycenter(
                    (0..grid.n_cols()).map(|c| (col_pos[c], weight(grid.get(r, c), self.floor))),
                    grid.n_cols(),
                )
            });
            let row_pos = positions(&rows);
            cols = sort_by_barycenter(&cols, |c| {
                barycenter(
                    (0..grid.n_rows()).map(|r| (row_pos[r], weight(grid.get(r, c), self.floor))),
                    grid.n_rows(),
                )
            });

            let metric = clustering_metric(grid, &rows, &cols);
            log::trace!("barycenter sweep {sweep}: metric {metric:.6}");
            if metric > best_metric {
                best_metric = metric;
                best = (rows.clone(), cols.clone());
            } else {
                break;
            }
        }
        best
    }
}

/// Weighted mean position; items with no weight sort after everything else.
fn barycenter(cells: impl Iterator<Item = (usize, f64)>, empty_position: usize) -> f64 {
    let (mut num, mut den) = (0.0, 0.0);
    for (pos, w) in cells {
        num += pos as f64 * w;
        den += w;
    }
    if den > 0.0 {
        num / den
    } else {
        empty_position as f64
    }
}

/// Stable sort of `order` by key, ties kept in current order.
fn sort_by_barycenter<F>(order: &[usize], key: F) -> Vec<usize>
where
    F: Fn(usize) -> f64,
{
    let mut keyed: Vec<(OrderedFloat<f64>, usize, usize)> = order
        .iter()
        .enumerate()
        .map(|(pos, &item)| (OrderedFloat(key(item)), pos, item))
        .collect();
    keyed.sort();
    keyed.into_iter().map(|(_, _, item)| item).collect()
}
