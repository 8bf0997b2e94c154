//! Local search: swap neighbouring rows/columns while the metric improves.
//!
//! Swapping positions p and p+1 only changes the two outer neighbour pairs,
//! since a pair's block sums are symmetric in its two members. The delta is
//! computed from those pairs alone.

use crate::grid::Grid;
use crate::metric::{col_pair_score, row_pair_score};

const MIN_GAIN: f64 = 1e-12;

/// Alternates row and column sweeps until a full pass makes no swap or
/// `max_passes` is reached. Every accepted swap strictly raises the metric.
pub fn adjacent_swaps(grid: &Grid<'_>, rows: &mut [usize], cols: &mut [usize], max_passes: usize) -> usize {
    let mut swaps = 0;
    for _ in 0..max_passes {
        let row_swaps = sweep(rows, |a, b, order| row_pair_score(grid, a, b, order), cols);
        let col_swaps = sweep(cols, |a, b, order| col_pair_score(grid, a, b, order), rows);
        swaps += row_swaps + col_swaps;
        if row_swaps + col_swaps == 0 {
            break;
        }
    }
    swaps
}

fn sweep<F>(order: &mut [usize], pair_score: F, other: &[usize]) -> usize
where
    F: Fn(usize, usize, &[usize]) -> f64,
{
    let n = order.len();
    if n < 2 || other.len() < 2 {
        return 0;
    }
    let mut swaps = 0;
    for p in 0..n - 1 {
        let a = order[p];
        let b = order[p + 1];
        let mut before = 0.0;
        let mut after = 0.0;
        if p > 0 {
            let prev = order[p - 1];
            before += pair_score(prev, a, other);
            after += pair_score(prev, b, other);
        }
        if p + 2 < n {
            let next = order[p + 2];
            before += pair_score(b, next, other);
            after += pair_score(a, next, other);
        }
        if after - before > MIN_GAIN {
            order.swap(p, p + 1);
            swaps += 1;
        }
    }
    swaps
}
