//! Spectral co-clustering order.
//!
//! Works on the floor-subtracted matrix A. With row sums r and column sums c,
//! the normalized matrix An = D_r^-1/2 · A · D_c^-1/2 has a trivial top
//! singular pair (sqrt(r), sqrt(c)). The second left singular vector, found
//! by power iteration on An·Anᵀ with the trivial vector deflated, gives a 1-D
//! embedding of rows; projecting it through Anᵀ embeds the columns. Rows and
//! columns are sorted by their embedding.
//!
//! Rows or columns with no heat above the floor cannot be embedded and are
//! placed last. Whenever the embedding degenerates the axis falls back to
//! heat mass, heaviest first.

use ordered_float::OrderedFloat;

use crate::grid::Grid;
use crate::strategy::{weight, ReorderStrategy};

const MAX_ITERATIONS: usize = 200;
const TOLERANCE: f64 = 1e-10;
const DEGENERATE: f64 = 1e-12;

pub struct Spectral {
    floor: f64,
}

impl Spectral {
    pub fn new(floor: f64) -> Self {
        Self { floor }
    }
}

impl ReorderStrategy for Spectral {
    fn name(&self) -> &'static str {
        "spectral"
    }

    fn reorder(&self, grid: &Grid<'_>) -> (Vec<usize>, Vec<usize>) {
        let n = grid.n_rows();
        let m = grid.n_cols();
        let a: Vec<Vec<f64>> = (0..n)
            .map(|r| (0..m).map(|c| weight(grid.get(r, c), self.floor)).collect())
            .collect();
        let row_mass: Vec<f64> = a.iter().map(|row| row.iter().sum()).collect();
        let col_mass: Vec<f64> = (0..m).map(|c| a.iter().map(|row| row[c]).sum()).collect();

        let live_rows: Vec<usize> = (0..n).filter(|&r| row_mass[r] > 0.0).collect();
        let live_cols: Vec<usize> = (0..m).filter(|&c| col_mass[c] > 0.0).collect();

        let embedding = if live_rows.len() >= 2 && live_cols.len() >= 2 {
            embed(&a, &row_mass, &col_mass, &live_rows, &live_cols)
        } else {
            None
        };

        match embedding {
            Some((row_scores, col_scores)) => (
                finish(&live_rows, &row_scores, &row_mass),
                finish(&live_cols, &col_scores, &col_mass),
            ),
            None => {
                log::debug!("spectral embedding degenerate for {n}x{m} matrix; ordering by heat mass");
                (by_mass(&row_mass), by_mass(&col_mass))
            }
        }
    }
}

/// Row and column scores for the live sub-matrix, or `None` when the second
/// singular vector vanishes.
fn embed(
    a: &[Vec<f64>],
    row_mass: &[f64],
    col_mass: &[f64],
    live_rows: &[usize],
    live_cols: &[usize],
) -> Option<(Vec<f64>, Vec<f64>)> {
    let p = live_rows.len();
    let q = live_cols.len();

    let an: Vec<Vec<f64>> = live_rows
        .iter()
        .map(|&r| {
            live_cols
                .iter()
                .map(|&c| a[r][c] / (row_mass[r].sqrt() * col_mass[c].sqrt()))
                .collect()
        })
        .collect();

    // Trivial top vector, unit length.
    let mut u1: Vec<f64> = live_rows.iter().map(|&r| row_mass[r].sqrt()).collect();
    normalize(&mut u1)?;

    // Deterministic start: a ramp, orthogonalized against u1.
    let mut x: Vec<f64> = (0..p).map(|i| (i + 1) as f64).collect();
    deflate(&mut x, &u1);
    normalize(&mut x)?;

    let apply = |x: &[f64]| -> Vec<f64> {
        let y: Vec<f64> = (0..q).map(|j| (0..p).map(|i| an[i][j] * x[i]).sum()).collect();
        (0..p).map(|i| (0..q).map(|j| an[i][j] * y[j]).sum()).collect()
    };

    for _ in 0..MAX_ITERATIONS {
        let mut next = apply(&x);
        deflate(&mut next, &u1);
        normalize(&mut next)?;
        let shift: f64 = next.iter().zip(&x).map(|(a, b)| (a - b).abs()).fold(0.0, f64::max);
        x = next;
        if shift < TOLERANCE {
            break;
        }
    }

    let mut row_scores: Vec<f64> = live_rows
        .iter()
        .zip(&x)
        .map(|(&r, xi)| xi / row_mass[r].sqrt())
        .collect();
    let mut col_scores: Vec<f64> = live_cols
        .iter()
        .enumerate()
        .map(|(j, &c)| {
            let yj: f64 = (0..p).map(|i| an[i][j] * x[i]).sum();
            yj / col_mass[c].sqrt()
        })
        .collect();

    // Orient so the hottest row leads.
    let hottest = (0..p)
        .max_by_key(|&i| (OrderedFloat(row_mass[live_rows[i]]), std::cmp::Reverse(i)))
        .unwrap_or(0);
    let median = {
        let mut sorted = row_scores.clone();
        sorted.sort_by_key(|v| OrderedFloat(*v));
        sorted[p / 2]
    };
    if row_scores[hottest] > median {
        row_scores.iter_mut().for_each(|v| *v = -*v);
        col_scores.iter_mut().for_each(|v| *v = -*v);
    }

    Some((row_scores, col_scores))
}

fn deflate(x: &mut [f64], u: &[f64]) {
    let dot: f64 = x.iter().zip(u).map(|(a, b)| a * b).sum();
    for (xi, ui) in x.iter_mut().zip(u) {
        *xi -= dot * ui;
    }
}

fn normalize(x: &mut [f64]) -> Option<()> {
    let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
    if !norm.is_finite() || norm < DEGENERATE {
        return None;
    }
    x.iter_mut().for_each(|v| *v /= norm);
    Some(())
}

/// Live items by score (ties: heavier first, then index), then dead items in
/// index order.
fn finish(live: &[usize], scores: &[f64], mass: &[f64]) -> Vec<usize> {
    let mut keyed: Vec<(OrderedFloat<f64>, std::cmp::Reverse<OrderedFloat<f64>>, usize)> = live
        .iter()
        .zip(scores)
        .map(|(&i, s)| (OrderedFloat(*s), std::cmp::Reverse(OrderedFloat(mass[i])), i))
        .collect();
    keyed.sort();
    let mut order: Vec<usize> = keyed.into_iter().map(|(_, _, i)| i).collect();
    order.extend((0..mass.len()).filter(|i| !live.contains(i)));
    order
}

fn by_mass(mass: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..mass.len()).collect();
    order.sort_by_key(|&i| (std::cmp::Reverse(OrderedFloat(mass[i])), i));
    order
}
