//! Agglomerative clustering with Ward linkage.
//!
//! Rows (and columns) start as singleton clusters over their floor-subtracted
//! heat profiles and are merged bottom-up, cheapest Ward merge first. The leaf
//! order of the finished dendrogram is the new order; at every merge the
//! hotter subtree goes first.

use ordered_float::OrderedFloat;

use crate::grid::Grid;
use crate::metric::identity;
use crate::strategy::{weight, ReorderStrategy};

pub struct Hierarchical {
    floor: f64,
}

impl Hierarchical {
    pub fn new(floor: f64) -> Self {
        Self { floor }
    }

    fn profiles(&self, grid: &Grid<'_>, by_row: bool) -> Vec<Vec<f64>> {
        let (outer, inner) = if by_row {
            (grid.n_rows(), grid.n_cols())
        } else {
            (grid.n_cols(), grid.n_rows())
        };
        (0..outer)
            .map(|i| {
                (0..inner)
                    .map(|j| weight(if by_row { grid.get(i, j) } else { grid.get(j, i) }, self.floor))
                    .collect()
            })
            .collect()
    }
}

impl ReorderStrategy for Hierarchical {
    fn name(&self) -> &'static str {
        "hierarchical"
    }

    fn reorder(&self, grid: &Grid<'_>) -> (Vec<usize>, Vec<usize>) {
        (
            leaf_order(&self.profiles(grid, true)),
            leaf_order(&self.profiles(grid, false)),
        )
    }
}

struct Cluster {
    /// Leaves in dendrogram order.
    leaves: Vec<usize>,
    mass: f64,
}

impl Cluster {
    fn first_leaf(&self) -> usize {
        self.leaves.iter().copied().min().unwrap_or(usize::MAX)
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Dendrogram leaf order. Ties between equal merge costs go to the lowest
/// cluster indices.
pub(crate) fn leaf_order(profiles: &[Vec<f64>]) -> Vec<usize> {
    let n = profiles.len();
    if n < 2 {
        return identity(n);
    }

    let mut clusters: Vec<Option<Cluster>> = profiles
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Some(Cluster {
                leaves: vec![i],
                mass: p.iter().sum(),
            })
        })
        .collect();

    // Ward merge cost: increase in within-cluster sum of squares.
    let mut cost = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i + 1..n {
            let c = squared_distance(&profiles[i], &profiles[j]) / 2.0;
            cost[i][j] = c;
            cost[j][i] = c;
        }
    }

    for _ in 1..n {
        let active: Vec<usize> = (0..n).filter(|&i| clusters[i].is_some()).collect();
        let mut best: Option<(OrderedFloat<f64>, usize, usize)> = None;
        for (a, &i) in active.iter().enumerate() {
            for &j in &active[a + 1..] {
                let key = (OrderedFloat(cost[i][j]), i, j);
                if best.map_or(true, |b| key < b) {
                    best = Some(key);
                }
            }
        }
        let Some((_, i, j)) = best else { break };

        let size = |k: usize| clusters[k].as_ref().map_or(0, |c| c.leaves.len()) as f64;
        let (ni, nj) = (size(i), size(j));
        // Lance-Williams update for Ward.
        for &k in &active {
            if k == i || k == j {
                continue;
            }
            let nk = size(k);
            let c = ((ni + nk) * cost[k][i] + (nj + nk) * cost[k][j] - nk * cost[i][j]) / (ni + nj + nk);
            cost[i][k] = c;
            cost[k][i] = c;
        }

        if let (Some(left), Some(right)) = (clusters[i].take(), clusters[j].take()) {
            clusters[i] = Some(join(left, right));
        }
    }

    clusters
        .into_iter()
        .flatten()
        .next()
        .map(|c| c.leaves)
        .unwrap_or_else(|| identity(n))
}

/// Hotter subtree first; equal mass keeps the lower leaf first.
fn join(a: Cluster, b: Cluster) -> Cluster {
    let a_first = match b.mass.total_cmp(&a.mass) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => a.first_leaf() <= b.first_leaf(),
    };
    let (mut first, second) = if a_first { (a, b) } else { (b, a) };
    first.leaves.extend(second.leaves);
    first.mass += second.mass;
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_matching_profiles() {
        let m = vec![
            vec![0.9, 0.05, 0.9, 0.05],
            vec![0.05, 0.6, 0.05, 0.6],
            vec![0.9, 0.05, 0.9, 0.05],
            vec![0.05, 0.6, 0.05, 0.6],
        ];
        let (rows, cols) = Hierarchical::new(0.05).reorder(&Grid::new(&m));
        assert_eq!(rows, vec![0, 2, 1, 3]);
        assert_eq!(cols, vec![0, 2, 1, 3]);
    }

    #[test]
    fn hot_cluster_leads() {
        let profiles = vec![vec![0.0, 0.0], vec![0.8, 0.8], vec![0.0, 0.1], vec![0.8, 0.7]];
        assert_eq!(leaf_order(&profiles), vec![1, 3, 2, 0]);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(leaf_order(&[]), Vec::<usize>::new());
        assert_eq!(leaf_order(&[vec![0.5]]), vec![0]);
        assert_eq!(leaf_order(&[vec![0.0], vec![0.0], vec![0.0]]), vec![0, 1, 2]);
    }
}
