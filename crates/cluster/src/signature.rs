//! Heat-signature chaining.
//!
//! Every row (and column) is described by its floor-subtracted heat profile.
//! The chain starts from the item with the most high-risk cells and then
//! repeatedly appends the unvisited item whose profile is closest, so items
//! with similar signatures end up next to each other.

use ordered_float::OrderedFloat;

use crate::grid::Grid;
use crate::strategy::{weight, ReorderStrategy};

/// Cells at or above this heat count as high-risk when picking the seed.
const HIGH_HEAT: f64 = 0.6;

pub struct HeatSignature {
    floor: f64,
}

impl HeatSignature {
    pub fn new(floor: f64) -> Self {
        Self { floor }
    }

    fn profiles(&self, grid: &Grid<'_>, by_row: bool) -> Vec<Profile> {
        let (outer, inner) = if by_row {
            (grid.n_rows(), grid.n_cols())
        } else {
            (grid.n_cols(), grid.n_rows())
        };
        (0..outer)
            .map(|i| {
                let raw: Vec<f64> = (0..inner)
                    .map(|j| if by_row { grid.get(i, j) } else { grid.get(j, i) })
                    .collect();
                Profile {
                    high: raw.iter().filter(|v| **v >= HIGH_HEAT).count(),
                    signature: raw.iter().map(|v| weight(*v, self.floor)).collect(),
                }
            })
            .collect()
    }
}

struct Profile {
    high: usize,
    signature: Vec<f64>,
}

impl Profile {
    fn mass(&self) -> f64 {
        self.signature.iter().sum()
    }

    fn distance(&self, other: &Profile) -> f64 {
        self.signature
            .iter()
            .zip(&other.signature)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl ReorderStrategy for HeatSignature {
    fn name(&self) -> &'static str {
        "heat_signature"
    }

    fn reorder(&self, grid: &Grid<'_>) -> (Vec<usize>, Vec<usize>) {
        (
            chain(&self.profiles(grid, true)),
            chain(&self.profiles(grid, false)),
        )
    }
}

/// Greedy nearest-neighbour chain. Ties prefer the heavier item, then the
/// lower index.
fn chain(profiles: &[Profile]) -> Vec<usize> {
    let n = profiles.len();
    if n == 0 {
        return Vec::new();
    }
    let masses: Vec<f64> = profiles.iter().map(Profile::mass).collect();

    let seed = (0..n)
        .max_by_key(|&i| (profiles[i].high, OrderedFloat(masses[i]), std::cmp::Reverse(i)))
        .unwrap_or(0);

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    visited[seed] = true;
    order.push(seed);

    let mut current = seed;
    while order.len() < n {
        let next = (0..n)
            .filter(|&j| !visited[j])
            .min_by_key(|&j| {
                (
                    OrderedFloat(profiles[current].distance(&profiles[j])),
                    std::cmp::Reverse(OrderedFloat(masses[j])),
                    j,
                )
            });
        let Some(next) = next else { break };
        visited[next] = true;
        order.push(next);
        current = next;
    }
    order
}
