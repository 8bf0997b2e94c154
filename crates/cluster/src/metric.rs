use crate::grid::Grid;

/// Clustering-quality metric of an ordering.
///
/// Mean, over every 2x2 block of neighbouring cells (rows and columns taken in
/// the given order), of the squared sum of the four cells. Matrices with fewer
/// than two rows or columns have no blocks and score 0.
pub fn clustering_metric(grid: &Grid<'_>, row_order: &[usize], col_order: &[usize]) -> f64 {
    if row_order.len() < 2 || col_order.len() < 2 {
        return 0.0;
    }
    let total: f64 = row_order
        .windows(2)
        .map(|w| row_pair_score(grid, w[0], w[1], col_order))
        .sum();
    let blocks = (row_order.len() - 1) * (col_order.len() - 1);
    total / blocks as f64
}

/// Convenience wrapper over a plain matrix.
pub fn metric_of(matrix: &[Vec<f64>], row_order: &[usize], col_order: &[usize]) -> f64 {
    clustering_metric(&Grid::new(matrix), row_order, col_order)
}

/// Sum of squared block sums for two rows placed next to each other.
pub(crate) fn row_pair_score(grid: &Grid<'_>, r1: usize, r2: usize, col_order: &[usize]) -> f64 {
    col_order
        .windows(2)
        .map(|w| {
            let s = grid.get(r1, w[0]) + grid.get(r1, w[1]) + grid.get(r2, w[0]) + grid.get(r2, w[1]);
            s * s
        })
        .sum()
}

/// Sum of squared block sums for two columns placed next to each other.
pub(crate) fn col_pair_score(grid: &Grid<'_>, c1: usize, c2: usize, row_order: &[usize]) -> f64 {
    row_order
        .windows(2)
        .map(|w| {
            let s = grid.get(w[0], c1) + grid.get(w[1], c1) + grid.get(w[0], c2) + grid.get(w[1], c2);
            s * s
        })
        .sum()
}

pub fn identity(n: usize) -> Vec<usize> {
    (0..n).collect()
}

/// True when `order` is a bijection onto `0..n`.
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &i in order {
        if i >= n || seen[i] {
            return false;
        }
        seen[i] = true;
    }
    true
}

/// Inverse permutation: `positions(order)[item] == index of item in order`.
pub(crate) fn positions(order: &[usize]) -> Vec<usize> {
    let mut pos = vec![0; order.len()];
    for (p, &i) in order.iter().enumerate() {
        pos[i] = p;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block() {
        let m = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        // one block, sum 4, squared 16
        assert_eq!(metric_of(&m, &[0, 1], &[0, 1]), 16.0);
    }

    #[test]
    fn mean_over_blocks() {
        let m = vec![vec![1.0, 0.0, 0.0], vec![1.0, 0.0, 0.0]];
        // blocks: (1+0+1+0)^2 = 4 and 0 → mean 2
        assert_eq!(metric_of(&m, &[0, 1], &[0, 1, 2]), 2.0);
    }

    #[test]
    fn adjacency_of_hot_cells_is_rewarded() {
        let m = vec![vec![1.0, 0.0, 1.0], vec![1.0, 0.0, 1.0]];
        let spread = metric_of(&m, &[0, 1], &[0, 1, 2]);
        let packed = metric_of(&m, &[0, 1], &[0, 2, 1]);
        assert!(packed > spread);
    }

    #[test]
    fn degenerate_shapes_score_zero() {
        assert_eq!(metric_of(&[], &[], &[]), 0.0);
        assert_eq!(metric_of(&[vec![0.9]], &[0], &[0]), 0.0);
        assert_eq!(metric_of(&[vec![0.9, 0.9]], &[0], &[0, 1]), 0.0);
    }

    #[test]
    fn permutation_checks() {
        assert!(is_permutation(&[2, 0, 1], 3));
        assert!(is_permutation(&[], 0));
        assert!(!is_permutation(&[0, 0, 1], 3));
        assert!(!is_permutation(&[0, 1], 3));
        assert!(!is_permutation(&[0, 1, 3], 3));
    }

    #[test]
    fn positions_invert_order() {
        assert_eq!(positions(&[2, 0, 1]), vec![1, 2, 0]);
    }
}
