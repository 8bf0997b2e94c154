/// Read-only view over a possibly ragged matrix.
///
/// Width is the longest row (or a caller-supplied minimum). Cells past the end
/// of a short row, and non-finite values, read as 0.0.
#[derive(Debug, Clone, Copy)]
pub struct Grid<'a> {
    rows: &'a [Vec<f64>],
    n_cols: usize,
}

impl<'a> Grid<'a> {
    pub fn new(rows: &'a [Vec<f64>]) -> Self {
        Self::with_cols(rows, 0)
    }

    pub fn with_cols(rows: &'a [Vec<f64>], n_cols: usize) -> Self {
        let widest = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        Self {
            rows,
            n_cols: widest.max(n_cols),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.n_cols == 0
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self.rows.get(row).and_then(|r| r.get(col)) {
            Some(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }

    pub fn row(&self, row: usize) -> Vec<f64> {
        (0..self.n_cols).map(|c| self.get(row, c)).collect()
    }

    pub fn col(&self, col: usize) -> Vec<f64> {
        (0..self.n_rows()).map(|r| self.get(r, col)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_pad_with_zero() {
        let m = vec![vec![1.0, 2.0, 3.0], vec![4.0]];
        let g = Grid::new(&m);
        assert_eq!(g.n_cols(), 3);
        assert_eq!(g.get(1, 2), 0.0);
        assert_eq!(g.row(1), vec![4.0, 0.0, 0.0]);
        assert_eq!(g.col(0), vec![1.0, 4.0]);
    }

    #[test]
    fn non_finite_reads_as_zero() {
        let m = vec![vec![f64::NAN, f64::INFINITY, 0.5]];
        let g = Grid::new(&m);
        assert_eq!(g.get(0, 0), 0.0);
        assert_eq!(g.get(0, 1), 0.0);
        assert_eq!(g.get(0, 2), 0.5);
    }

    #[test]
    fn declared_width_survives_zero_rows() {
        let g = Grid::with_cols(&[], 19);
        assert_eq!(g.n_rows(), 0);
        assert_eq!(g.n_cols(), 19);
        assert!(g.is_empty());
    }
}
