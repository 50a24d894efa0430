/// Grid arrangement of subplots for one figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub columns: usize,
}

impl GridLayout {
    /// `ceil(n_plots / columns_per_row)` rows of `columns_per_row` cells
    pub fn for_plots(n_plots: usize, columns_per_row: usize) -> Self {
        let columns = columns_per_row.max(1);
        let rows = (n_plots as f64 / columns as f64).ceil() as usize;
        GridLayout { rows, columns }
    }

    pub fn single() -> Self {
        GridLayout { rows: 1, columns: 1 }
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Number of trailing cells in the last row that no plot fills
    pub fn cells_to_remove(&self, n_plots: usize) -> usize {
        let remainder = n_plots % self.columns;
        if remainder == 0 {
            0
        } else {
            self.columns - remainder
        }
    }

    /// Indices of the removed cells, rightmost first
    pub fn removed_cells(&self, n_plots: usize) -> Vec<usize> {
        if self.rows == 0 {
            return Vec::new();
        }
        let last_row_end = self.cell_count();
        (0..self.cells_to_remove(n_plots))
            .map(|j| last_row_end - 1 - j)
            .collect()
    }

    /// Figure width and height in figure units
    pub fn figure_size(&self, cell_size: f64) -> (f64, f64) {
        (cell_size * self.columns as f64, cell_size * self.rows as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_plots_three_per_row() {
        let grid = GridLayout::for_plots(7, 3);
        assert_eq!(grid, GridLayout { rows: 3, columns: 3 });
        assert_eq!(grid.cells_to_remove(7), 2);
        assert_eq!(grid.removed_cells(7), vec![8, 7]);
    }

    #[test]
    fn test_exact_multiple_removes_nothing() {
        for n in [3, 6, 9, 30] {
            let grid = GridLayout::for_plots(n, 3);
            assert_eq!(grid.cells_to_remove(n), 0);
            assert!(grid.removed_cells(n).is_empty());
        }
    }

    #[test]
    fn test_removal_count_formula() {
        for cols in 1..6 {
            for n in 1..20 {
                let grid = GridLayout::for_plots(n, cols);
                let expected = if n % cols == 0 { 0 } else { cols - n % cols };
                assert_eq!(grid.cells_to_remove(n), expected);
                assert_eq!(grid.cell_count() - grid.cells_to_remove(n), n);
            }
        }
    }

    #[test]
    fn test_single_row() {
        let grid = GridLayout::for_plots(1, 3);
        assert_eq!(grid.rows, 1);
        assert_eq!(grid.removed_cells(1), vec![2, 1]);
    }

    #[test]
    fn test_figure_size() {
        let grid = GridLayout::for_plots(4, 3);
        assert_eq!(grid.figure_size(5.0), (15.0, 10.0));
    }
}
