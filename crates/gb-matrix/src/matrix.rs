/// Linear order of a matrix's backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Element `(row, col)` lives at `row * cols + col`.
    RowMajor,
    /// Element `(row, col)` lives at `col * rows + row`.
    ColMajor,
}

/// A dense f32 matrix with an explicit storage layout.
///
/// Holds contiguous data in a single allocation. Kernels that prefer a
/// particular traversal order convert with `to_layout` up front instead of
/// paying strided access inside their inner loops.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    layout: Layout,
    data: Vec<f32>,
}

impl Matrix {
    /// Create a matrix from existing storage.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, layout: Layout, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "data length {} does not match {}x{} matrix",
            data.len(),
            rows,
            cols
        );
        Matrix {
            rows,
            cols,
            layout,
            data,
        }
    }

    /// Create a zero-filled row-major matrix.
    pub fn zeroed(rows: usize, cols: usize) -> Self {
        Matrix {
            rows,
            cols,
            layout: Layout::RowMajor,
            data: vec![0.0; rows * cols],
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Storage layout of the backing data.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Layout-aware element access.
    ///
    /// # Panics
    /// Panics if `row` or `col` is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({}, {}) out of bounds for {}x{} matrix",
            row,
            col,
            self.rows,
            self.cols
        );
        match self.layout {
            Layout::RowMajor => self.data[row * self.cols + col],
            Layout::ColMajor => self.data[col * self.rows + row],
        }
    }

    /// Borrow the backing storage in its current layout.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume the matrix and return its backing storage.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Return a copy of this matrix with the requested storage layout.
    ///
    /// Returns a plain clone when the layout already matches.
    pub fn to_layout(&self, layout: Layout) -> Matrix {
        if self.layout == layout {
            return self.clone();
        }
        let mut data = Vec::with_capacity(self.data.len());
        match layout {
            Layout::RowMajor => {
                for row in 0..self.rows {
                    for col in 0..self.cols {
                        data.push(self.data[col * self.rows + row]);
                    }
                }
            }
            Layout::ColMajor => {
                for col in 0..self.cols {
                    for row in 0..self.rows {
                        data.push(self.data[row * self.cols + col]);
                    }
                }
            }
        }
        Matrix {
            rows: self.rows,
            cols: self.cols,
            layout,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_and_get() {
        // [1,2,3;4,5,6] row-major
        let m = Matrix::from_vec(2, 3, Layout::RowMajor, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(0, 2), 3.0);
        assert_eq!(m.get(1, 1), 5.0);
    }

    #[test]
    fn test_col_major_get() {
        // Same [1,2,3;4,5,6] stored column by column
        let m = Matrix::from_vec(2, 3, Layout::ColMajor, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(1, 2), 6.0);
    }

    #[test]
    fn test_to_layout_round_trip() {
        let m = Matrix::from_vec(2, 3, Layout::RowMajor, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let c = m.to_layout(Layout::ColMajor);
        assert_eq!(c.layout(), Layout::ColMajor);
        assert_eq!(c.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        // Elements are unchanged under either layout
        for row in 0..2 {
            for col in 0..3 {
                assert_eq!(m.get(row, col), c.get(row, col));
            }
        }
        let back = c.to_layout(Layout::RowMajor);
        assert_eq!(back, m);
    }

    #[test]
    fn test_to_layout_same_is_clone() {
        let m = Matrix::from_vec(2, 2, Layout::RowMajor, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.to_layout(Layout::RowMajor), m);
    }

    #[test]
    fn test_zeroed() {
        let m = Matrix::zeroed(3, 2);
        assert_eq!(m.len(), 6);
        assert!(m.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn test_from_vec_length_mismatch_panics() {
        Matrix::from_vec(2, 2, Layout::RowMajor, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_matrix() {
        let m = Matrix::zeroed(0, 5);
        assert!(m.is_empty());
        assert_eq!(m.to_layout(Layout::ColMajor).len(), 0);
    }
}
