use crate::matrix::Matrix;

/// Sum of all elements, accumulated in f64.
///
/// Used to compare outputs across backends and implementations. The f64
/// accumulator keeps the result independent of element order within
/// floating-point tolerance, so matrices in different layouts checksum
/// equal. An empty matrix checksums to 0.0.
pub fn checksum(matrix: &Matrix) -> f64 {
    matrix.as_slice().iter().map(|&v| v as f64).sum()
}
