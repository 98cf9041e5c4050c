use std::fmt::Debug;
use std::time::Duration;

use gb_matrix::Matrix;

use crate::error::{BackendError, Result};

/// Identity of the library behind a backend, as reported in benchmark
/// output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    /// Library name, e.g. "matrixmultiply" or "wgpu".
    pub name: String,
    /// Driver or library version when the backend exposes one.
    pub version: Option<String>,
}

/// Result of a timed benchmark run.
#[derive(Debug)]
pub struct TimedRun {
    /// Wall time of the timed loop, measured on a monotonic clock.
    pub elapsed: Duration,
    /// The product matrix, row-major, equal to a single multiply of the
    /// operands.
    pub output: Matrix,
}

/// Trait for pluggable GEMM backends (CPU, wgpu, etc.).
///
/// A backend owns whatever device state it needs and exposes one
/// measured operation. Operand transfer and result readback, where a
/// backend has any, stay outside the timed region; the timed loop
/// covers computation only.
pub trait GemmBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu", "wgpu").
    fn name(&self) -> &str;

    /// Returns the report identity of the library doing the work.
    fn engine(&self) -> EngineInfo;

    /// Timed matrix multiplication: C = A @ B, `repeats` times.
    ///
    /// - validates that `a.cols() == b.rows()`
    /// - performs one untimed warmup multiply
    /// - times exactly `repeats` multiplies, draining any in-flight
    ///   work before the clock stops
    ///
    /// Returns the elapsed time of the timed loop and the product.
    fn multiply_timed(&self, a: &Matrix, b: &Matrix, repeats: usize) -> Result<TimedRun>;
}

/// Validate operand shapes and return `(m, k, n)`.
pub(crate) fn check_dims(a: &Matrix, b: &Matrix) -> Result<(usize, usize, usize)> {
    if a.cols() != b.rows() {
        return Err(BackendError::ShapeMismatch {
            m: a.rows(),
            k: a.cols(),
            k2: b.rows(),
            n: b.cols(),
        });
    }
    Ok((a.rows(), a.cols(), b.cols()))
}
