use std::time::Instant;

use gb_matrix::{Layout, Matrix};

use crate::backend::{check_dims, EngineInfo, GemmBackend, TimedRun};
use crate::error::Result;

/// CPU backend over the `matrixmultiply` crate.
///
/// Always available. Operands in either layout are handled through
/// explicit strides, so no conversion copy is made on this path.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Row and column strides of a matrix in the given layout.
fn strides(rows: usize, cols: usize, layout: Layout) -> (isize, isize) {
    match layout {
        Layout::RowMajor => (cols as isize, 1),
        Layout::ColMajor => (1, rows as isize),
    }
}

/// C = A @ B into a row-major output slice.
fn sgemm_into(a: &Matrix, b: &Matrix, out: &mut [f32], m: usize, k: usize, n: usize) {
    let (rsa, csa) = strides(m, k, a.layout());
    let (rsb, csb) = strides(k, n, b.layout());
    unsafe {
        matrixmultiply::sgemm(
            m,
            k,
            n,
            1.0,
            a.as_slice().as_ptr(),
            rsa,
            csa,
            b.as_slice().as_ptr(),
            rsb,
            csb,
            0.0,
            out.as_mut_ptr(),
            n as isize,
            1,
        );
    }
}

impl GemmBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn engine(&self) -> EngineInfo {
        EngineInfo {
            name: "matrixmultiply".to_string(),
            version: None,
        }
    }

    fn multiply_timed(&self, a: &Matrix, b: &Matrix, repeats: usize) -> Result<TimedRun> {
        let (m, k, n) = check_dims(a, b)?;
        let mut out = vec![0.0f32; m * n];

        // Warmup multiply, outside the timed region.
        sgemm_into(a, b, &mut out, m, k, n);

        let start = Instant::now();
        for _ in 0..repeats {
            sgemm_into(a, b, &mut out, m, k, n);
        }
        let elapsed = start.elapsed();

        Ok(TimedRun {
            elapsed,
            output: Matrix::from_vec(m, n, Layout::RowMajor, out),
        })
    }
}
