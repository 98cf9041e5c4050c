use gb_backend::{select, BackendRequest};
use gb_matrix::{checksum, generate};

use crate::error::{BenchError, Result};
use crate::report::{Engine, InputSummary, OutputMetrics, Report};

/// Seed for the left operand A.
pub const SEED_LEFT: u32 = 1;
/// Seed for the right operand B.
pub const SEED_RIGHT: u32 = 2;

/// Parameters of one benchmark run.
///
/// Dimensions arrive as raw i64 so out-of-range command-line input
/// reaches validation intact. The output matrix is square: M = N.
#[derive(Debug, Clone)]
pub struct BenchParams {
    pub n: i64,
    pub k: i64,
    pub repeats: i64,
    pub backend: BackendRequest,
}

impl Default for BenchParams {
    fn default() -> Self {
        BenchParams {
            n: 2048,
            k: 2048,
            repeats: 50,
            backend: BackendRequest::Auto,
        }
    }
}

/// GFLOPS for `repeats` multiplies of an [m x k] by [k x n] product.
///
/// Each multiply costs 2*m*n*k floating-point operations.
pub fn gflops(m: usize, n: usize, k: usize, repeats: usize, elapsed_sec: f64) -> f64 {
    let ops = 2.0 * m as f64 * n as f64 * k as f64 * repeats as f64;
    ops / (elapsed_sec * 1e9)
}

/// Execute one benchmark run and assemble its report.
///
/// Returns `Err` only for usage errors (non-positive dimensions or
/// repeats). Backend failures are handled outcomes: the report carries
/// an `error` field instead of measurements, and the caller still has
/// something to print.
pub fn run(params: &BenchParams) -> Result<Report> {
    if params.n <= 0 || params.k <= 0 || params.repeats <= 0 {
        return Err(BenchError::InvalidArguments {
            n: params.n,
            k: params.k,
            repeats: params.repeats,
        });
    }
    let n = params.n as usize;
    let k = params.k as usize;
    let repeats = params.repeats as usize;
    let m = n;
    let input = InputSummary::new(m, n, k, repeats);

    // Resolve before any generation work; AUTO probes exactly once.
    let backend = match select(params.backend) {
        Ok(backend) => backend,
        Err(err) => {
            return Ok(Report::failure(
                requested_engine(params.backend),
                input,
                err.to_string(),
            ));
        }
    };
    log::info!("backend resolved: {}", backend.name());

    let a = generate(m, k, SEED_LEFT);
    let b = generate(k, n, SEED_RIGHT);
    log::debug!("operands generated: {}x{} and {}x{}", m, k, k, n);

    match backend.multiply_timed(&a, &b, repeats) {
        Ok(timed) => {
            let time_sec = timed.elapsed.as_secs_f64();
            if time_sec <= 0.0 {
                return Ok(Report::failure(
                    backend.engine().into(),
                    input,
                    "timer reported non-positive elapsed time".to_string(),
                ));
            }
            let metrics = OutputMetrics {
                time_sec,
                gflops: gflops(m, n, k, repeats, time_sec),
                checksum: checksum(&timed.output),
            };
            Ok(Report::success(backend.engine().into(), input, metrics))
        }
        Err(err) => Ok(Report::failure(backend.engine().into(), input, err.to_string())),
    }
}

/// Report identity for a request that never produced a backend.
fn requested_engine(request: BackendRequest) -> Engine {
    match request {
        // Selection only fails for explicit GPU requests.
        BackendRequest::Gpu => Engine {
            name: "wgpu".to_string(),
            version: None,
        },
        BackendRequest::Auto | BackendRequest::Cpu => Engine {
            name: "cpu".to_string(),
            version: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn cpu_params(n: i64, k: i64, repeats: i64) -> BenchParams {
        BenchParams {
            n,
            k,
            repeats,
            backend: BackendRequest::Cpu,
        }
    }

    #[test]
    fn test_rejects_nonpositive_arguments() {
        for params in [
            cpu_params(0, 4, 1),
            cpu_params(4, 0, 1),
            cpu_params(4, 4, 0),
            cpu_params(-1, 4, 1),
            cpu_params(4, -2, 1),
            cpu_params(4, 4, -1),
        ] {
            let err = run(&params).unwrap_err();
            assert!(matches!(err, BenchError::InvalidArguments { .. }));
        }
    }

    #[test]
    fn test_backend_error_message_passes_through() {
        let err = BenchError::from(gb_backend::BackendError::UnknownRequest {
            name: "tpu".to_string(),
        });
        assert!(err.to_string().contains("unknown backend request 'tpu'"));
    }

    #[test]
    fn test_defaults() {
        let params = BenchParams::default();
        assert_eq!(params.n, 2048);
        assert_eq!(params.k, 2048);
        assert_eq!(params.repeats, 50);
        assert_eq!(params.backend, BackendRequest::Auto);
    }

    #[test]
    fn test_gflops_formula() {
        let g = gflops(2048, 2048, 2048, 1, 1.0);
        assert!((g - 17.179869184).abs() < 1e-9);
        // Scales linearly with repeats, inversely with time
        assert!((gflops(2048, 2048, 2048, 2, 1.0) - 2.0 * g).abs() < 1e-9);
        assert!((gflops(2048, 2048, 2048, 1, 2.0) - g / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_cpu_run_small() {
        let report = run(&cpu_params(4, 4, 3)).unwrap();
        assert_eq!(report.engine.name, "matrixmultiply");
        assert_eq!(report.input.m, 4);
        assert_eq!(report.input.n, 4);
        assert_eq!(report.input.k, 4);
        assert_eq!(report.input.repeats, 3);
        assert_eq!(report.input.expected_bytes_total, 192);
        assert!(report.error.is_none());
        let output = report.output.expect("cpu run must produce output");
        assert!(output.time_sec > 0.0);
        assert!(output.gflops > 0.0);
        // Reference checksum for seeds 1 and 2 at 4x4
        assert_abs_diff_eq!(output.checksum, 1.2669054269790649, epsilon = 1e-4);
    }

    #[test]
    fn test_checksum_independent_of_repeats() {
        let once = run(&cpu_params(8, 8, 1)).unwrap().output.unwrap();
        let many = run(&cpu_params(8, 8, 4)).unwrap().output.unwrap();
        assert_eq!(once.checksum, many.checksum);
    }

    #[test]
    fn test_auto_run_always_reports_output() {
        let params = BenchParams {
            n: 4,
            k: 4,
            repeats: 1,
            backend: BackendRequest::Auto,
        };
        let report = run(&params).unwrap();
        assert!(report.error.is_none());
        assert!(report.output.is_some());
    }

    #[cfg(not(feature = "wgpu"))]
    #[test]
    fn test_auto_equals_cpu_without_gpu_support() {
        let auto = run(&BenchParams {
            backend: BackendRequest::Auto,
            ..cpu_params(6, 5, 2)
        })
        .unwrap();
        let cpu = run(&cpu_params(6, 5, 2)).unwrap();
        assert_eq!(auto.engine.name, cpu.engine.name);
        assert_eq!(
            auto.output.unwrap().checksum,
            cpu.output.unwrap().checksum
        );
    }

    #[cfg(not(feature = "wgpu"))]
    #[test]
    fn test_gpu_request_reports_unavailable() {
        let report = run(&BenchParams {
            backend: BackendRequest::Gpu,
            ..cpu_params(4, 4, 1)
        })
        .unwrap();
        assert_eq!(report.engine.name, "wgpu");
        assert!(report.output.is_none());
        assert!(report
            .error
            .expect("gpu request without support must carry an error")
            .contains("not compiled"));
    }

    #[test]
    fn test_rectangular_inner_dimension() {
        // N = 3, K = 7: A is 3x7, B is 7x3, C is 3x3
        let report = run(&cpu_params(3, 7, 1)).unwrap();
        assert_eq!(report.input.m, 3);
        assert_eq!(report.input.k, 7);
        let bytes = 4 * (3 * 7 + 7 * 3 + 3 * 3);
        assert_eq!(report.input.expected_bytes_total, bytes as u64);
        assert!(report.output.is_some());
    }
}
