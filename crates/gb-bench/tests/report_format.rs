use gb_backend::BackendRequest;
use gb_bench::{run, BenchParams};
use serde_json::Value;

fn run_to_value(params: &BenchParams) -> Value {
    let report = run(params).expect("run should produce a report");
    let line = report.to_json().expect("report should serialize");
    assert!(!line.contains('\n'));
    serde_json::from_str(&line).expect("report line should parse back")
}

#[test]
fn cpu_report_carries_full_input_echo() {
    let value = run_to_value(&BenchParams {
        n: 4,
        k: 4,
        repeats: 2,
        backend: BackendRequest::Cpu,
    });

    assert_eq!(value["engine"]["name"], "matrixmultiply");
    assert_eq!(value["input"]["M"], 4);
    assert_eq!(value["input"]["N"], 4);
    assert_eq!(value["input"]["K"], 4);
    assert_eq!(value["input"]["repeats"], 2);
    assert_eq!(value["input"]["expected_bytes_total"], 192);
    assert_eq!(value["input"]["expected_megabytes_total"].as_f64().unwrap(), 0.0);
}

#[test]
fn cpu_report_output_values() {
    let value = run_to_value(&BenchParams {
        n: 4,
        k: 4,
        repeats: 1,
        backend: BackendRequest::Cpu,
    });

    assert!(value.get("error").is_none());
    let output = value["output"].as_object().expect("output object present");
    // A 4x4 multiply can finish under a microsecond, in which case the
    // serialized time legitimately rounds to 0.0.
    let time_sec = output["time_sec"].as_f64().unwrap();
    assert!(time_sec >= 0.0);
    // Serialized values are already rounded: at most 6 decimal places
    assert!(((time_sec * 1e6).round() - time_sec * 1e6).abs() < 1e-6);
    let checksum = output["checksum"].as_f64().unwrap();
    assert!((checksum - 1.266905).abs() < 1e-4);
    assert!(output["gflops"].as_f64().unwrap() >= 0.0);
}

#[test]
fn usage_errors_do_not_produce_reports() {
    for (n, k, repeats) in [(0, 4, 1), (4, 0, 1), (4, 4, 0), (-3, 4, 1), (4, 4, -1)] {
        let result = run(&BenchParams {
            n,
            k,
            repeats,
            backend: BackendRequest::Cpu,
        });
        assert!(result.is_err(), "N={n} K={k} repeats={repeats} must be rejected");
    }
}

#[cfg(not(feature = "wgpu"))]
#[test]
fn gpu_request_without_support_is_a_handled_failure() {
    let value = run_to_value(&BenchParams {
        n: 4,
        k: 4,
        repeats: 1,
        backend: BackendRequest::Gpu,
    });

    assert_eq!(value["engine"]["name"], "wgpu");
    assert!(value["error"].as_str().unwrap().contains("not compiled"));
    assert!(value.get("output").is_none());
    // Input echo survives even when no work ran
    assert_eq!(value["input"]["expected_bytes_total"], 192);
}

#[test]
fn larger_run_reports_expected_sizes() {
    let value = run_to_value(&BenchParams {
        n: 64,
        k: 32,
        repeats: 1,
        backend: BackendRequest::Cpu,
    });

    // 64x32 + 32x64 + 64x64 f32 elements
    let bytes = 4 * (64 * 32 + 32 * 64 + 64 * 64);
    assert_eq!(value["input"]["expected_bytes_total"], bytes);
    assert!(value["output"]["time_sec"].as_f64().unwrap() > 0.0);
}
