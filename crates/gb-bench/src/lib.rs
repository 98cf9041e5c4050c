//! `gb-bench` - Benchmark driver and JSON reporting for gemm-bench.
//!
//! This crate provides:
//! - `BenchParams` and `run`: validate parameters, resolve a backend,
//!   generate operands, time the multiply loop, assemble a `Report`
//! - The `Report` model matching the line format shared with companion
//!   implementations, including fixed-point rounding at serialization
//! - The `gflops` throughput formula

pub mod driver;
pub mod error;
pub mod report;

// Re-export primary types at the crate root for convenience.
pub use driver::{gflops, run, BenchParams, SEED_LEFT, SEED_RIGHT};
pub use error::{BenchError, Result};
pub use report::{Engine, InputSummary, OutputMetrics, Report};
