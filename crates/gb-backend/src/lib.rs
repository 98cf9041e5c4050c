//! `gb-backend` - Pluggable GEMM compute backends for gemm-bench.
//!
//! This crate provides:
//! - The `GemmBackend` trait: shape validation, one untimed warmup
//!   multiply, then a timed loop over a monotonic clock
//! - `CpuBackend` over the `matrixmultiply` crate, always available
//! - `WgpuBackend` driving a WGSL compute kernel, behind the `wgpu`
//!   feature (on by default)
//! - `BackendRequest` parsing, the AUTO probe, and the fallback policy

pub mod backend;
pub mod cpu;
pub mod error;
#[cfg(feature = "wgpu")]
pub mod gpu;
pub mod select;

// Re-export primary types at the crate root for convenience.
pub use backend::{EngineInfo, GemmBackend, TimedRun};
pub use cpu::CpuBackend;
pub use error::{BackendError, Result};
#[cfg(feature = "wgpu")]
pub use gpu::WgpuBackend;
pub use select::{gpu_compiled, select, BackendRequest};
