use std::fmt;
use std::str::FromStr;

use crate::backend::GemmBackend;
use crate::cpu::CpuBackend;
use crate::error::{BackendError, Result};
#[cfg(feature = "wgpu")]
use crate::gpu::WgpuBackend;
#[cfg(feature = "wgpu")]
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Which backend a run should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendRequest {
    /// Probe for a usable GPU, fall back to the CPU.
    #[default]
    Auto,
    /// Always the CPU backend.
    Cpu,
    /// The GPU backend or an error; never a silent downgrade.
    Gpu,
}

impl BackendRequest {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendRequest::Auto => "auto",
            BackendRequest::Cpu => "cpu",
            BackendRequest::Gpu => "gpu",
        }
    }
}

impl fmt::Display for BackendRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendRequest {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendRequest::Auto),
            "cpu" => Ok(BackendRequest::Cpu),
            "gpu" => Ok(BackendRequest::Gpu),
            _ => Err(BackendError::UnknownRequest {
                name: s.to_string(),
            }),
        }
    }
}

/// True when GPU support was compiled into this build.
pub const fn gpu_compiled() -> bool {
    cfg!(feature = "wgpu")
}

/// Resolve a request to a concrete backend.
///
/// Explicit requests are never downgraded: `Gpu` either yields the GPU
/// backend or the constructor's own error. `Auto` probes the GPU once,
/// keeps the probed instance on success, and falls back to the CPU on
/// any failure, including panics inside the graphics stack.
pub fn select(request: BackendRequest) -> Result<Box<dyn GemmBackend>> {
    match request {
        BackendRequest::Cpu => Ok(Box::new(CpuBackend::new())),
        BackendRequest::Gpu => gpu_backend(),
        BackendRequest::Auto => Ok(probe_gpu().unwrap_or_else(|err| {
            log::debug!("gpu probe failed, using cpu: {err}");
            Box::new(CpuBackend::new())
        })),
    }
}

#[cfg(feature = "wgpu")]
fn gpu_backend() -> Result<Box<dyn GemmBackend>> {
    Ok(Box::new(WgpuBackend::new()?))
}

#[cfg(not(feature = "wgpu"))]
fn gpu_backend() -> Result<Box<dyn GemmBackend>> {
    Err(BackendError::Unavailable {
        reason: "gpu support is not compiled into this build".to_string(),
    })
}

#[cfg(feature = "wgpu")]
fn probe_gpu() -> Result<Box<dyn GemmBackend>> {
    let backend = catch_unwind(AssertUnwindSafe(WgpuBackend::probe)).map_err(|_| {
        BackendError::DeviceUnavailable {
            reason: "gpu probe panicked".to_string(),
        }
    })??;
    log::info!("auto-selected gpu backend");
    Ok(Box::new(backend))
}

#[cfg(not(feature = "wgpu"))]
fn probe_gpu() -> Result<Box<dyn GemmBackend>> {
    Err(BackendError::Unavailable {
        reason: "gpu support is not compiled into this build".to_string(),
    })
}
