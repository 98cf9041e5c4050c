use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("no usable device: {reason}")]
    DeviceUnavailable { reason: String },
    #[error("compute failed: {reason}")]
    Compute { reason: String },
    #[error("gemm dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    ShapeMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("unknown backend request '{name}' (expected auto, cpu, or gpu)")]
    UnknownRequest { name: String },
}

pub type Result<T> = std::result::Result<T, BackendError>;
