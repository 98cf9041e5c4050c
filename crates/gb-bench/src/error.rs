use gb_backend::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("N, K, and repeats must be positive integers (got N={n}, K={k}, repeats={repeats})")]
    InvalidArguments { n: i64, k: i64, repeats: i64 },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, BenchError>;
