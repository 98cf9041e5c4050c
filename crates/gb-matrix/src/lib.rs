//! `gb-matrix` - Matrix container and deterministic operand generation for gemm-bench.
//!
//! This crate provides:
//! - A dense f32 `Matrix` type with an explicit storage `Layout`
//! - A fixed linear-congruential `generate` function that produces
//!   bit-identical operands on every platform and backend
//! - An order-insensitive f64 `checksum` for comparing results

pub mod checksum;
pub mod generate;
pub mod matrix;

// Re-export primary types at the crate root for convenience.
pub use checksum::checksum;
pub use generate::{generate, Lcg};
pub use matrix::{Layout, Matrix};
