//! Floating-point shims, approximate equality, and 4×4 matrices.

pub use {approx::ApproxEq, mat::Mat4};

pub mod approx;
pub mod float;
pub mod mat;
