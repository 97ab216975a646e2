//! Separable Gaussian derivative filters and Hessian evaluation.

pub mod gaussian;
pub mod hessian;

pub use gaussian::{DerivativeKernels, GaussianDerivative, SeparableFilter};
pub use hessian::{hessian_at, sorted_eigen, HessianField};
