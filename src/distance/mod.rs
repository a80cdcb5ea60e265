//! Weight matrices.
//!
//! Provides the dense weight matrix consumed by every solver and the
//! provider seam through which externally computed matrices arrive.

mod matrix;
mod provider;

pub use crate::error::VisitError;
pub use matrix::WeightMatrix;
pub use provider::{WeightMatrixProvider, WeightMatrixResult};
