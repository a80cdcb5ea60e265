//! Weight-matrix provider seam.
//!
//! Network routing and location resolution live outside this crate. A
//! provider hands over the weights between the locations it could resolve,
//! together with the errors for the ones it could not.

use std::collections::BTreeMap;

use super::WeightMatrix;
use crate::error::{RoutingError, VisitError};

/// Weights between resolved locations plus per-location errors.
///
/// Row `i` of `weights` corresponds to original location `resolved[i]`.
/// Locations present in `errors` are excluded from `resolved`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrixResult {
    weights: WeightMatrix,
    resolved: Vec<usize>,
    errors: BTreeMap<usize, VisitError>,
}

impl WeightMatrixResult {
    /// Creates a result, checking that `resolved` matches the matrix size,
    /// contains no duplicates, and is disjoint from `errors`.
    pub fn new(
        weights: WeightMatrix,
        resolved: Vec<usize>,
        errors: BTreeMap<usize, VisitError>,
    ) -> Result<Self, RoutingError> {
        if resolved.len() != weights.size() {
            return Err(RoutingError::WeightMatrix(format!(
                "{} resolved locations for a {}x{} matrix",
                resolved.len(),
                weights.size(),
                weights.size()
            )));
        }
        let mut seen = resolved.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != resolved.len() {
            return Err(RoutingError::WeightMatrix(
                "duplicate resolved location".to_string(),
            ));
        }
        if let Some(location) = resolved.iter().find(|l| errors.contains_key(l)) {
            return Err(RoutingError::WeightMatrix(format!(
                "location {location} is both resolved and in error"
            )));
        }
        Ok(Self {
            weights,
            resolved,
            errors,
        })
    }

    /// A result where every location resolved, in order.
    pub fn complete(weights: WeightMatrix) -> Self {
        let resolved = (0..weights.size()).collect();
        Self {
            weights,
            resolved,
            errors: BTreeMap::new(),
        }
    }

    /// Weights between the resolved locations.
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Original location index of each matrix row.
    pub fn resolved(&self) -> &[usize] {
        &self.resolved
    }

    /// Errors keyed by original location index.
    pub fn errors(&self) -> &BTreeMap<usize, VisitError> {
        &self.errors
    }

    /// The error recorded for `location`, if any.
    pub fn error(&self, location: usize) -> Option<&VisitError> {
        self.errors.get(&location)
    }

    /// Matrix index of an original location.
    pub fn index_of(&self, location: usize) -> Option<usize> {
        self.resolved.iter().position(|&l| l == location)
    }

    /// Original location of a matrix index.
    pub fn location_of(&self, index: usize) -> Option<usize> {
        self.resolved.get(index).copied()
    }

    /// Resolves an endpoint that must take part in the run.
    ///
    /// Fails with the recorded error, or `InvalidProblem` for a location
    /// the provider never saw.
    pub fn require(&self, location: usize) -> Result<usize, RoutingError> {
        if let Some(error) = self.error(location) {
            return Err(error.to_routing_error(location));
        }
        self.index_of(location).ok_or_else(|| {
            RoutingError::InvalidProblem(format!("location {location} is unknown to the weight matrix"))
        })
    }
}

/// Computes weights between locations.
///
/// Implemented outside this crate by network routers; precomputed results
/// implement it directly.
pub trait WeightMatrixProvider {
    /// Computes the weight matrix.
    fn compute(&self) -> Result<WeightMatrixResult, RoutingError>;
}

impl WeightMatrixProvider for WeightMatrixResult {
    fn compute(&self) -> Result<WeightMatrixResult, RoutingError> {
        Ok(self.clone())
    }
}

impl WeightMatrixProvider for WeightMatrix {
    fn compute(&self) -> Result<WeightMatrixResult, RoutingError> {
        Ok(WeightMatrixResult::complete(self.clone()))
    }
}
