//! Capacity configuration and per-tour content.

use std::ops::{AddAssign, SubAssign};

use serde::{Deserialize, Serialize};

/// Well-known metric names.
pub mod metrics {
    /// Travel weight plus per-visit time costs.
    pub const TIME: &str = "time";
    /// Load carried by the vehicle.
    pub const WEIGHT: &str = "weight";
}

/// An upper bound on one named metric of a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityConstraint {
    /// Metric name, matched against [`VisitCosts::name`].
    pub name: String,
    /// Maximum allowed value.
    pub capacity: f64,
}

impl CapacityConstraint {
    /// Creates a constraint.
    pub fn new(name: impl Into<String>, capacity: f64) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }
}

/// Per-visit cost or demand for one named metric, indexed by visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitCosts {
    /// Metric name.
    pub name: String,
    /// Cost of each visit.
    pub costs: Vec<f64>,
}

impl VisitCosts {
    /// Creates visit costs.
    pub fn new(name: impl Into<String>, costs: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            costs,
        }
    }

    /// The same cost for each of `count` visits.
    pub fn uniform(name: impl Into<String>, count: usize, cost: f64) -> Self {
        Self::new(name, vec![cost; count])
    }
}

/// The vehicle capacity: a set of named constraints.
///
/// # Examples
///
/// ```
/// use u_tour::vrp::{metrics, Capacity};
///
/// let capacity = Capacity::new()
///     .with_constraint(metrics::TIME, 3600.0)
///     .with_constraint(metrics::WEIGHT, 500.0);
/// assert_eq!(capacity.max(metrics::WEIGHT), Some(500.0));
/// assert_eq!(capacity.max("volume"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    /// The constraints, in declaration order.
    pub constraints: Vec<CapacityConstraint>,
}

impl Capacity {
    /// An unconstrained capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint.
    pub fn with_constraint(mut self, name: impl Into<String>, capacity: f64) -> Self {
        self.constraints.push(CapacityConstraint::new(name, capacity));
        self
    }

    /// The bound on `name`, if constrained.
    pub fn max(&self, name: &str) -> Option<f64> {
        self.constraints
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.capacity)
    }

    /// Returns `true` if there are no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// Accumulated metric values of one tour.
///
/// `weight` is the tour's travel weight plus the time costs of its visits;
/// `quantities[k]` is the sum of the visit costs for the k-th non-time
/// constraint of the problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Travel weight plus visit time costs.
    pub weight: f64,
    /// Sums per quantity constraint.
    pub quantities: Vec<f64>,
}

impl Content {
    /// An empty content tracking `quantities` metrics.
    pub fn zero(quantities: usize) -> Self {
        Self {
            weight: 0.0,
            quantities: vec![0.0; quantities],
        }
    }

    /// Returns `true` if both contents agree within `tolerance`.
    pub fn approx_eq(&self, other: &Content, tolerance: f64) -> bool {
        (self.weight - other.weight).abs() <= tolerance
            && self.quantities.len() == other.quantities.len()
            && self
                .quantities
                .iter()
                .zip(&other.quantities)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

impl AddAssign<&Content> for Content {
    fn add_assign(&mut self, other: &Content) {
        self.weight += other.weight;
        for (q, o) in self.quantities.iter_mut().zip(&other.quantities) {
            *q += o;
        }
    }
}

impl SubAssign<&Content> for Content {
    fn sub_assign(&mut self, other: &Content) {
        self.weight -= other.weight;
        for (q, o) in self.quantities.iter_mut().zip(&other.quantities) {
            *q -= o;
        }
    }
}
