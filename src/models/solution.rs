//! Solutions across routing problem flavors.

use super::Tour;
use crate::vrp::DepotCvrpSolution;

/// A solution to any supported routing problem.
///
/// Each variant owns its tours exclusively; cloning deep-copies them.
///
/// # Examples
///
/// ```
/// use u_tour::models::{RoutingSolution, Tour};
///
/// let tour = Tour::from_visits(&[0, 2, 1], Some(0)).unwrap();
/// let sol = RoutingSolution::from(tour);
/// assert_eq!(sol.route_count(), 1);
/// assert_eq!(sol.visit_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub enum RoutingSolution {
    /// A single tour.
    Tsp(Tour),
    /// Depot-based capacitated tours.
    DepotCvrp(DepotCvrpSolution),
}

impl RoutingSolution {
    /// Flavor name used in messages.
    pub fn flavor(&self) -> &'static str {
        match self {
            RoutingSolution::Tsp(_) => "TSP",
            RoutingSolution::DepotCvrp(_) => "depot CVRP",
        }
    }

    /// All tours in order.
    pub fn tours(&self) -> Vec<&Tour> {
        match self {
            RoutingSolution::Tsp(tour) => vec![tour],
            RoutingSolution::DepotCvrp(sol) => sol.tours().iter().collect(),
        }
    }

    /// Number of tours.
    pub fn route_count(&self) -> usize {
        match self {
            RoutingSolution::Tsp(_) => 1,
            RoutingSolution::DepotCvrp(sol) => sol.count(),
        }
    }

    /// Number of non-anchor visits.
    pub fn visit_count(&self) -> usize {
        match self {
            RoutingSolution::Tsp(tour) => tour.free_count(),
            RoutingSolution::DepotCvrp(sol) => sol.tours().visit_count(),
        }
    }

    /// The single tour, for the TSP variant.
    pub fn as_tour(&self) -> Option<&Tour> {
        match self {
            RoutingSolution::Tsp(tour) => Some(tour),
            RoutingSolution::DepotCvrp(_) => None,
        }
    }

    /// The capacitated solution, for the depot variant.
    pub fn as_depot_cvrp(&self) -> Option<&DepotCvrpSolution> {
        match self {
            RoutingSolution::Tsp(_) => None,
            RoutingSolution::DepotCvrp(sol) => Some(sol),
        }
    }
}

impl From<Tour> for RoutingSolution {
    fn from(tour: Tour) -> Self {
        RoutingSolution::Tsp(tour)
    }
}

impl From<DepotCvrpSolution> for RoutingSolution {
    fn from(sol: DepotCvrpSolution) -> Self {
        RoutingSolution::DepotCvrp(sol)
    }
}
