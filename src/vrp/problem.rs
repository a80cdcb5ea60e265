//! Depot-based capacitated VRP problem definition.

use super::content::{metrics, Capacity, Content, VisitCosts};
use crate::distance::WeightMatrix;
use crate::error::RoutingError;
use crate::models::Tour;

/// Slack allowed when comparing accumulated content against capacity.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// One non-time capacity constraint with the matching visit costs.
#[derive(Debug, Clone)]
struct Quantity {
    name: String,
    capacity: f64,
    costs: Vec<f64>,
}

/// A capacitated VRP: every tour starts and ends at the depot.
///
/// The `"time"` constraint bounds each tour's travel weight plus the
/// `"time"` visit costs of its visits. Every other constraint bounds the
/// sum of the same-named visit costs. Visit costs without a constraint are
/// ignored; constraints without visit costs count zero per visit.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::vrp::{metrics, Capacity, CvrpProblem, VisitCosts};
///
/// let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 250.0);
/// let costs = vec![VisitCosts::uniform(metrics::WEIGHT, 4, 100.0)];
/// let problem = CvrpProblem::new(WeightMatrix::uniform(4, 1.0), 0, capacity, costs).unwrap();
///
/// assert_eq!(problem.visits(), vec![1, 2, 3]);
/// assert!(problem.fits_alone(2));
/// ```
#[derive(Debug, Clone)]
pub struct CvrpProblem {
    weights: WeightMatrix,
    depot: usize,
    capacity: Capacity,
    max_weight: f64,
    time_costs: Vec<f64>,
    quantities: Vec<Quantity>,
}

impl CvrpProblem {
    /// Creates a problem.
    ///
    /// Fails with [`RoutingError::InvalidProblem`] if the depot is out of
    /// range or a visit-cost vector does not cover every visit.
    pub fn new(
        weights: WeightMatrix,
        depot: usize,
        capacity: Capacity,
        visit_costs: Vec<VisitCosts>,
    ) -> Result<Self, RoutingError> {
        let size = weights.size();
        if depot >= size {
            return Err(RoutingError::InvalidProblem(format!(
                "depot {depot} outside a {size}-visit matrix"
            )));
        }
        if let Some(bad) = visit_costs.iter().find(|c| c.costs.len() != size) {
            return Err(RoutingError::InvalidProblem(format!(
                "visit costs '{}' have {} entries for {} visits",
                bad.name,
                bad.costs.len(),
                size
            )));
        }
        let costs_for = |name: &str| {
            visit_costs
                .iter()
                .find(|c| c.name == name)
                .map_or_else(|| vec![0.0; size], |c| c.costs.clone())
        };

        let max_weight = capacity.max(metrics::TIME).unwrap_or(f64::INFINITY);
        let time_costs = costs_for(metrics::TIME);
        let quantities = capacity
            .constraints
            .iter()
            .filter(|c| c.name != metrics::TIME)
            .map(|c| Quantity {
                name: c.name.clone(),
                capacity: c.capacity,
                costs: costs_for(&c.name),
            })
            .collect();

        Ok(Self {
            weights,
            depot,
            capacity,
            max_weight,
            time_costs,
            quantities,
        })
    }

    /// The weight matrix.
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Weight from `from` to `to`.
    pub fn weight(&self, from: usize, to: usize) -> f64 {
        self.weights.get(from, to)
    }

    /// The depot every tour starts and ends at.
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// Number of visits, depot included.
    pub fn size(&self) -> usize {
        self.weights.size()
    }

    /// The capacity configuration.
    pub fn capacity(&self) -> &Capacity {
        &self.capacity
    }

    /// Bound on content weight; infinite without a `"time"` constraint.
    pub fn max_weight(&self) -> f64 {
        self.max_weight
    }

    /// Names of the tracked quantities, in content order.
    pub fn quantity_names(&self) -> Vec<&str> {
        self.quantities.iter().map(|q| q.name.as_str()).collect()
    }

    /// All visits except the depot.
    pub fn visits(&self) -> Vec<usize> {
        (0..self.size()).filter(|&v| v != self.depot).collect()
    }

    /// Time cost of `visit`.
    pub fn time_cost(&self, visit: usize) -> f64 {
        self.time_costs[visit]
    }

    /// The content `visit` adds to a tour, travel excluded.
    pub fn visit_content(&self, visit: usize) -> Content {
        Content {
            weight: self.time_costs[visit],
            quantities: self.quantities.iter().map(|q| q.costs[visit]).collect(),
        }
    }

    /// The content of `visits` together, travel excluded.
    pub fn sequence_content(&self, visits: &[usize]) -> Content {
        let mut content = Content::zero(self.quantities.len());
        for &v in visits {
            content += &self.visit_content(v);
        }
        content
    }

    /// Computes the content of a tour from scratch.
    pub fn content_of(&self, tour: &Tour) -> Content {
        let visits = tour.visits();
        let mut content = self.sequence_content(&visits);
        content.weight += tour.weight(&self.weights);
        content
    }

    /// Returns `true` if `content` respects every constraint.
    pub fn fits(&self, content: &Content) -> bool {
        content.weight <= self.max_weight + FEASIBILITY_TOLERANCE
            && self
                .quantities
                .iter()
                .zip(&content.quantities)
                .all(|(q, &value)| value <= q.capacity + FEASIBILITY_TOLERANCE)
    }

    /// Returns `true` if a depot round trip to `visit` alone is feasible.
    pub fn fits_alone(&self, visit: usize) -> bool {
        let tour = Tour::new(self.depot, Some(self.depot));
        let mut content = self.content_of(&tour);
        content += &self.visit_content(visit);
        content.weight += self.weight(self.depot, visit) + self.weight(visit, self.depot);
        self.fits(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrp::CapacityConstraint;

    fn problem() -> CvrpProblem {
        let capacity = Capacity {
            constraints: vec![
                CapacityConstraint::new(metrics::TIME, 10.0),
                CapacityConstraint::new(metrics::WEIGHT, 500.0),
            ],
        };
        let costs = vec![
            VisitCosts::uniform(metrics::WEIGHT, 5, 100.0),
            VisitCosts::new(metrics::TIME, vec![0.0, 1.0, 1.0, 1.0, 9.0]),
        ];
        CvrpProblem::new(WeightMatrix::uniform(5, 1.0), 0, capacity, costs).expect("valid")
    }

    #[test]
    fn test_quantities_exclude_time() {
        let p = problem();
        assert_eq!(p.quantity_names(), vec!["weight"]);
        assert!((p.max_weight() - 10.0).abs() < 1e-10);
        assert_eq!(p.visit_content(2).quantities, vec![100.0]);
        assert!((p.visit_content(4).weight - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_content_of_tour() {
        let p = problem();
        let tour = Tour::from_visits(&[0, 1, 2], Some(0)).expect("valid");
        let c = p.content_of(&tour);
        // 3 edges of weight 1 plus two visits of time 1.
        assert!((c.weight - 5.0).abs() < 1e-10);
        assert_eq!(c.quantities, vec![200.0]);
        assert!(p.fits(&c));
    }

    #[test]
    fn test_fits_alone() {
        let p = problem();
        assert!(p.fits_alone(1));
        // 2 travel + 9 time > 10.
        assert!(!p.fits_alone(4));
    }

    #[test]
    fn test_invalid_inputs() {
        let wm = WeightMatrix::uniform(3, 1.0);
        assert!(CvrpProblem::new(wm.clone(), 3, Capacity::new(), Vec::new()).is_err());
        let short = vec![VisitCosts::uniform(metrics::WEIGHT, 2, 1.0)];
        assert!(matches!(
            CvrpProblem::new(wm, 0, Capacity::new(), short),
            Err(RoutingError::InvalidProblem(_))
        ));
    }

    #[test]
    fn test_unconstrained() {
        let p = CvrpProblem::new(WeightMatrix::uniform(3, 1.0), 1, Capacity::new(), Vec::new())
            .expect("valid");
        assert_eq!(p.max_weight(), f64::INFINITY);
        assert_eq!(p.visits(), vec![0, 2]);
        assert!(p.fits(&Content::zero(0)));
    }
}
