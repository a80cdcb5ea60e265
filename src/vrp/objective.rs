//! CVRP objective: total travel weight of all tours.

use std::cmp::Ordering;

use super::{CvrpProblem, DepotCvrpSolution};
use crate::objective::Objective;

/// Sum of every tour's travel weight.
///
/// Visit time costs are a capacity concern and do not enter the fitness.
#[derive(Debug, Clone, Copy, Default)]
pub struct CvrpObjective;

impl Objective<CvrpProblem, DepotCvrpSolution> for CvrpObjective {
    type Fitness = f64;

    fn name(&self) -> &str {
        "CVRP"
    }

    fn zero(&self) -> f64 {
        0.0
    }

    fn infinite(&self) -> f64 {
        f64::INFINITY
    }

    fn calculate(&self, problem: &CvrpProblem, solution: &DepotCvrpSolution) -> f64 {
        solution.weight(problem)
    }

    fn add(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    fn subtract(&self, a: f64, b: f64) -> f64 {
        a - b
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        a.total_cmp(&b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;
    use crate::vrp::{metrics, Capacity, VisitCosts};

    #[test]
    fn test_sums_tours_without_visit_costs() {
        let capacity = Capacity::new().with_constraint(metrics::TIME, 100.0);
        let costs = vec![VisitCosts::uniform(metrics::TIME, 3, 5.0)];
        let problem =
            CvrpProblem::new(WeightMatrix::uniform(3, 2.0), 0, capacity, costs).expect("valid");
        let mut sol = DepotCvrpSolution::new();
        let a = sol.add(&problem, 0, Some(0));
        let b = sol.add(&problem, 0, Some(0));
        sol.try_insert_after(&problem, a, 0, 1).expect("fits");
        sol.try_insert_after(&problem, b, 0, 2).expect("fits");
        assert!((CvrpObjective.calculate(&problem, &sol) - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_solution_is_zero() {
        let problem = CvrpProblem::new(WeightMatrix::uniform(2, 1.0), 0, Capacity::new(), Vec::new())
            .expect("valid");
        let sol = DepotCvrpSolution::new();
        assert!(CvrpObjective.is_zero(CvrpObjective.calculate(&problem, &sol)));
    }
}
