//! End-to-end depot CVRP runs over a weight-matrix provider.

use rand::Rng;

use super::{Capacity, CvrpObjective, CvrpProblem, DepotCvrpSolution, SeededCheapestInsertion, VisitCosts};
use crate::distance::{WeightMatrixProvider, WeightMatrixResult};
use crate::error::{RoutingError, RunOutcome};
use crate::local_search::{
    ExchangeOperator, MultiExchangeOperator, MultiRelocateOperator, RelocateOperator, TwoOptOperator,
};
use crate::solver::{IterativeSolver, Solver};

/// Restarts of the default CVRP solver.
const DEFAULT_RESTARTS: usize = 10;

/// Seeded cheapest insertion followed by the full operator chain.
pub type DefaultCvrpSolver = IterativeSolver<CvrpProblem, CvrpObjective, DepotCvrpSolution, SeededCheapestInsertion>;

/// Builds the solver used when none is configured.
pub fn default_cvrp_solver() -> DefaultCvrpSolver {
    IterativeSolver::new(SeededCheapestInsertion::default(), DEFAULT_RESTARTS)
        .with_operator(RelocateOperator)
        .with_operator(ExchangeOperator)
        .with_operator(MultiExchangeOperator::default())
        .with_operator(MultiRelocateOperator::default())
        .with_operator(TwoOptOperator)
}

/// Solves a depot CVRP over the locations a provider could resolve.
///
/// `depot` and the indices of `visit_costs` refer to original locations.
/// Errored locations are excluded; an errored depot fails the run with
/// [`RoutingError::FirstUnavailable`].
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::random::create_rng;
/// use u_tour::vrp::{metrics, Capacity, DepotCvrpRouter, VisitCosts};
///
/// let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
/// let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 200.0);
/// let costs = vec![VisitCosts::uniform(metrics::WEIGHT, 5, 100.0)];
/// let router = DepotCvrpRouter::new(WeightMatrix::from_coordinates(&points), 0, capacity, costs);
///
/// let outcome = router.run(&mut create_rng(7));
/// let solution = outcome.value().unwrap();
/// assert_eq!(solution.visit_count(), 4);
/// assert!(solution.count() >= 2);
/// ```
#[derive(Debug, Clone)]
pub struct DepotCvrpRouter<Pv, Sv = DefaultCvrpSolver> {
    provider: Pv,
    depot: usize,
    capacity: Capacity,
    visit_costs: Vec<VisitCosts>,
    solver: Sv,
}

impl<Pv: WeightMatrixProvider> DepotCvrpRouter<Pv> {
    /// Creates a router with the default solver.
    pub fn new(provider: Pv, depot: usize, capacity: Capacity, visit_costs: Vec<VisitCosts>) -> Self {
        Self {
            provider,
            depot,
            capacity,
            visit_costs,
            solver: default_cvrp_solver(),
        }
    }
}

impl<Pv, Sv> DepotCvrpRouter<Pv, Sv> {
    /// Replaces the solver.
    pub fn with_solver<S2>(self, solver: S2) -> DepotCvrpRouter<Pv, S2> {
        DepotCvrpRouter {
            provider: self.provider,
            depot: self.depot,
            capacity: self.capacity,
            visit_costs: self.visit_costs,
            solver,
        }
    }

    /// The depot location.
    pub fn depot(&self) -> usize {
        self.depot
    }
}

impl<Pv, Sv> DepotCvrpRouter<Pv, Sv>
where
    Pv: WeightMatrixProvider,
    Sv: Solver<CvrpProblem, CvrpObjective, DepotCvrpSolution>,
{
    /// Runs the optimization. Tours, seeds and unassigned visits in the
    /// returned solution are original locations.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> RunOutcome<DepotCvrpSolution> {
        match self.try_run(rng) {
            Ok(solution) => RunOutcome::succeeded(solution),
            Err(error) => {
                if error.is_fatal() {
                    tracing::warn!(depot = self.depot, %error, "CVRP run failed");
                } else {
                    tracing::info!(depot = self.depot, %error, "CVRP run failed");
                }
                RunOutcome::failed(error)
            }
        }
    }

    fn try_run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DepotCvrpSolution, RoutingError> {
        let matrix = self.provider.compute()?;
        let depot = matrix
            .require(self.depot)
            .map_err(|e| RoutingError::FirstUnavailable(Box::new(e)))?;
        let costs = self
            .visit_costs
            .iter()
            .map(|c| reindex(c, &matrix))
            .collect::<Result<Vec<_>, _>>()?;

        let problem = CvrpProblem::new(matrix.weights().clone(), depot, self.capacity.clone(), costs)?;
        let (solution, fitness) = self
            .solver
            .solve(&problem, &CvrpObjective, rng)
            .ok_or_else(|| RoutingError::NoSolution(Solver::name(&self.solver)))?;
        tracing::debug!(
            fitness,
            tours = solution.count(),
            unassigned = solution.unassigned().len(),
            "CVRP solved"
        );
        solution
            .remap(matrix.resolved())
            .ok_or_else(|| RoutingError::InvalidProblem("solution visit outside the weight matrix".into()))
    }
}

/// Restricts visit costs to the resolved locations, in matrix order.
fn reindex(costs: &VisitCosts, matrix: &WeightMatrixResult) -> Result<VisitCosts, RoutingError> {
    let values = matrix
        .resolved()
        .iter()
        .map(|&location| costs.costs.get(location).copied())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            RoutingError::InvalidProblem(format!(
                "visit costs '{}' do not cover every resolved location",
                costs.name
            ))
        })?;
    Ok(VisitCosts::new(costs.name.clone(), values))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::distance::{VisitError, WeightMatrix};
    use crate::random::create_rng;
    use crate::vrp::metrics;

    /// Locations 0..6 on a line; location 3 has no route.
    fn partial() -> WeightMatrixResult {
        let points = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (4.0, 0.0), (5.0, 0.0)];
        let mut errors = BTreeMap::new();
        errors.insert(3, VisitError::NoRoute("closed road".into()));
        WeightMatrixResult::new(WeightMatrix::from_coordinates(&points), vec![0, 1, 2, 4, 5], errors)
            .expect("valid")
    }

    fn weight_costs() -> Vec<VisitCosts> {
        // Location 3 is excluded, so its oversized demand never matters.
        vec![VisitCosts::new(metrics::WEIGHT, vec![0.0, 100.0, 100.0, 900.0, 100.0, 100.0])]
    }

    #[test]
    fn test_run_excludes_errored() {
        let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 200.0);
        let router = DepotCvrpRouter::new(partial(), 0, capacity, weight_costs());
        let solution = router.run(&mut create_rng(5)).into_result().expect("solved");
        assert_eq!(solution.visit_count(), 4);
        assert_eq!(solution.count(), 2);
        assert!(solution.unassigned().is_empty());
        assert!(solution.tours().iter().all(|t| !t.contains(3) && t.first() == 0));
        for visit in [1, 2, 4, 5] {
            assert!(solution.tour_of(visit).is_some(), "visit {visit}");
        }
    }

    #[test]
    fn test_errored_depot() {
        let router = DepotCvrpRouter::new(partial(), 3, Capacity::new(), Vec::new());
        let outcome = router.run(&mut create_rng(1));
        assert!(matches!(outcome.error(), Some(RoutingError::FirstUnavailable(_))));
        assert!(outcome
            .error_message()
            .expect("message")
            .contains("could not route to/from location 3"));
    }

    #[test]
    fn test_short_visit_costs() {
        let costs = vec![VisitCosts::uniform(metrics::WEIGHT, 3, 1.0)];
        let router = DepotCvrpRouter::new(partial(), 0, Capacity::new(), costs);
        let outcome = router.run(&mut create_rng(1));
        assert!(matches!(outcome.error(), Some(RoutingError::InvalidProblem(_))));
    }

    #[test]
    fn test_custom_solver() {
        let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 1000.0);
        let router = DepotCvrpRouter::new(partial(), 0, capacity, weight_costs()).with_solver(
            IterativeSolver::<CvrpProblem, CvrpObjective, DepotCvrpSolution, _>::new(
                SeededCheapestInsertion::default(),
                1,
            )
            .with_operator(TwoOptOperator),
        );
        let solution = router.run(&mut create_rng(2)).into_result().expect("solved");
        assert_eq!(solution.count(), 1);
        assert_eq!(solution.visit_count(), 4);
        assert!(solution.contents()[0].weight >= 10.0 - 1e-10);
    }

    #[test]
    fn test_default_solver_name() {
        assert_eq!(
            Solver::<CvrpProblem, CvrpObjective, DepotCvrpSolution>::name(&default_cvrp_solver()),
            "ITER_[10x(SCI+RELOC+EX+MEX+MRELOC+2OPT)]"
        );
    }
}
