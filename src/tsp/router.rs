//! End-to-end TSP runs over a weight-matrix provider.

use rand::Rng;

use super::{TspObjective, TspProblem};
use crate::distance::{WeightMatrixProvider, WeightMatrixResult};
use crate::error::{RoutingError, RunOutcome};
use crate::ga::{EaxSolver, GaSettings};
use crate::local_search::{RelocateOperator, TwoOptOperator};
use crate::models::Tour;
use crate::solver::{IterativeSolver, Solver};

/// Restarts of the default TSP solver.
const DEFAULT_RESTARTS: usize = 3;

/// EAX with 2-opt and relocate polishing.
pub type DefaultTspSolver = IterativeSolver<TspProblem, TspObjective, Tour, EaxSolver>;

/// Builds the solver used when none is configured.
pub fn default_tsp_solver() -> DefaultTspSolver {
    IterativeSolver::new(EaxSolver::new(GaSettings::default()), DEFAULT_RESTARTS)
        .with_operator(TwoOptOperator)
        .with_operator(RelocateOperator)
}

/// Solves a TSP over the locations a provider could resolve.
///
/// `first` and `last` are original location indices. Locations the
/// provider reports in error are left out of the tour; an errored
/// endpoint fails the run.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::ga::{EaxSolver, GaSettings};
/// use u_tour::models::Tour;
/// use u_tour::random::create_rng;
/// use u_tour::solver::IterativeSolver;
/// use u_tour::tsp::{TspObjective, TspProblem, TspRouter};
///
/// let wm = WeightMatrix::from_coordinates(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (3.0, 0.0)]);
/// let solver = IterativeSolver::<TspProblem, TspObjective, Tour, _>::new(
///     EaxSolver::new(GaSettings::fast()),
///     1,
/// );
/// let router = TspRouter::new(wm, 0, Some(3)).with_solver(solver);
///
/// let outcome = router.run(&mut create_rng(1));
/// assert!(outcome.has_succeeded());
/// assert_eq!(outcome.value().unwrap().visits(), vec![0, 2, 1, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct TspRouter<Pv, Sv = DefaultTspSolver> {
    provider: Pv,
    first: usize,
    last: Option<usize>,
    solver: Sv,
}

impl<Pv: WeightMatrixProvider> TspRouter<Pv> {
    /// Creates a router with the default solver.
    pub fn new(provider: Pv, first: usize, last: Option<usize>) -> Self {
        Self {
            provider,
            first,
            last,
            solver: default_tsp_solver(),
        }
    }
}

impl<Pv, Sv> TspRouter<Pv, Sv> {
    /// Replaces the solver.
    pub fn with_solver<S2>(self, solver: S2) -> TspRouter<Pv, S2> {
        TspRouter {
            provider: self.provider,
            first: self.first,
            last: self.last,
            solver,
        }
    }

    /// The first location.
    pub fn first(&self) -> usize {
        self.first
    }

    /// The last location, if any.
    pub fn last(&self) -> Option<usize> {
        self.last
    }
}

impl<Pv, Sv> TspRouter<Pv, Sv>
where
    Pv: WeightMatrixProvider,
    Sv: Solver<TspProblem, TspObjective, Tour>,
{
    /// Runs the optimization. The returned tour holds original locations.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> RunOutcome<Tour> {
        match self.try_run(rng) {
            Ok(tour) => RunOutcome::succeeded(tour),
            Err(error) => {
                if error.is_fatal() {
                    tracing::warn!(first = self.first, last = ?self.last, %error, "TSP run failed");
                } else {
                    tracing::info!(first = self.first, last = ?self.last, %error, "TSP run failed");
                }
                RunOutcome::failed(error)
            }
        }
    }

    fn try_run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Tour, RoutingError> {
        let matrix = self.provider.compute()?;
        let first = matrix
            .require(self.first)
            .map_err(|e| RoutingError::FirstUnavailable(Box::new(e)))?;
        let last = match self.last {
            Some(l) => Some(
                matrix
                    .require(l)
                    .map_err(|e| RoutingError::LastUnavailable(Box::new(e)))?,
            ),
            None => None,
        };

        let problem = TspProblem::new(matrix.weights().clone(), first, last)
            .ok_or_else(|| RoutingError::InvalidProblem("endpoint outside the weight matrix".into()))?;
        let (tour, fitness) = self
            .solver
            .solve(&problem, &TspObjective, rng)
            .ok_or_else(|| RoutingError::NoSolution(Solver::name(&self.solver)))?;
        tracing::debug!(fitness, visits = tour.count(), "TSP solved");
        to_locations(&tour, &matrix)
    }
}

/// Re-expresses a tour over matrix indices in original locations.
fn to_locations(tour: &Tour, matrix: &WeightMatrixResult) -> Result<Tour, RoutingError> {
    let unmapped = || RoutingError::InvalidProblem("tour visit outside the weight matrix".into());
    let visits = tour
        .iter()
        .map(|v| matrix.location_of(v))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(unmapped)?;
    let last = match tour.last() {
        Some(l) => Some(matrix.location_of(l).ok_or_else(unmapped)?),
        None => None,
    };
    Tour::from_visits(&visits, last).ok_or_else(unmapped)
}
