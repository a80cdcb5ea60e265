//! Capability dispatch over the supported routing flavors.
//!
//! Problems and solutions come as tagged variants, one per flavor. The
//! free functions [`improve`] and [`construct`] pattern-match on them and
//! run the operator or solver implementing the requested [`Capability`].
//! A combination with no implementation fails with
//! [`RoutingError::Unsupported`].

use rand::Rng;

use super::{Operator, Solver};
use crate::error::RoutingError;
use crate::local_search::{ExchangeOperator, MultiExchangeOperator, MultiRelocateOperator, RelocateOperator};
use crate::models::RoutingSolution;
use crate::tsp::{TspObjective, TspProblem};
use crate::vrp::{CvrpObjective, CvrpProblem, DepotCvrpSolution, SeededCheapestInsertion};

/// A problem of any supported flavor.
#[derive(Debug, Clone)]
pub enum RoutingProblem {
    /// A single tour over every visit.
    Tsp(TspProblem),
    /// Depot-based capacitated tours.
    DepotCvrp(CvrpProblem),
}

impl RoutingProblem {
    /// Flavor name used in messages.
    pub fn flavor(&self) -> &'static str {
        match self {
            RoutingProblem::Tsp(_) => "TSP",
            RoutingProblem::DepotCvrp(_) => "depot CVRP",
        }
    }
}

impl From<TspProblem> for RoutingProblem {
    fn from(problem: TspProblem) -> Self {
        RoutingProblem::Tsp(problem)
    }
}

impl From<CvrpProblem> for RoutingProblem {
    fn from(problem: CvrpProblem) -> Self {
        RoutingProblem::DepotCvrp(problem)
    }
}

/// A move or construction a solution flavor may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Single-visit relocation.
    Relocate,
    /// Single-visit exchange.
    Exchange,
    /// Multi-size sequence exchange.
    MultiExchange,
    /// Multi-size sequence relocation (Or-opt).
    MultiRelocate,
    /// Seeded cheapest-insertion construction.
    SeededCheapestInsertion,
}

impl Capability {
    /// Every capability.
    pub const ALL: [Capability; 5] = [
        Capability::Relocate,
        Capability::Exchange,
        Capability::MultiExchange,
        Capability::MultiRelocate,
        Capability::SeededCheapestInsertion,
    ];

    /// Short name, matching the operator or solver name.
    pub fn name(self) -> &'static str {
        match self {
            Capability::Relocate => "RELOC",
            Capability::Exchange => "EX",
            Capability::MultiExchange => "MEX",
            Capability::MultiRelocate => "MRELOC",
            Capability::SeededCheapestInsertion => "SCI",
        }
    }

    /// Returns `true` for capabilities that build a solution from nothing.
    pub fn is_construction(self) -> bool {
        self == Capability::SeededCheapestInsertion
    }

    /// Returns `true` if solutions of `problem`'s flavor implement this
    /// capability.
    pub fn is_supported_by(self, problem: &RoutingProblem) -> bool {
        !matches!(
            (self, problem),
            (Capability::SeededCheapestInsertion, RoutingProblem::Tsp(_))
        )
    }
}

/// Applies an improvement capability to `solution`.
///
/// Returns the fitness delta, or `None` if nothing improved. Fails with
/// [`RoutingError::Unsupported`] when the solution's flavor differs from
/// the problem's or `capability` is a construction.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::{RoutingSolution, Tour};
/// use u_tour::solver::{improve, Capability, RoutingProblem};
/// use u_tour::tsp::TspProblem;
///
/// let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
/// let problem = RoutingProblem::from(TspProblem::closed(WeightMatrix::from_coordinates(&points), 0).unwrap());
/// let mut solution = RoutingSolution::from(Tour::from_visits(&[0, 3, 4, 1, 2], Some(0)).unwrap());
///
/// let delta = improve(&problem, &mut solution, Capability::MultiRelocate).unwrap();
/// assert!(delta.is_some_and(|d| d < 0.0));
///
/// let error = improve(&problem, &mut solution, Capability::SeededCheapestInsertion).unwrap_err();
/// assert!(error.is_fatal());
/// ```
pub fn improve(
    problem: &RoutingProblem,
    solution: &mut RoutingSolution,
    capability: Capability,
) -> Result<Option<f64>, RoutingError> {
    let mismatch = format!(
        "{} on a {} solution for a {} problem",
        capability.name(),
        solution.flavor(),
        problem.flavor()
    );
    match (problem, solution) {
        (RoutingProblem::Tsp(p), RoutingSolution::Tsp(tour)) => match capability {
            Capability::Relocate => Ok(RelocateOperator.apply(p, &TspObjective, tour)),
            Capability::Exchange => Ok(ExchangeOperator.apply(p, &TspObjective, tour)),
            Capability::MultiExchange => Ok(MultiExchangeOperator::default().apply(p, &TspObjective, tour)),
            Capability::MultiRelocate => Ok(MultiRelocateOperator::default().apply(p, &TspObjective, tour)),
            Capability::SeededCheapestInsertion => Err(RoutingError::Unsupported(mismatch)),
        },
        (RoutingProblem::DepotCvrp(p), RoutingSolution::DepotCvrp(sol)) => match capability {
            Capability::Relocate => Ok(RelocateOperator.apply(p, &CvrpObjective, sol)),
            Capability::Exchange => Ok(ExchangeOperator.apply(p, &CvrpObjective, sol)),
            Capability::MultiExchange => Ok(MultiExchangeOperator::default().apply(p, &CvrpObjective, sol)),
            Capability::MultiRelocate => Ok(MultiRelocateOperator::default().apply(p, &CvrpObjective, sol)),
            Capability::SeededCheapestInsertion => Err(RoutingError::Unsupported(mismatch)),
        },
        _ => Err(RoutingError::Unsupported(mismatch)),
    }
}

/// Builds a solution with a construction capability.
///
/// Fails with [`RoutingError::Unsupported`] when `capability` is not a
/// construction of `problem`'s flavor.
pub fn construct<R: Rng + ?Sized>(
    problem: &RoutingProblem,
    capability: Capability,
    rng: &mut R,
) -> Result<RoutingSolution, RoutingError> {
    match (problem, capability) {
        (RoutingProblem::DepotCvrp(p), Capability::SeededCheapestInsertion) => {
            let solver = SeededCheapestInsertion::default();
            Solver::<CvrpProblem, CvrpObjective, DepotCvrpSolution>::solve(&solver, p, &CvrpObjective, rng)
                .map(|(sol, _)| RoutingSolution::from(sol))
                .ok_or_else(|| {
                    RoutingError::NoSolution(Solver::<CvrpProblem, CvrpObjective, DepotCvrpSolution>::name(&solver))
                })
        }
        _ => Err(RoutingError::Unsupported(format!(
            "{} cannot build a {} solution",
            capability.name(),
            problem.flavor()
        ))),
    }
}
