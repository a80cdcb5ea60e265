//! Solver and operator abstractions plus the iterative driver.
//!
//! A [`Solver`] produces a solution from nothing; an [`Operator`] improves
//! an existing one in place. [`IterativeSolver`] wraps any solver with
//! restarts, operator application and elitist best tracking. [`improve`]
//! and [`construct`] dispatch a [`Capability`] over problem and solution
//! variants.
//!
//! Solvers take the random number generator at call time and hold no
//! mutable state, so independent problems can be solved on separate
//! threads with separate generators.

mod capability;
mod iterative;

pub use capability::{construct, improve, Capability, RoutingProblem};
pub use iterative::{IntermediateResult, IterativeSolver, StopCondition};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;

use crate::objective::Objective;

/// Produces a solution for a problem.
pub trait Solver<P, O, S>
where
    O: Objective<P, S>,
{
    /// Name used in logs and composite solver names.
    fn name(&self) -> String;

    /// Builds a solution and its fitness.
    ///
    /// Returns `None` when no solution could be produced, for example when
    /// the run was cancelled before the first result.
    fn solve<R: Rng + ?Sized>(
        &self,
        problem: &P,
        objective: &O,
        rng: &mut R,
    ) -> Option<(S, O::Fitness)>;
}

/// Improves a solution in place.
pub trait Operator<P, O, S>
where
    O: Objective<P, S>,
{
    /// Name used in composite solver names.
    fn name(&self) -> &str;

    /// Applies improving moves to `solution`.
    ///
    /// Returns the fitness delta (negative is an improvement) if at least
    /// one move was applied. On `None` the solution is unchanged.
    fn apply(&self, problem: &P, objective: &O, solution: &mut S) -> Option<O::Fitness>;
}

/// Returns `true` if the optional cancellation flag has been raised.
pub(crate) fn is_cancelled(cancel: &Option<Arc<AtomicBool>>) -> bool {
    cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed))
}
