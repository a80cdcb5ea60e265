//! Iterative restart driver.
//!
//! # Algorithm
//!
//! For up to `n` iterations, while neither cancelled nor stopped:
//!
//! 1. Run the base solver fresh.
//! 2. If its result beats the best so far, keep a clone and report it.
//! 3. Apply each operator in order to the current solution. An improving
//!    result that beats the best is cloned into the best. Before the next
//!    operator runs, the current solution is reset to a clone of the best.
//!
//! The best fitness never worsens over the run.
//!
//! # Complexity
//!
//! O(n × (T_solver + Σ T_operator)).

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::Rng;

use super::{is_cancelled, Operator, Solver};
use crate::objective::Objective;

/// Predicate `(iteration, problem, objective, best) -> stop`.
pub type StopCondition<P, O, S> = Box<dyn Fn(usize, &P, &O, Option<&S>) -> bool + Send + Sync>;

/// Observer notified with every new best solution.
pub type IntermediateResult<S> = Box<dyn Fn(&S) + Send + Sync>;

type BoxedOperator<P, O, S> = Box<dyn Operator<P, O, S> + Send + Sync>;

/// Wraps a base solver with restarts and local-search operators.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::ga::{EaxSolver, GaSettings};
/// use u_tour::local_search::TwoOptOperator;
/// use u_tour::random::create_rng;
/// use u_tour::solver::{IterativeSolver, Solver};
/// use u_tour::models::Tour;
/// use u_tour::tsp::{TspObjective, TspProblem};
///
/// let wm = WeightMatrix::from_coordinates(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
/// let problem = TspProblem::closed(wm, 0).unwrap();
///
/// let solver = IterativeSolver::<TspProblem, TspObjective, Tour, _>::new(EaxSolver::new(GaSettings::fast()), 3)
///     .with_operator(TwoOptOperator);
/// assert_eq!(solver.name(), "ITER_[3x(EAX+2OPT)]");
///
/// let mut rng = create_rng(42);
/// let (tour, fitness) = solver.solve(&problem, &TspObjective, &mut rng).unwrap();
/// assert_eq!(tour.count(), 4);
/// assert!((fitness - 4.0).abs() < 1e-10);
/// ```
pub struct IterativeSolver<P, O, S, Sv>
where
    O: Objective<P, S>,
{
    solver: Sv,
    n: usize,
    operators: Vec<BoxedOperator<P, O, S>>,
    stop_condition: Option<StopCondition<P, O, S>>,
    intermediate_result: Option<IntermediateResult<S>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<P, O, S, Sv> IterativeSolver<P, O, S, Sv>
where
    O: Objective<P, S>,
    S: Clone,
    Sv: Solver<P, O, S>,
{
    /// Creates a driver running `solver` up to `n` times.
    pub fn new(solver: Sv, n: usize) -> Self {
        Self {
            solver,
            n,
            operators: Vec::new(),
            stop_condition: None,
            intermediate_result: None,
            cancel: None,
        }
    }

    /// Appends an operator; operators run in the order added.
    pub fn with_operator(mut self, operator: impl Operator<P, O, S> + Send + Sync + 'static) -> Self {
        self.operators.push(Box::new(operator));
        self
    }

    /// Sets the stop condition, checked before every iteration.
    pub fn with_stop_condition(
        mut self,
        stop: impl Fn(usize, &P, &O, Option<&S>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.stop_condition = Some(Box::new(stop));
        self
    }

    /// Sets the observer called with every new best solution.
    pub fn with_intermediate_result(mut self, report: impl Fn(&S) + Send + Sync + 'static) -> Self {
        self.intermediate_result = Some(Box::new(report));
        self
    }

    /// Sets a cancellation flag polled before every iteration.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Maximum number of iterations.
    pub fn iterations(&self) -> usize {
        self.n
    }

    fn should_stop(&self, iteration: usize, problem: &P, objective: &O, best: Option<&S>) -> bool {
        is_cancelled(&self.cancel)
            || self
                .stop_condition
                .as_ref()
                .is_some_and(|stop| stop(iteration, problem, objective, best))
    }

    fn report(&self, best: &S) {
        if let Some(report) = &self.intermediate_result {
            report(best);
        }
    }

    fn accept(&self, objective: &O, best: &mut Option<(S, O::Fitness)>, candidate: &S, fitness: O::Fitness) -> bool {
        let better = best
            .as_ref()
            .is_none_or(|(_, f)| objective.is_better_than(fitness, *f));
        if better {
            tracing::debug!(fitness = ?fitness, "new best solution");
            *best = Some((candidate.clone(), fitness));
            self.report(candidate);
        }
        better
    }
}

impl<P, O, S, Sv> Solver<P, O, S> for IterativeSolver<P, O, S, Sv>
where
    O: Objective<P, S>,
    S: Clone,
    Sv: Solver<P, O, S>,
{
    fn name(&self) -> String {
        let base = self.solver.name();
        if self.operators.is_empty() {
            return if self.n == 1 {
                base
            } else {
                format!("ITER_[{}x{}]", self.n, base)
            };
        }
        let ops: Vec<&str> = self.operators.iter().map(|op| op.name()).collect();
        let chain = format!("{}+{}", base, ops.join("+"));
        if self.n == 1 {
            format!("[{chain}]")
        } else {
            format!("ITER_[{}x({})]", self.n, chain)
        }
    }

    fn solve<R: Rng + ?Sized>(
        &self,
        problem: &P,
        objective: &O,
        rng: &mut R,
    ) -> Option<(S, O::Fitness)> {
        let mut best: Option<(S, O::Fitness)> = None;
        let mut i = 0;
        while i < self.n && !self.should_stop(i, problem, objective, best.as_ref().map(|(s, _)| s)) {
            tracing::debug!(iteration = i, solver = %self.solver.name(), "iteration started");

            if let Some((mut next, fitness)) = self.solver.solve(problem, objective, rng) {
                self.accept(objective, &mut best, &next, fitness);

                for operator in &self.operators {
                    if operator.apply(problem, objective, &mut next).is_some() {
                        let fitness = objective.calculate(problem, &next);
                        self.accept(objective, &mut best, &next, fitness);
                    }
                    if let Some((incumbent, _)) = &best {
                        next = incumbent.clone();
                    }
                }
            }
            i += 1;
        }
        best
    }
}
