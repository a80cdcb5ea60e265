//! Seeded cheapest-insertion construction.
//!
//! # Algorithm
//!
//! 1. Visits that cannot be served even by a dedicated round trip are
//!    recorded as unassigned.
//! 2. While unrouted visits remain, open a depot tour around a seed drawn
//!    at random among the `seed_candidates` unrouted visits farthest from
//!    the depot.
//! 3. Grow the tour by repeatedly inserting, at its cheapest feasible
//!    position, the best of the `neighbourhood` unrouted visits nearest the
//!    seed. If none of them fits, every unrouted visit is tried. When
//!    nothing fits the tour is closed and step 2 repeats.
//!
//! # Complexity
//!
//! O(n² × L) where L is the longest tour length.

use rand::Rng;

use super::{CvrpProblem, DepotCvrpSolution};
use crate::objective::Objective;
use crate::solver::Solver;

/// Builds a [`DepotCvrpSolution`] by growing tours around seed visits.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::random::create_rng;
/// use u_tour::solver::Solver;
/// use u_tour::vrp::{metrics, Capacity, CvrpObjective, CvrpProblem, SeededCheapestInsertion, VisitCosts};
///
/// let points: Vec<(f64, f64)> = (0..7).map(|i| (i as f64, 0.0)).collect();
/// let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 300.0);
/// let costs = vec![VisitCosts::uniform(metrics::WEIGHT, 7, 100.0)];
/// let problem = CvrpProblem::new(WeightMatrix::from_coordinates(&points), 0, capacity, costs).unwrap();
///
/// let mut rng = create_rng(42);
/// let (sol, _) = SeededCheapestInsertion::default()
///     .solve(&problem, &CvrpObjective, &mut rng)
///     .unwrap();
/// assert_eq!(sol.visit_count(), 6);
/// assert_eq!(sol.count(), 2);
/// assert!(sol.is_feasible(&problem));
/// ```
#[derive(Debug, Clone)]
pub struct SeededCheapestInsertion {
    /// Unrouted visits nearest the seed considered per insertion step.
    pub neighbourhood: usize,
    /// Farthest unrouted visits the seed is drawn from.
    pub seed_candidates: usize,
}

impl Default for SeededCheapestInsertion {
    fn default() -> Self {
        Self {
            neighbourhood: 10,
            seed_candidates: 3,
        }
    }
}

impl SeededCheapestInsertion {
    /// Creates a construction with default sizes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the insertion neighbourhood size.
    pub fn with_neighbourhood(mut self, n: usize) -> Self {
        self.neighbourhood = n;
        self
    }

    /// Sets how many far visits compete to become a seed.
    pub fn with_seed_candidates(mut self, n: usize) -> Self {
        self.seed_candidates = n;
        self
    }

    fn pick_seed<R: Rng + ?Sized>(&self, problem: &CvrpProblem, unrouted: &[usize], rng: &mut R) -> usize {
        let depot = problem.depot();
        let mut by_distance = unrouted.to_vec();
        by_distance.sort_by(|&a, &b| {
            let da = problem.weight(depot, a) + problem.weight(a, depot);
            let db = problem.weight(depot, b) + problem.weight(b, depot);
            db.total_cmp(&da)
        });
        let k = self.seed_candidates.clamp(1, by_distance.len());
        by_distance[rng.random_range(0..k)]
    }

    /// Best `(visit, after, delta)` among `candidates` for tour `t`.
    fn best_insertion(
        solution: &DepotCvrpSolution,
        problem: &CvrpProblem,
        t: usize,
        candidates: &[usize],
    ) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for &v in candidates {
            if let Some((after, delta)) = solution.cheapest_insertion(problem, t, v) {
                if best.is_none_or(|(_, _, d)| delta < d) {
                    best = Some((v, after, delta));
                }
            }
        }
        best
    }

    /// Runs the construction.
    pub fn construct<R: Rng + ?Sized>(&self, problem: &CvrpProblem, rng: &mut R) -> DepotCvrpSolution {
        let depot = problem.depot();
        let mut solution = DepotCvrpSolution::new();
        let mut unrouted = Vec::new();
        for v in problem.visits() {
            if problem.fits_alone(v) {
                unrouted.push(v);
            } else {
                solution.mark_unassigned(v);
            }
        }

        while !unrouted.is_empty() {
            let seed = self.pick_seed(problem, &unrouted, rng);
            unrouted.retain(|&v| v != seed);
            let t = solution.add(problem, depot, Some(depot));
            if solution.try_insert_after(problem, t, depot, seed).is_none() {
                solution.mark_unassigned(seed);
                solution.remove_empty_tours();
                continue;
            }
            solution.set_seed(t, seed);
            tracing::trace!(tour = t, seed, remaining = unrouted.len(), "opened tour");

            loop {
                let mut near = unrouted.clone();
                near.sort_by(|&a, &b| problem.weight(seed, a).total_cmp(&problem.weight(seed, b)));
                near.truncate(self.neighbourhood.max(1));

                let found = Self::best_insertion(&solution, problem, t, &near)
                    .or_else(|| Self::best_insertion(&solution, problem, t, &unrouted));
                let Some((visit, after, _)) = found else {
                    break;
                };
                if solution.try_insert_after(problem, t, after, visit).is_none() {
                    break;
                }
                unrouted.retain(|&v| v != visit);
            }
        }
        solution
    }
}

impl<O> Solver<CvrpProblem, O, DepotCvrpSolution> for SeededCheapestInsertion
where
    O: Objective<CvrpProblem, DepotCvrpSolution>,
{
    fn name(&self) -> String {
        "SCI".to_string()
    }

    fn solve<R: Rng + ?Sized>(
        &self,
        problem: &CvrpProblem,
        objective: &O,
        rng: &mut R,
    ) -> Option<(DepotCvrpSolution, O::Fitness)> {
        let solution = self.construct(problem, rng);
        let fitness = objective.calculate(problem, &solution);
        Some((solution, fitness))
    }
}
