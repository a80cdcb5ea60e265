//! Intra-tour 2-opt improvement.
//!
//! # Algorithm
//!
//! For each segment `v[i..=j]` of free visits, compute the change from
//! reversing it:
//!
//! ```text
//! delta = w(p, v[j]) + rev(v[i..=j]) + w(v[i], q)
//!       - w(p, v[i]) - fwd(v[i..=j]) - w(v[j], q)
//! ```
//!
//! where `p` precedes and `q` follows the segment. Weights may be
//! asymmetric, so the inner path is re-costed in both directions; both sums
//! are grown incrementally while `j` advances. The best reversal of each
//! pass is applied until no pass improves (best-improvement strategy).
//!
//! # Complexity
//!
//! O(n²) per pass.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use super::IMPROVEMENT_EPSILON;
use crate::distance::WeightMatrix;
use crate::models::Tour;
use crate::objective::Objective;
use crate::solver::Operator;
use crate::tsp::{TspObjective, TspProblem};
use crate::vrp::{CvrpObjective, CvrpProblem, DepotCvrpSolution};

/// Segment-reversal operator for single tours and every tour of a
/// depot CVRP solution.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::TwoOptOperator;
/// use u_tour::models::Tour;
/// use u_tour::solver::Operator;
/// use u_tour::tsp::{TspObjective, TspProblem};
///
/// let wm = WeightMatrix::from_coordinates(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
/// let problem = TspProblem::closed(wm, 0).unwrap();
/// let mut tour = Tour::from_visits(&[0, 2, 1, 3], Some(0)).unwrap();
///
/// let delta = TwoOptOperator.apply(&problem, &TspObjective, &mut tour).unwrap();
/// assert!(delta < 0.0);
/// assert!((tour.weight(problem.weights()) - 4.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoOptOperator;

/// Best reversal of one pass as `(from, to, delta)`.
fn best_reversal(weights: &WeightMatrix, tour: &Tour) -> Option<(usize, usize, f64)> {
    let v = tour.visits();
    let n = v.len();
    // The last position that may be reversed.
    let last = if tour.has_fixed_end() { n.checked_sub(2)? } else { n.checked_sub(1)? };
    let mut best: Option<(usize, usize, f64)> = None;

    for i in 1..last {
        let p = v[i - 1];
        let mut fwd = 0.0;
        let mut rev = 0.0;
        for j in (i + 1)..=last {
            fwd += weights.get(v[j - 1], v[j]);
            rev += weights.get(v[j], v[j - 1]);
            let q = if j + 1 < n {
                Some(v[j + 1])
            } else if tour.is_closed() {
                Some(v[0])
            } else {
                None
            };
            let (old_out, new_out) = match q {
                Some(q) => (weights.get(v[j], q), weights.get(v[i], q)),
                None => (0.0, 0.0),
            };
            let delta = weights.get(p, v[j]) + rev + new_out - weights.get(p, v[i]) - fwd - old_out;
            if delta < -IMPROVEMENT_EPSILON && best.is_none_or(|(_, _, d)| delta < d) {
                best = Some((v[i], v[j], delta));
            }
        }
    }
    best
}

/// Runs 2-opt on `tour` until no reversal improves it.
///
/// Returns the total weight change if at least one reversal was applied.
pub(crate) fn improve_tour(weights: &WeightMatrix, tour: &mut Tour) -> Option<f64> {
    let mut total = 0.0;
    let mut applied = false;
    while let Some((from, to, delta)) = best_reversal(weights, tour) {
        if !tour.reverse(from, to) {
            break;
        }
        total += delta;
        applied = true;
    }
    applied.then_some(total)
}

impl Operator<TspProblem, TspObjective, Tour> for TwoOptOperator {
    fn name(&self) -> &str {
        "2OPT"
    }

    fn apply(&self, problem: &TspProblem, _: &TspObjective, solution: &mut Tour) -> Option<f64> {
        improve_tour(problem.weights(), solution)
    }
}

impl Operator<CvrpProblem, CvrpObjective, DepotCvrpSolution> for TwoOptOperator {
    fn name(&self) -> &str {
        "2OPT"
    }

    fn apply(
        &self,
        problem: &CvrpProblem,
        objective: &CvrpObjective,
        solution: &mut DepotCvrpSolution,
    ) -> Option<f64> {
        let mut total = objective.zero();
        let mut applied = false;
        for t in 0..solution.count() {
            let Some(mut tour) = solution.tour(t).cloned() else {
                continue;
            };
            // Shorter travel never breaks a capacity that held before.
            if let Some(delta) = improve_tour(problem.weights(), &mut tour) {
                solution.replace_tour(problem, t, tour);
                total = objective.add(total, delta);
                applied = true;
            }
        }
        applied.then_some(total)
    }
}
