//! Visit relocation operator.
//!
//! # Algorithm
//!
//! Tries moving each free visit to every other allowed position: within its
//! own tour, and for depot CVRP solutions also into the cheapest feasible
//! position of every other tour that [`have_to_try_inter`] deems close
//! enough. The first strictly improving move is applied and the scan
//! restarts until a full pass finds nothing (first-improvement strategy).
//!
//! # Complexity
//!
//! O(n²) per pass for one tour; O(n² × R²) across R tours.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.
//!
//! [`have_to_try_inter`]: super::have_to_try_inter

use super::{have_to_try_inter, IMPROVEMENT_EPSILON};
use crate::distance::WeightMatrix;
use crate::models::Tour;
use crate::solver::Operator;
use crate::tsp::{TspObjective, TspProblem};
use crate::vrp::{CvrpObjective, CvrpProblem, DepotCvrpSolution};

/// Moves single visits to cheaper positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelocateOperator;

/// Weight change of moving `visit` directly after `after` in `tour`.
///
/// `None` if the move is not allowed or would leave the tour unchanged.
pub(crate) fn relocate_delta(weights: &WeightMatrix, tour: &Tour, visit: usize, after: usize) -> Option<f64> {
    if visit == after || tour.is_fixed(visit) || !tour.can_insert_after(after) {
        return None;
    }
    let p = tour.prev(visit)?;
    let n = tour.next(visit);
    if p == after || n == Some(p) {
        return None;
    }
    let removal = match n {
        Some(n) => weights.get(p, n) - weights.get(p, visit) - weights.get(visit, n),
        None => -weights.get(p, visit),
    };
    let insertion = weights.get(after, visit)
        + match tour.next(after) {
            Some(x) => weights.get(visit, x) - weights.get(after, x),
            None => 0.0,
        };
    Some(removal + insertion)
}

/// First improving intra-tour relocation as `(visit, after, delta)`.
fn first_improving(weights: &WeightMatrix, tour: &Tour) -> Option<(usize, usize, f64)> {
    for visit in tour.iter() {
        for after in tour.iter() {
            if let Some(delta) = relocate_delta(weights, tour, visit, after) {
                if delta < -IMPROVEMENT_EPSILON {
                    return Some((visit, after, delta));
                }
            }
        }
    }
    None
}

impl Operator<TspProblem, TspObjective, Tour> for RelocateOperator {
    fn name(&self) -> &str {
        "RELOC"
    }

    fn apply(&self, problem: &TspProblem, _: &TspObjective, solution: &mut Tour) -> Option<f64> {
        let mut total = 0.0;
        let mut applied = false;
        while let Some((visit, after, delta)) = first_improving(problem.weights(), solution) {
            if !solution.shift_after(visit, after) {
                break;
            }
            total += delta;
            applied = true;
        }
        applied.then_some(total)
    }
}

impl RelocateOperator {
    fn intra(problem: &CvrpProblem, solution: &mut DepotCvrpSolution, t: usize) -> Option<f64> {
        let tour = solution.tour(t)?;
        let mut candidates = Vec::new();
        for visit in tour.iter() {
            for after in tour.iter() {
                if let Some(delta) = relocate_delta(problem.weights(), tour, visit, after) {
                    if delta < -IMPROVEMENT_EPSILON {
                        candidates.push((visit, after));
                    }
                }
            }
        }
        candidates
            .into_iter()
            .find_map(|(visit, after)| solution.shift_visit(problem, t, visit, after))
    }

    fn inter(problem: &CvrpProblem, solution: &mut DepotCvrpSolution, from: usize, to: usize) -> Option<f64> {
        let (source, target) = (solution.tour(from)?, solution.tour(to)?);
        if !have_to_try_inter(problem.weights(), source, target) {
            return None;
        }
        let visits: Vec<usize> = source.iter().filter(|&v| !source.is_fixed(v)).collect();
        for visit in visits {
            let Some(removal) = solution.removal_delta(problem, from, visit) else {
                continue;
            };
            let Some((after, insertion)) = solution.cheapest_insertion(problem, to, visit) else {
                continue;
            };
            if removal + insertion >= -IMPROVEMENT_EPSILON {
                continue;
            }
            let (Some(mut source), Some(mut target)) = (solution.tour(from).cloned(), solution.tour(to).cloned())
            else {
                return None;
            };
            if !source.remove(visit) || !target.insert_after(after, visit) {
                continue;
            }
            // Non-metric weights can lengthen the source when a visit leaves.
            if !problem.fits(&problem.content_of(&source)) || !problem.fits(&problem.content_of(&target)) {
                continue;
            }
            solution.replace_tour(problem, from, source);
            solution.replace_tour(problem, to, target);
            return Some(removal + insertion);
        }
        None
    }
}

impl Operator<CvrpProblem, CvrpObjective, DepotCvrpSolution> for RelocateOperator {
    fn name(&self) -> &str {
        "RELOC"
    }

    fn apply(&self, problem: &CvrpProblem, _: &CvrpObjective, solution: &mut DepotCvrpSolution) -> Option<f64> {
        let mut total = 0.0;
        let mut applied = false;
        'pass: loop {
            for t in 0..solution.count() {
                if let Some(delta) = Self::intra(problem, solution, t) {
                    total += delta;
                    applied = true;
                    continue 'pass;
                }
            }
            for from in 0..solution.count() {
                for to in 0..solution.count() {
                    if from == to {
                        continue;
                    }
                    if let Some(delta) = Self::inter(problem, solution, from, to) {
                        total += delta;
                        applied = true;
                        continue 'pass;
                    }
                }
            }
            break;
        }
        applied.then_some(total)
    }
}
