//! Sequence relocation within and between tours (Or-opt).
//!
//! # Algorithm
//!
//! Each sequence of `min_size..=max_size` free visits is taken out of its
//! tour and costed at every other position, in both orientations:
//!
//! ```text
//! removal   = w(before, after) - total(s)
//! insertion = w(x, head) + between(s) + w(tail, next(x)) - w(x, next(x))
//! ```
//!
//! Within a tour, `next(x)` is read after the removal, so `x = before`
//! reinserts the sequence reversed in place. Between tours, only nearby
//! pairs ([`have_to_try_inter`]) are tried and both tours must stay within
//! capacity. The first sequence with an improving move is relocated to its
//! best position; the scan restarts until nothing improves.
//!
//! # Complexity
//!
//! O(n² × k) per pass for one tour, O(R² × n² × k) across R tours,
//! k = `max_size - min_size + 1`.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.
//!
//! [`have_to_try_inter`]: super::have_to_try_inter

use super::{have_to_try_inter, seq_and_smaller, IMPROVEMENT_EPSILON};
use crate::distance::WeightMatrix;
use crate::models::{Seq, Tour};
use crate::solver::Operator;
use crate::tsp::{TspObjective, TspProblem};
use crate::vrp::{CvrpObjective, CvrpProblem, DepotCvrpSolution};

/// Moves sequences of `min_size..=max_size` visits to cheaper positions,
/// in the same tour or another one.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::MultiRelocateOperator;
/// use u_tour::models::Tour;
/// use u_tour::solver::Operator;
/// use u_tour::tsp::{TspObjective, TspProblem};
///
/// let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
/// let problem = TspProblem::closed(WeightMatrix::from_coordinates(&points), 0).unwrap();
/// let mut tour = Tour::from_visits(&[0, 3, 4, 1, 2], Some(0)).unwrap();
///
/// let delta = MultiRelocateOperator::new(2, 2).apply(&problem, &TspObjective, &mut tour);
/// assert_eq!(delta, Some(-2.0));
/// assert_eq!(tour.weight(problem.weights()), 8.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MultiRelocateOperator {
    /// Smallest sequence size.
    pub min_size: usize,
    /// Largest sequence size.
    pub max_size: usize,
}

impl Default for MultiRelocateOperator {
    fn default() -> Self {
        Self {
            min_size: 2,
            max_size: 3,
        }
    }
}

/// A relocation found by the scan.
struct Move {
    seq: Seq,
    after: usize,
    delta: f64,
}

/// Weight change of moving `seq` of `tour` directly after `x` of the same
/// tour, in `seq`'s current direction.
///
/// `None` if `x` is inside the sequence, cannot take a successor, or the
/// sequence holds every free visit of a closed tour.
fn within_delta(weights: &WeightMatrix, tour: &Tour, seq: &Seq, x: usize) -> Option<f64> {
    if seq.after() == Some(seq.before()) || seq.inner().contains(&x) || !tour.can_insert_after(x) {
        return None;
    }
    let next = if x == seq.before() { seq.after() } else { tour.next(x) };
    let insertion = seq.cost_between(x, next, weights) - next.map_or(0.0, |n| weights.get(x, n));
    Some(seq.removal_delta(weights) + insertion)
}

/// Cheapest improving position and orientation for `seq` in its own tour.
fn best_within(weights: &WeightMatrix, tour: &Tour, seq: &Seq) -> Option<Move> {
    let reversed = seq.reversed(weights);
    let mut best: Option<Move> = None;
    for x in tour.iter() {
        for candidate in [seq, &reversed] {
            let Some(delta) = within_delta(weights, tour, candidate, x) else {
                continue;
            };
            if delta < -IMPROVEMENT_EPSILON && best.as_ref().is_none_or(|m| delta < m.delta) {
                best = Some(Move {
                    seq: candidate.clone(),
                    after: x,
                    delta,
                });
            }
        }
    }
    best
}

/// Cuts the sequence of `m` out of `source` and splices it after `m.after`
/// in `target`, which may be a copy of the same tour.
fn relocate(source: &mut Tour, target: Option<&mut Tour>, m: &Move) -> bool {
    let order = m.seq.in_tour_order();
    let (Some(&from), Some(&to)) = (order.first(), order.last()) else {
        return false;
    };
    if source.extract(from, to).is_none() {
        return false;
    }
    match target {
        Some(target) => target.splice_after(m.after, m.seq.inner()),
        None => source.splice_after(m.after, m.seq.inner()),
    }
}

impl MultiRelocateOperator {
    /// Creates an operator for sizes `min_size..=max_size`.
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self { min_size, max_size }
    }

    fn sequences(&self, weights: &WeightMatrix, tour: &Tour) -> Vec<Seq> {
        seq_and_smaller(weights, tour, self.min_size, self.max_size, true).collect()
    }

    /// First sequence of `tour` with an improving move inside it, relocated
    /// to its best position.
    fn improve_tour(&self, weights: &WeightMatrix, tour: &mut Tour) -> Option<f64> {
        for seq in self.sequences(weights, tour) {
            let Some(m) = best_within(weights, tour, &seq) else {
                continue;
            };
            let mut moved = tour.clone();
            if relocate(&mut moved, None, &m) {
                *tour = moved;
                return Some(m.delta);
            }
        }
        None
    }

    /// Intra-tour Or-opt on tour `t`, keeping it within capacity.
    fn improve_within(&self, problem: &CvrpProblem, solution: &mut DepotCvrpSolution, t: usize) -> Option<f64> {
        let weights = problem.weights();
        let mut tour = solution.tour(t)?.clone();
        let delta = self.improve_tour(weights, &mut tour)?;
        let mut content = solution.content(t)?.clone();
        content.weight += delta;
        if !problem.fits(&content) {
            return None;
        }
        solution.replace_tour(problem, t, tour);
        Some(delta)
    }

    /// Cheapest feasible improving relocation of `seq` into tour `to`.
    fn best_target(problem: &CvrpProblem, solution: &DepotCvrpSolution, from: usize, seq: &Seq, to: usize) -> Option<Move> {
        let weights = problem.weights();
        let removal = seq.removal_delta(weights);
        let load = problem.sequence_content(seq.inner());

        let mut source = solution.content(from)?.clone();
        source -= &load;
        source.weight += removal;
        if !problem.fits(&source) {
            return None;
        }

        let target = solution.tour(to)?;
        let base = solution.content(to)?;
        let reversed = seq.reversed(weights);
        let mut best: Option<Move> = None;
        for x in target.iter() {
            if !target.can_insert_after(x) {
                continue;
            }
            let current = target.next(x);
            // A closed tour holding only its anchor gains the closing edge.
            let next = current.or_else(|| target.is_closed().then_some(target.first()));
            let replaced = current.map_or(0.0, |n| weights.get(x, n));
            for candidate in [seq, &reversed] {
                let insertion = candidate.cost_between(x, next, weights) - replaced;
                let delta = removal + insertion;
                if delta >= -IMPROVEMENT_EPSILON || best.as_ref().is_some_and(|m| m.delta <= delta) {
                    continue;
                }
                let mut content = base.clone();
                content += &load;
                content.weight += insertion;
                if problem.fits(&content) {
                    best = Some(Move {
                        seq: candidate.clone(),
                        after: x,
                        delta,
                    });
                }
            }
        }
        best
    }

    fn commit(problem: &CvrpProblem, solution: &mut DepotCvrpSolution, from: usize, to: usize, m: &Move) -> Option<f64> {
        let mut source = solution.tour(from)?.clone();
        let mut target = solution.tour(to)?.clone();
        if !relocate(&mut source, Some(&mut target), m) {
            return None;
        }
        solution.replace_tour(problem, from, source);
        solution.replace_tour(problem, to, target);
        Some(m.delta)
    }

    fn improve_pair(&self, problem: &CvrpProblem, solution: &mut DepotCvrpSolution, from: usize, to: usize) -> Option<f64> {
        let weights = problem.weights();
        let (source, target) = (solution.tour(from)?, solution.tour(to)?);
        if !have_to_try_inter(weights, source, target) {
            return None;
        }
        for seq in &self.sequences(weights, source) {
            if let Some(m) = Self::best_target(problem, solution, from, seq, to) {
                return Self::commit(problem, solution, from, to, &m);
            }
        }
        None
    }
}

impl Operator<TspProblem, TspObjective, Tour> for MultiRelocateOperator {
    fn name(&self) -> &str {
        "MRELOC"
    }

    fn apply(&self, problem: &TspProblem, _: &TspObjective, solution: &mut Tour) -> Option<f64> {
        let mut total = 0.0;
        let mut applied = false;
        while let Some(delta) = self.improve_tour(problem.weights(), solution) {
            total += delta;
            applied = true;
        }
        applied.then_some(total)
    }
}

impl Operator<CvrpProblem, CvrpObjective, DepotCvrpSolution> for MultiRelocateOperator {
    fn name(&self) -> &str {
        "MRELOC"
    }

    fn apply(&self, problem: &CvrpProblem, _: &CvrpObjective, solution: &mut DepotCvrpSolution) -> Option<f64> {
        let mut total = 0.0;
        let mut applied = false;
        'pass: loop {
            for from in 0..solution.count() {
                for to in 0..solution.count() {
                    let delta = if from == to {
                        self.improve_within(problem, solution, from)
                    } else {
                        self.improve_pair(problem, solution, from, to)
                    };
                    if let Some(delta) = delta {
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
