//! Visit and sequence exchange.
//!
//! # Algorithm
//!
//! A swap takes sequence `s1` out of tour `t1` and sequence `s2` out of
//! tour `t2`, then puts each into the gap left by the other. Weights may be
//! asymmetric, so each sequence is costed in both orientations in its new
//! gap and the cheaper one is kept:
//!
//! ```text
//! delta = min(cost(s2 between b1, a1), cost(rev(s2) between b1, a1)) - total(s1)
//!       + min(cost(s1 between b2, a2), cost(rev(s1) between b2, a2)) - total(s2)
//! ```
//!
//! Two non-overlapping sequences of the same tour swap the same way, except
//! when one directly follows the other: then the pair `b s1 s2 a` becomes
//! `b s2 s1 a` and all four orientation pairs are costed as one run.
//!
//! [`simulate_swap`] only computes this (and checks capacity);
//! [`try_swap`] commits the swap when it strictly improves.
//!
//! # Complexity
//!
//! O(|s1| + |s2|) per simulated swap.
//!
//! # Reference
//!
//! Osman, I.H. (1993). "Metastrategy simulated annealing and tabu search
//! algorithms for the vehicle routing problem", *Annals of Operations
//! Research* 41, 421-451.

use super::IMPROVEMENT_EPSILON;
use crate::distance::WeightMatrix;
use crate::models::{Seq, Tour};
use crate::solver::Operator;
use crate::tsp::{TspObjective, TspProblem};
use crate::vrp::{CvrpObjective, CvrpProblem, DepotCvrpSolution};

/// Result of a simulated swap.
///
/// Orientations are relative to each sequence's current direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapSimulation {
    /// Travel weight change of both tours together.
    pub delta: f64,
    /// `s1` goes into its new gap reversed.
    pub reverse_first: bool,
    /// `s2` goes into its new gap reversed.
    pub reverse_second: bool,
}

/// How two sequences of one tour sit relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Apart,
    FirstThenSecond,
    SecondThenFirst,
}

fn layout(s1: &Seq, s2: &Seq) -> Layout {
    if s1.after().is_some_and(|a| s2.in_tour_order().first() == Some(&a)) {
        Layout::FirstThenSecond
    } else if s2.after().is_some_and(|a| s1.in_tour_order().first() == Some(&a)) {
        Layout::SecondThenFirst
    } else {
        Layout::Apart
    }
}

/// Returns `true` if `seq` still describes a free run of `tour`.
fn still_in(tour: &Tour, seq: &Seq) -> bool {
    let mut current = seq.before();
    for v in seq.in_tour_order() {
        if tour.is_fixed(v) || tour.next(current) != Some(v) {
            return false;
        }
        current = v;
    }
    tour.next(current) == seq.after()
}

/// Cheapest orientation of `seq` between `from` and `to` as
/// `(weight, reversed)`.
fn place(weights: &WeightMatrix, seq: &Seq, from: usize, to: Option<usize>) -> (f64, bool) {
    let forward = seq.cost_between(from, to, weights);
    let backward = seq.reversed(weights).cost_between(from, to, weights);
    if backward < forward {
        (backward, true)
    } else {
        (forward, false)
    }
}

/// Inner visits of `seq`, reversed from their current direction if asked.
fn oriented(seq: &Seq, reverse: bool) -> Vec<usize> {
    let mut visits = seq.inner().to_vec();
    if reverse {
        visits.reverse();
    }
    visits
}

/// Weight of `run` followed by `after`, if any.
fn run_weight(weights: &WeightMatrix, run: &[usize], after: Option<usize>) -> f64 {
    let closing = match (run.last(), after) {
        (Some(&last), Some(after)) => weights.get(last, after),
        _ => 0.0,
    };
    weights.path_weight(run) + closing
}

/// Swaps `a` with `b` directly after it, as `(delta, reverse_a, reverse_b)`.
fn adjacent_delta(weights: &WeightMatrix, a: &Seq, b: &Seq) -> (f64, bool, bool) {
    let mut current = vec![a.before()];
    current.extend(a.in_tour_order());
    current.extend(b.in_tour_order());
    let current = run_weight(weights, &current, b.after());

    let mut best = (f64::INFINITY, false, false);
    for reverse_a in [false, true] {
        for reverse_b in [false, true] {
            let mut run = vec![a.before()];
            run.extend(oriented(b, reverse_b));
            run.extend(oriented(a, reverse_a));
            let cost = run_weight(weights, &run, b.after());
            if cost < best.0 {
                best = (cost, reverse_a, reverse_b);
            }
        }
    }
    (best.0 - current, best.1, best.2)
}

/// Cuts the inner visits of `seq` out of `tour`.
fn cut(tour: &mut Tour, seq: &Seq) -> bool {
    let order = seq.in_tour_order();
    match (order.first(), order.last()) {
        (Some(&from), Some(&to)) => tour.extract(from, to).is_some(),
        _ => false,
    }
}

/// Simulates exchanging two non-overlapping sequences of one tour.
///
/// Nothing is mutated. Returns `None` if the sequences share a visit or
/// no longer match the tour.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::{seq_and_smaller, simulate_swap_within};
/// use u_tour::models::Tour;
///
/// let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
/// let wm = WeightMatrix::from_coordinates(&points);
/// let tour = Tour::from_visits(&[0, 3, 4, 1, 2], Some(0)).unwrap();
/// let seqs: Vec<_> = seq_and_smaller(&wm, &tour, 2, 2, true).collect();
///
/// // [3, 4] and [1, 2] trade places: 10 becomes 8.
/// let sim = simulate_swap_within(&wm, &tour, &seqs[0], &seqs[2]).unwrap();
/// assert_eq!(sim.delta, -2.0);
/// ```
pub fn simulate_swap_within(weights: &WeightMatrix, tour: &Tour, s1: &Seq, s2: &Seq) -> Option<SwapSimulation> {
    if !still_in(tour, s1) || !still_in(tour, s2) {
        return None;
    }
    let order2 = s2.in_tour_order();
    if s1.inner().iter().any(|v| order2.contains(v)) {
        return None;
    }
    let sim = match layout(s1, s2) {
        Layout::Apart => {
            let (into1, reverse_second) = place(weights, s2, s1.before(), s1.after());
            let (into2, reverse_first) = place(weights, s1, s2.before(), s2.after());
            SwapSimulation {
                delta: into1 - s1.total_original() + into2 - s2.total_original(),
                reverse_first,
                reverse_second,
            }
        }
        Layout::FirstThenSecond => {
            let (delta, reverse_first, reverse_second) = adjacent_delta(weights, s1, s2);
            SwapSimulation {
                delta,
                reverse_first,
                reverse_second,
            }
        }
        Layout::SecondThenFirst => {
            let (delta, reverse_second, reverse_first) = adjacent_delta(weights, s2, s1);
            SwapSimulation {
                delta,
                reverse_first,
                reverse_second,
            }
        }
    };
    Some(sim)
}

/// Applies a simulated same-tour swap; on `false` `tour` may be partly
/// changed, so callers work on a copy.
fn swap_within(tour: &mut Tour, s1: &Seq, s2: &Seq, sim: &SwapSimulation) -> bool {
    let into1 = oriented(s2, sim.reverse_second);
    let into2 = oriented(s1, sim.reverse_first);
    let layout = layout(s1, s2);
    if !cut(tour, s1) || !cut(tour, s2) {
        return false;
    }
    match layout {
        Layout::Apart => tour.splice_after(s1.before(), &into1) && tour.splice_after(s2.before(), &into2),
        Layout::FirstThenSecond => tour.splice_after(s1.before(), &[into1, into2].concat()),
        Layout::SecondThenFirst => tour.splice_after(s2.before(), &[into2, into1].concat()),
    }
}

/// Swaps two sequences of `tour` when that strictly improves.
///
/// Returns the weight delta; on `None` the tour is unchanged.
pub fn try_swap_within(weights: &WeightMatrix, tour: &mut Tour, s1: &Seq, s2: &Seq) -> Option<f64> {
    let sim = simulate_swap_within(weights, tour, s1, s2)?;
    if sim.delta >= -IMPROVEMENT_EPSILON {
        return None;
    }
    let mut swapped = tour.clone();
    if !swap_within(&mut swapped, s1, s2, &sim) {
        return None;
    }
    *tour = swapped;
    Some(sim.delta)
}

/// Simulates exchanging `s1` of tour `t1` with `s2` of tour `t2`.
///
/// `t1` may equal `t2` for non-overlapping sequences of one tour. Nothing
/// is mutated. Returns `None` if the sequences overlap, a sequence no
/// longer matches its tour, or a tour would exceed capacity after the swap.
pub fn simulate_swap(
    problem: &CvrpProblem,
    solution: &DepotCvrpSolution,
    t1: usize,
    s1: &Seq,
    t2: usize,
    s2: &Seq,
) -> Option<SwapSimulation> {
    let weights = problem.weights();
    if t1 == t2 {
        let sim = simulate_swap_within(weights, solution.tour(t1)?, s1, s2)?;
        let mut content = solution.content(t1)?.clone();
        content.weight += sim.delta;
        return problem.fits(&content).then_some(sim);
    }
    let (tour1, tour2) = (solution.tour(t1)?, solution.tour(t2)?);
    if !still_in(tour1, s1) || !still_in(tour2, s2) {
        return None;
    }
    let (into1, reverse_second) = place(weights, s2, s1.before(), s1.after());
    let (into2, reverse_first) = place(weights, s1, s2.before(), s2.after());
    let delta1 = into1 - s1.total_original();
    let delta2 = into2 - s2.total_original();

    let load1 = problem.sequence_content(s1.inner());
    let load2 = problem.sequence_content(s2.inner());
    let mut content1 = solution.content(t1)?.clone();
    content1 -= &load1;
    content1 += &load2;
    content1.weight += delta1;
    let mut content2 = solution.content(t2)?.clone();
    content2 -= &load2;
    content2 += &load1;
    content2.weight += delta2;
    if !problem.fits(&content1) || !problem.fits(&content2) {
        return None;
    }

    Some(SwapSimulation {
        delta: delta1 + delta2,
        reverse_first,
        reverse_second,
    })
}

/// Swaps `s1` of tour `t1` with `s2` of tour `t2` when that strictly
/// improves and stays feasible.
///
/// Returns the travel delta; on `None` the solution is unchanged.
pub fn try_swap(
    problem: &CvrpProblem,
    solution: &mut DepotCvrpSolution,
    t1: usize,
    s1: &Seq,
    t2: usize,
    s2: &Seq,
) -> Option<f64> {
    let sim = simulate_swap(problem, solution, t1, s1, t2, s2)?;
    if sim.delta >= -IMPROVEMENT_EPSILON {
        return None;
    }
    if t1 == t2 {
        let mut tour = solution.tour(t1)?.clone();
        if !swap_within(&mut tour, s1, s2, &sim) {
            return None;
        }
        solution.replace_tour(problem, t1, tour);
        return Some(sim.delta);
    }

    let into1 = oriented(s2, sim.reverse_second);
    let into2 = oriented(s1, sim.reverse_first);
    let mut tour1 = solution.tour(t1)?.clone();
    let mut tour2 = solution.tour(t2)?.clone();
    if !cut(&mut tour1, s1) || !cut(&mut tour2, s2) {
        return None;
    }
    if !tour1.splice_after(s1.before(), &into1) || !tour2.splice_after(s2.before(), &into2) {
        return None;
    }
    solution.replace_tour(problem, t1, tour1);
    solution.replace_tour(problem, t2, tour2);
    Some(sim.delta)
}

/// Weight change of swapping the free visits `a` and `b` of one tour.
pub(crate) fn swap_delta(weights: &WeightMatrix, tour: &Tour, a: usize, b: usize) -> Option<f64> {
    if a == b || tour.is_fixed(a) || tour.is_fixed(b) {
        return None;
    }
    let w = |from: usize, to: Option<usize>| to.map_or(0.0, |to| weights.get(from, to));
    let (pa, na) = (tour.prev(a)?, tour.next(a));
    let (pb, nb) = (tour.prev(b)?, tour.next(b));
    let delta = if na == Some(b) {
        weights.get(pa, b) + weights.get(b, a) + w(a, nb) - weights.get(pa, a) - weights.get(a, b) - w(b, nb)
    } else if nb == Some(a) {
        weights.get(pb, a) + weights.get(a, b) + w(b, na) - weights.get(pb, b) - weights.get(b, a) - w(a, na)
    } else {
        weights.get(pa, b) + w(b, na) + weights.get(pb, a) + w(a, nb)
            - weights.get(pa, a)
            - w(a, na)
            - weights.get(pb, b)
            - w(b, nb)
    };
    Some(delta)
}

/// Best improving intra-tour swap as `(a, b, delta)`.
fn best_swap(weights: &WeightMatrix, tour: &Tour) -> Option<(usize, usize, f64)> {
    let free: Vec<usize> = tour.iter().filter(|&v| !tour.is_fixed(v)).collect();
    let mut best: Option<(usize, usize, f64)> = None;
    for (i, &a) in free.iter().enumerate() {
        for &b in &free[i + 1..] {
            let Some(delta) = swap_delta(weights, tour, a, b) else {
                continue;
            };
            if delta < -IMPROVEMENT_EPSILON && best.is_none_or(|(_, _, d)| delta < d) {
                best = Some((a, b, delta));
            }
        }
    }
    best
}

/// Runs improving swaps on one tour until none is left.
fn improve_by_swaps(weights: &WeightMatrix, tour: &mut Tour) -> Option<f64> {
    let mut total = 0.0;
    let mut applied = false;
    while let Some((a, b, delta)) = best_swap(weights, tour) {
        if !tour.swap(a, b) {
            break;
        }
        total += delta;
        applied = true;
    }
    applied.then_some(total)
}

/// Swaps pairs of single visits, within a tour and between tours.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::ExchangeOperator;
/// use u_tour::models::Tour;
/// use u_tour::solver::Operator;
/// use u_tour::tsp::{TspObjective, TspProblem};
///
/// let wm = WeightMatrix::from_coordinates(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
/// let problem = TspProblem::open(wm, 0).unwrap();
/// let mut tour = Tour::from_visits(&[0, 3, 2, 1], None).unwrap();
///
/// assert!(ExchangeOperator.apply(&problem, &TspObjective, &mut tour).is_some());
/// assert_eq!(tour.visits(), vec![0, 1, 2, 3]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeOperator;

impl Operator<TspProblem, TspObjective, Tour> for ExchangeOperator {
    fn name(&self) -> &str {
        "EX"
    }

    fn apply(&self, problem: &TspProblem, _: &TspObjective, solution: &mut Tour) -> Option<f64> {
        improve_by_swaps(problem.weights(), solution)
    }
}

impl Operator<CvrpProblem, CvrpObjective, DepotCvrpSolution> for ExchangeOperator {
    fn name(&self) -> &str {
        "EX"
    }

    fn apply(&self, problem: &CvrpProblem, _: &CvrpObjective, solution: &mut DepotCvrpSolution) -> Option<f64> {
        let weights = problem.weights();
        let mut total = 0.0;
        let mut applied = false;

        for t in 0..solution.count() {
            let Some(mut tour) = solution.tour(t).cloned() else {
                continue;
            };
            if let Some(delta) = improve_by_swaps(weights, &mut tour) {
                solution.replace_tour(problem, t, tour);
                total += delta;
                applied = true;
            }
        }

        'pass: loop {
            for t1 in 0..solution.count() {
                for t2 in (t1 + 1)..solution.count() {
                    let (Some(tour1), Some(tour2)) = (solution.tour(t1), solution.tour(t2)) else {
                        continue;
                    };
                    if !super::have_to_try_inter(weights, tour1, tour2) {
                        continue;
                    }
                    let seqs1: Vec<Seq> = super::seq_and_smaller(weights, tour1, 1, 1, true).collect();
                    let seqs2: Vec<Seq> = super::seq_and_smaller(weights, tour2, 1, 1, true).collect();
                    for s1 in &seqs1 {
                        for s2 in &seqs2 {
                            if let Some(delta) = try_swap(problem, solution, t1, s1, t2, s2) {
                                total += delta;
                                applied = true;
                                continue 'pass;
                            }
                        }
                    }
                }
            }
            break;
        }
        applied.then_some(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_search::seq_and_smaller;
    use crate::vrp::{metrics, Capacity, VisitCosts};

    fn two_cluster_problem(weight_cap: f64) -> CvrpProblem {
        // Depot in the middle, cluster A on the left, cluster B on the right.
        let points = vec![
            (0.0, 0.0),
            (-10.0, 0.0),
            (-10.0, 1.0),
            (10.0, 0.0),
            (10.0, 1.0),
        ];
        let capacity = Capacity::new().with_constraint(metrics::WEIGHT, weight_cap);
        let costs = vec![VisitCosts::new(metrics::WEIGHT, vec![0.0, 100.0, 100.0, 120.0, 150.0])];
        CvrpProblem::new(WeightMatrix::from_coordinates(&points), 0, capacity, costs).expect("valid")
    }

    /// Tours [0, 1, 3] and [0, 2, 4]: each mixes both clusters.
    fn mixed(problem: &CvrpProblem) -> DepotCvrpSolution {
        let mut sol = DepotCvrpSolution::new();
        let a = sol.add(problem, 0, Some(0));
        let b = sol.add(problem, 0, Some(0));
        sol.try_insert_after(problem, a, 0, 1).expect("fits");
        sol.try_insert_after(problem, a, 1, 3).expect("fits");
        sol.try_insert_after(problem, b, 0, 2).expect("fits");
        sol.try_insert_after(problem, b, 2, 4).expect("fits");
        sol
    }

    fn single(weights: &WeightMatrix, tour: &Tour, visit: usize) -> Seq {
        let prev = tour.prev(visit).expect("in tour");
        let next = tour.next(visit).expect("in tour");
        Seq::new(vec![prev, visit, next], 0, weights).expect("inner")
    }

    #[test]
    fn test_simulate_does_not_mutate() {
        let problem = two_cluster_problem(1000.0);
        let sol = mixed(&problem);
        let s1 = single(problem.weights(), sol.tour(0).expect("tour"), 3);
        let s2 = single(problem.weights(), sol.tour(1).expect("tour"), 2);
        let first = simulate_swap(&problem, &sol, 0, &s1, 1, &s2).expect("feasible");
        let second = simulate_swap(&problem, &sol, 0, &s1, 1, &s2).expect("feasible");
        assert_eq!(first, second);
        assert!(first.delta < 0.0);
        assert_eq!(sol.tour(0).expect("tour").visits(), vec![0, 1, 3]);
        assert!(simulate_swap(&problem, &sol, 0, &s1, 0, &s2).is_none());
    }

    #[test]
    fn test_try_swap_commits_exact_delta() {
        let problem = two_cluster_problem(1000.0);
        let mut sol = mixed(&problem);
        let before = sol.weight(&problem);
        let s1 = single(problem.weights(), sol.tour(0).expect("tour"), 3);
        let s2 = single(problem.weights(), sol.tour(1).expect("tour"), 2);
        let delta = try_swap(&problem, &mut sol, 0, &s1, 1, &s2).expect("improves");
        assert!((before + delta - sol.weight(&problem)).abs() < 1e-9);
        assert!(sol.content_matches(&problem));
        assert!(sol.tours().verify(5));
        // The same sequences are stale now.
        assert!(simulate_swap(&problem, &sol, 0, &s1, 1, &s2).is_none());
    }

    #[test]
    fn test_swap_rejected_over_capacity() {
        // Moving 4 into tour a would load it with 150 + 120.
        let problem = two_cluster_problem(250.0);
        let mut sol = mixed(&problem);
        let s1 = single(problem.weights(), sol.tour(0).expect("tour"), 1);
        let s2 = single(problem.weights(), sol.tour(1).expect("tour"), 4);
        assert!(simulate_swap(&problem, &sol, 0, &s1, 1, &s2).is_none());
        let before = sol.clone();
        assert!(try_swap(&problem, &mut sol, 0, &s1, 1, &s2).is_none());
        assert_eq!(sol.tour(0), before.tour(0));
    }

    #[test]
    fn test_swap_delta_matches_weight() {
        let wm = WeightMatrix::from_rows(&[
            vec![0.0, 2.0, 9.0, 4.0, 7.0],
            vec![3.0, 0.0, 1.0, 8.0, 2.0],
            vec![6.0, 4.0, 0.0, 1.0, 9.0],
            vec![1.0, 7.0, 3.0, 0.0, 5.0],
            vec![8.0, 2.0, 6.0, 4.0, 0.0],
        ])
        .expect("square");
        for last in [None, Some(0)] {
            let tour = Tour::from_visits(&[0, 1, 2, 3, 4], last).expect("valid");
            for a in 1..5 {
                for b in 1..5 {
                    if let Some(delta) = swap_delta(&wm, &tour, a, b) {
                        let mut swapped = tour.clone();
                        assert!(swapped.swap(a, b));
                        let expected = swapped.weight(&wm) - tour.weight(&wm);
                        assert!((delta - expected).abs() < 1e-10, "swap {a} {b}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_operator_separates_clusters() {
        let problem = two_cluster_problem(1000.0);
        let mut sol = mixed(&problem);
        let before = sol.weight(&problem);
        let delta = ExchangeOperator.apply(&problem, &CvrpObjective, &mut sol).expect("improves");
        assert!((before + delta - sol.weight(&problem)).abs() < 1e-9);
        let t = sol.tour_of(1).expect("routed");
        assert_eq!(sol.tour_of(2), Some(t));
        assert!(sol.is_feasible(&problem));
    }

    fn line(n: usize) -> WeightMatrix {
        let points: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, 0.0)).collect();
        WeightMatrix::from_coordinates(&points)
    }

    /// Deterministic asymmetric weights.
    fn skewed(n: usize) -> WeightMatrix {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { 0.0 } else { ((i * 7 + j * 3) % 11) as f64 + 1.0 })
                    .collect()
            })
            .collect();
        WeightMatrix::from_rows(&rows).expect("square")
    }

    #[test]
    fn test_swap_within_adjacent_sequences() {
        let wm = line(5);
        let mut tour = Tour::from_visits(&[0, 3, 4, 1, 2], Some(0)).expect("valid");
        assert!((tour.weight(&wm) - 10.0).abs() < 1e-10);
        let seqs: Vec<Seq> = seq_and_smaller(&wm, &tour, 2, 2, true).collect();
        let first = seqs.iter().find(|s| s.inner() == [3, 4]).expect("seq");
        let second = seqs.iter().find(|s| s.inner() == [1, 2]).expect("seq");

        let sim = simulate_swap_within(&wm, &tour, first, second).expect("disjoint");
        assert!((sim.delta + 2.0).abs() < 1e-10);
        let mirrored = simulate_swap_within(&wm, &tour, second, first).expect("disjoint");
        assert!((mirrored.delta - sim.delta).abs() < 1e-10);

        let delta = try_swap_within(&wm, &mut tour, first, second).expect("improves");
        assert!((delta + 2.0).abs() < 1e-10);
        assert!((tour.weight(&wm) - 8.0).abs() < 1e-10);
        assert!(tour.verify(5));
    }

    #[test]
    fn test_swap_within_rejects_overlap() {
        let wm = line(5);
        let tour = Tour::from_visits(&[0, 3, 4, 1, 2], Some(0)).expect("valid");
        let seqs: Vec<Seq> = seq_and_smaller(&wm, &tour, 2, 2, true).collect();
        let a = seqs.iter().find(|s| s.inner() == [3, 4]).expect("seq");
        let b = seqs.iter().find(|s| s.inner() == [4, 1]).expect("seq");
        assert!(simulate_swap_within(&wm, &tour, a, b).is_none());
        assert!(simulate_swap_within(&wm, &tour, a, a).is_none());
    }

    #[test]
    fn test_swap_within_delta_matches_weight() {
        let wm = skewed(8);
        for last in [None, Some(0), Some(7)] {
            let tour = Tour::from_visits(&[0, 5, 2, 6, 1, 4, 3, 7], last).expect("valid");
            let seqs: Vec<Seq> = seq_and_smaller(&wm, &tour, 1, 3, true).collect();
            let mut simulated = 0;
            for (i, s1) in seqs.iter().enumerate() {
                for s2 in &seqs[i + 1..] {
                    let Some(sim) = simulate_swap_within(&wm, &tour, s1, s2) else {
                        continue;
                    };
                    simulated += 1;
                    let mut swapped = tour.clone();
                    assert!(swap_within(&mut swapped, s1, s2, &sim));
                    assert!(swapped.verify(8));
                    assert_eq!(swapped.count(), tour.count());
                    let expected = swapped.weight(&wm) - tour.weight(&wm);
                    assert!(
                        (sim.delta - expected).abs() < 1e-10,
                        "{:?} <-> {:?} last {last:?}",
                        s1.inner(),
                        s2.inner()
                    );
                }
            }
            assert!(simulated > 0);
        }
    }

    #[test]
    fn test_cvrp_swap_within_one_tour() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
        let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 1000.0);
        let costs = vec![VisitCosts::uniform(metrics::WEIGHT, 5, 10.0)];
        let problem = CvrpProblem::new(WeightMatrix::from_coordinates(&points), 0, capacity, costs).expect("valid");
        let mut sol = DepotCvrpSolution::new();
        let t = sol.add(&problem, 0, Some(0));
        for (after, v) in [(0, 3), (3, 4), (4, 1), (1, 2)] {
            sol.try_insert_after(&problem, t, after, v).expect("fits");
        }
        let seqs: Vec<Seq> = seq_and_smaller(problem.weights(), sol.tour(t).expect("tour"), 2, 2, true)
            .collect();
        let s1 = seqs.iter().find(|s| s.inner() == [3, 4]).expect("seq");
        let s2 = seqs.iter().find(|s| s.inner() == [1, 2]).expect("seq");

        let sim = simulate_swap(&problem, &sol, t, s1, t, s2).expect("feasible");
        assert!((sim.delta + 2.0).abs() < 1e-10);
        assert_eq!(sol.tour(t).expect("tour").visits(), vec![0, 3, 4, 1, 2]);

        let delta = try_swap(&problem, &mut sol, t, s1, t, s2).expect("improves");
        assert!((delta + 2.0).abs() < 1e-10);
        assert!((sol.weight(&problem) - 8.0).abs() < 1e-10);
        assert!(sol.content_matches(&problem));
        assert_eq!(sol.visit_count(), 4);
    }
}
