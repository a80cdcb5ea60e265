//! Multi-size sequence exchange within and between tours.
//!
//! # Algorithm
//!
//! For every pair of tours close enough to be worth it
//! ([`have_to_try_inter`]), enumerate all sequences of each tour with sizes
//! from `max_size` down to `min_size` ([`seq_and_smaller`]) and commit the
//! first strictly improving feasible swap ([`try_swap`]). Each tour is also
//! paired with itself, swapping two of its non-overlapping sequences. After
//! a commit the enumeration restarts, since the sequences changed.
//!
//! # Complexity
//!
//! O(R² × (n × k)²) simulated swaps per pass, k = `max_size - min_size + 1`.
//!
//! [`try_swap`]: super::try_swap

use super::{try_swap, try_swap_within};
use crate::distance::WeightMatrix;
use crate::models::{Seq, Tour};
use crate::solver::Operator;
use crate::tsp::{TspObjective, TspProblem};
use crate::vrp::{CvrpObjective, CvrpProblem, DepotCvrpSolution};

/// Lazily enumerates the sequences of a tour, largest sizes first.
///
/// Only free visits are ever inside a sequence. An open tour also yields
/// sequences running to its end, with no visit after them. A closed tour
/// yields sequences ending at its last visit only with `wrap`, closed by
/// the edge back to the first. The enumeration is finite and can be
/// restarted with [`reset`](Self::reset) or by cloning before use.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::local_search::seq_and_smaller;
/// use u_tour::models::Tour;
///
/// let wm = WeightMatrix::uniform(4, 1.0);
/// let tour = Tour::from_visits(&[0, 1, 2, 3], Some(0)).unwrap();
///
/// let inner: Vec<Vec<usize>> = seq_and_smaller(&wm, &tour, 1, 2, false)
///     .map(|s| s.inner().to_vec())
///     .collect();
/// assert_eq!(inner, vec![vec![1, 2], vec![1], vec![2]]);
///
/// assert_eq!(seq_and_smaller(&wm, &tour, 1, 2, true).count(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct SeqAndSmaller<'a> {
    weights: &'a WeightMatrix,
    visits: Vec<usize>,
    limit: usize,
    closing: Option<usize>,
    min: usize,
    max: usize,
    size: usize,
    start: usize,
}

/// Enumerates the sequences of `tour` with `min..=max` inner visits.
pub fn seq_and_smaller<'a>(
    weights: &'a WeightMatrix,
    tour: &Tour,
    min: usize,
    max: usize,
    wrap: bool,
) -> SeqAndSmaller<'a> {
    let visits = tour.visits();
    let n = visits.len();
    let open = !tour.is_closed() && !tour.has_fixed_end();
    // Largest index the visit after a sequence may take; `n` stands for the
    // first visit over the closing edge, or for no visit at an open end.
    let limit = if open || (wrap && tour.is_closed()) { n } else { n - 1 };
    let max = max.min(n);
    SeqAndSmaller {
        weights,
        visits,
        limit,
        closing: tour.is_closed().then_some(tour.first()),
        min: min.max(1),
        max,
        size: max,
        start: 1,
    }
}

impl SeqAndSmaller<'_> {
    /// Restarts the enumeration from the largest size.
    pub fn reset(&mut self) {
        self.size = self.max;
        self.start = 1;
    }
}

impl Iterator for SeqAndSmaller<'_> {
    type Item = Seq;

    fn next(&mut self) -> Option<Seq> {
        while self.size >= self.min {
            let end = self.start + self.size;
            if end > self.limit {
                self.size -= 1;
                self.start = 1;
                continue;
            }
            let mut run = Vec::with_capacity(self.size + 2);
            run.push(self.visits[self.start - 1]);
            run.extend_from_slice(&self.visits[self.start..end]);
            let seq = match self.visits.get(end).copied().or(self.closing) {
                Some(after) => {
                    run.push(after);
                    Seq::new(run, self.start, self.weights)
                }
                None => Seq::open_ended(run, self.start, self.weights),
            };
            self.start += 1;
            if seq.is_some() {
                return seq;
            }
        }
        None
    }
}

/// Returns `true` if exchanging visits between `t1` and `t2` is worth
/// enumerating: their closest pair of free visits is no farther apart than
/// twice the mean edge weight of both tours.
///
/// A tour without free visits is always worth trying against one that has
/// some, so relocations can refill it; two such tours never are.
pub fn have_to_try_inter(weights: &WeightMatrix, t1: &Tour, t2: &Tour) -> bool {
    let free1: Vec<usize> = t1.iter().filter(|&v| !t1.is_fixed(v)).collect();
    let free2: Vec<usize> = t2.iter().filter(|&v| !t2.is_fixed(v)).collect();
    match (free1.is_empty(), free2.is_empty()) {
        (true, true) => return false,
        (true, false) | (false, true) => return true,
        (false, false) => {}
    }
    let (sum, count) = t1
        .pairs()
        .chain(t2.pairs())
        .fold((0.0, 0usize), |(s, c), (a, b)| (s + weights.get(a, b), c + 1));
    if count == 0 {
        return true;
    }
    let threshold = 2.0 * sum / count as f64;
    free1.iter().any(|&a| {
        free2
            .iter()
            .any(|&b| weights.get(a, b).min(weights.get(b, a)) <= threshold)
    })
}

/// Swaps sequences of `min_size..=max_size` visits within and between tours.
///
/// # Examples
///
/// ```
/// use u_tour::local_search::MultiExchangeOperator;
///
/// let op = MultiExchangeOperator::new(1, 4).with_wrap(false);
/// assert_eq!((op.min_size, op.max_size, op.wrap), (1, 4, false));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MultiExchangeOperator {
    /// Smallest sequence size.
    pub min_size: usize,
    /// Largest sequence size.
    pub max_size: usize,
    /// Also try sequences closed by a tour's closing edge.
    pub wrap: bool,
}

impl Default for MultiExchangeOperator {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 3,
            wrap: true,
        }
    }
}

impl MultiExchangeOperator {
    /// Creates an operator for sizes `min_size..=max_size`, with wrap.
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self {
            min_size,
            max_size,
            wrap: true,
        }
    }

    /// Sets whether wrap-around sequences are tried.
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    fn sequences(&self, weights: &WeightMatrix, tour: &Tour) -> Vec<Seq> {
        seq_and_smaller(weights, tour, self.min_size, self.max_size, self.wrap).collect()
    }

    /// First improving swap between `t1` and `t2`, or inside `t1` when
    /// they are the same tour.
    fn improve_pair(
        &self,
        problem: &CvrpProblem,
        solution: &mut DepotCvrpSolution,
        t1: usize,
        t2: usize,
    ) -> Option<f64> {
        let weights = problem.weights();
        if t1 == t2 {
            let seqs = self.sequences(weights, solution.tour(t1)?);
            for (i, s1) in seqs.iter().enumerate() {
                for s2 in &seqs[i + 1..] {
                    if let Some(delta) = try_swap(problem, solution, t1, s1, t1, s2) {
                        return Some(delta);
                    }
                }
            }
            return None;
        }
        let (tour1, tour2) = (solution.tour(t1)?, solution.tour(t2)?);
        if !have_to_try_inter(weights, tour1, tour2) {
            return None;
        }
        let seqs1 = self.sequences(weights, tour1);
        let seqs2 = self.sequences(weights, tour2);
        for s1 in &seqs1 {
            for s2 in &seqs2 {
                if let Some(delta) = try_swap(problem, solution, t1, s1, t2, s2) {
                    return Some(delta);
                }
            }
        }
        None
    }

    /// First improving swap of two sequences of one tour.
    fn improve_tour(&self, weights: &WeightMatrix, tour: &mut Tour) -> Option<f64> {
        let seqs = self.sequences(weights, tour);
        for (i, s1) in seqs.iter().enumerate() {
            for s2 in &seqs[i + 1..] {
                if let Some(delta) = try_swap_within(weights, tour, s1, s2) {
                    return Some(delta);
                }
            }
        }
        None
    }
}

impl Operator<TspProblem, TspObjective, Tour> for MultiExchangeOperator {
    fn name(&self) -> &str {
        "MEX"
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

impl Operator<CvrpProblem, CvrpObjective, DepotCvrpSolution> for MultiExchangeOperator {
    fn name(&self) -> &str {
        "MEX"
    }

    fn apply(&self, problem: &CvrpProblem, _: &CvrpObjective, solution: &mut DepotCvrpSolution) -> Option<f64> {
        let mut total = 0.0;
        let mut applied = false;
        'pass: loop {
            for t1 in 0..solution.count() {
                for t2 in t1..solution.count() {
                    if let Some(delta) = self.improve_pair(problem, solution, t1, t2) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::Objective;
    use crate::vrp::{metrics, Capacity, VisitCosts};

    #[test]
    fn test_sizes_largest_first() {
        let wm = WeightMatrix::uniform(5, 1.0);
        let tour = Tour::from_visits(&[0, 1, 2, 3, 4], Some(0)).expect("valid");
        let sizes: Vec<usize> = seq_and_smaller(&wm, &tour, 2, 3, false).map(|s| s.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
    }

    #[test]
    fn test_wrap_uses_closing_edge() {
        let wm = WeightMatrix::uniform(4, 1.0);
        let tour = Tour::from_visits(&[0, 1, 2, 3], Some(0)).expect("valid");
        let wrapped: Vec<Seq> = seq_and_smaller(&wm, &tour, 3, 3, true).collect();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].inner(), &[1, 2, 3]);
        assert_eq!((wrapped[0].before(), wrapped[0].after()), (0, Some(0)));
        assert!(seq_and_smaller(&wm, &tour, 3, 3, false).next().is_none());
    }

    #[test]
    fn test_never_includes_fixed_end() {
        let wm = WeightMatrix::uniform(5, 1.0);
        let tour = Tour::from_visits(&[0, 1, 2, 4], Some(4)).expect("valid");
        for seq in seq_and_smaller(&wm, &tour, 1, 5, true) {
            assert!(!seq.inner().contains(&4));
            assert!(!seq.inner().contains(&0));
        }
    }

    #[test]
    fn test_open_tour_reaches_its_end() {
        let wm = WeightMatrix::uniform(3, 1.0);
        let open = Tour::from_visits(&[0, 1, 2], None).expect("valid");
        for wrap in [false, true] {
            let seqs: Vec<Seq> = seq_and_smaller(&wm, &open, 1, 2, wrap).collect();
            let inner: Vec<Vec<usize>> = seqs.iter().map(|s| s.inner().to_vec()).collect();
            assert_eq!(inner, vec![vec![1, 2], vec![1], vec![2]]);
            assert_eq!(seqs[0].after(), None);
            assert_eq!(seqs[1].after(), Some(2));
            assert_eq!(seqs[2].after(), None);
        }
    }

    #[test]
    fn test_reset_restarts() {
        let wm = WeightMatrix::uniform(4, 1.0);
        let tour = Tour::from_visits(&[0, 1, 2, 3], Some(0)).expect("valid");
        let mut seqs = seq_and_smaller(&wm, &tour, 1, 1, false);
        let first: Vec<Seq> = seqs.by_ref().collect();
        assert!(seqs.next().is_none());
        seqs.reset();
        assert_eq!(seqs.count(), first.len());
    }

    #[test]
    fn test_have_to_try_inter() {
        let wm = WeightMatrix::from_coordinates(&[
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 1.0),
            (-100.0, 0.0),
            (-100.0, 1.0),
            (100.0, 2.0),
        ]);
        let east = Tour::from_visits(&[0, 1, 2], Some(0)).expect("valid");
        let west = Tour::from_visits(&[0, 3, 4], Some(0)).expect("valid");
        let also_east = Tour::from_visits(&[0, 5], Some(0)).expect("valid");
        let empty = Tour::new(0, Some(0));
        // 200 apart against a mean edge of about 67.
        assert!(!have_to_try_inter(&wm, &east, &west));
        assert!(have_to_try_inter(&wm, &east, &also_east));
        // An emptied tour can be refilled from any tour.
        assert!(have_to_try_inter(&wm, &east, &empty));
        assert!(have_to_try_inter(&wm, &empty, &west));
        assert!(!have_to_try_inter(&wm, &empty, &Tour::new(0, Some(0))));
    }

    #[test]
    fn test_swaps_pairs_of_visits() {
        // Two clusters, each tour holding one pair from each side.
        let points = vec![
            (0.0, 0.0),
            (-10.0, 0.0),
            (-10.0, 1.0),
            (10.0, 0.0),
            (10.0, 1.0),
            (-11.0, 0.0),
            (11.0, 0.0),
        ];
        let n = points.len();
        let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 300.0);
        let costs = vec![VisitCosts::uniform(metrics::WEIGHT, n, 100.0)];
        let problem =
            CvrpProblem::new(WeightMatrix::from_coordinates(&points), 0, capacity, costs).expect("valid");
        let mut sol = DepotCvrpSolution::new();
        let a = sol.add(&problem, 0, Some(0));
        let b = sol.add(&problem, 0, Some(0));
        for (after, v) in [(0, 1), (1, 3), (3, 4)] {
            sol.try_insert_after(&problem, a, after, v).expect("fits");
        }
        for (after, v) in [(0, 2), (2, 5), (5, 6)] {
            sol.try_insert_after(&problem, b, after, v).expect("fits");
        }

        let before = CvrpObjective.calculate(&problem, &sol);
        let delta = MultiExchangeOperator::default()
            .apply(&problem, &CvrpObjective, &mut sol)
            .expect("improves");
        let after = CvrpObjective.calculate(&problem, &sol);
        assert!((before + delta - after).abs() < 1e-9);
        assert!(after < before);
        assert!(sol.is_feasible(&problem));
        assert!(sol.content_matches(&problem));
        assert!(sol.tours().verify(n));
        assert_eq!(sol.visit_count(), 6);
    }

    #[test]
    fn test_swaps_within_single_tour() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 0.0)).collect();
        let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 1000.0);
        let costs = vec![VisitCosts::uniform(metrics::WEIGHT, 5, 10.0)];
        let problem =
            CvrpProblem::new(WeightMatrix::from_coordinates(&points), 0, capacity, costs).expect("valid");
        let mut sol = DepotCvrpSolution::new();
        let t = sol.add(&problem, 0, Some(0));
        for (after, v) in [(0, 3), (3, 4), (4, 1), (1, 2)] {
            sol.try_insert_after(&problem, t, after, v).expect("fits");
        }
        let before = CvrpObjective.calculate(&problem, &sol);
        assert!((before - 10.0).abs() < 1e-10);

        let delta = MultiExchangeOperator::new(2, 2)
            .apply(&problem, &CvrpObjective, &mut sol)
            .expect("improves");
        let after = CvrpObjective.calculate(&problem, &sol);
        assert!((before + delta - after).abs() < 1e-10);
        assert!((after - 8.0).abs() < 1e-10);
        assert!(sol.content_matches(&problem));
        assert_eq!(sol.visit_count(), 4);
    }

    #[test]
    fn test_tsp_sequence_swaps() {
        let points: Vec<(f64, f64)> = (0..7).map(|i| (i as f64, 0.0)).collect();
        let problem = TspProblem::open(WeightMatrix::from_coordinates(&points), 0).expect("valid");
        let mut tour = Tour::from_visits(&[0, 5, 6, 3, 4, 1, 2], None).expect("valid");
        let before = tour.weight(problem.weights());

        let op = MultiExchangeOperator::new(1, 2);
        let delta = op.apply(&problem, &TspObjective, &mut tour).expect("improves");
        let after = tour.weight(problem.weights());
        assert!((before + delta - after).abs() < 1e-10);
        assert!(after < before);
        assert!(tour.verify(7));
        assert_eq!(tour.count(), 7);
        assert_eq!(Operator::<TspProblem, TspObjective, Tour>::name(&op), "MEX");
        // A local optimum stays put.
        assert!(op.apply(&problem, &TspObjective, &mut tour).is_none());
    }
}
