//! Depot-based capacitated VRP solution.

use super::{Content, CvrpProblem};
use crate::models::{MultiTour, Tour};

/// Tours anchored at a depot, with one [`Content`] and one seed per tour.
///
/// Every mutation goes through methods that keep each tour's content equal
/// to [`CvrpProblem::content_of`] of that tour. Insertions that would break
/// a capacity constraint are rejected without changing anything.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::vrp::{metrics, Capacity, CvrpProblem, DepotCvrpSolution, VisitCosts};
///
/// let capacity = Capacity::new().with_constraint(metrics::WEIGHT, 150.0);
/// let costs = vec![VisitCosts::uniform(metrics::WEIGHT, 4, 100.0)];
/// let problem = CvrpProblem::new(WeightMatrix::uniform(4, 1.0), 0, capacity, costs).unwrap();
///
/// let mut sol = DepotCvrpSolution::new();
/// let t = sol.add(&problem, 0, Some(0));
/// assert!(sol.try_insert_after(&problem, t, 0, 1).is_some());
/// assert!(sol.try_insert_after(&problem, t, 1, 2).is_none()); // 200 > 150
/// assert_eq!(sol.content(t).unwrap().quantities, vec![100.0]);
/// assert!(sol.content_matches(&problem));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DepotCvrpSolution {
    tours: MultiTour,
    contents: Vec<Content>,
    seeds: Vec<Option<usize>>,
    unassigned: Vec<usize>,
}

impl DepotCvrpSolution {
    /// Creates a solution without tours.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tour anchored at `first` and returns its index.
    pub fn add(&mut self, problem: &CvrpProblem, first: usize, last: Option<usize>) -> usize {
        let t = self.tours.add(first, last);
        let content = self.tours.tour(t).map(|tour| problem.content_of(tour)).unwrap_or_default();
        self.contents.push(content);
        self.seeds.push(None);
        t
    }

    /// Number of tours.
    pub fn count(&self) -> usize {
        self.tours.count()
    }

    /// All tours.
    pub fn tours(&self) -> &MultiTour {
        &self.tours
    }

    /// The tour at `t`.
    pub fn tour(&self, t: usize) -> Option<&Tour> {
        self.tours.tour(t)
    }

    /// The content of tour `t`.
    pub fn content(&self, t: usize) -> Option<&Content> {
        self.contents.get(t)
    }

    /// Contents of all tours.
    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// The seed tour `t` was grown from.
    pub fn seed(&self, t: usize) -> Option<usize> {
        self.seeds.get(t).copied().flatten()
    }

    /// Records the seed of tour `t`.
    pub fn set_seed(&mut self, t: usize, seed: usize) -> bool {
        match self.seeds.get_mut(t) {
            Some(slot) => {
                *slot = Some(seed);
                true
            }
            None => false,
        }
    }

    /// Visits that could not be served by any tour.
    pub fn unassigned(&self) -> &[usize] {
        &self.unassigned
    }

    /// Records a visit that cannot be served.
    pub fn mark_unassigned(&mut self, visit: usize) {
        if !self.unassigned.contains(&visit) {
            self.unassigned.push(visit);
        }
    }

    /// Number of routed non-depot visits.
    pub fn visit_count(&self) -> usize {
        self.tours.visit_count()
    }

    /// Index of the tour serving `visit`.
    pub fn tour_of(&self, visit: usize) -> Option<usize> {
        self.tours.tour_of(visit)
    }

    /// Total travel weight over all tours.
    pub fn weight(&self, problem: &CvrpProblem) -> f64 {
        self.tours.iter().map(|t| t.weight(problem.weights())).sum()
    }

    /// Travel delta of inserting `visit` after `after` in tour `t`, or
    /// `None` if the position is not allowed.
    pub fn insertion_delta(&self, problem: &CvrpProblem, t: usize, after: usize, visit: usize) -> Option<f64> {
        let tour = self.tours.tour(t)?;
        if tour.contains(visit) || !tour.can_insert_after(after) {
            return None;
        }
        let delta = problem.weight(after, visit)
            + match tour.next(after) {
                Some(n) => problem.weight(visit, n) - problem.weight(after, n),
                // A closed tour holding only its anchor gains the closing edge.
                None if tour.is_closed() => problem.weight(visit, tour.first()),
                None => 0.0,
            };
        Some(delta)
    }

    fn fits_with(&self, problem: &CvrpProblem, t: usize, travel: f64, added: &Content, removed: &Content) -> bool {
        let Some(current) = self.contents.get(t) else {
            return false;
        };
        let mut content = current.clone();
        content += added;
        content -= removed;
        content.weight += travel;
        problem.fits(&content)
    }

    /// Cheapest feasible position for `visit` in tour `t` as
    /// `(after, travel delta)`.
    pub fn cheapest_insertion(&self, problem: &CvrpProblem, t: usize, visit: usize) -> Option<(usize, f64)> {
        let tour = self.tours.tour(t)?;
        let added = problem.visit_content(visit);
        let empty = Content::zero(added.quantities.len());
        let mut best: Option<(usize, f64)> = None;
        for after in tour.iter() {
            let Some(delta) = self.insertion_delta(problem, t, after, visit) else {
                continue;
            };
            if best.is_none_or(|(_, d)| delta < d) && self.fits_with(problem, t, delta, &added, &empty) {
                best = Some((after, delta));
            }
        }
        best
    }

    /// Inserts `visit` after `after` in tour `t` if capacity allows.
    ///
    /// Returns the travel delta; on `None` nothing changed.
    pub fn try_insert_after(&mut self, problem: &CvrpProblem, t: usize, after: usize, visit: usize) -> Option<f64> {
        let delta = self.insertion_delta(problem, t, after, visit)?;
        let added = problem.visit_content(visit);
        if !self.fits_with(problem, t, delta, &added, &Content::zero(added.quantities.len())) {
            return None;
        }
        if !self.tours.tour_mut(t)?.insert_after(after, visit) {
            return None;
        }
        let content = &mut self.contents[t];
        *content += &added;
        content.weight += delta;
        self.unassigned.retain(|&v| v != visit);
        Some(delta)
    }

    /// Travel delta of removing `visit` from tour `t`.
    pub fn removal_delta(&self, problem: &CvrpProblem, t: usize, visit: usize) -> Option<f64> {
        let tour = self.tours.tour(t)?;
        if !tour.contains(visit) || tour.is_fixed(visit) {
            return None;
        }
        let prev = tour.prev(visit)?;
        let delta = match tour.next(visit) {
            Some(n) if n == prev => -problem.weight(prev, visit) - problem.weight(visit, n),
            Some(n) => problem.weight(prev, n) - problem.weight(prev, visit) - problem.weight(visit, n),
            None => -problem.weight(prev, visit),
        };
        Some(delta)
    }

    /// Removes `visit` from tour `t` and returns the travel delta.
    ///
    /// With non-metric weights a removal can lengthen the tour; such a
    /// removal is rejected when it would break the time constraint.
    pub fn remove_visit(&mut self, problem: &CvrpProblem, t: usize, visit: usize) -> Option<f64> {
        let delta = self.removal_delta(problem, t, visit)?;
        let removed = problem.visit_content(visit);
        let empty = Content::zero(removed.quantities.len());
        if !self.fits_with(problem, t, delta, &empty, &removed) {
            return None;
        }
        if !self.tours.tour_mut(t)?.remove(visit) {
            return None;
        }
        let content = &mut self.contents[t];
        *content -= &removed;
        content.weight += delta;
        Some(delta)
    }

    /// Moves `visit` after `after` within tour `t` if capacity allows.
    pub fn shift_visit(&mut self, problem: &CvrpProblem, t: usize, visit: usize, after: usize) -> Option<f64> {
        let tour = self.tours.tour(t)?;
        if visit == after || tour.next(after) == Some(visit) {
            return None;
        }
        let mut moved = tour.clone();
        if !moved.shift_after(visit, after) {
            return None;
        }
        let delta = moved.weight(problem.weights()) - tour.weight(problem.weights());
        let empty = Content::zero(problem.quantity_names().len());
        if !self.fits_with(problem, t, delta, &empty, &empty) {
            return None;
        }
        self.tours.replace(t, moved)?;
        self.contents[t].weight += delta;
        Some(delta)
    }

    /// Replaces tour `t` and recomputes its content.
    ///
    /// Capacity is not checked; callers validate the new tour first.
    pub fn replace_tour(&mut self, problem: &CvrpProblem, t: usize, tour: Tour) -> Option<Tour> {
        let content = problem.content_of(&tour);
        let old = self.tours.replace(t, tour)?;
        self.contents[t] = content;
        Some(old)
    }

    /// Drops tours that hold only their anchors; returns how many.
    pub fn remove_empty_tours(&mut self) -> usize {
        let mut removed = 0;
        let mut t = 0;
        while t < self.tours.count() {
            if self.tours.tour(t).is_some_and(|tour| tour.free_count() == 0) {
                self.tours.remove(t);
                self.contents.remove(t);
                self.seeds.remove(t);
                removed += 1;
            } else {
                t += 1;
            }
        }
        removed
    }

    /// Returns `true` if every stored content equals a recomputation.
    pub fn content_matches(&self, problem: &CvrpProblem) -> bool {
        self.tours.count() == self.contents.len()
            && self
                .tours
                .iter()
                .zip(&self.contents)
                .all(|(tour, content)| problem.content_of(tour).approx_eq(content, 1e-6))
    }

    /// Returns `true` if every tour respects capacity.
    pub fn is_feasible(&self, problem: &CvrpProblem) -> bool {
        self.contents.iter().all(|c| problem.fits(c))
    }

    /// Relabels every visit through `mapping` (old index to new index).
    ///
    /// Contents are label independent and carried over. Returns `None` if
    /// a visit has no mapping.
    pub fn remap(&self, mapping: &[usize]) -> Option<Self> {
        let map = |v: usize| mapping.get(v).copied();
        let mut tours = MultiTour::new();
        for tour in self.tours.iter() {
            let visits: Option<Vec<usize>> = tour.iter().map(map).collect();
            let last = match tour.last() {
                Some(l) => Some(map(l)?),
                None => None,
            };
            tours.push(Tour::from_visits(&visits?, last)?);
        }
        let seeds = self
            .seeds
            .iter()
            .map(|s| match s {
                Some(v) => map(*v).map(Some),
                None => Some(None),
            })
            .collect::<Option<Vec<_>>>()?;
        let unassigned = self.unassigned.iter().map(|&v| map(v)).collect::<Option<Vec<_>>>()?;
        Some(Self {
            tours,
            contents: self.contents.clone(),
            seeds,
            unassigned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;
    use crate::vrp::{metrics, Capacity, VisitCosts};

    fn line_problem(capacity: f64) -> CvrpProblem {
        let points: Vec<(f64, f64)> = (0..6).map(|i| (i as f64, 0.0)).collect();
        let cap = Capacity::new()
            .with_constraint(metrics::WEIGHT, capacity)
            .with_constraint(metrics::TIME, 100.0);
        let costs = vec![
            VisitCosts::uniform(metrics::WEIGHT, 6, 10.0),
            VisitCosts::uniform(metrics::TIME, 6, 1.0),
        ];
        CvrpProblem::new(WeightMatrix::from_coordinates(&points), 0, cap, costs).expect("valid")
    }

    #[test]
    fn test_insert_and_remove_keep_content() {
        let p = line_problem(100.0);
        let mut sol = DepotCvrpSolution::new();
        let t = sol.add(&p, 0, Some(0));
        assert!((sol.try_insert_after(&p, t, 0, 2).expect("fits") - 4.0).abs() < 1e-10);
        assert!(sol.try_insert_after(&p, t, 0, 1).is_some());
        assert!(sol.try_insert_after(&p, t, 2, 5).is_some());
        assert!(sol.content_matches(&p));
        assert_eq!(sol.tour(t).expect("tour").visits(), vec![0, 1, 2, 5]);

        let d = sol.remove_visit(&p, t, 2).expect("present");
        assert!(d.abs() < 1e-10);
        assert!(sol.content_matches(&p));
        assert!(sol.remove_visit(&p, t, 0).is_none());
        assert!(sol.remove_visit(&p, t, 2).is_none());
    }

    #[test]
    fn test_infeasible_insert_is_rejected_without_change() {
        let p = line_problem(20.0);
        let mut sol = DepotCvrpSolution::new();
        let t = sol.add(&p, 0, Some(0));
        assert!(sol.try_insert_after(&p, t, 0, 1).is_some());
        let before = sol.clone();
        assert!(sol.try_insert_after(&p, t, 1, 2).is_none());
        assert_eq!(sol.tour(t), before.tour(t));
        assert_eq!(sol.content(t), before.content(t));
    }

    #[test]
    fn test_cheapest_insertion() {
        let p = line_problem(100.0);
        let mut sol = DepotCvrpSolution::new();
        let t = sol.add(&p, 0, Some(0));
        sol.try_insert_after(&p, t, 0, 4);
        let (after, delta) = sol.cheapest_insertion(&p, t, 2).expect("fits");
        assert_eq!(after, 0);
        assert!(delta.abs() < 1e-10);
    }

    #[test]
    fn test_shift_visit() {
        let p = line_problem(100.0);
        let mut sol = DepotCvrpSolution::new();
        let t = sol.add(&p, 0, Some(0));
        sol.try_insert_after(&p, t, 0, 3);
        sol.try_insert_after(&p, t, 3, 1);
        sol.try_insert_after(&p, t, 1, 2);
        let delta = sol.shift_visit(&p, t, 1, 0).expect("allowed");
        assert!((delta + 2.0).abs() < 1e-10);
        assert_eq!(sol.tour(t).expect("tour").visits(), vec![0, 1, 3, 2]);
        assert!(sol.content_matches(&p));
    }

    #[test]
    fn test_remove_empty_tours_and_seeds() {
        let p = line_problem(100.0);
        let mut sol = DepotCvrpSolution::new();
        let a = sol.add(&p, 0, Some(0));
        let b = sol.add(&p, 0, Some(0));
        sol.try_insert_after(&p, b, 0, 3);
        assert!(sol.set_seed(b, 3));
        assert!(!sol.set_seed(9, 3));
        assert_eq!(sol.seed(a), None);
        assert_eq!(sol.remove_empty_tours(), 1);
        assert_eq!(sol.count(), 1);
        assert_eq!(sol.seed(0), Some(3));
        assert!(sol.content_matches(&p));
    }

    #[test]
    fn test_remap() {
        let p = line_problem(100.0);
        let mut sol = DepotCvrpSolution::new();
        let t = sol.add(&p, 0, Some(0));
        sol.try_insert_after(&p, t, 0, 2);
        sol.set_seed(t, 2);
        sol.mark_unassigned(5);
        let mapped = sol.remap(&[10, 11, 12, 13, 14, 15]).expect("mapped");
        assert_eq!(mapped.tour(0).expect("tour").visits(), vec![10, 12]);
        assert!(mapped.tour(0).expect("tour").is_closed());
        assert_eq!(mapped.seed(0), Some(12));
        assert_eq!(mapped.unassigned(), &[15]);
        assert!(sol.remap(&[1, 2]).is_none());
    }

    #[test]
    fn test_clone_is_deep() {
        let p = line_problem(100.0);
        let mut sol = DepotCvrpSolution::new();
        let t = sol.add(&p, 0, Some(0));
        sol.try_insert_after(&p, t, 0, 2);
        let copy = sol.clone();
        sol.remove_visit(&p, t, 2);
        assert_eq!(copy.visit_count(), 1);
        assert_eq!(sol.visit_count(), 0);
    }
}
