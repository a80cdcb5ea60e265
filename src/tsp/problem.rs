//! TSP problem definition.

use crate::distance::WeightMatrix;
use crate::models::Tour;

/// A travelling salesman problem over a weight matrix.
///
/// Every matrix index is a visit. `first` is fixed at the start; `last`
/// selects an open (`None`), closed (`Some(first)`) or fixed-end tour.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::tsp::TspProblem;
///
/// let p = TspProblem::fixed(WeightMatrix::uniform(5, 1.0), 0, 4).unwrap();
/// assert_eq!(p.size(), 5);
/// assert!(!p.is_closed());
/// assert!(TspProblem::closed(WeightMatrix::uniform(2, 1.0), 3).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct TspProblem {
    weights: WeightMatrix,
    first: usize,
    last: Option<usize>,
}

impl TspProblem {
    /// Creates a problem, returning `None` if an endpoint is out of range.
    pub fn new(weights: WeightMatrix, first: usize, last: Option<usize>) -> Option<Self> {
        let size = weights.size();
        if first >= size || last.is_some_and(|l| l >= size) {
            return None;
        }
        Some(Self {
            weights,
            first,
            last,
        })
    }

    /// An open problem starting at `first`.
    pub fn open(weights: WeightMatrix, first: usize) -> Option<Self> {
        Self::new(weights, first, None)
    }

    /// A closed problem returning to `first`.
    pub fn closed(weights: WeightMatrix, first: usize) -> Option<Self> {
        Self::new(weights, first, Some(first))
    }

    /// A problem from `first` to a fixed `last`.
    pub fn fixed(weights: WeightMatrix, first: usize, last: usize) -> Option<Self> {
        Self::new(weights, first, Some(last))
    }

    /// The weight matrix.
    pub fn weights(&self) -> &WeightMatrix {
        &self.weights
    }

    /// Weight from `from` to `to`.
    pub fn weight(&self, from: usize, to: usize) -> f64 {
        self.weights.get(from, to)
    }

    /// Number of visits.
    pub fn size(&self) -> usize {
        self.weights.size()
    }

    /// The fixed first visit.
    pub fn first(&self) -> usize {
        self.first
    }

    /// The configured last visit.
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// Returns `true` if the tour returns to `first`.
    pub fn is_closed(&self) -> bool {
        self.last == Some(self.first)
    }

    /// Visits other than the fixed endpoints, in index order.
    pub fn free_visits(&self) -> Vec<usize> {
        (0..self.size())
            .filter(|&v| v != self.first && Some(v) != self.last)
            .collect()
    }

    /// Weight of the tour visiting the free visits in `order` between the
    /// fixed endpoints, including the closing edge when closed.
    pub fn order_weight(&self, order: &[usize]) -> f64 {
        let mut total = 0.0;
        let mut prev = self.first;
        for &v in order {
            total += self.weights.get(prev, v);
            prev = v;
        }
        match self.last {
            Some(l) if prev != l => total + self.weights.get(prev, l),
            _ => total,
        }
    }

    /// Builds a tour from the free visits in the given order.
    ///
    /// Returns `None` if `order` is not a permutation of the free visits.
    pub fn tour_from_order(&self, order: &[usize]) -> Option<Tour> {
        if order.len() != self.size() - 1 - usize::from(self.has_fixed_end()) {
            return None;
        }
        let mut visits = Vec::with_capacity(self.size());
        visits.push(self.first);
        visits.extend_from_slice(order);
        if let Some(l) = self.last.filter(|&l| l != self.first) {
            visits.push(l);
        }
        if visits.iter().any(|&v| v >= self.size()) {
            return None;
        }
        Tour::from_visits(&visits, self.last)
    }

    fn has_fixed_end(&self) -> bool {
        self.last.is_some_and(|l| l != self.first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_visits() {
        let wm = WeightMatrix::uniform(5, 1.0);
        let fixed = TspProblem::fixed(wm.clone(), 1, 3).expect("valid");
        assert_eq!(fixed.free_visits(), vec![0, 2, 4]);
        let open = TspProblem::open(wm, 1).expect("valid");
        assert_eq!(open.free_visits(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_tour_from_order() {
        let wm = WeightMatrix::uniform(4, 1.0);
        let fixed = TspProblem::fixed(wm.clone(), 0, 3).expect("valid");
        let tour = fixed.tour_from_order(&[2, 1]).expect("permutation");
        assert_eq!(tour.visits(), vec![0, 2, 1, 3]);
        assert!(fixed.tour_from_order(&[2]).is_none());
        assert!(fixed.tour_from_order(&[2, 2]).is_none());

        let closed = TspProblem::closed(wm, 0).expect("valid");
        let tour = closed.tour_from_order(&[3, 1, 2]).expect("permutation");
        assert!(tour.is_closed());
        assert_eq!(tour.visits(), vec![0, 3, 1, 2]);
    }

    #[test]
    fn test_order_weight() {
        let wm = WeightMatrix::from_coordinates(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0)]);
        let open = TspProblem::open(wm.clone(), 0).expect("valid");
        assert!((open.order_weight(&[1, 2]) - 3.0).abs() < 1e-10);
        let closed = TspProblem::closed(wm.clone(), 0).expect("valid");
        assert!((closed.order_weight(&[1, 2]) - 6.0).abs() < 1e-10);
        assert_eq!(closed.order_weight(&[]), 0.0);
        let fixed = TspProblem::fixed(wm, 0, 2).expect("valid");
        assert!((fixed.order_weight(&[1]) - 3.0).abs() < 1e-10);
        assert!((fixed.order_weight(&[]) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let wm = WeightMatrix::uniform(2, 1.0);
        assert!(TspProblem::fixed(wm.clone(), 0, 2).is_none());
        assert!(TspProblem::open(wm, 2).is_none());
    }
}
