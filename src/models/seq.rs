//! Contiguous visit sequences used by the exchange operators.

use crate::distance::WeightMatrix;

/// A contiguous run of visits cut from a tour, with the visits directly
/// around it.
///
/// `visits` holds `[before, inner.., after]`; only the inner visits move.
/// A run reaching the end of an open tour has no `after`.
/// `between` is the weight of the inner path in its current direction and
/// `total_original` the weight of the whole run as found in the tour,
/// anchors included.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::Seq;
///
/// let wm = WeightMatrix::from_coordinates(&[(0.0, 0.0), (1.0, 0.0), (3.0, 0.0), (6.0, 0.0)]);
/// let seq = Seq::new(vec![0, 1, 2, 3], 1, &wm).unwrap();
/// assert_eq!(seq.inner(), &[1, 2]);
/// assert_eq!(seq.after(), Some(3));
/// assert_eq!(seq.between(), 2.0);
/// assert_eq!(seq.total_original(), 6.0);
///
/// let rev = seq.reversed(&wm);
/// assert_eq!(rev.inner(), &[2, 1]);
/// assert_eq!(rev.total_original(), 6.0);
///
/// let tail = Seq::open_ended(vec![1, 2, 3], 2, &wm).unwrap();
/// assert_eq!(tail.inner(), &[2, 3]);
/// assert_eq!(tail.after(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Seq {
    visits: Vec<usize>,
    start: usize,
    between: f64,
    total_original: f64,
    reversed: bool,
    open: bool,
}

impl Seq {
    /// Creates a sequence from `[before, inner.., after]`.
    ///
    /// `start` is the tour position of the first inner visit. Returns
    /// `None` if there is no inner visit.
    pub fn new(visits: Vec<usize>, start: usize, weights: &WeightMatrix) -> Option<Self> {
        Self::build(visits, start, weights, false)
    }

    /// Creates a sequence from `[before, inner..]` that ends an open tour.
    pub fn open_ended(visits: Vec<usize>, start: usize, weights: &WeightMatrix) -> Option<Self> {
        Self::build(visits, start, weights, true)
    }

    fn build(visits: Vec<usize>, start: usize, weights: &WeightMatrix, open: bool) -> Option<Self> {
        let anchors = if open { 1 } else { 2 };
        if visits.len() < anchors + 1 {
            return None;
        }
        let between = weights.path_weight(&visits[1..visits.len() + 1 - anchors]);
        let total_original = weights.path_weight(&visits);
        Some(Self {
            visits,
            start,
            between,
            total_original,
            reversed: false,
            open,
        })
    }

    fn inner_end(&self) -> usize {
        if self.open {
            self.visits.len()
        } else {
            self.visits.len() - 1
        }
    }

    /// The visit before the sequence.
    pub fn before(&self) -> usize {
        self.visits[0]
    }

    /// The visit after the sequence, `None` at the end of an open tour.
    pub fn after(&self) -> Option<usize> {
        if self.open {
            None
        } else {
            self.visits.last().copied()
        }
    }

    /// The moving visits, in their current direction.
    pub fn inner(&self) -> &[usize] {
        &self.visits[1..self.inner_end()]
    }

    /// The moving visits in the order they appear in the tour.
    pub fn in_tour_order(&self) -> Vec<usize> {
        let mut order = self.inner().to_vec();
        if self.reversed {
            order.reverse();
        }
        order
    }

    /// First moving visit.
    pub fn head(&self) -> usize {
        self.visits[1]
    }

    /// Last moving visit.
    pub fn tail(&self) -> usize {
        self.visits[self.inner_end() - 1]
    }

    /// Number of moving visits.
    pub fn len(&self) -> usize {
        self.inner_end() - 1
    }

    /// Always `false`: a sequence holds at least one moving visit.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Tour position of the first inner visit when the sequence was cut.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Weight of the inner path in its current direction.
    pub fn between(&self) -> f64 {
        self.between
    }

    /// Weight of `before -> inner -> after` as found in the tour.
    pub fn total_original(&self) -> f64 {
        self.total_original
    }

    /// Returns `true` if the inner visits run opposite to the tour.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Weight of placing the inner path after `from`, followed by `to`
    /// when there is one.
    pub fn cost_between(&self, from: usize, to: Option<usize>, weights: &WeightMatrix) -> f64 {
        weights.get(from, self.head()) + self.between + to.map_or(0.0, |to| weights.get(self.tail(), to))
    }

    /// Weight change of cutting the inner visits out and joining
    /// `before` to `after`.
    pub fn removal_delta(&self, weights: &WeightMatrix) -> f64 {
        let closing = match self.after() {
            // A run spanning a whole closed tour leaves only the anchor.
            Some(after) if after != self.before() => weights.get(self.before(), after),
            _ => 0.0,
        };
        closing - self.total_original
    }

    /// The same sequence with its inner visits reversed.
    ///
    /// `between` is recomputed because weights may be asymmetric;
    /// `total_original` is kept.
    pub fn reversed(&self, weights: &WeightMatrix) -> Self {
        let mut visits = self.visits.clone();
        let end = self.inner_end();
        visits[1..end].reverse();
        let between = weights.path_weight(&visits[1..end]);
        Self {
            visits,
            start: self.start,
            between,
            total_original: self.total_original,
            reversed: !self.reversed,
            open: self.open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asymmetric() -> WeightMatrix {
        WeightMatrix::from_rows(&[
            vec![0.0, 1.0, 9.0, 9.0],
            vec![9.0, 0.0, 2.0, 9.0],
            vec![9.0, 5.0, 0.0, 3.0],
            vec![4.0, 9.0, 9.0, 0.0],
        ])
        .expect("square")
    }

    #[test]
    fn test_requires_inner_visit() {
        let wm = asymmetric();
        assert!(Seq::new(vec![0, 1], 0, &wm).is_none());
        assert!(Seq::new(vec![0, 1, 2], 1, &wm).is_some());
    }

    #[test]
    fn test_weights() {
        let wm = asymmetric();
        let seq = Seq::new(vec![0, 1, 2, 3], 1, &wm).expect("inner");
        assert!((seq.between() - 2.0).abs() < 1e-10);
        assert!((seq.total_original() - 6.0).abs() < 1e-10);
        assert_eq!((seq.head(), seq.tail()), (1, 2));
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_reversed_recomputes_between() {
        let wm = asymmetric();
        let seq = Seq::new(vec![0, 1, 2, 3], 1, &wm).expect("inner");
        let rev = seq.reversed(&wm);
        assert!(rev.is_reversed());
        assert_eq!(rev.inner(), &[2, 1]);
        assert!((rev.between() - 5.0).abs() < 1e-10);
        assert!((rev.total_original() - 6.0).abs() < 1e-10);
        assert_eq!((rev.before(), rev.after()), (0, Some(3)));
        assert_eq!(rev.in_tour_order(), vec![1, 2]);
        assert!(!rev.reversed(&wm).is_reversed());
    }

    #[test]
    fn test_cost_between() {
        let wm = asymmetric();
        let seq = Seq::new(vec![0, 1, 2, 3], 1, &wm).expect("inner");
        assert!((seq.cost_between(0, Some(3), &wm) - seq.total_original()).abs() < 1e-10);
        // 0 -> 1 -> 2 -> 3 replaced by 0 -> 3.
        assert!((seq.removal_delta(&wm) - (9.0 - 6.0)).abs() < 1e-10);
    }

    #[test]
    fn test_open_ended() {
        let wm = asymmetric();
        assert!(Seq::open_ended(vec![0], 1, &wm).is_none());
        let seq = Seq::open_ended(vec![1, 2, 3], 1, &wm).expect("inner");
        assert_eq!(seq.inner(), &[2, 3]);
        assert_eq!((seq.head(), seq.tail(), seq.len()), (2, 3, 2));
        assert_eq!(seq.after(), None);
        assert!((seq.between() - 3.0).abs() < 1e-10);
        assert!((seq.total_original() - 5.0).abs() < 1e-10);
        assert!((seq.removal_delta(&wm) + 5.0).abs() < 1e-10);
        assert!((seq.cost_between(0, None, &wm) - 12.0).abs() < 1e-10);

        let rev = seq.reversed(&wm);
        assert_eq!(rev.inner(), &[3, 2]);
        assert_eq!(rev.after(), None);
        assert!((rev.between() - 9.0).abs() < 1e-10);
    }
}
