//! Tour: an ordered visit sequence with O(1) successor and predecessor lookup.

use std::collections::HashSet;
use std::fmt;

use crate::distance::WeightMatrix;

/// An ordered sequence of distinct visits for one vehicle.
///
/// A tour always starts at `first`, which can never be removed. The optional
/// `last` selects the variant:
///
/// - `None`: open, the tour ends wherever its sequence ends.
/// - `Some(first)`: closed, the end wraps back to `first`.
/// - `Some(l)` with `l != first`: fixed end, `l` stays at the end.
///
/// Successors are stored in index arrays, so cloning is a plain array copy.
///
/// # Examples
///
/// ```
/// use u_tour::models::Tour;
///
/// let mut tour = Tour::from_visits(&[0, 1, 2], Some(0)).unwrap();
/// assert!(tour.is_closed());
/// assert_eq!(tour.next(2), Some(0));
///
/// assert!(tour.insert_after(1, 3));
/// assert_eq!(tour.visits(), vec![0, 1, 3, 2]);
/// assert!(!tour.remove(0)); // first is fixed
/// ```
#[derive(Debug, Clone)]
pub struct Tour {
    first: usize,
    last: Option<usize>,
    end: usize,
    count: usize,
    next: Vec<Option<usize>>,
    prev: Vec<Option<usize>>,
}

impl Tour {
    /// Creates a tour holding only its anchors: `[first]`, or
    /// `[first, last]` when `last` is a distinct fixed end.
    pub fn new(first: usize, last: Option<usize>) -> Self {
        let mut tour = Self::anchored(first, last);
        if let Some(l) = last {
            if l != first {
                tour.push_back(l);
            }
        }
        tour
    }

    /// Creates a tour from an explicit order.
    ///
    /// Returns `None` if `visits` is empty, contains duplicates, or does not
    /// end with a distinct fixed `last`.
    pub fn from_visits(visits: &[usize], last: Option<usize>) -> Option<Self> {
        let (&first, rest) = visits.split_first()?;
        if let Some(l) = last {
            if l != first && visits.last() != Some(&l) {
                return None;
            }
        }
        let mut tour = Self::anchored(first, last);
        for &v in rest {
            if tour.contains(v) {
                return None;
            }
            tour.push_back(v);
        }
        Some(tour)
    }

    fn anchored(first: usize, last: Option<usize>) -> Self {
        let mut tour = Self {
            first,
            last,
            end: first,
            count: 1,
            next: Vec::new(),
            prev: Vec::new(),
        };
        tour.ensure(first);
        tour
    }

    fn ensure(&mut self, visit: usize) {
        if visit >= self.next.len() {
            self.next.resize(visit + 1, None);
            self.prev.resize(visit + 1, None);
        }
    }

    fn push_back(&mut self, visit: usize) {
        self.ensure(visit);
        self.next[self.end] = Some(visit);
        self.prev[visit] = Some(self.end);
        self.end = visit;
        self.count += 1;
    }

    /// The fixed first visit.
    pub fn first(&self) -> usize {
        self.first
    }

    /// The configured last visit (see the type docs for its meaning).
    pub fn last(&self) -> Option<usize> {
        self.last
    }

    /// The visit currently at the end of the sequence.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of visits, anchors included.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns `true` if the end wraps back to the first visit.
    pub fn is_closed(&self) -> bool {
        self.last == Some(self.first)
    }

    /// Returns `true` if a distinct last visit is pinned at the end.
    pub fn has_fixed_end(&self) -> bool {
        self.last.is_some_and(|l| l != self.first)
    }

    /// Returns `true` if `visit` is an anchor that can never move.
    pub fn is_fixed(&self, visit: usize) -> bool {
        visit == self.first || (self.has_fixed_end() && self.last == Some(visit))
    }

    /// Number of visits that are not anchors.
    pub fn free_count(&self) -> usize {
        if self.has_fixed_end() {
            self.count - 2
        } else {
            self.count - 1
        }
    }

    /// Returns `true` if `visit` is in this tour.
    pub fn contains(&self, visit: usize) -> bool {
        visit == self.first || self.prev.get(visit).is_some_and(|p| p.is_some())
    }

    /// Successor of `visit`, following the closing edge in a closed tour.
    pub fn next(&self, visit: usize) -> Option<usize> {
        if !self.contains(visit) {
            return None;
        }
        match self.next[visit] {
            Some(n) => Some(n),
            None if self.is_closed() && self.count > 1 => Some(self.first),
            None => None,
        }
    }

    /// Predecessor of `visit`, following the closing edge in a closed tour.
    pub fn prev(&self, visit: usize) -> Option<usize> {
        if !self.contains(visit) {
            return None;
        }
        if visit == self.first {
            return (self.is_closed() && self.count > 1).then_some(self.end);
        }
        self.prev[visit]
    }

    /// Iterates visits from `first` in order (no wrap-around).
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tour: self,
            current: Some(self.first),
        }
    }

    /// Visits in order.
    pub fn visits(&self) -> Vec<usize> {
        self.iter().collect()
    }

    /// Consecutive `(from, to)` pairs, including the closing edge when closed.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let closing = (self.is_closed() && self.count > 1).then_some((self.end, self.first));
        self.iter().zip(self.iter().skip(1)).chain(closing)
    }

    /// Sum of the weights of all pairs.
    pub fn weight(&self, weights: &WeightMatrix) -> f64 {
        self.pairs().map(|(a, b)| weights.get(a, b)).sum()
    }

    /// Returns `true` if a visit may be inserted directly after `after`.
    pub fn can_insert_after(&self, after: usize) -> bool {
        self.contains(after) && !(self.has_fixed_end() && after == self.end)
    }

    /// Inserts a new visit after `after`.
    ///
    /// Returns `false` without changes if `visit` is already present or the
    /// position is not allowed.
    pub fn insert_after(&mut self, after: usize, visit: usize) -> bool {
        if visit == after || self.contains(visit) || !self.can_insert_after(after) {
            return false;
        }
        self.ensure(visit);
        let n = self.next[after];
        self.next[after] = Some(visit);
        self.prev[visit] = Some(after);
        self.next[visit] = n;
        match n {
            Some(n) => self.prev[n] = Some(visit),
            None => self.end = visit,
        }
        self.count += 1;
        true
    }

    /// Removes a visit. Anchors cannot be removed.
    pub fn remove(&mut self, visit: usize) -> bool {
        if !self.contains(visit) || self.is_fixed(visit) {
            return false;
        }
        self.unlink(visit);
        true
    }

    fn unlink(&mut self, visit: usize) {
        let Some(p) = self.prev[visit] else {
            return;
        };
        let n = self.next[visit];
        self.next[p] = n;
        match n {
            Some(n) => self.prev[n] = Some(p),
            None => self.end = p,
        }
        self.next[visit] = None;
        self.prev[visit] = None;
        self.count -= 1;
    }

    /// Moves an existing visit so it directly follows `after`.
    pub fn shift_after(&mut self, visit: usize, after: usize) -> bool {
        if visit == after
            || !self.contains(visit)
            || self.is_fixed(visit)
            || !self.can_insert_after(after)
        {
            return false;
        }
        if self.next[after] == Some(visit) {
            return true;
        }
        self.unlink(visit);
        self.insert_after(after, visit)
    }

    /// Exchanges the positions of two free visits.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) || self.is_fixed(a) || self.is_fixed(b) {
            return false;
        }
        if self.next[a] == Some(b) {
            return self.shift_after(a, b);
        }
        if self.next[b] == Some(a) {
            return self.shift_after(b, a);
        }
        let (Some(pa), Some(pb)) = (self.prev[a], self.prev[b]) else {
            return false;
        };
        self.shift_after(a, pb) && self.shift_after(b, pa)
    }

    /// Puts `new` in the position of `old`, which leaves the tour.
    pub fn replace(&mut self, old: usize, new: usize) -> bool {
        if old == new || !self.contains(old) || self.is_fixed(old) || self.contains(new) {
            return false;
        }
        self.ensure(new);
        let p = self.prev[old];
        let n = self.next[old];
        self.prev[new] = p;
        self.next[new] = n;
        if let Some(p) = p {
            self.next[p] = Some(new);
        }
        match n {
            Some(n) => self.prev[n] = Some(new),
            None => self.end = new,
        }
        self.prev[old] = None;
        self.next[old] = None;
        true
    }

    /// The visits from `from` to `to` inclusive, walking forward without
    /// wrapping. `None` if `to` does not follow `from`.
    pub fn path(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        let mut path = vec![from];
        let mut current = from;
        while current != to {
            current = self.next[current]?;
            path.push(current);
        }
        Some(path)
    }

    /// Reverses the sub-path `from..=to` in place. Anchors cannot be part
    /// of the reversed path.
    pub fn reverse(&mut self, from: usize, to: usize) -> bool {
        let Some(path) = self.path(from, to) else {
            return false;
        };
        if path.iter().any(|&v| self.is_fixed(v)) {
            return false;
        }
        if path.len() < 2 {
            return true;
        }
        let Some(p) = self.prev[from] else {
            return false;
        };
        let q = self.next[to];
        let mut current = p;
        for &v in path.iter().rev() {
            self.next[current] = Some(v);
            self.prev[v] = Some(current);
            current = v;
        }
        self.next[from] = q;
        match q {
            Some(q) => self.prev[q] = Some(from),
            None => self.end = from,
        }
        true
    }

    /// Cuts the sub-path `from..=to` out of the tour and returns it.
    pub fn extract(&mut self, from: usize, to: usize) -> Option<Vec<usize>> {
        let path = self.path(from, to)?;
        if path.iter().any(|&v| self.is_fixed(v)) {
            return None;
        }
        let p = self.prev[from]?;
        let q = self.next[to];
        self.next[p] = q;
        match q {
            Some(q) => self.prev[q] = Some(p),
            None => self.end = p,
        }
        for &v in &path {
            self.next[v] = None;
            self.prev[v] = None;
        }
        self.count -= path.len();
        Some(path)
    }

    /// Inserts `visits` in order directly after `after`.
    ///
    /// Returns `false` without changes if any visit is already present,
    /// repeated, or the position is not allowed.
    pub fn splice_after(&mut self, after: usize, visits: &[usize]) -> bool {
        if !self.can_insert_after(after) {
            return false;
        }
        let mut seen = HashSet::with_capacity(visits.len());
        if visits.iter().any(|&v| self.contains(v) || !seen.insert(v)) {
            return false;
        }
        let mut at = after;
        for &v in visits {
            self.insert_after(at, v);
            at = v;
        }
        true
    }

    /// Checks the structural invariants against a universe of `size` visits:
    /// every visit in range, each reachable exactly once from `first`,
    /// predecessors consistent, and a distinct fixed end at the end.
    pub fn verify(&self, size: usize) -> bool {
        let mut seen = vec![false; size];
        let mut steps = 0;
        let mut previous: Option<usize> = None;
        let mut current = Some(self.first);
        while let Some(v) = current {
            if v >= size || seen[v] || steps > self.count {
                return false;
            }
            if v != self.first && self.prev[v] != previous {
                return false;
            }
            seen[v] = true;
            steps += 1;
            previous = Some(v);
            current = self.next[v];
        }
        if steps != self.count || previous != Some(self.end) {
            return false;
        }
        !self.has_fixed_end() || self.last == Some(self.end)
    }
}

impl PartialEq for Tour {
    fn eq(&self, other: &Self) -> bool {
        self.first == other.first
            && self.last == other.last
            && self.count == other.count
            && self.iter().eq(other.iter())
    }
}

impl Eq for Tour {}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "->")?;
            }
            write!(f, "{v}")?;
        }
        if self.is_closed() && self.count > 1 {
            write!(f, "->{}", self.first)?;
        }
        write!(f, "]")
    }
}

/// Iterator over the visits of a [`Tour`] in order.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    tour: &'a Tour,
    current: Option<usize>,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.current?;
        self.current = self.tour.next[current];
        Some(current)
    }
}

impl<'a> IntoIterator for &'a Tour {
    type Item = usize;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed(visits: &[usize]) -> Tour {
        Tour::from_visits(visits, Some(visits[0])).expect("valid closed tour")
    }

    #[test]
    fn test_new_variants() {
        let open = Tour::new(0, None);
        assert_eq!(open.visits(), vec![0]);
        assert!(!open.is_closed());

        let c = Tour::new(0, Some(0));
        assert!(c.is_closed());
        assert_eq!(c.count(), 1);
        assert_eq!(c.next(0), None);

        let fixed = Tour::new(0, Some(4));
        assert_eq!(fixed.visits(), vec![0, 4]);
        assert!(fixed.has_fixed_end());
        assert_eq!(fixed.free_count(), 0);
    }

    #[test]
    fn test_from_visits_validation() {
        assert!(Tour::from_visits(&[], None).is_none());
        assert!(Tour::from_visits(&[0, 1, 1], None).is_none());
        assert!(Tour::from_visits(&[0, 3, 1], Some(3)).is_none());
        assert!(Tour::from_visits(&[0, 1, 3], Some(3)).is_some());
    }

    #[test]
    fn test_next_prev_wrap() {
        let t = closed(&[0, 1, 2]);
        assert_eq!(t.next(0), Some(1));
        assert_eq!(t.next(2), Some(0));
        assert_eq!(t.prev(0), Some(2));
        assert_eq!(t.prev(1), Some(0));
        assert_eq!(t.next(7), None);

        let open = Tour::from_visits(&[0, 1, 2], None).expect("valid");
        assert_eq!(open.next(2), None);
        assert_eq!(open.prev(0), None);
    }

    #[test]
    fn test_pairs_closing_edge() {
        let t = closed(&[0, 1, 2]);
        let pairs: Vec<_> = t.pairs().collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 0)]);

        let open = Tour::from_visits(&[0, 1, 2], None).expect("valid");
        assert_eq!(open.pairs().count(), 2);

        let single = Tour::new(0, Some(0));
        assert_eq!(single.pairs().count(), 0);
    }

    #[test]
    fn test_weight_two_visit_closed() {
        let wm = WeightMatrix::from_rows(&[vec![9999.0, 3.0], vec![3.0, 9999.0]]).expect("square");
        let t = closed(&[0, 1]);
        assert!((t.weight(&wm) - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_insert_remove() {
        let mut t = closed(&[0, 1, 2]);
        assert!(t.insert_after(2, 3));
        assert_eq!(t.end(), 3);
        assert!(!t.insert_after(2, 3));
        assert!(!t.insert_after(9, 4));
        assert!(t.remove(1));
        assert_eq!(t.visits(), vec![0, 2, 3]);
        assert!(!t.remove(1));
        assert!(!t.remove(0));
        assert!(t.remove(3));
        assert_eq!(t.end(), 2);
        assert!(t.verify(4));
    }

    #[test]
    fn test_fixed_end_protected() {
        let mut t = Tour::from_visits(&[0, 1, 2, 5], Some(5)).expect("valid");
        assert!(!t.insert_after(5, 3));
        assert!(!t.remove(5));
        assert!(!t.shift_after(5, 0));
        assert!(t.insert_after(2, 3));
        assert_eq!(t.visits(), vec![0, 1, 2, 3, 5]);
        assert!(t.verify(6));
    }

    #[test]
    fn test_shift_after() {
        let mut t = closed(&[0, 1, 2, 3, 4]);
        assert!(t.shift_after(1, 3));
        assert_eq!(t.visits(), vec![0, 2, 3, 1, 4]);
        assert!(t.shift_after(4, 0));
        assert_eq!(t.visits(), vec![0, 4, 2, 3, 1]);
        assert_eq!(t.end(), 1);
        assert!(!t.shift_after(2, 2));
        assert!(t.verify(5));
    }

    #[test]
    fn test_swap() {
        let mut t = closed(&[0, 1, 2, 3, 4]);
        assert!(t.swap(1, 2));
        assert_eq!(t.visits(), vec![0, 2, 1, 3, 4]);
        assert!(t.swap(3, 1));
        assert_eq!(t.visits(), vec![0, 2, 3, 1, 4]);
        assert!(t.swap(2, 4));
        assert_eq!(t.visits(), vec![0, 4, 3, 1, 2]);
        assert_eq!(t.end(), 2);
        assert!(!t.swap(0, 3));
        assert!(!t.swap(3, 3));
        assert!(t.verify(5));
    }

    #[test]
    fn test_replace() {
        let mut t = closed(&[0, 1, 2]);
        assert!(t.replace(2, 7));
        assert_eq!(t.visits(), vec![0, 1, 7]);
        assert_eq!(t.end(), 7);
        assert!(!t.contains(2));
        assert!(!t.replace(0, 9));
        assert!(!t.replace(1, 7));
        assert!(t.verify(8));
    }

    #[test]
    fn test_reverse() {
        let mut t = closed(&[0, 1, 2, 3, 4]);
        assert!(t.reverse(1, 3));
        assert_eq!(t.visits(), vec![0, 3, 2, 1, 4]);
        assert!(t.reverse(2, 4));
        assert_eq!(t.visits(), vec![0, 3, 4, 1, 2]);
        assert_eq!(t.end(), 2);
        assert!(!t.reverse(0, 3));
        assert!(!t.reverse(2, 3));
        assert!(t.verify(5));
    }

    #[test]
    fn test_extract_and_splice() {
        let mut t = closed(&[0, 1, 2, 3, 4]);
        let cut = t.extract(2, 3).expect("path");
        assert_eq!(cut, vec![2, 3]);
        assert_eq!(t.visits(), vec![0, 1, 4]);
        assert!(t.splice_after(4, &[3, 2]));
        assert_eq!(t.visits(), vec![0, 1, 4, 3, 2]);
        assert!(!t.splice_after(0, &[5, 5]));
        assert!(!t.splice_after(0, &[1]));
        assert!(t.extract(0, 1).is_none());
        assert!(t.verify(5));
    }

    #[test]
    fn test_display() {
        assert_eq!(closed(&[0, 2, 1]).to_string(), "[0->2->1->0]");
        let open = Tour::from_visits(&[3, 1], None).expect("valid");
        assert_eq!(open.to_string(), "[3->1]");
    }

    #[test]
    fn test_equality_ignores_storage() {
        let mut a = closed(&[0, 1, 2]);
        a.insert_after(2, 9);
        a.remove(9);
        let b = closed(&[0, 1, 2]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_clone_is_independent() {
        let a = closed(&[0, 1, 2]);
        let mut b = a.clone();
        b.remove(1);
        assert_eq!(a.count(), 3);
        assert_eq!(b.count(), 2);
    }
}
