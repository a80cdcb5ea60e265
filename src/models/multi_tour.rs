//! A collection of tours sharing one visit universe.

use super::Tour;

/// An ordered collection of [`Tour`]s, one per vehicle.
///
/// Anchors (first and fixed last visits) may be shared between tours, for
/// example a common depot. Every other visit belongs to at most one tour.
///
/// # Examples
///
/// ```
/// use u_tour::models::MultiTour;
///
/// let mut tours = MultiTour::new();
/// let t = tours.add(0, Some(0));
/// tours.tour_mut(t).unwrap().insert_after(0, 3);
/// assert_eq!(tours.count(), 1);
/// assert_eq!(tours.tour_of(3), Some(0));
/// assert_eq!(tours.visit_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiTour {
    tours: Vec<Tour>,
}

impl MultiTour {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new tour anchored at `first` and returns its index.
    pub fn add(&mut self, first: usize, last: Option<usize>) -> usize {
        self.tours.push(Tour::new(first, last));
        self.tours.len() - 1
    }

    /// Adds an existing tour and returns its index.
    pub fn push(&mut self, tour: Tour) -> usize {
        self.tours.push(tour);
        self.tours.len() - 1
    }

    /// Number of tours.
    pub fn count(&self) -> usize {
        self.tours.len()
    }

    /// Returns `true` if there are no tours.
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }

    /// The tour at `index`.
    pub fn tour(&self, index: usize) -> Option<&Tour> {
        self.tours.get(index)
    }

    /// The tour at `index`, mutably.
    pub fn tour_mut(&mut self, index: usize) -> Option<&mut Tour> {
        self.tours.get_mut(index)
    }

    /// Mutable access to two distinct tours at once.
    pub fn pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Tour, &mut Tour)> {
        if a == b || a >= self.tours.len() || b >= self.tours.len() {
            return None;
        }
        if a < b {
            let (left, right) = self.tours.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.tours.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }

    /// Iterates the tours in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tour> {
        self.tours.iter()
    }

    /// Removes and returns the tour at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Tour> {
        (index < self.tours.len()).then(|| self.tours.remove(index))
    }

    /// Replaces the tour at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, tour: Tour) -> Option<Tour> {
        let slot = self.tours.get_mut(index)?;
        Some(std::mem::replace(slot, tour))
    }

    /// Number of non-anchor visits over all tours.
    pub fn visit_count(&self) -> usize {
        self.tours.iter().map(Tour::free_count).sum()
    }

    /// Index of the tour holding the non-anchor `visit`.
    pub fn tour_of(&self, visit: usize) -> Option<usize> {
        self.tours
            .iter()
            .position(|t| t.contains(visit) && !t.is_fixed(visit))
    }

    /// Checks every tour's structure against a universe of `size` visits
    /// and that no non-anchor visit appears twice, or as another tour's
    /// anchor.
    pub fn verify(&self, size: usize) -> bool {
        let mut anchor = vec![false; size];
        let mut owned = vec![false; size];
        for tour in &self.tours {
            if !tour.verify(size) {
                return false;
            }
            for v in tour.iter() {
                if tour.is_fixed(v) {
                    anchor[v] = true;
                } else if owned[v] {
                    return false;
                } else {
                    owned[v] = true;
                }
            }
        }
        !anchor.iter().zip(&owned).any(|(&a, &o)| a && o)
    }
}

impl<'a> IntoIterator for &'a MultiTour {
    type Item = &'a Tour;
    type IntoIter = std::slice::Iter<'a, Tour>;

    fn into_iter(self) -> Self::IntoIter {
        self.tours.iter()
    }
}
