//! Tour chromosome for the genetic TSP solver.
//!
//! A chromosome is the order of the free visits only. The fixed first
//! visit and, if any, the fixed last visit are implied by the problem, so
//! crossover and mutation can never move them.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::Tour;
use crate::tsp::TspProblem;

/// An order of the free visits of a TSP problem with its fitness.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::ga::TourChromosome;
/// use u_tour::tsp::TspProblem;
///
/// let problem = TspProblem::closed(WeightMatrix::uniform(4, 1.0), 0).unwrap();
/// let mut c = TourChromosome::new(vec![3, 1, 2]);
/// assert_eq!(c.fitness(), f64::INFINITY);
///
/// c.evaluate(&problem);
/// assert_eq!(c.fitness(), 4.0);
/// assert_eq!(c.to_tour(&problem).unwrap().visits(), vec![0, 3, 1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct TourChromosome {
    order: Vec<usize>,
    fitness: f64,
}

impl TourChromosome {
    /// Creates an unevaluated chromosome.
    pub fn new(order: Vec<usize>) -> Self {
        Self {
            order,
            fitness: f64::INFINITY,
        }
    }

    /// Creates an evaluated chromosome from a random order.
    pub fn random<R: Rng + ?Sized>(problem: &TspProblem, rng: &mut R) -> Self {
        let mut order = problem.free_visits();
        order.shuffle(rng);
        let mut chromosome = Self::new(order);
        chromosome.evaluate(problem);
        chromosome
    }

    /// Creates an evaluated chromosome from a tour of `problem`.
    pub fn from_tour(problem: &TspProblem, tour: &Tour) -> Self {
        let order = tour.iter().filter(|&v| !tour.is_fixed(v)).collect();
        let mut chromosome = Self::new(order);
        chromosome.evaluate(problem);
        chromosome
    }

    /// The free-visit order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Number of free visits.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if there are no free visits.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The last evaluated fitness.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Recomputes the fitness.
    pub fn evaluate(&mut self, problem: &TspProblem) {
        self.fitness = problem.order_weight(&self.order);
    }

    /// Reverses a random segment of the order and re-evaluates.
    pub fn mutate<R: Rng + ?Sized>(&mut self, problem: &TspProblem, rng: &mut R) {
        let n = self.order.len();
        if n < 2 {
            return;
        }
        let a = rng.random_range(0..n);
        let mut b = rng.random_range(0..n - 1);
        if b >= a {
            b += 1;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        self.order[lo..=hi].reverse();
        self.evaluate(problem);
    }

    /// Converts back to a tour.
    pub fn to_tour(&self, problem: &TspProblem) -> Option<Tour> {
        problem.tour_from_order(&self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::WeightMatrix;
    use crate::random::create_rng;

    fn line(n: usize) -> TspProblem {
        let points: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, 0.0)).collect();
        TspProblem::fixed(WeightMatrix::from_coordinates(&points), 0, n - 1).expect("valid")
    }

    #[test]
    fn test_new_is_unevaluated() {
        let c = TourChromosome::new(vec![1, 2, 3]);
        assert_eq!(c.order(), &[1, 2, 3]);
        assert_eq!(c.len(), 3);
        assert!(!c.is_empty());
        assert_eq!(c.fitness(), f64::INFINITY);
    }

    #[test]
    fn test_random_is_permutation_of_free() {
        let problem = line(8);
        let mut rng = create_rng(42);
        let c = TourChromosome::random(&problem, &mut rng);
        let mut sorted = c.order().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, problem.free_visits());
        assert!(c.fitness() >= 7.0 - 1e-10);
    }

    #[test]
    fn test_from_tour_round_trip() {
        let problem = line(5);
        let tour = Tour::from_visits(&[0, 2, 1, 3, 4], Some(4)).expect("valid");
        let c = TourChromosome::from_tour(&problem, &tour);
        assert_eq!(c.order(), &[2, 1, 3]);
        assert!((c.fitness() - 6.0).abs() < 1e-10);
        assert_eq!(c.to_tour(&problem), Some(tour));
    }

    #[test]
    fn test_mutate_keeps_permutation() {
        let problem = line(10);
        let mut rng = create_rng(7);
        let mut c = TourChromosome::new((1..9).collect());
        c.evaluate(&problem);
        for _ in 0..20 {
            c.mutate(&problem, &mut rng);
            let mut sorted = c.order().to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, (1..9).collect::<Vec<_>>());
            assert!((c.fitness() - problem.order_weight(c.order())).abs() < 1e-10);
        }
    }

    #[test]
    fn test_mutate_single_is_noop() {
        let problem = line(3);
        let mut rng = create_rng(1);
        let mut c = TourChromosome::new(vec![1]);
        c.mutate(&problem, &mut rng);
        assert_eq!(c.order(), &[1]);
    }
}
