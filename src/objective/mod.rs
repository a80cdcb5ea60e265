//! Objective functions and their fitness algebra.
//!
//! Solvers never assume fitness is a plain number. They only combine and
//! compare fitness values through the objective, which leaves room for
//! lexicographic or multi-criteria fitness.

use std::cmp::Ordering;
use std::fmt::Debug;

/// A fitness function over solutions `S` of problem `P`.
///
/// Lower is better. Implementations must keep [`calculate`](Self::calculate)
/// deterministic and side-effect free, and deltas reported by operators,
/// added to the previous fitness, must equal `calculate` on the mutated
/// solution.
///
/// # Examples
///
/// ```
/// use u_tour::objective::Objective;
/// use u_tour::tsp::{TspObjective, TspProblem};
/// use u_tour::distance::WeightMatrix;
/// use u_tour::models::Tour;
///
/// let problem = TspProblem::closed(WeightMatrix::uniform(3, 2.0), 0).unwrap();
/// let tour = Tour::from_visits(&[0, 2, 1], Some(0)).unwrap();
/// let obj = TspObjective;
///
/// let f = obj.calculate(&problem, &tour);
/// assert_eq!(f, 6.0);
/// assert!(obj.is_better_than(f, obj.infinite()));
/// assert!(obj.is_zero(obj.subtract(f, f)));
/// ```
pub trait Objective<P, S> {
    /// The fitness type.
    type Fitness: Copy + Debug + PartialEq;

    /// Short name used in solver names and logs.
    fn name(&self) -> &str;

    /// The additive identity.
    fn zero(&self) -> Self::Fitness;

    /// A fitness worse than any reachable one.
    fn infinite(&self) -> Self::Fitness;

    /// Computes the fitness of `solution` from scratch.
    fn calculate(&self, problem: &P, solution: &S) -> Self::Fitness;

    /// `a + b`.
    fn add(&self, a: Self::Fitness, b: Self::Fitness) -> Self::Fitness;

    /// `a - b`.
    fn subtract(&self, a: Self::Fitness, b: Self::Fitness) -> Self::Fitness;

    /// Total order on fitness; `Less` means `a` is better.
    fn compare(&self, a: Self::Fitness, b: Self::Fitness) -> Ordering;

    /// Returns `true` if `fitness` equals [`zero`](Self::zero).
    fn is_zero(&self, fitness: Self::Fitness) -> bool {
        self.compare(fitness, self.zero()) == Ordering::Equal
    }

    /// Returns `true` if `a` is strictly better than `b`.
    fn is_better_than(&self, a: Self::Fitness, b: Self::Fitness) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lexicographic (vehicles, distance) fitness.
    struct Lexicographic;

    impl Objective<(), (u32, f64)> for Lexicographic {
        type Fitness = (u32, f64);

        fn name(&self) -> &str {
            "LEX"
        }

        fn zero(&self) -> (u32, f64) {
            (0, 0.0)
        }

        fn infinite(&self) -> (u32, f64) {
            (u32::MAX, f64::INFINITY)
        }

        fn calculate(&self, _: &(), solution: &(u32, f64)) -> (u32, f64) {
            *solution
        }

        fn add(&self, a: (u32, f64), b: (u32, f64)) -> (u32, f64) {
            (a.0.saturating_add(b.0), a.1 + b.1)
        }

        fn subtract(&self, a: (u32, f64), b: (u32, f64)) -> (u32, f64) {
            (a.0.saturating_sub(b.0), a.1 - b.1)
        }

        fn compare(&self, a: (u32, f64), b: (u32, f64)) -> Ordering {
            a.0.cmp(&b.0).then(a.1.total_cmp(&b.1))
        }
    }

    #[test]
    fn test_default_methods_use_compare() {
        let obj = Lexicographic;
        assert!(obj.is_better_than((1, 100.0), (2, 1.0)));
        assert!(obj.is_better_than((1, 5.0), (1, 6.0)));
        assert!(!obj.is_better_than((1, 6.0), (1, 6.0)));
        assert!(obj.is_zero((0, 0.0)));
        assert!(!obj.is_zero((0, 1.0)));
        assert!(obj.is_better_than((3, 0.0), obj.infinite()));
    }

    #[test]
    fn test_algebra_round_trip() {
        let obj = Lexicographic;
        let a = (2, 10.5);
        let b = (1, 0.5);
        assert_eq!(obj.add(obj.subtract(a, b), b), a);
        assert_eq!(obj.calculate(&(), &a), a);
        assert_eq!(obj.name(), "LEX");
    }
}
