//! TSP objective: total tour weight.

use std::cmp::Ordering;

use super::TspProblem;
use crate::models::Tour;
use crate::objective::Objective;

/// Sum of the weights of all consecutive pairs of a tour, including the
/// closing edge of a closed tour.
#[derive(Debug, Clone, Copy, Default)]
pub struct TspObjective;

impl Objective<TspProblem, Tour> for TspObjective {
    type Fitness = f64;

    fn name(&self) -> &str {
        "TSP"
    }

    fn zero(&self) -> f64 {
        0.0
    }

    fn infinite(&self) -> f64 {
        f64::INFINITY
    }

    fn calculate(&self, problem: &TspProblem, solution: &Tour) -> f64 {
        solution.weight(problem.weights())
    }

    fn add(&self, a: f64, b: f64) -> f64 {
        a + b
    }

    fn subtract(&self, a: f64, b: f64) -> f64 {
        a - b
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        a.total_cmp(&b)
    }
}
