//! Genetic TSP solver built on edge-assembly crossover.
//!
//! # Algorithm
//!
//! 1. Seed the population with random orders, each polished by 2-opt.
//! 2. Every generation, sort by fitness. Each individual is crossed, with
//!    probability `crossover_percentage`, with the winner of a two-way
//!    tournament among the others; the offspring replaces it when better.
//! 3. Non-elite individuals are mutated (segment reversal) with probability
//!    `mutation_percentage`; the top `elitism_percentage` are never touched.
//! 4. Stop after `max_generations`, after `stagnation_count` generations
//!    without improving the best, or when cancelled.
//!
//! Problems with at most three free visits are solved by enumeration.
//!
//! # Reference
//!
//! Nagata, Y. & Kobayashi, S. (2013). "A Powerful Genetic Algorithm Using
//! Edge Assembly Crossover for the Traveling Salesman Problem",
//! *INFORMS Journal on Computing* 25(2), 346-363.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rand::Rng;

use super::{edge_assembly_crossover, GaSettings, TourChromosome};
use crate::local_search::improve_tour;
use crate::models::Tour;
use crate::objective::Objective;
use crate::solver::{is_cancelled, Solver};
use crate::tsp::{TspObjective, TspProblem};

/// Largest free-visit count solved by enumeration.
const ENUMERATION_LIMIT: usize = 3;

/// EAX genetic solver for TSP problems.
///
/// The solver holds only configuration; every call to
/// [`solve`](Solver::solve) starts from a fresh population.
///
/// # Examples
///
/// ```
/// use u_tour::distance::WeightMatrix;
/// use u_tour::ga::{EaxSolver, GaSettings};
/// use u_tour::random::create_rng;
/// use u_tour::solver::Solver;
/// use u_tour::tsp::{TspObjective, TspProblem};
///
/// let points: Vec<(f64, f64)> = (0..10)
///     .map(|i| {
///         let a = i as f64 * std::f64::consts::TAU / 10.0;
///         (a.cos(), a.sin())
///     })
///     .collect();
/// let problem = TspProblem::closed(WeightMatrix::from_coordinates(&points), 0).unwrap();
///
/// let solver = EaxSolver::new(GaSettings::fast());
/// let mut rng = create_rng(42);
/// let (tour, fitness) = solver.solve(&problem, &TspObjective, &mut rng).unwrap();
///
/// // The optimum is the decagon's perimeter.
/// let side = 2.0 * (std::f64::consts::PI / 10.0).sin();
/// assert!((fitness - 10.0 * side).abs() < 1e-9);
/// assert_eq!(tour.count(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EaxSolver {
    settings: GaSettings,
    cancel: Option<Arc<AtomicBool>>,
}

impl EaxSolver {
    /// Creates a solver.
    pub fn new(settings: GaSettings) -> Self {
        Self {
            settings,
            cancel: None,
        }
    }

    /// Sets a cancellation flag polled at generation boundaries.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The configuration.
    pub fn settings(&self) -> &GaSettings {
        &self.settings
    }

    fn polished<R: Rng + ?Sized>(problem: &TspProblem, rng: &mut R) -> TourChromosome {
        let chromosome = TourChromosome::random(problem, rng);
        match chromosome.to_tour(problem) {
            Some(mut tour) => {
                improve_tour(problem.weights(), &mut tour);
                TourChromosome::from_tour(problem, &tour)
            }
            None => chromosome,
        }
    }

    /// Index of the better of two random individuals other than `skip`.
    fn tournament<R: Rng + ?Sized>(population: &[TourChromosome], skip: usize, rng: &mut R) -> usize {
        let mut pick = || {
            let j = rng.random_range(0..population.len() - 1);
            if j >= skip {
                j + 1
            } else {
                j
            }
        };
        let (a, b) = (pick(), pick());
        if population[b].fitness() < population[a].fitness() {
            b
        } else {
            a
        }
    }

    /// Runs the generational loop and returns the best chromosome.
    fn evolve<R: Rng + ?Sized>(&self, problem: &TspProblem, rng: &mut R) -> Option<TourChromosome> {
        let s = &self.settings;
        let mut population: Vec<TourChromosome> =
            (0..s.population_size).map(|_| Self::polished(problem, rng)).collect();
        let mut best = population
            .iter()
            .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))?
            .clone();
        let elites = s.elite_count().min(population.len());
        let mut stagnation = 0usize;

        for generation in 0..s.max_generations {
            if is_cancelled(&self.cancel) {
                tracing::debug!(generation, "EAX cancelled");
                break;
            }
            population.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));

            if population.len() > 1 {
                for i in 0..population.len() {
                    if rng.random_range(0.0..100.0) >= s.crossover_percentage {
                        continue;
                    }
                    let j = Self::tournament(&population, i, rng);
                    if let Some(child) = edge_assembly_crossover(problem, &population[i], &population[j], rng) {
                        if child.fitness() < population[i].fitness() - 1e-10 {
                            population[i] = child;
                        }
                    }
                }
            }
            for individual in population.iter_mut().skip(elites) {
                if rng.random_range(0.0..100.0) < s.mutation_percentage {
                    individual.mutate(problem, rng);
                }
            }

            let generation_best = population
                .iter()
                .min_by(|a, b| a.fitness().total_cmp(&b.fitness()))?;
            if generation_best.fitness() < best.fitness() - 1e-10 {
                best = generation_best.clone();
                stagnation = 0;
                tracing::trace!(generation, fitness = best.fitness(), "EAX improved");
            } else {
                stagnation += 1;
                if stagnation >= s.stagnation_count {
                    tracing::debug!(generation, fitness = best.fitness(), "EAX stagnated");
                    break;
                }
            }
        }
        Some(best)
    }
}

/// All orders of `items`.
fn permutations(items: &[usize]) -> Vec<Vec<usize>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut all = Vec::new();
    for (i, &head) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head);
            all.push(tail);
        }
    }
    all
}

fn enumerate(problem: &TspProblem) -> Option<Vec<usize>> {
    permutations(&problem.free_visits())
        .into_iter()
        .min_by(|a, b| problem.order_weight(a).total_cmp(&problem.order_weight(b)))
}

impl Solver<TspProblem, TspObjective, Tour> for EaxSolver {
    fn name(&self) -> String {
        "EAX".to_string()
    }

    fn solve<R: Rng + ?Sized>(
        &self,
        problem: &TspProblem,
        objective: &TspObjective,
        rng: &mut R,
    ) -> Option<(Tour, f64)> {
        if let Err(message) = self.settings.validate() {
            tracing::warn!(%message, "invalid GA settings");
            return None;
        }
        let order = if problem.free_visits().len() <= ENUMERATION_LIMIT {
            enumerate(problem)?
        } else {
            self.evolve(problem, rng)?.order().to_vec()
        };
        let tour = problem.tour_from_order(&order)?;
        let fitness = objective.calculate(problem, &tour);
        Some((tour, fitness))
    }
}
