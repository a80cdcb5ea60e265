//! Genetic algorithm for the TSP.
//!
//! - [`TourChromosome`] — Free-visit order with cached fitness
//! - [`edge_assembly_crossover`] — EAX offspring from two parents
//! - [`GaSettings`] — Population, termination and rate configuration
//! - [`EaxSolver`] — Generational solver combining the above

mod chromosome;
mod eax;
mod settings;
mod solver;

pub use chromosome::TourChromosome;
pub use eax::edge_assembly_crossover;
pub use settings::GaSettings;
pub use solver::EaxSolver;
