//! Genetic solver configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`EaxSolver`](super::EaxSolver).
///
/// Percentages are in `0.0..=100.0`.
///
/// # Examples
///
/// ```
/// use u_tour::ga::GaSettings;
///
/// let settings = GaSettings::default()
///     .with_population_size(50)
///     .with_stagnation_count(200)
///     .with_elitism_percentage(5.0);
/// assert_eq!(settings.population_size, 50);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaSettings {
    /// Number of individuals.
    pub population_size: usize,
    /// Hard limit on generations.
    pub max_generations: usize,
    /// Generations without improvement before stopping.
    pub stagnation_count: usize,
    /// Share of the population kept unmutated each generation.
    pub elitism_percentage: f64,
    /// Chance that an individual is crossed with a selected partner.
    pub crossover_percentage: f64,
    /// Chance that a non-elite individual is mutated.
    pub mutation_percentage: f64,
}

impl Default for GaSettings {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100_000,
            stagnation_count: 100,
            elitism_percentage: 1.0,
            crossover_percentage: 10.0,
            mutation_percentage: 0.0,
        }
    }
}

impl GaSettings {
    /// A small, quickly converging configuration.
    pub fn fast() -> Self {
        Self {
            population_size: 30,
            max_generations: 500,
            stagnation_count: 30,
            elitism_percentage: 5.0,
            crossover_percentage: 50.0,
            mutation_percentage: 5.0,
        }
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation limit.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_count(mut self, n: usize) -> Self {
        self.stagnation_count = n;
        self
    }

    /// Sets the elitism percentage.
    pub fn with_elitism_percentage(mut self, p: f64) -> Self {
        self.elitism_percentage = p;
        self
    }

    /// Sets the crossover percentage.
    pub fn with_crossover_percentage(mut self, p: f64) -> Self {
        self.crossover_percentage = p;
        self
    }

    /// Sets the mutation percentage.
    pub fn with_mutation_percentage(mut self, p: f64) -> Self {
        self.mutation_percentage = p;
        self
    }

    /// Number of elite individuals, rounded up.
    pub fn elite_count(&self) -> usize {
        let count = (self.population_size as f64 * self.elitism_percentage / 100.0).ceil() as usize;
        count.min(self.population_size)
    }

    /// Validates the settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size == 0 {
            return Err("population_size must be > 0".into());
        }
        for (name, p) in [
            ("elitism_percentage", self.elitism_percentage),
            ("crossover_percentage", self.crossover_percentage),
            ("mutation_percentage", self.mutation_percentage),
        ] {
            if !(0.0..=100.0).contains(&p) {
                return Err(format!("{name} must be in [0, 100]"));
            }
        }
        Ok(())
    }
}
