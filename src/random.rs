//! Reproducible random number generation.
//!
//! Solvers never own a generator: callers create one here and pass it to
//! [`Solver::solve`](crate::solver::Solver::solve), so the same seed replays
//! the same run and independent runs can use independent generators.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a seeded generator.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use u_tour::random::create_rng;
///
/// let mut a = create_rng(42);
/// let mut b = create_rng(42);
/// assert_eq!(a.random::<u64>(), b.random::<u64>());
/// ```
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
