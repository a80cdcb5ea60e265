//! Travelling salesman problem.
//!
//! - [`TspProblem`] — Weight matrix with fixed first and optional last visit
//! - [`TspObjective`] — Total tour weight
//! - [`TspRouter`] — Provider-to-tour run with endpoint error handling

mod objective;
mod problem;
mod router;

pub use objective::TspObjective;
pub use problem::TspProblem;
pub use router::{default_tsp_solver, DefaultTspSolver, TspRouter};
