//! Depot-based capacitated vehicle routing.
//!
//! Every tour starts and ends at the depot. Each tour carries a
//! [`Content`], the running total of its travel weight and named
//! quantities, kept consistent with its visits by every mutation and
//! checked against the vehicle [`Capacity`].
//!
//! - [`CvrpProblem`] — Weights, depot, capacity and visit costs
//! - [`DepotCvrpSolution`] — Tours with per-tour content and seed
//! - [`SeededCheapestInsertion`] — Construction around far seed visits
//! - [`CvrpObjective`] — Total travel weight
//! - [`DepotCvrpRouter`] — Provider-to-solution run

mod construction;
mod content;
mod objective;
mod problem;
mod router;
mod solution;

pub use construction::SeededCheapestInsertion;
pub use content::{metrics, Capacity, CapacityConstraint, Content, VisitCosts};
pub use objective::CvrpObjective;
pub use problem::{CvrpProblem, FEASIBILITY_TOLERANCE};
pub use router::{default_cvrp_solver, DefaultCvrpSolver, DepotCvrpRouter};
pub use solution::DepotCvrpSolution;
