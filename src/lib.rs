//! # u-tour
//!
//! Metaheuristic tour optimization for the Travelling Salesman Problem and
//! depot-based capacitated Vehicle Routing Problems, driven by a dense
//! weight matrix.
//!
//! ## Modules
//!
//! - [`distance`] — Dense weight matrix and the weight-matrix provider seam
//! - [`models`] — Tour, MultiTour, Seq and the routing solution variant
//! - [`objective`] — Fitness algebra shared by all solvers and operators
//! - [`solver`] — Solver/Operator traits, capability dispatch and the iterative driver
//! - [`local_search`] — Relocate, Exchange, their multi-visit forms, and 2-opt
//! - [`ga`] — Edge-assembly crossover (EAX) genetic solver for TSP
//! - [`tsp`] — TSP problem, objective and router
//! - [`vrp`] — Capacitated depot VRP: content tracking, seeded construction, router
//! - [`error`] — Routing errors and the run outcome contract
//! - [`random`] — Reproducible RNG construction

pub mod distance;
pub mod error;
pub mod ga;
pub mod local_search;
pub mod models;
pub mod objective;
pub mod random;
pub mod solver;
pub mod tsp;
pub mod vrp;
