//! Domain model types for tour-based routing problems.
//!
//! Provides tours as index-linked visit sequences with O(1) neighbor
//! lookup, collections of tours sharing a depot, the contiguous sequences
//! moved by exchange operators, and a tagged solution type covering every
//! supported problem flavor.

mod multi_tour;
mod seq;
mod solution;
mod tour;

pub use multi_tour::MultiTour;
pub use seq::Seq;
pub use solution::RoutingSolution;
pub use tour::{Iter, Tour};
