//! Local search operators for improving tours in place.
//!
//! - [`TwoOptOperator`] — Intra-tour segment reversal (asymmetric aware)
//! - [`RelocateOperator`] — Single-visit moves within and between tours
//! - [`ExchangeOperator`] — Visit swaps; [`simulate_swap`] and [`try_swap`] cost and commit sequence swaps
//! - [`MultiExchangeOperator`] — Multi-size sequence swaps within and between tours
//! - [`MultiRelocateOperator`] — Or-opt sequence moves within and between tours
//!
//! Every operator only commits strictly improving moves and leaves the
//! solution untouched when it reports `None`.

mod exchange;
mod multi_exchange;
mod multi_relocate;
mod relocate;
mod two_opt;

pub use exchange::{simulate_swap, simulate_swap_within, try_swap, try_swap_within, ExchangeOperator, SwapSimulation};
pub use multi_exchange::{have_to_try_inter, seq_and_smaller, MultiExchangeOperator, SeqAndSmaller};
pub use multi_relocate::MultiRelocateOperator;
pub use relocate::RelocateOperator;
pub use two_opt::TwoOptOperator;

pub(crate) use two_opt::improve_tour;

/// A move is only applied when its delta is below `-IMPROVEMENT_EPSILON`.
pub const IMPROVEMENT_EPSILON: f64 = 1e-10;
