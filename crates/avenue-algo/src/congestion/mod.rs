//! Congestion-reduction search and selection.
//!
//! - [`trial`]: subset enumeration, the ranking score and [`ResultRow`]
//! - [`search`]: parallel evaluation of every trial against a network
//! - [`selection`]: [`CongestionPlanner`], which owns a live network and
//!   applies one ranked row at a time

pub mod search;
pub mod selection;
pub mod trial;

pub use search::{
    run_search, search_congestion_reduction, SearchConfig, SearchReport, TrialIsolation,
    DEFAULT_MAX_TRIALS,
};
pub use selection::{CongestionPlanner, SelectionState};
pub use trial::{score, trial_count, ResultRow, DEFAULT_EDGE_LIMIT, LOSS_EXPONENT};
