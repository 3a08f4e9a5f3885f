//! Parallel tracklet filtering and multi-night detectability for survey simulations.
//!
//! See [`pipeline::run_pipeline`] for the end-to-end entry point, or use the stages directly:
//! [`partition::partition`], [`tracklet_filter::is_valid`], [`filter_engine::filter`] and
//! [`detectability::compute_windows`].
pub mod constants;
pub mod conversion;
pub mod detectability;
pub mod filter_engine;
mod fork_join;
pub mod observations;
pub mod partition;
pub mod pipeline;
pub mod progress_bar;
pub mod sieve_errors;
pub mod time;
pub mod tracklet_filter;

pub use constants::ObjectNumber;
pub use detectability::{DetectionWindow, DetectionWindows, WindowParams};
pub use filter_engine::{FilterOutcome, FilterParams, FilterStats};
pub use observations::{table::ObservationTable, tracklet::Tracklet, Observation};
pub use pipeline::{run_pipeline, PipelineOutcome, SieveConfig};
pub use sieve_errors::SieveError;
pub use time::NightEpoch;
pub use tracklet_filter::{Rejection, TrackletCriteria};
