//! # End-to-end sieve
//!
//! [`run_pipeline`] chains every stage of the crate on one raw batch of observations:
//!
//! ```text
//! raw observations
//!   └─ canonicalize (drop malformed rows, derive nights if an epoch is set)
//!        └─ drop excluded objects
//!             └─ filter tracklets (parallel)
//!                  └─ detection windows (parallel)
//! ```
//!
//! The whole run is driven by a [`SieveConfig`], which derives `serde` so it can be loaded from
//! any configuration format the caller prefers. Missing fields fall back to their defaults.
//!
//! ## Example
//! -----------------
//! ```rust
//! use tracksieve::{
//!     observations::Observation,
//!     pipeline::{run_pipeline, SieveConfig},
//!     time::NightEpoch,
//! };
//!
//! let epoch = NightEpoch::new(60000);
//! let mut observations = Vec::new();
//! for night in [0, 1, 2] {
//!     let t = 60000.6 + night as f64;
//!     observations.push(Observation::new("X", 10.0, 0.0, t, &epoch));
//!     observations.push(Observation::new("X", 10.01, 0.0, t + 0.01, &epoch));
//! }
//!
//! let config = SieveConfig::default();
//! let outcome = run_pipeline(observations, &config).unwrap();
//! assert_eq!(outcome.windows.first_detectable(&"X".into()), Some(2));
//! ```
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    constants::ObjectNumber,
    detectability::{compute_windows_parallel, DetectionWindows, WindowParams},
    filter_engine::{filter_with_stats, FilterParams, FilterStats},
    observations::{
        table::{IngestReport, ObjectSet, ObservationTable},
        Observation,
    },
    progress_bar::fmt_dur,
    sieve_errors::SieveError,
    time::NightEpoch,
};

/// Full configuration of a sieve run.
///
/// Fields
/// -----------------
/// * `night_epoch` – when set, every night index is re-derived from the observation epoch;
///   otherwise the night carried by each observation is trusted.
/// * `filter` – tracklet thresholds and worker count.
/// * `window` – detectability thresholds.
/// * `excluded_objects` – objects removed before filtering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    pub night_epoch: Option<NightEpoch>,
    pub filter: FilterParams,
    pub window: WindowParams,
    pub excluded_objects: Vec<ObjectNumber>,
}

impl SieveConfig {
    /// Check the filter and window parameters.
    pub fn validated(self) -> Result<Self, SieveError> {
        self.filter.validated()?;
        self.window.validated()?;
        Ok(self)
    }

    pub fn with_night_epoch(mut self, epoch: NightEpoch) -> Self {
        self.night_epoch = Some(epoch);
        self
    }

    pub fn with_filter(mut self, filter: FilterParams) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_window(mut self, window: WindowParams) -> Self {
        self.window = window;
        self
    }

    pub fn with_excluded_objects<I, O>(mut self, objects: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<ObjectNumber>,
    {
        self.excluded_objects = objects.into_iter().map(Into::into).collect();
        self
    }
}

/// Everything produced by [`run_pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Rows of every valid tracklet, in canonical order
    pub filtered: ObservationTable,
    /// Detection window of every object left after filtering
    pub windows: DetectionWindows,
    /// Rows accepted and rejected during canonicalization
    pub ingest: IngestReport,
    /// Counters of the tracklet filter
    pub stats: FilterStats,
}

/// Run the whole sieve on a raw batch of observations.
///
/// Configuration is validated before anything else happens. Malformed rows are dropped and
/// counted in [`PipelineOutcome::ingest`], never reported as errors.
pub fn run_pipeline<I>(observations: I, config: &SieveConfig) -> Result<PipelineOutcome, SieveError>
where
    I: IntoIterator<Item = Observation>,
{
    let config = config.clone().validated()?;
    let start = Instant::now();

    let (table, ingest) = match &config.night_epoch {
        Some(epoch) => ObservationTable::canonicalize_with_epoch(observations, epoch),
        None => ObservationTable::canonicalize(observations),
    };

    let excluded: ObjectSet = config.excluded_objects.iter().cloned().collect();
    let table = table.without_objects(&excluded);

    let outcome = filter_with_stats(&table, &config.filter)?;
    let windows =
        compute_windows_parallel(&outcome.table, &config.window, config.filter.worker_count)?;

    info!(
        accepted = ingest.accepted,
        rejected = ingest.rejected,
        excluded = ingest.accepted - table.len(),
        filtered_rows = outcome.table.len(),
        objects = windows.len(),
        findable = windows.number_findable(),
        elapsed = %fmt_dur(start.elapsed()),
        "sieve run finished"
    );

    Ok(PipelineOutcome {
        filtered: outcome.table,
        windows,
        ingest,
        stats: outcome.stats,
    })
}

#[cfg(test)]
mod pipeline_test {
    use super::*;
    use crate::tracklet_filter::TrackletCriteria;

    fn tracklet(object: &str, night: i64, epoch: &NightEpoch) -> [Observation; 2] {
        let t = (epoch.zero + night) as f64 + 0.6;
        [
            Observation::new(object, 10.0, 0.0, t, epoch),
            Observation::new(object, 10.01, 0.0, t + 0.01, epoch),
        ]
    }

    fn survey(epoch: &NightEpoch) -> Vec<Observation> {
        let mut rows = Vec::new();
        for night in [0, 1, 14, 15, 16] {
            rows.extend(tracklet("X", night, epoch));
        }
        for night in [0, 20, 40] {
            rows.extend(tracklet("Y", night, epoch));
        }
        for night in [2, 3, 4] {
            rows.extend(tracklet("Excluded", night, epoch));
        }
        rows.reverse();
        rows
    }

    #[test]
    fn test_run_pipeline() {
        let epoch = NightEpoch::default();
        let mut rows = survey(&epoch);
        rows.push(Observation::with_night("X", f64::NAN, 0.0, 60300.0, 0));

        let config = SieveConfig::default()
            .with_filter(FilterParams::new(TrackletCriteria::default(), 3).unwrap())
            .with_excluded_objects(["Excluded"]);
        let outcome = run_pipeline(rows, &config).unwrap();

        assert_eq!(outcome.ingest, IngestReport { accepted: 22, rejected: 1 });
        assert_eq!(outcome.filtered.len(), 16);
        assert_eq!(outcome.stats.tracklets_kept, 8);
        assert_eq!(outcome.windows.len(), 2);
        assert_eq!(outcome.windows.first_detectable(&"X".into()), Some(14));
        assert_eq!(outcome.windows.first_detectable(&"Y".into()), None);
        assert!(outcome.windows.get(&"Excluded".into()).is_none());
    }

    #[test]
    fn test_epoch_rederives_nights() {
        let epoch = NightEpoch::new(60000);
        let rows: Vec<Observation> = [0, 1, 2]
            .into_iter()
            .flat_map(|n| tracklet("X", n, &epoch))
            .map(|mut o| {
                o.night = 0;
                o
            })
            .collect();

        // Without an epoch every row sits on night 0: one tracklet, not detectable.
        let plain = run_pipeline(rows.clone(), &SieveConfig::default()).unwrap();
        assert_eq!(plain.windows.first_detectable(&"X".into()), None);

        let config = SieveConfig::default().with_night_epoch(epoch);
        let rederived = run_pipeline(rows, &config).unwrap();
        assert_eq!(rederived.windows.first_detectable(&"X".into()), Some(2));
    }

    #[test]
    fn test_invalid_config_fails_before_work() {
        let mut config = SieveConfig::default();
        config.window.min_nights = 0;
        assert_eq!(
            run_pipeline(Vec::new(), &config),
            Err(SieveError::InvalidMinNights(0))
        );

        let mut config = SieveConfig::default();
        config.filter.worker_count = 0;
        assert_eq!(
            run_pipeline(Vec::new(), &config),
            Err(SieveError::InvalidWorkerCount(0))
        );
    }
}
