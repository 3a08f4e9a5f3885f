//! # Parallel tracklet filtering
//!
//! Reduce a canonical [`ObservationTable`] to the rows of tracklets that pass a
//! [`TrackletCriteria`], using a fixed pool of workers.
//!
//! ## Pipeline
//! -----------------
//! 1. **Partitioning** – split the table with [`partition`](crate::partition::partition) into at
//!    most `worker_count` borrowed chunks that never cut through an object.
//! 2. **Object prefilter** – every worker drops the objects of its partition with fewer than
//!    `min_obs` observations in total (across all nights). Such an object cannot have a single
//!    passing tracklet. Since an object never spans two partitions, its count in the partition is
//!    its count in the table.
//! 3. **Per-partition validation** – every worker walks the tracklets of the remaining objects and
//!    records the row ranges of passing tracklets, with a tally of rejection reasons.
//! 4. **Ordered merge** – kept ranges are gathered in partition order and only the surviving rows
//!    are copied into the output, in their original relative order.
//!
//! ## Guarantees
//! -----------------
//! * The output is identical for every `worker_count >= 1`.
//! * Filtering is idempotent: every surviving tracklet already satisfies the criteria, so
//!   running the filter again on its own output returns it unchanged.
//! * The input table is only borrowed; the output is a new table.
//!
//! ## Errors
//! -----------------
//! * Invalid thresholds or `worker_count == 0` are reported before any work starts.
//! * If one partition turns out to be malformed (an object revisits a night after a later one,
//!   which happens when night indices disagree with epochs), the whole call fails.
//!
//! ## Example
//! -----------------
//! ```rust
//! use tracksieve::{
//!     filter_engine::filter,
//!     observations::{table::ObservationTable, Observation},
//!     time::NightEpoch,
//! };
//!
//! let epoch = NightEpoch::new(60000);
//! let (table, _) = ObservationTable::canonicalize(vec![
//!     Observation::new("X", 10.0, 0.0, 60000.6, &epoch),
//!     Observation::new("X", 10.0028, 0.0, 60000.60208, &epoch),
//!     Observation::new("Y", 50.0, 5.0, 60000.6, &epoch),
//! ]);
//!
//! let filtered = filter(&table, 2, 1.0, 90.0, 2).unwrap();
//! assert_eq!(filtered.len(), 2);
//! ```
use std::{ops::Range, time::Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    constants::{ArcSec, Minutes},
    fork_join::fork_join,
    observations::{table::ObservationTable, tracklet::Tracklets, Observation},
    partition::{partition, Partition},
    progress_bar::fmt_dur,
    sieve_errors::SieveError,
    tracklet_filter::{Rejection, TrackletCriteria},
};

/// Number of worker threads to use when the caller does not say.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Thresholds and parallelism of one filtering run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub criteria: TrackletCriteria,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            criteria: TrackletCriteria::default(),
            worker_count: default_worker_count(),
        }
    }
}

impl FilterParams {
    /// Build validated parameters.
    pub fn new(criteria: TrackletCriteria, worker_count: usize) -> Result<Self, SieveError> {
        FilterParams {
            criteria,
            worker_count,
        }
        .validated()
    }

    /// Check the criteria and `worker_count >= 1`.
    pub fn validated(self) -> Result<Self, SieveError> {
        if self.worker_count < 1 {
            return Err(SieveError::InvalidWorkerCount(self.worker_count));
        }
        self.criteria.validated()?;
        Ok(self)
    }
}

/// Counters describing one filtering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterStats {
    /// Rows in the input table
    pub input_rows: usize,
    /// Objects dropped by the total-count prefilter
    pub objects_prefiltered: usize,
    /// Rows dropped by the total-count prefilter
    pub rows_prefiltered: usize,
    /// Partitions actually used
    pub partitions: usize,
    /// Tracklets evaluated by the workers
    pub tracklets_examined: usize,
    /// Tracklets that passed
    pub tracklets_kept: usize,
    pub rejected_too_few_observations: usize,
    pub rejected_single_detection: usize,
    pub rejected_arc_too_short: usize,
    pub rejected_gap_too_large: usize,
    /// Rows in the output table
    pub output_rows: usize,
}

impl FilterStats {
    fn record(&mut self, verdict: Result<(), Rejection>) {
        self.tracklets_examined += 1;
        match verdict {
            Ok(()) => self.tracklets_kept += 1,
            Err(Rejection::TooFewObservations) => self.rejected_too_few_observations += 1,
            Err(Rejection::SingleDetection) => self.rejected_single_detection += 1,
            Err(Rejection::ArcTooShort) => self.rejected_arc_too_short += 1,
            Err(Rejection::GapTooLarge) => self.rejected_gap_too_large += 1,
        }
    }

    fn merge(&mut self, other: &FilterStats) {
        self.objects_prefiltered += other.objects_prefiltered;
        self.rows_prefiltered += other.rows_prefiltered;
        self.tracklets_examined += other.tracklets_examined;
        self.tracklets_kept += other.tracklets_kept;
        self.rejected_too_few_observations += other.rejected_too_few_observations;
        self.rejected_single_detection += other.rejected_single_detection;
        self.rejected_arc_too_short += other.rejected_arc_too_short;
        self.rejected_gap_too_large += other.rejected_gap_too_large;
    }

    /// Total number of rejected tracklets.
    pub fn tracklets_rejected(&self) -> usize {
        self.tracklets_examined - self.tracklets_kept
    }
}

/// Filtered table together with the run counters.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub table: ObservationTable,
    pub stats: FilterStats,
}

/// Private output of one worker: kept row ranges (absolute) and a tally.
struct PartitionVerdict {
    kept: Vec<Range<usize>>,
    stats: FilterStats,
}

/// Filter `table` with explicit thresholds.
///
/// Arguments
/// ---------
/// * `table`: canonical input table (borrowed, left untouched)
/// * `min_obs`: minimum detections per object and per tracklet (`>= 1`)
/// * `min_arc_arcsec`: minimum first-to-last arc of a tracklet (arcseconds)
/// * `max_gap_minutes`: the closest consecutive pair of a tracklet must be below this (minutes)
/// * `worker_count`: number of workers (`>= 1`)
///
/// Return
/// ------
/// * the rows of every passing tracklet, in canonical order
pub fn filter(
    table: &ObservationTable,
    min_obs: usize,
    min_arc_arcsec: ArcSec,
    max_gap_minutes: Minutes,
    worker_count: usize,
) -> Result<ObservationTable, SieveError> {
    let params = FilterParams::new(
        TrackletCriteria::new(min_obs, min_arc_arcsec, max_gap_minutes)?,
        worker_count,
    )?;
    Ok(filter_with_stats(table, &params)?.table)
}

/// Filter `table` and report what happened.
///
/// See the [module documentation](self) for the steps and guarantees.
pub fn filter_with_stats(
    table: &ObservationTable,
    params: &FilterParams,
) -> Result<FilterOutcome, SieveError> {
    let params = params.validated()?;
    let criteria = params.criteria;
    let start = Instant::now();

    let mut stats = FilterStats {
        input_rows: table.len(),
        ..FilterStats::default()
    };

    let partitions = partition(table, params.worker_count)?;
    stats.partitions = partitions.len();

    let verdicts = fork_join(&partitions, params.worker_count, "filter", |part| {
        filter_partition(part, &criteria)
    })?;

    // Ordered merge: only kept rows are copied
    let mut keep = vec![false; table.len()];
    for verdict in &verdicts {
        stats.merge(&verdict.stats);
        for range in &verdict.kept {
            keep[range.clone()].fill(true);
        }
    }
    let rows: Vec<Observation> = table
        .iter()
        .zip(keep)
        .filter_map(|(obs, kept)| kept.then(|| obs.clone()))
        .collect();
    stats.output_rows = rows.len();

    info!(
        input_rows = stats.input_rows,
        output_rows = stats.output_rows,
        partitions = stats.partitions,
        tracklets_kept = stats.tracklets_kept,
        tracklets_rejected = stats.tracklets_rejected(),
        objects_prefiltered = stats.objects_prefiltered,
        elapsed = %fmt_dur(start.elapsed()),
        "tracklet filtering done"
    );

    Ok(FilterOutcome {
        table: ObservationTable::from_sorted_unchecked(rows),
        stats,
    })
}

/// Prefilter the objects of one partition and validate the tracklets of the others.
///
/// Fails when an object comes back to a night it already left, i.e. when one
/// `(object, night)` group would be split in two.
fn filter_partition(
    part: &Partition<'_>,
    criteria: &TrackletCriteria,
) -> Result<PartitionVerdict, SieveError> {
    let mut verdict = PartitionVerdict {
        kept: Vec::new(),
        stats: FilterStats::default(),
    };

    let mut offset = part.start;
    for object_rows in part.rows().chunk_by(|a, b| a.object == b.object) {
        if object_rows.len() < criteria.min_obs {
            verdict.stats.objects_prefiltered += 1;
            verdict.stats.rows_prefiltered += object_rows.len();
            offset += object_rows.len();
            continue;
        }

        let mut previous_night = None;
        for tracklet in Tracklets::new(object_rows) {
            if let Some(prev_night) = previous_night {
                if tracklet.night() <= prev_night {
                    return Err(SieveError::WorkerFailed {
                        partition: part.index,
                        reason: format!(
                            "object {} returns to night {} after night {}",
                            tracklet.object(),
                            tracklet.night(),
                            prev_night
                        ),
                    });
                }
            }
            previous_night = Some(tracklet.night());

            let verdict_for_tracklet = criteria.evaluate(&tracklet);
            if verdict_for_tracklet.is_ok() {
                verdict.kept.push(offset..offset + tracklet.len());
            }
            verdict.stats.record(verdict_for_tracklet);
            offset += tracklet.len();
        }
    }

    Ok(verdict)
}
