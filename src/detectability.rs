//! # Multi-night detectability windows
//!
//! An object is *findable* once enough of its valid tracklets, taken on distinct nights, fall
//! inside a bounded span of nights. This module computes, for every object of a filtered table,
//! the night on which that first happens.
//!
//! ## Algorithm
//! -----------------
//! For each object:
//!
//! 1. collect the sorted, de-duplicated night indices of its tracklets,
//! 2. slide a window of `min_nights` consecutive entries over that sequence,
//! 3. the first window whose span `last - first` is `<= max_window_days` wins; its **last**
//!    night is the night first detectable.
//!
//! An object with fewer than `min_nights` distinct nights, or whose nights are too spread out for
//! any window to qualify, is *not detectable*. It still appears in [`DetectionWindows`] with
//! `first_detectable == None`; [`DetectionWindows::findable`] skips it.
//!
//! ## Example
//! -----------------
//! ```rust
//! use tracksieve::detectability::first_detectable_night;
//!
//! assert_eq!(first_detectable_night(&[0, 1, 14, 15, 16], 3, 15), Some(14));
//! assert_eq!(first_detectable_night(&[0, 20, 40], 3, 15), None);
//! assert_eq!(first_detectable_night(&[5, 6], 3, 15), None);
//! ```
use std::{
    collections::{btree_map, BTreeMap},
    time::Instant,
};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::info;

use crate::{
    constants::{Night, ObjectNumber},
    fork_join::fork_join,
    observations::{table::ObservationTable, Observation},
    partition::partition,
    progress_bar::fmt_dur,
    sieve_errors::SieveError,
};

/// Sorted, distinct night indices of one object. Most objects are seen on a handful of nights.
pub type NightList = SmallVec<[Night; 8]>;

/// Windowing thresholds.
///
/// Fields
/// -----------------
/// * `min_nights` – number of distinct nights required (`>= 1`).
/// * `max_window_days` – largest allowed span, in nights, between the first and last of them
///   (`>= 0`).
///
/// Defaults
/// -----------------
/// `min_nights = 3`, `max_window_days = 15`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowParams {
    pub min_nights: usize,
    pub max_window_days: i64,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            min_nights: 3,
            max_window_days: 15,
        }
    }
}

impl WindowParams {
    /// Build validated parameters.
    pub fn new(min_nights: usize, max_window_days: i64) -> Result<Self, SieveError> {
        WindowParams {
            min_nights,
            max_window_days,
        }
        .validated()
    }

    pub fn builder() -> WindowParamsBuilder {
        WindowParamsBuilder::default()
    }

    /// Check `min_nights >= 1` and `max_window_days >= 0`.
    pub fn validated(self) -> Result<Self, SieveError> {
        if self.min_nights < 1 {
            return Err(SieveError::InvalidMinNights(self.min_nights));
        }
        if self.max_window_days < 0 {
            return Err(SieveError::InvalidWindowParameter(format!(
                "max_window_days must be >= 0, got {}",
                self.max_window_days
            )));
        }
        Ok(self)
    }
}

/// Builder for [`WindowParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct WindowParamsBuilder {
    params: WindowParams,
}

impl WindowParamsBuilder {
    pub fn min_nights(mut self, v: usize) -> Self {
        self.params.min_nights = v;
        self
    }

    pub fn max_window_days(mut self, v: i64) -> Self {
        self.params.max_window_days = v;
        self
    }

    pub fn build(self) -> Result<WindowParams, SieveError> {
        self.params.validated()
    }
}

/// Night at which `nights` first contains `min_nights` entries within `max_window_days`.
///
/// Arguments
/// ---------
/// * `nights`: sorted, distinct night indices
/// * `min_nights`: window width, in entries
/// * `max_window_days`: largest allowed `last - first` inside the window
///
/// Return
/// ------
/// * the last night of the leftmost qualifying window, or `None` if no window qualifies
///   (including when `nights` has fewer than `min_nights` entries)
pub fn first_detectable_night(
    nights: &[Night],
    min_nights: usize,
    max_window_days: i64,
) -> Option<Night> {
    if min_nights == 0 {
        return None;
    }
    let max_span = u64::try_from(max_window_days).ok()?;
    nights
        .windows(min_nights)
        .find(|w| w[w.len() - 1].abs_diff(w[0]) <= max_span)
        .map(|w| w[w.len() - 1])
}

/// Night sequence and detection outcome of one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionWindow {
    pub object: ObjectNumber,
    /// Sorted, distinct nights with at least one valid tracklet
    pub nights: NightList,
    /// Night first detectable, `None` when the object is not detectable
    pub first_detectable: Option<Night>,
}

impl DetectionWindow {
    /// Build the window of `object` from its (possibly repeated, unsorted) nights.
    pub fn from_nights<I>(object: ObjectNumber, nights: I, params: &WindowParams) -> Self
    where
        I: IntoIterator<Item = Night>,
    {
        let mut nights: NightList = nights.into_iter().collect();
        nights.sort_unstable();
        nights.dedup();
        let first_detectable =
            first_detectable_night(&nights, params.min_nights, params.max_window_days);
        DetectionWindow {
            object,
            nights,
            first_detectable,
        }
    }

    #[inline]
    pub fn is_detectable(&self) -> bool {
        self.first_detectable.is_some()
    }
}

/// Detection windows of every object of a filtered table, ordered by object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DetectionWindows {
    windows: BTreeMap<ObjectNumber, DetectionWindow>,
}

impl DetectionWindows {
    pub fn get(&self, object: &ObjectNumber) -> Option<&DetectionWindow> {
        self.windows.get(object)
    }

    /// Night first detectable of `object`; `None` for unknown or undetectable objects alike.
    pub fn first_detectable(&self, object: &ObjectNumber) -> Option<Night> {
        self.windows.get(object).and_then(|w| w.first_detectable)
    }

    /// Number of objects (detectable or not).
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> btree_map::Values<'_, ObjectNumber, DetectionWindow> {
        self.windows.values()
    }

    /// `(object, night first detectable)` of detectable objects, ordered by object.
    pub fn findable(&self) -> impl Iterator<Item = (&ObjectNumber, Night)> + '_ {
        self.windows
            .iter()
            .filter_map(|(obj, w)| w.first_detectable.map(|n| (obj, n)))
    }

    pub fn number_findable(&self) -> usize {
        self.findable().count()
    }

    /// Number of objects becoming detectable on each night.
    pub fn detections_per_night(&self) -> BTreeMap<Night, usize> {
        let mut counts = BTreeMap::new();
        for (_, night) in self.findable() {
            *counts.entry(night).or_insert(0) += 1;
        }
        counts
    }
}

impl FromIterator<DetectionWindow> for DetectionWindows {
    fn from_iter<I: IntoIterator<Item = DetectionWindow>>(iter: I) -> Self {
        DetectionWindows {
            windows: iter.into_iter().map(|w| (w.object.clone(), w)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DetectionWindows {
    type Item = &'a DetectionWindow;
    type IntoIter = btree_map::Values<'a, ObjectNumber, DetectionWindow>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows.values()
    }
}

fn windows_of(rows: &[Observation], params: &WindowParams) -> Vec<DetectionWindow> {
    rows.chunk_by(|a, b| a.object == b.object)
        .map(|obj_rows| {
            DetectionWindow::from_nights(
                obj_rows[0].object.clone(),
                obj_rows.iter().map(|o| o.night),
                params,
            )
        })
        .collect()
}

/// Detection windows of every object of `filtered`, computed on the calling thread.
///
/// Arguments
/// ---------
/// * `filtered`: output of the tracklet filter (every row belongs to a valid tracklet)
/// * `min_nights`: distinct nights required (`>= 1`)
/// * `max_window_days`: largest allowed span between the first and last of them (`>= 0`)
pub fn compute_windows(
    filtered: &ObservationTable,
    min_nights: usize,
    max_window_days: i64,
) -> Result<DetectionWindows, SieveError> {
    let params = WindowParams::new(min_nights, max_window_days)?;
    Ok(windows_of(filtered.as_slice(), &params).into_iter().collect())
}

/// Same as [`compute_windows`], with objects spread over `worker_count` workers.
///
/// The result does not depend on `worker_count`.
pub fn compute_windows_parallel(
    filtered: &ObservationTable,
    params: &WindowParams,
    worker_count: usize,
) -> Result<DetectionWindows, SieveError> {
    let params = params.validated()?;
    if worker_count < 1 {
        return Err(SieveError::InvalidWorkerCount(worker_count));
    }
    let start = Instant::now();

    let partitions = partition(filtered, worker_count)?;
    let per_partition = fork_join(&partitions, worker_count, "windows", |part| {
        Ok(windows_of(part.rows(), &params))
    })?;
    let windows: DetectionWindows = per_partition.into_iter().flatten().collect();

    info!(
        objects = windows.len(),
        findable = windows.number_findable(),
        min_nights = params.min_nights,
        max_window_days = params.max_window_days,
        elapsed = %fmt_dur(start.elapsed()),
        "detection windows computed"
    );
    Ok(windows)
}
