//! # Tracklet validation
//!
//! Decide whether a single-night group of detections ([`Tracklet`]) is good enough to be
//! reported. A tracklet passes only if **all** of the following hold:
//!
//! 1. it has at least `min_obs` detections,
//! 2. the great-circle arc between its first and last detection is **strictly greater** than
//!    `min_arc_arcsec`,
//! 3. the smallest time gap between two **consecutive** detections is **strictly less** than
//!    `max_gap_minutes`.
//!
//! A tracklet with a single detection has neither an arc nor a gap and always fails.
//!
//! Criterion 3 looks at consecutive detections only: a pair taken a few minutes apart is
//! enough, even if a third detection of the same night comes hours later.
//!
//! ## Configuration
//! -----------------
//! Thresholds are grouped in [`TrackletCriteria`] and validated by its builder:
//!
//! ```rust
//! use tracksieve::tracklet_filter::TrackletCriteria;
//!
//! let criteria = TrackletCriteria::builder()
//!     .min_obs(3)
//!     .min_arc_arcsec(1.0)
//!     .max_gap_minutes(90.0)
//!     .build()
//!     .unwrap();
//! assert_eq!(criteria.min_obs, 3);
//! ```
use std::cmp::Ordering::{Equal, Greater, Less};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{ArcSec, Minutes},
    observations::tracklet::Tracklet,
    sieve_errors::SieveError,
};

/// Why a tracklet was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// Fewer than `min_obs` detections
    TooFewObservations,
    /// Only one detection: arc and gap are undefined
    SingleDetection,
    /// Arc between first and last detection not above `min_arc_arcsec`
    ArcTooShort,
    /// No pair of consecutive detections closer than `max_gap_minutes`
    GapTooLarge,
}

/// Minimum-detectability thresholds for a tracklet.
///
/// Fields
/// -----------------
/// * `min_obs` – minimum number of detections (`>= 1`).
/// * `min_arc_arcsec` – the first-to-last arc must exceed this value (arcseconds, `>= 0`).
/// * `max_gap_minutes` – the smallest consecutive time gap must be below this value
///   (minutes, `> 0`).
///
/// Defaults
/// -----------------
/// `min_obs = 2`, `min_arc_arcsec = 1.0`, `max_gap_minutes = 90.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackletCriteria {
    pub min_obs: usize,
    pub min_arc_arcsec: ArcSec,
    pub max_gap_minutes: Minutes,
}

impl Default for TrackletCriteria {
    fn default() -> Self {
        TrackletCriteria {
            min_obs: 2,
            min_arc_arcsec: 1.0,
            max_gap_minutes: 90.0,
        }
    }
}

impl TrackletCriteria {
    /// Build validated criteria from explicit thresholds.
    pub fn new(
        min_obs: usize,
        min_arc_arcsec: ArcSec,
        max_gap_minutes: Minutes,
    ) -> Result<Self, SieveError> {
        TrackletCriteria {
            min_obs,
            min_arc_arcsec,
            max_gap_minutes,
        }
        .validated()
    }

    pub fn builder() -> TrackletCriteriaBuilder {
        TrackletCriteriaBuilder::new()
    }

    /// Check every threshold, returning the criteria unchanged when they are usable.
    ///
    /// Validation rules
    /// -----------------
    /// * `min_obs >= 1`
    /// * `min_arc_arcsec` finite and `>= 0`
    /// * `max_gap_minutes` finite and `> 0`
    pub fn validated(self) -> Result<Self, SieveError> {
        if self.min_obs < 1 {
            return Err(SieveError::InvalidMinObs(self.min_obs));
        }
        if !self.min_arc_arcsec.is_finite()
            || !matches!(self.min_arc_arcsec.partial_cmp(&0.0), Some(Greater | Equal))
        {
            return Err(SieveError::InvalidFilterParameter(format!(
                "min_arc_arcsec must be finite and >= 0, got {}",
                self.min_arc_arcsec
            )));
        }
        if !self.max_gap_minutes.is_finite()
            || self.max_gap_minutes.partial_cmp(&0.0) != Some(Greater)
        {
            return Err(SieveError::InvalidFilterParameter(format!(
                "max_gap_minutes must be finite and > 0, got {}",
                self.max_gap_minutes
            )));
        }
        Ok(self)
    }

    /// Evaluate a tracklet against the criteria.
    ///
    /// Return
    /// ------
    /// * `Ok(())` if the tracklet passes
    /// * `Err(Rejection)` naming the first failed criterion, checked in the order
    ///   count, arc, gap
    pub fn evaluate(&self, tracklet: &Tracklet<'_>) -> Result<(), Rejection> {
        if tracklet.len() < self.min_obs {
            return Err(Rejection::TooFewObservations);
        }

        let (Some(arc), Some(gap)) = (
            tracklet.arc_length(),
            tracklet.min_consecutive_gap_minutes(),
        ) else {
            return Err(Rejection::SingleDetection);
        };

        if arc.partial_cmp(&self.min_arc_arcsec) != Some(Greater) {
            return Err(Rejection::ArcTooShort);
        }
        if gap.partial_cmp(&self.max_gap_minutes) != Some(Less) {
            return Err(Rejection::GapTooLarge);
        }
        Ok(())
    }

    /// True when the tracklet passes every criterion.
    #[inline]
    pub fn accepts(&self, tracklet: &Tracklet<'_>) -> bool {
        self.evaluate(tracklet).is_ok()
    }
}

/// Decide whether `tracklet` passes the three detectability criteria.
///
/// Thresholds are taken as given; use [`TrackletCriteria::new`] for validated thresholds.
///
/// Arguments
/// ---------
/// * `tracklet`: the same-night group to evaluate
/// * `min_obs`: minimum number of detections
/// * `min_arc_arcsec`: the first-to-last arc must exceed this value (arcseconds)
/// * `max_gap_minutes`: the smallest consecutive gap must be below this value (minutes)
pub fn is_valid(
    tracklet: &Tracklet<'_>,
    min_obs: usize,
    min_arc_arcsec: ArcSec,
    max_gap_minutes: Minutes,
) -> bool {
    TrackletCriteria {
        min_obs,
        min_arc_arcsec,
        max_gap_minutes,
    }
    .accepts(tracklet)
}

/// Builder for [`TrackletCriteria`], with validation.
#[derive(Debug, Clone, Default)]
pub struct TrackletCriteriaBuilder {
    criteria: TrackletCriteria,
}

impl TrackletCriteriaBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            criteria: TrackletCriteria::default(),
        }
    }

    pub fn min_obs(mut self, v: usize) -> Self {
        self.criteria.min_obs = v;
        self
    }
    pub fn min_arc_arcsec(mut self, v: ArcSec) -> Self {
        self.criteria.min_arc_arcsec = v;
        self
    }
    pub fn max_gap_minutes(mut self, v: Minutes) -> Self {
        self.criteria.max_gap_minutes = v;
        self
    }

    /// Finalize the builder, see [`TrackletCriteria::validated`] for the rules applied.
    pub fn build(self) -> Result<TrackletCriteria, SieveError> {
        self.criteria.validated()
    }
}
