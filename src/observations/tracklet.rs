//! Same-night observation groups.
//!
//! A [`Tracklet`] is never materialized as an owned entity: it is a contiguous
//! slice of a canonical [`ObservationTable`](crate::observations::table::ObservationTable)
//! in which every row shares one `(object, night)` key. Because the table is sorted by
//! epoch within each object, the first and last rows of a tracklet are also its first
//! and last detections in time.
use itertools::Itertools;

use crate::{
    constants::{ArcSec, Minutes, Night, ObjectNumber, ARCSEC_PER_DEG, MINUTES_PER_DAY},
    conversion::separation_arcsec,
    observations::Observation,
};

/// The observations of one object on one night.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tracklet<'a> {
    observations: &'a [Observation],
}

impl<'a> Tracklet<'a> {
    /// Wrap a slice of same-key observations.
    ///
    /// Return
    /// ------
    /// * `None` if `observations` is empty
    ///
    /// The caller guarantees that every row shares the same `(object, night)` and that rows
    /// are ordered by epoch; this is checked in debug builds only.
    pub fn from_slice(observations: &'a [Observation]) -> Option<Self> {
        let first = observations.first()?;
        debug_assert!(
            observations
                .iter()
                .all(|o| o.object == first.object && o.night == first.night),
            "tracklet rows must share (object, night)"
        );
        Some(Tracklet { observations })
    }

    pub fn object(&self) -> &'a ObjectNumber {
        &self.observations[0].object
    }

    pub fn night(&self) -> Night {
        self.observations[0].night
    }

    pub fn observations(&self) -> &'a [Observation] {
        self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false: an empty slice never becomes a tracklet.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> &'a Observation {
        &self.observations[0]
    }

    pub fn last(&self) -> &'a Observation {
        &self.observations[self.observations.len() - 1]
    }

    /// Great-circle distance between the first and last detection, in arcseconds.
    ///
    /// Return
    /// ------
    /// * `None` for a single-detection tracklet, where the arc is undefined
    pub fn arc_length(&self) -> Option<ArcSec> {
        if self.len() < 2 {
            return None;
        }
        let (first, last) = (self.first(), self.last());
        Some(separation_arcsec(first.ra, first.dec, last.ra, last.dec))
    }

    /// Smallest time gap between two consecutive detections, in minutes.
    ///
    /// Return
    /// ------
    /// * `None` for a single-detection tracklet
    pub fn min_consecutive_gap_minutes(&self) -> Option<Minutes> {
        self.observations
            .iter()
            .tuple_windows()
            .map(|(a, b)| (b.time - a.time) * MINUTES_PER_DAY)
            .min_by(f64::total_cmp)
    }

    /// Time elapsed between the first and last detection, in days.
    pub fn duration_days(&self) -> f64 {
        self.last().time - self.first().time
    }

    /// Mean on-sky rate of motion over the tracklet, in degrees per day.
    ///
    /// Return
    /// ------
    /// * `None` when the arc is undefined or all detections share one epoch
    pub fn angular_speed(&self) -> Option<f64> {
        let arc = self.arc_length()?;
        let duration = self.duration_days();
        if duration <= 0.0 {
            return None;
        }
        Some(arc / ARCSEC_PER_DEG / duration)
    }
}

/// Iterator over the tracklets of a canonically ordered slice of observations.
///
/// Consecutive rows sharing `(object, night)` are grouped together. The iterator
/// never yields an empty tracklet.
pub struct Tracklets<'a> {
    chunks: std::slice::ChunkBy<'a, Observation, fn(&Observation, &Observation) -> bool>,
}

fn same_tracklet(a: &Observation, b: &Observation) -> bool {
    a.object == b.object && a.night == b.night
}

impl<'a> Tracklets<'a> {
    pub fn new(rows: &'a [Observation]) -> Self {
        Tracklets {
            chunks: rows.chunk_by(same_tracklet as fn(&Observation, &Observation) -> bool),
        }
    }
}

impl<'a> Iterator for Tracklets<'a> {
    type Item = Tracklet<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(|observations| Tracklet { observations })
    }
}

#[cfg(test)]
mod tracklet_test {
    use super::*;
    use approx::assert_relative_eq;

    fn obs(object: &str, ra: f64, dec: f64, time: f64, night: i64) -> Observation {
        Observation::with_night(object, ra, dec, time, night)
    }

    #[test]
    fn test_empty_slice_is_not_a_tracklet() {
        assert!(Tracklet::from_slice(&[]).is_none());
    }

    #[test]
    fn test_tracklet_kinematics() {
        let rows = vec![
            obs("A", 10.0, 0.0, 60000.0, 0),
            obs("A", 10.001, 0.0, 60000.01, 0),
            obs("A", 10.0028, 0.0, 60000.02, 0),
        ];
        let tracklet = Tracklet::from_slice(&rows).unwrap();

        assert_eq!(tracklet.len(), 3);
        assert_eq!(tracklet.object(), &ObjectNumber::from("A"));
        assert_eq!(tracklet.night(), 0);
        assert_relative_eq!(tracklet.arc_length().unwrap(), 10.08, epsilon = 1e-6);
        assert_relative_eq!(
            tracklet.min_consecutive_gap_minutes().unwrap(),
            14.4,
            epsilon = 1e-4
        );
        assert_relative_eq!(tracklet.duration_days(), 0.02, epsilon = 1e-9);
        assert_relative_eq!(tracklet.angular_speed().unwrap(), 0.14, epsilon = 1e-6);
    }

    #[test]
    fn test_min_gap_is_the_smallest_consecutive_gap() {
        let rows = vec![
            obs("A", 0.0, 0.0, 60000.0, 0),
            obs("A", 0.1, 0.0, 60000.1, 0),
            obs("A", 0.2, 0.0, 60000.101, 0),
            obs("A", 0.3, 0.0, 60000.3, 0),
        ];
        let tracklet = Tracklet::from_slice(&rows).unwrap();
        assert_relative_eq!(
            tracklet.min_consecutive_gap_minutes().unwrap(),
            1.44,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_single_detection() {
        let rows = vec![obs("A", 0.0, 0.0, 60000.0, 0)];
        let tracklet = Tracklet::from_slice(&rows).unwrap();
        assert_eq!(tracklet.arc_length(), None);
        assert_eq!(tracklet.min_consecutive_gap_minutes(), None);
        assert_eq!(tracklet.angular_speed(), None);
    }

    #[test]
    fn test_tracklets_iterator_groups_by_object_and_night() {
        let rows = vec![
            obs("A", 0.0, 0.0, 60000.6, 0),
            obs("A", 0.0, 0.0, 60000.7, 0),
            obs("A", 0.0, 0.0, 60001.6, 1),
            obs("B", 0.0, 0.0, 60001.6, 1),
            obs("B", 0.0, 0.0, 60001.7, 1),
            obs("C", 0.0, 0.0, 60003.6, 3),
        ];
        let keys: Vec<(String, i64, usize)> = Tracklets::new(&rows)
            .map(|t| (t.object().to_string(), t.night(), t.len()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A".to_string(), 0, 2),
                ("A".to_string(), 1, 1),
                ("B".to_string(), 1, 2),
                ("C".to_string(), 3, 1),
            ]
        );
        assert_eq!(Tracklets::new(&[]).count(), 0);
    }
}
