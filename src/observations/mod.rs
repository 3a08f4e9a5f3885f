//! # Observations: records, tables and tracklets
//!
//! The data model shared by every stage of the sieve.
//!
//! * [`Observation`] – one astrometric detection of one object (RA/Dec in **degrees**, epoch in
//!   **MJD**, night index, opaque photometry).
//! * [`table::ObservationTable`] – an owned, **canonically ordered** sequence of observations:
//!   sorted by [`ObjectNumber`], then by epoch within each object. Every downstream component
//!   (partitioner, validator, windower) assumes this order.
//! * [`tracklet::Tracklet`] – a borrowed, contiguous slice of a canonical table holding the
//!   observations of one object on one night.
//!
//! Observations are never mutated once they are stored in a table: partitions and tracklets
//! borrow rows, and every filtering stage produces a new owned table.
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, Night, ObjectNumber, MAX_ABS_MJD, MJD},
    time::NightEpoch,
};

pub mod table;
pub mod tracklet;

/// Brightness and filter band of a detection.
///
/// Carried through the sieve untouched; nothing in this crate interprets it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Photometry {
    /// Apparent magnitude in `filter`
    pub magnitude: f32,
    /// Filter band name (e.g. `"r"`)
    pub filter: String,
}

/// A single astrometric detection of a moving object.
///
/// # Fields
///
/// * `object` - Identifier of the observed object, stable across the whole run
/// * `ra` - Right ascension in degrees
/// * `dec` - Declination in degrees
/// * `time` - Epoch of the detection (MJD)
/// * `night` - Night index derived from `time` (see [`NightEpoch`])
/// * `photometry` - Opaque brightness/filter payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub object: ObjectNumber,
    pub ra: Degree,
    pub dec: Degree,
    pub time: MJD,
    pub night: Night,
    pub photometry: Photometry,
}

impl Observation {
    /// Create a new observation, deriving its night index from `epoch`.
    ///
    /// Arguments
    /// ---------
    /// * `object`: identifier of the observed object
    /// * `ra`: right ascension (degrees)
    /// * `dec`: declination (degrees)
    /// * `time`: epoch of the detection (MJD)
    /// * `epoch`: reference epoch for night indices
    ///
    /// Return
    /// ------
    /// * a new Observation with empty photometry
    pub fn new(
        object: impl Into<ObjectNumber>,
        ra: Degree,
        dec: Degree,
        time: MJD,
        epoch: &NightEpoch,
    ) -> Self {
        Observation {
            object: object.into(),
            ra,
            dec,
            time,
            night: epoch.night_of(time),
            photometry: Photometry::default(),
        }
    }

    /// Create a new observation with an explicit, precomputed night index.
    pub fn with_night(
        object: impl Into<ObjectNumber>,
        ra: Degree,
        dec: Degree,
        time: MJD,
        night: Night,
    ) -> Self {
        Observation {
            object: object.into(),
            ra,
            dec,
            time,
            night,
            photometry: Photometry::default(),
        }
    }

    /// Attach a brightness/filter payload.
    pub fn with_photometry(mut self, magnitude: f32, filter: impl Into<String>) -> Self {
        self.photometry = Photometry {
            magnitude,
            filter: filter.into(),
        };
        self
    }

    /// True when position and epoch are all finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.ra.is_finite() && self.dec.is_finite() && self.time.is_finite()
    }

    /// Finite position and an epoch within `±MAX_ABS_MJD`.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.is_finite() && self.time.abs() <= MAX_ABS_MJD
    }
}

#[cfg(test)]
mod test_observations {
    use super::*;

    #[test]
    fn test_new_observation() {
        let epoch = NightEpoch::new(60000);
        let observation = Observation::new("S1", 10.0, -5.0, 60003.7, &epoch);
        assert_eq!(
            observation,
            Observation {
                object: ObjectNumber::String("S1".into()),
                ra: 10.0,
                dec: -5.0,
                time: 60003.7,
                night: 3,
                photometry: Photometry::default(),
            }
        );

        let observation = Observation::with_night(42_u32, 1.0, 2.0, 60001.0, 7)
            .with_photometry(21.3, "r");
        assert_eq!(observation.object, ObjectNumber::Int(42));
        assert_eq!(observation.night, 7);
        assert_eq!(observation.photometry.filter, "r");
    }

    #[test]
    fn test_is_finite() {
        let epoch = NightEpoch::default();
        assert!(Observation::new(1_u32, 1.0, 2.0, 60300.0, &epoch).is_finite());
        assert!(!Observation::with_night(1_u32, f64::NAN, 2.0, 60300.0, 0).is_finite());
        assert!(!Observation::with_night(1_u32, 1.0, f64::INFINITY, 60300.0, 0).is_finite());
        assert!(!Observation::with_night(1_u32, 1.0, 2.0, f64::NAN, 0).is_finite());
    }

    #[test]
    fn test_is_well_formed() {
        assert!(Observation::with_night(1_u32, 1.0, 2.0, 60300.0, 0).is_well_formed());
        assert!(Observation::with_night(1_u32, 1.0, 2.0, -1e300, 0).is_finite());
        assert!(!Observation::with_night(1_u32, 1.0, 2.0, -1e300, 0).is_well_formed());
        assert!(!Observation::with_night(1_u32, 1.0, 2.0, 2e9, 0).is_well_formed());
        assert!(!Observation::with_night(1_u32, f64::NAN, 2.0, 60300.0, 0).is_well_formed());
    }
}
