//! # Canonical observation tables
//!
//! [`ObservationTable`] owns a sequence of [`Observation`]s kept in **canonical order**:
//! sorted by [`ObjectNumber`], then by epoch within each object (ties keep their input order).
//! Group boundaries (tracklets, objects, partitions) are detected by comparing neighbouring
//! rows, so this order is an invariant of the type rather than a convention: a table can only
//! be built through [`ObservationTable::canonicalize`], which sorts, or through
//! [`ObservationTable::from_sorted`], which checks.
//!
//! ## Malformed rows
//! -----------------
//! Rows with a non-finite right ascension, declination or epoch, or with an epoch beyond
//! [`MAX_ABS_MJD`](crate::constants::MAX_ABS_MJD), are dropped during canonicalization. The number of dropped rows is returned in an [`IngestReport`] and logged;
//! a bad row never aborts the whole table.
use std::{cmp::Ordering, collections::HashSet};

use ahash::RandomState;
use tracing::warn;

use crate::{
    constants::{Night, ObjectNumber},
    observations::{
        tracklet::{Tracklet, Tracklets},
        Observation,
    },
    sieve_errors::SieveError,
    time::NightEpoch,
};

/// Fast hash set of object identifiers, used for exclusion lists.
pub type ObjectSet = HashSet<ObjectNumber, RandomState>;

/// Outcome of canonicalizing a raw batch of observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestReport {
    /// Rows kept in the table
    pub accepted: usize,
    /// Rows dropped because of a non-finite position or an unusable epoch
    pub rejected: usize,
}

/// Canonical row order: object identifier, then epoch.
#[inline]
pub(crate) fn canonical_cmp(a: &Observation, b: &Observation) -> Ordering {
    a.object
        .cmp(&b.object)
        .then_with(|| a.time.total_cmp(&b.time))
}

/// An owned, canonically ordered table of observations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    /// Build a canonical table from an unordered batch of observations.
    ///
    /// Rows that are not [well formed](Observation::is_well_formed) are dropped, the rest are
    /// stably sorted by `(object, time)`. Night indices are kept as provided.
    ///
    /// Arguments
    /// ---------
    /// * `observations`: any batch of observations
    ///
    /// Return
    /// ------
    /// * the canonical table and an [`IngestReport`] counting kept and rejected rows
    pub fn canonicalize<I>(observations: I) -> (Self, IngestReport)
    where
        I: IntoIterator<Item = Observation>,
    {
        Self::canonicalize_impl(observations, None)
    }

    /// Same as [`ObservationTable::canonicalize`], but every accepted row gets its night
    /// index re-derived from its epoch with `epoch`.
    pub fn canonicalize_with_epoch<I>(observations: I, epoch: &NightEpoch) -> (Self, IngestReport)
    where
        I: IntoIterator<Item = Observation>,
    {
        Self::canonicalize_impl(observations, Some(epoch))
    }

    fn canonicalize_impl<I>(observations: I, epoch: Option<&NightEpoch>) -> (Self, IngestReport)
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut rejected = 0usize;
        let mut rows: Vec<Observation> = observations
            .into_iter()
            .filter_map(|mut obs| {
                if !obs.is_well_formed() {
                    rejected += 1;
                    return None;
                }
                if let Some(epoch) = epoch {
                    obs.night = epoch.night_of(obs.time);
                }
                Some(obs)
            })
            .collect();

        rows.sort_by(canonical_cmp);

        if rejected > 0 {
            warn!(
                rejected,
                accepted = rows.len(),
                "dropped observations with non-finite position or out-of-range epoch"
            );
        }

        let report = IngestReport {
            accepted: rows.len(),
            rejected,
        };
        (ObservationTable { rows }, report)
    }

    /// Wrap rows that are already in canonical order.
    ///
    /// Return
    /// ------
    /// * `Err(SieveError::UnsortedTable { row })` where `row` is the first row that is
    ///   out of `(object, time)` order, or whose night index decreases within its object.
    pub fn from_sorted(rows: Vec<Observation>) -> Result<Self, SieveError> {
        if let Some(row) = first_disorder(&rows) {
            return Err(SieveError::UnsortedTable { row });
        }
        Ok(ObservationTable { rows })
    }

    /// Wrap rows known to be canonical, e.g. an order-preserving subset of a canonical table.
    pub(crate) fn from_sorted_unchecked(rows: Vec<Observation>) -> Self {
        debug_assert!(first_disorder(&rows).is_none());
        ObservationTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.rows.iter()
    }

    pub fn into_observations(self) -> Vec<Observation> {
        self.rows
    }

    /// Iterate over the `(object, night)` groups of the table, in table order.
    pub fn tracklets(&self) -> Tracklets<'_> {
        Tracklets::new(&self.rows)
    }

    /// Iterate over the rows of each object, in table order.
    pub fn objects(&self) -> impl Iterator<Item = (&ObjectNumber, &[Observation])> + '_ {
        self.rows
            .chunk_by(|a, b| a.object == b.object)
            .map(|rows| (&rows[0].object, rows))
    }

    /// Number of distinct objects in the table.
    pub fn number_of_objects(&self) -> usize {
        self.objects().count()
    }

    /// Drop every row belonging to an object of `excluded`, keeping canonical order.
    pub fn without_objects(self, excluded: &ObjectSet) -> Self {
        if excluded.is_empty() {
            return self;
        }
        let rows = self
            .rows
            .into_iter()
            .filter(|obs| !excluded.contains(&obs.object))
            .collect();
        ObservationTable { rows }
    }

    /// Copy of the rows observed on `night`, in canonical order.
    pub fn observations_on_night(&self, night: Night) -> ObservationTable {
        let rows = self
            .rows
            .iter()
            .filter(|obs| obs.night == night)
            .cloned()
            .collect();
        ObservationTable { rows }
    }

    /// The tracklet of `object` on `night`, if any.
    ///
    /// The object is located by binary search; its nights are scanned in table order, so the
    /// lookup does not assume night indices agree with epochs. If they do not and `night`
    /// occurs in several runs, the first run is returned.
    pub fn tracklet(&self, object: &ObjectNumber, night: Night) -> Option<Tracklet<'_>> {
        let start = self.rows.partition_point(|obs| &obs.object < object);
        let end = start + self.rows[start..].partition_point(|obs| &obs.object == object);
        Tracklets::new(&self.rows[start..end]).find(|t| t.night() == night)
    }
}

impl<'a> IntoIterator for &'a ObservationTable {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Index of the first row breaking canonical order, if any.
fn first_disorder(rows: &[Observation]) -> Option<usize> {
    rows.windows(2).position(|pair| {
        let (a, b) = (&pair[0], &pair[1]);
        match canonical_cmp(a, b) {
            Ordering::Greater => true,
            _ => a.object == b.object && b.night < a.night,
        }
    })
    .map(|i| i + 1)
}
