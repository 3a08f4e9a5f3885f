//! # Group-preserving partitioning
//!
//! Split a canonical [`ObservationTable`] into at most `n_parts` contiguous, near-equal
//! [`Partition`]s without ever separating the rows of one object.
//!
//! ## Algorithm
//! -----------------
//! The ideal partition size is `len / n_parts`. Starting from the previous cut, the cursor
//! jumps forward by that amount, then moves **right** while the rows on both sides of the
//! cut belong to the same object. A cut therefore always sits exactly between two different
//! objects, so no tracklet (and no object) straddles two partitions.
//!
//! When moving right runs off the end of the table (the tail is a single object, or the table
//! has fewer rows than `n_parts`), the remaining cuts are dropped and fewer partitions are
//! returned. This is the expected outcome, not an error.
//!
//! ## Guarantees
//! -----------------
//! * Partitions come back in table order and concatenate to the whole table.
//! * No [`ObjectNumber`](crate::constants::ObjectNumber) appears in two partitions.
//! * Cut positions depend only on the table and `n_parts`.
use std::ops::Range;

use crate::{
    observations::{table::ObservationTable, tracklet::Tracklets, Observation},
    sieve_errors::SieveError,
};

/// A contiguous, borrowed slice of a canonical table assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition<'a> {
    /// Position of the partition in table order
    pub index: usize,
    /// Row index of the first row in the source table
    pub start: usize,
    rows: &'a [Observation],
}

impl<'a> Partition<'a> {
    pub fn rows(&self) -> &'a [Observation] {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row range covered in the source table.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.rows.len()
    }

    /// Iterate over the `(object, night)` groups of this partition.
    pub fn tracklets(&self) -> Tracklets<'a> {
        Tracklets::new(self.rows)
    }
}

/// Split `table` into at most `n_parts` group-preserving partitions.
///
/// Arguments
/// ---------
/// * `table`: a canonical observation table
/// * `n_parts`: requested number of partitions (`>= 1`)
///
/// Return
/// ------
/// * between 1 and `n_parts` partitions, in table order; an empty table yields one
///   empty partition
/// * `Err(SieveError::InvalidWorkerCount)` when `n_parts == 0`
pub fn partition(
    table: &ObservationTable,
    n_parts: usize,
) -> Result<Vec<Partition<'_>>, SieveError> {
    partition_rows(table.as_slice(), n_parts)
}

/// Same as [`partition`] on a slice of canonically ordered rows.
pub fn partition_rows(
    rows: &[Observation],
    n_parts: usize,
) -> Result<Vec<Partition<'_>>, SieveError> {
    if n_parts == 0 {
        return Err(SieveError::InvalidWorkerCount(n_parts));
    }

    let cuts = cut_points(rows, n_parts);

    let mut partitions = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for (index, end) in cuts.into_iter().chain(std::iter::once(rows.len())).enumerate() {
        partitions.push(Partition {
            index,
            start,
            rows: &rows[start..end],
        });
        start = end;
    }
    Ok(partitions)
}

/// Interior cut positions: each cut `c` ends a partition before row `c`.
///
/// Every returned cut satisfies `0 < c < rows.len()` and
/// `rows[c - 1].object != rows[c].object`; cuts are strictly increasing.
pub(crate) fn cut_points(rows: &[Observation], n_parts: usize) -> Vec<usize> {
    let len = rows.len();
    let step = len / n_parts.max(1);
    if step == 0 {
        return Vec::new();
    }

    let mut cuts = Vec::with_capacity(n_parts - 1);
    let mut cursor = 0;
    while cuts.len() < n_parts - 1 {
        cursor += step;
        if cursor >= len {
            break;
        }

        // Slide right until the cut falls between two different objects
        while cursor < len && rows[cursor - 1].object == rows[cursor].object {
            cursor += 1;
        }
        if cursor >= len {
            break;
        }
        cuts.push(cursor);
    }
    cuts
}
