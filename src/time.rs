use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Night, DEFAULT_NIGHT_ZERO, MJD, NIGHT_OFFSET},
    sieve_errors::SieveError,
};

/// Reference epoch from which night indices are counted.
///
/// A night index is the integer day number of `mjd - 0.5` relative to `zero`:
///
/// ```text
/// night = floor(mjd - 0.5) - zero
/// ```
///
/// The half-day offset moves the day boundary to noon UTC so that an observing
/// night, which straddles midnight, keeps a single index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightEpoch {
    /// Integer MJD of night zero
    pub zero: i64,
}

impl Default for NightEpoch {
    fn default() -> Self {
        NightEpoch {
            zero: DEFAULT_NIGHT_ZERO,
        }
    }
}

impl NightEpoch {
    /// Create an epoch whose night zero starts at the integer MJD `zero`.
    pub fn new(zero: i64) -> Self {
        NightEpoch { zero }
    }

    /// Create an epoch from a UTC calendar date.
    ///
    /// Arguments
    /// ---------
    /// * `year`, `month`, `day`: the calendar date of night zero
    ///
    /// Return
    /// ------
    /// * the epoch, or [`SieveError::InvalidCalendarDate`] if hifitime rejects the date
    pub fn from_calendar_date(year: i32, month: u8, day: u8) -> Result<Self, SieveError> {
        let epoch = Epoch::maybe_from_gregorian_utc(year, month, day, 0, 0, 0, 0)
            .map_err(|e| SieveError::InvalidCalendarDate(format!("{year}-{month}-{day}: {e}")))?;
        Ok(NightEpoch {
            zero: epoch.to_mjd_utc_days().round() as i64,
        })
    }

    /// Night index of an observation taken at `mjd`.
    ///
    /// Saturates at the `i64` bounds for epochs far outside any survey.
    #[inline]
    pub fn night_of(&self, mjd: MJD) -> Night {
        ((mjd - NIGHT_OFFSET).floor() as i64).saturating_sub(self.zero)
    }
}
