//! # Constants and type definitions for tracksieve
//!
//! This module centralizes the **conversion factors** and **common type definitions** used
//! throughout the crate, together with the object identifier type that every table is keyed on.
//!
//! ## Overview
//!
//! - Unit conversions (degrees ↔ radians ↔ arcseconds, days ↔ minutes)
//! - Core type aliases used across the crate
//! - The default survey epoch used to derive night indices
//! - [`ObjectNumber`], the identifier of a moving object

use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds in one degree
pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Minutes in one day
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Offset applied to an MJD before truncation so that a whole observing night
/// (local evening to morning for the reference site) maps to a single night index.
pub const NIGHT_OFFSET: f64 = 0.5;

/// MJD of night zero for the reference survey simulation (2023-09-30).
pub const DEFAULT_NIGHT_ZERO: i64 = 60217;

/// Largest accepted `|MJD|`. Epochs beyond it (millions of years away) are treated as malformed
/// so that night indices always fit an `i64`.
pub const MAX_ABS_MJD: f64 = 1.0e9;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Duration in minutes
pub type Minutes = f64;

/// Modified Julian Date (days)
pub type MJD = f64;

/// Integer night index relative to a [`NightEpoch`](crate::time::NightEpoch)
pub type Night = i64;

// -------------------------------------------------------------------------------------------------
// Identifiers
// -------------------------------------------------------------------------------------------------

/// Identifier of a solar system object.
///
/// This can be:
/// - A simulation or catalogue number (e.g. `Int(1234)`)
/// - A string designation (e.g. `"S1000000a"` or a hex id `"00004D2"`)
///
/// Ordering is total: every `Int` sorts before every `String`, then by value.
/// The canonical table order relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectNumber {
    /// Integer-based designation
    Int(u32),
    /// String-based designation
    String(String),
}

impl std::fmt::Display for ObjectNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectNumber::Int(n) => write!(f, "{n}"),
            ObjectNumber::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for ObjectNumber {
    fn from(n: u32) -> Self {
        ObjectNumber::Int(n)
    }
}

impl From<String> for ObjectNumber {
    fn from(s: String) -> Self {
        ObjectNumber::String(s)
    }
}

impl From<&str> for ObjectNumber {
    fn from(s: &str) -> Self {
        ObjectNumber::String(s.to_string())
    }
}

impl std::str::FromStr for ObjectNumber {
    type Err = std::num::ParseIntError;

    /// Try to parse an `ObjectNumber` from a string.
    /// - Pure digits → `Int(u32)`
    /// - Otherwise  → `String(String)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u32>() {
            Ok(n) => Ok(ObjectNumber::Int(n)),
            Err(e) => {
                // Digits that overflow u32 are an error, anything else is a designation
                if s.chars().any(|c| !c.is_ascii_digit()) {
                    Ok(ObjectNumber::String(s.to_string()))
                } else {
                    Err(e)
                }
            }
        }
    }
}
