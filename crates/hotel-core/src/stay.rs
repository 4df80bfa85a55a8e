//! Half-open stay date ranges.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{HotelError, HotelResult};

/// A stay from `check_in` (inclusive) to `check_out` (exclusive).
///
/// Construction through [`StayRange::new`] guarantees
/// `check_out > check_in`, i.e. at least one night.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> HotelResult<Self> {
        if check_out <= check_in {
            return Err(HotelError::validation(format!(
                "check-out date {} must be after check-in date {}",
                check_out, check_in
            )));
        }
        Ok(StayRange {
            check_in,
            check_out,
        })
    }

    /// The single night starting on `date`.
    pub fn night_of(date: NaiveDate) -> HotelResult<Self> {
        let next = date
            .succ_opt()
            .ok_or_else(|| HotelError::validation(format!("date {} is out of range", date)))?;
        StayRange::new(date, next)
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of nights billed for this stay.
    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    /// `[a,b)` and `[c,d)` overlap iff `a < d && c < b`.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

impl fmt::Display for StayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.check_in, self.check_out)
    }
}
