//! Season windows
//!
//! An inclusive month range that may wrap the year boundary (Aug to Jan).
//! Containment is decided on a combined month/day ordinal so a window can
//! later grow day-level precision without changing comparisons.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive month window, possibly wrapping the year boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindow {
    /// First in-season month (1-12)
    pub start_month: u32,
    /// Last in-season month (1-12), inclusive
    pub end_month: u32,
}

impl SeasonWindow {
    pub fn new(start_month: u32, end_month: u32) -> Self {
        debug_assert!((1..=12).contains(&start_month));
        debug_assert!((1..=12).contains(&end_month));
        Self {
            start_month,
            end_month,
        }
    }

    /// Whether the given date falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let ordinal = month_day_ordinal(date.month(), date.day());
        let start = month_day_ordinal(self.start_month, 1);
        let end = month_day_ordinal(self.end_month, 31);

        if start <= end {
            ordinal >= start && ordinal <= end
        } else {
            // Wraps the year boundary, e.g. Aug-Jan
            ordinal >= start || ordinal <= end
        }
    }
}

fn month_day_ordinal(month: u32, day: u32) -> u32 {
    month * 100 + day
}
