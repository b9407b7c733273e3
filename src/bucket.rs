//! Calendar time buckets derived from event timestamps
//!
//! Every event maps to exactly one [`Day`] and exactly one [`Month`].
//! Timestamps are bucketed by their own wall-clock date: no zone
//! conversion is applied (see [`crate::event::Timestamp`]).

use crate::event::Timestamp;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Bucket granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Day => write!(f, "day"),
            Granularity::Month => write!(f, "month"),
        }
    }
}

/// A calendar unit usable as a matrix row key
pub trait TimeBucket: Copy + Ord + Hash + fmt::Debug + fmt::Display {
    const GRANULARITY: Granularity;

    /// Bucket containing the timestamp's wall-clock date
    fn from_timestamp(ts: &Timestamp) -> Self;

    /// The next calendar unit
    fn succ(self) -> Self;
}

/// Exact calendar date (time of day dropped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(pub NaiveDate);

impl Day {
    /// Build a day from calendar parts, `None` if the date does not exist
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Day)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl TimeBucket for Day {
    const GRANULARITY: Granularity = Granularity::Day;

    fn from_timestamp(ts: &Timestamp) -> Self {
        Day(ts.local_date())
    }

    fn succ(self) -> Self {
        // Only NaiveDate::MAX has no successor; saturate there.
        Day(self.0.checked_add_days(Days::new(1)).unwrap_or(self.0))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Year-month bucket, displayed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Build a month, `None` unless `month` is in 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl TimeBucket for Month {
    const GRANULARITY: Granularity = Granularity::Month;

    fn from_timestamp(ts: &Timestamp) -> Self {
        let date = ts.local_date();
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Both bucket keys for one timestamp
pub fn bucketize(ts: &Timestamp) -> (Day, Month) {
    (Day::from_timestamp(ts), Month::from_timestamp(ts))
}
