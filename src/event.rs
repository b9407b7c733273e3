//! Deck-creation events
//!
//! An [`Event`] records that a deck was built for an entity (an
//! investigator) at a point in time. Events are immutable once loaded.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;

/// Formats tried, in order, for timestamps without an explicit offset
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Formats tried for timestamps with an offset that RFC 3339 rejects
///
/// `%#z` accepts `+HH:MM`, `+HHMM` and hour-only `+HH`.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Creation instant of an event
///
/// Equality compares instants, so `10:00+00:00` and `12:00+02:00` are the
/// same timestamp. Bucketing uses the wall-clock date in the offset the
/// timestamp was recorded with; offset-less inputs are read as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Parse an ISO-8601 style timestamp
    ///
    /// Accepts RFC 3339 and ISO 8601 date-times with a `T` or space
    /// separator, minute or second precision (optional fraction), and an
    /// optional `±HH:MM`, `±HHMM` or `±HH` offset; also bare `YYYY-MM-DD`
    /// (midnight).
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err("empty timestamp".to_string());
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self(dt));
        }

        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(input, fmt) {
                return Ok(Self(dt));
            }
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
                return Ok(Self::from_naive_utc(naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self::from_naive_utc(midnight));
            }
        }

        Err(format!("unrecognized timestamp '{}'", input))
    }

    fn from_naive_utc(naive: NaiveDateTime) -> Self {
        Self(DateTime::<FixedOffset>::from(Utc.from_utc_datetime(&naive)))
    }

    /// Calendar date as recorded, without zone conversion
    pub fn local_date(&self) -> NaiveDate {
        self.0.naive_local().date()
    }

    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A single deck-creation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Entity being counted (investigator name)
    pub entity_name: String,
    /// When the deck was created
    pub created_at: Timestamp,
    /// Deck title, if the source carries one
    pub deck_name: Option<String>,
}

impl Event {
    pub fn new(entity_name: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            entity_name: entity_name.into(),
            created_at,
            deck_name: None,
        }
    }

    pub fn with_deck_name(mut self, deck_name: impl Into<String>) -> Self {
        self.deck_name = Some(deck_name.into());
        self
    }

    /// Identity used for deduplication
    pub fn identity(&self) -> (&str, Timestamp) {
        (&self.entity_name, self.created_at)
    }
}
