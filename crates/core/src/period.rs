use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timestamp::Timestamp;

/// Display format of the period bounds in statement headers.
pub const PERIOD_DATE_FORMAT: &str = "%d/%m/%Y";

/// The `[start, end]` span of a group's valid timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Set when no row carried a valid timestamp and the processing time
    /// was used for both bounds.
    pub substituted: bool,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}   jusqu'au   {}", self.start_label(), self.end_label())
    }
}

impl Period {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Period { start, end, substituted: false }
    }

    /// Min/max over valid timestamps; `None` when there are none.
    pub fn spanning<'a, I>(timestamps: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Timestamp>,
    {
        timestamps
            .into_iter()
            .filter_map(Timestamp::valid)
            .fold(None, |acc: Option<Period>, dt| match acc {
                None => Some(Period::new(dt, dt)),
                Some(p) => Some(Period::new(p.start.min(dt), p.end.max(dt))),
            })
    }

    pub fn fallback(now: NaiveDateTime) -> Self {
        Period { start: now, end: now, substituted: true }
    }

    pub fn start_label(&self) -> String {
        self.start.format(PERIOD_DATE_FORMAT).to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format(PERIOD_DATE_FORMAT).to_string()
    }
}
