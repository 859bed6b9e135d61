//! Date normalization for transaction timestamps.
//!
//! Spreadsheet exports mix native date cells with free-form text such as
//! `2025-06-23 08:38:35`, `23/06/2025` or the database export layout
//! `10-JUN-25 12.49.35.212000 PM`. [`normalize`] maps any of them to a
//! [`Timestamp`]; text goes through [`STRATEGIES`] in order and the first
//! strategy returning a date in the supported year range wins.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use releve_core::Timestamp;

use crate::table::Cell;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// A pure text-to-date parser.
pub type DateStrategy = fn(&str) -> Option<NaiveDateTime>;

/// Text strategies, tried in this order.
pub const STRATEGIES: &[(&str, DateStrategy)] = &[
    ("database-export", parse_database_export),
    ("explicit-format", parse_explicit_formats),
    ("inferred", infer_datetime),
];

#[derive(Debug, Clone, Copy)]
enum Layout {
    DateTime(&'static str),
    Date(&'static str),
}

impl Layout {
    fn parse(self, text: &str) -> Option<NaiveDateTime> {
        match self {
            Layout::DateTime(fmt) => NaiveDateTime::parse_from_str(text, fmt).ok(),
            Layout::Date(fmt) => NaiveDate::parse_from_str(text, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
        }
    }
}

const EXPLICIT_LAYOUTS: &[Layout] = &[
    Layout::DateTime("%Y-%m-%d %H:%M:%S"),
    Layout::Date("%Y-%m-%d"),
    Layout::DateTime("%d/%m/%Y %H:%M:%S"),
    Layout::Date("%d/%m/%Y"),
    Layout::DateTime("%Y-%m-%d %H:%M"),
    Layout::Date("%m/%d/%Y"),
    Layout::DateTime("%m/%d/%Y %H:%M:%S"),
];

const INFERRED_LAYOUTS: &[Layout] = &[
    Layout::DateTime("%Y-%m-%dT%H:%M:%S%.f"),
    Layout::DateTime("%Y-%m-%dT%H:%M"),
    Layout::DateTime("%Y-%m-%d %H:%M:%S%.f"),
    Layout::DateTime("%Y/%m/%d %H:%M:%S"),
    Layout::DateTime("%Y/%m/%d %H:%M"),
    Layout::Date("%Y/%m/%d"),
    Layout::DateTime("%d/%m/%Y %H:%M"),
    Layout::DateTime("%d-%m-%Y %H:%M:%S"),
    Layout::Date("%d-%m-%Y"),
    Layout::DateTime("%d.%m.%Y %H:%M:%S"),
    Layout::DateTime("%d.%m.%Y %H:%M"),
    Layout::Date("%d.%m.%Y"),
    Layout::DateTime("%d-%b-%y %H.%M.%S%.f"),
    Layout::DateTime("%d-%b-%Y %H:%M:%S"),
    Layout::Date("%d-%b-%Y"),
    Layout::Date("%d-%b-%y"),
    Layout::Date("%d %B %Y"),
    Layout::Date("%d %b %Y"),
    Layout::Date("%B %d, %Y"),
    Layout::Date("%b %d, %Y"),
];

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_compact_date, r"^(\d{4})(\d{2})(\d{2})$");
re!(re_trailing_zone, r"(?i)\s*(?:UTC|GMT)$");

fn in_supported_range(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    (MIN_YEAR..=MAX_YEAR).contains(&dt.year()).then_some(dt)
}

/// Normalizes one cell. Never fails: unusable input becomes
/// [`Timestamp::Invalid`].
pub fn normalize(cell: &Cell) -> Timestamp {
    match cell {
        Cell::DateTime(dt) => Timestamp::Valid(*dt),
        Cell::Empty => Timestamp::invalid(""),
        other => normalize_text(&other.to_text()),
    }
}

pub fn normalize_text(raw: &str) -> Timestamp {
    let text = raw.trim();
    if text.is_empty() {
        return Timestamp::invalid("");
    }
    for (name, strategy) in STRATEGIES {
        if let Some(dt) = strategy(text) {
            tracing::trace!(strategy = name, input = text, "Parsed date");
            // Statements show whole seconds.
            return Timestamp::Valid(dt.with_nanosecond(0).unwrap_or(dt));
        }
    }
    tracing::debug!("Unparseable date: {text}");
    Timestamp::invalid(text)
}

/// `DD-MON-YY HH.MM.SS[.ffffff] AM|PM`, as written by database exports.
/// Sub-second digits are dropped.
pub fn parse_database_export(text: &str) -> Option<NaiveDateTime> {
    let upper = text.trim().to_ascii_uppercase();
    if !MONTH_ABBREVIATIONS.iter().any(|m| upper.contains(m)) {
        return None;
    }
    let (body, marker) = if let Some(body) = upper.strip_suffix(" PM") {
        (body, "PM")
    } else if let Some(body) = upper.strip_suffix(" AM") {
        (body, "AM")
    } else {
        return None;
    };

    let (date_part, time_part) = body.trim().split_once(' ')?;
    let time_clean = time_part.trim().replace('.', ":");
    let segments: Vec<&str> = time_clean.split(':').collect();
    let hms = if segments.len() >= 3 {
        format!("{}:{}:{}", segments[0], segments[1], segments[2])
    } else {
        time_clean.clone()
    };

    let candidate = format!("{date_part} {hms} {marker}");
    NaiveDateTime::parse_from_str(&candidate, "%d-%b-%y %I:%M:%S %p")
        .ok()
        .and_then(in_supported_range)
}

/// The fixed list of common layouts, in priority order.
pub fn parse_explicit_formats(text: &str) -> Option<NaiveDateTime> {
    EXPLICIT_LAYOUTS
        .iter()
        .filter_map(|layout| layout.parse(text))
        .find_map(in_supported_range)
}

/// Best-effort inference for everything the explicit layouts miss.
pub fn infer_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return in_supported_range(dt.naive_local());
    }
    if let Some(caps) = re_compact_date().captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(in_supported_range);
    }

    let stripped = re_trailing_zone().replace(text, "");
    let bare = stripped.trim();
    if let Some(naive) = bare.strip_suffix('Z') {
        let zulu = INFERRED_LAYOUTS
            .iter()
            .filter_map(|layout| layout.parse(naive))
            .find_map(in_supported_range);
        if zulu.is_some() {
            return zulu;
        }
    }
    let inferred = INFERRED_LAYOUTS
        .iter()
        .filter_map(|layout| layout.parse(bare))
        .find_map(in_supported_range);
    if inferred.is_none() && bare != text {
        return parse_explicit_formats(bare);
    }
    inferred
}
