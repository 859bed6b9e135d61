use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Rendered in place of a date that could not be parsed.
pub const INVALID_DATE_MARKER: &str = "Date invalide";
/// Rendered when the date cell was empty.
pub const MISSING_DATE_MARKER: &str = "Date manquante";

/// A normalized transaction time. Unparseable input is kept, not dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timestamp {
    Valid(NaiveDateTime),
    Invalid { raw: String },
}

impl Timestamp {
    pub fn invalid(raw: impl Into<String>) -> Self {
        Timestamp::Invalid { raw: raw.into() }
    }

    pub fn valid(&self) -> Option<NaiveDateTime> {
        match self {
            Timestamp::Valid(dt) => Some(*dt),
            Timestamp::Invalid { .. } => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::Valid(_))
    }

    /// Sort key placing every valid timestamp, ascending, before every
    /// invalid one. Invalid timestamps share a key, so a stable sort keeps
    /// their input order.
    pub fn chronological_key(&self) -> (bool, Option<NaiveDateTime>) {
        match self {
            Timestamp::Valid(dt) => (false, Some(*dt)),
            Timestamp::Invalid { .. } => (true, None),
        }
    }

    pub fn display(&self, format: &str) -> String {
        match self {
            Timestamp::Valid(dt) => dt.format(format).to_string(),
            Timestamp::Invalid { raw } if raw.trim().is_empty() => MISSING_DATE_MARKER.to_string(),
            Timestamp::Invalid { .. } => INVALID_DATE_MARKER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Timestamp::Valid(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn invalid_sorts_after_valid() {
        let mut stamps = vec![
            Timestamp::invalid("not-a-date"),
            at(2025, 6, 23, 8),
            Timestamp::invalid(""),
            at(2025, 6, 10, 12),
        ];
        stamps.sort_by_key(|t| t.chronological_key());
        assert_eq!(stamps[0], at(2025, 6, 10, 12));
        assert_eq!(stamps[1], at(2025, 6, 23, 8));
        // Stable among invalid entries.
        assert_eq!(stamps[2], Timestamp::invalid("not-a-date"));
        assert_eq!(stamps[3], Timestamp::invalid(""));
    }

    #[test]
    fn display_markers() {
        assert_eq!(Timestamp::invalid("garbage").display("%d/%m/%Y"), INVALID_DATE_MARKER);
        assert_eq!(Timestamp::invalid("  ").display("%d/%m/%Y"), MISSING_DATE_MARKER);
        assert_eq!(at(2025, 6, 23, 8).display("%d/%m/%Y %H:%M"), "23/06/2025 08:00");
    }
}
