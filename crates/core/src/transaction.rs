use serde::{Deserialize, Serialize};

use super::money::Money;
use super::timestamp::Timestamp;

/// One input record after column mapping and coercion.
///
/// `id` and `key` are opaque text: `"0625062308383599295"` stays exactly
/// that all the way to the rendered statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// 1-based spreadsheet line, header included. Used in log messages.
    pub line: usize,
    pub id: String,
    pub timestamp: Timestamp,
    pub key: String,
    pub counterparty: String,
    /// Operation type; empty for variants without such a column.
    pub operation: String,
    pub amount: Money,
    pub commission: Option<Money>,
}

/// Sorts rows by timestamp ascending, invalid timestamps last. Stable.
pub fn sort_chronologically(rows: &mut [TransactionRow]) {
    rows.sort_by_key(|row| row.timestamp.chronological_key());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(line: usize, timestamp: Timestamp) -> TransactionRow {
        TransactionRow {
            line,
            id: format!("{line:04}"),
            timestamp,
            key: "KSAR".to_string(),
            counterparty: String::new(),
            operation: String::new(),
            amount: Money::zero(),
            commission: None,
        }
    }

    fn day(d: u32) -> Timestamp {
        Timestamp::Valid(
            NaiveDate::from_ymd_opt(2025, 6, d)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn sort_places_invalid_rows_last_in_input_order() {
        let mut rows = vec![
            row(2, Timestamp::invalid("not-a-date")),
            row(3, day(23)),
            row(4, Timestamp::invalid("")),
            row(5, day(10)),
        ];
        sort_chronologically(&mut rows);
        let lines: Vec<usize> = rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![5, 3, 2, 4]);
    }

    #[test]
    fn sort_keeps_equal_timestamps_stable() {
        let mut rows = vec![row(2, day(10)), row(3, day(10)), row(4, day(1))];
        sort_chronologically(&mut rows);
        let lines: Vec<usize> = rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![4, 2, 3]);
    }
}
