use std::path::PathBuf;

use chrono::NaiveDateTime;
use releve_core::{InfoValue, ReportVariant, RowField, TransactionRow};
use releve_import::GroupSummary;

/// Optional header logos. The header is drawn only when both files exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branding {
    pub left_logo: Option<PathBuf>,
    pub right_logo: Option<PathBuf>,
}

impl Branding {
    pub fn new(left_logo: Option<PathBuf>, right_logo: Option<PathBuf>) -> Self {
        Self { left_logo, right_logo }
    }

    /// Both logo paths, if both are configured and present on disk.
    pub fn logos(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.left_logo, &self.right_logo) {
            (Some(l), Some(r)) if l.is_file() && r.is_file() => Some((l, r)),
            _ => None,
        }
    }
}

/// Everything needed to render one group's statement.
#[derive(Debug, Clone)]
pub struct GroupReport<'a> {
    pub variant: &'a ReportVariant,
    pub summary: &'a GroupSummary,
    /// Already in chronological order.
    pub rows: &'a [TransactionRow],
    pub branding: &'a Branding,
    pub generated_at: NaiveDateTime,
}

impl GroupReport<'_> {
    /// Header lines as `(label, value)` text pairs.
    pub fn info_lines(&self) -> Vec<(String, String)> {
        self.variant
            .info_lines
            .iter()
            .map(|line| (line.label.clone(), self.info_value(&line.value)))
            .collect()
    }

    fn info_value(&self, value: &InfoValue) -> String {
        let v = self.variant;
        let s = self.summary;
        match value {
            InfoValue::Key => s.key.clone(),
            InfoValue::Period if s.period.substituted => {
                format!("{} (aucune date valide)", s.period)
            }
            InfoValue::Period => s.period.to_string(),
            InfoValue::Count => s.count.to_string(),
            InfoValue::AmountSum => format!("{} {}", s.amount_sum.format(v.total_decimals), v.currency),
            InfoValue::CommissionSum => format!(
                "{} {}",
                s.commission_sum.unwrap_or_default().format(v.total_decimals),
                v.currency
            ),
            InfoValue::Literal(text) => text.clone(),
        }
    }

    /// Table body as text; a cell may contain `\n` line breaks.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.variant
                    .columns
                    .iter()
                    .map(|col| self.cell_text(row, col.field))
                    .collect()
            })
            .collect()
    }

    fn cell_text(&self, row: &TransactionRow, field: RowField) -> String {
        let v = self.variant;
        match field {
            RowField::Id => row.id.clone(),
            RowField::Date => row.timestamp.display(&v.date_format),
            RowField::Counterparty => row.counterparty.clone(),
            RowField::Key => row.key.clone(),
            RowField::Operation => row.operation.clone(),
            RowField::Commission => row
                .commission
                .unwrap_or_default()
                .format(v.commission_decimals),
            RowField::Amount => row.amount.format(v.amount_decimals),
        }
    }

    /// Footer stamp, e.g. `Généré le 30/06/2025 à 09:00`.
    pub fn generated_line(&self) -> String {
        self.generated_at.format("Généré le %d/%m/%Y à %H:%M").to_string()
    }

    pub fn summary_line(&self) -> Option<String> {
        self.variant.show_summary_line.then(|| {
            format!(
                "Total : {} {}",
                self.summary.amount_sum.format(self.variant.total_decimals),
                self.variant.currency
            )
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::NaiveDate;
    use releve_core::{Money, Period, Timestamp};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    pub fn at(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    pub fn money(s: &str) -> Money {
        Money::from_decimal(Decimal::from_str(s).unwrap())
    }

    pub fn rows() -> Vec<TransactionRow> {
        vec![
            TransactionRow {
                line: 2,
                id: "0625062308383599295".to_string(),
                timestamp: Timestamp::Valid(at(10, 12, 49, 35)),
                key: "KSAR".to_string(),
                counterparty: "22334455".to_string(),
                operation: "PAIEMENT".to_string(),
                amount: money("1500"),
                commission: Some(money("2.5")),
            },
            TransactionRow {
                line: 3,
                id: "0002".to_string(),
                timestamp: Timestamp::invalid("not-a-date"),
                key: "KSAR".to_string(),
                counterparty: "Ould \"Sidi\"".to_string(),
                operation: "RETRAIT".to_string(),
                amount: money("200.5"),
                commission: None,
            },
        ]
    }

    pub fn summary() -> GroupSummary {
        GroupSummary {
            key: "KSAR".to_string(),
            count: 2,
            amount_sum: money("1700.5"),
            commission_sum: Some(money("2.5")),
            period: Period::new(at(10, 12, 49, 35), at(23, 8, 38, 35)),
        }
    }
}
