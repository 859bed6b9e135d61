use chrono::NaiveDateTime;
use releve_core::{Money, Period, ReportVariant, TransactionRow};
use serde::Serialize;

/// Per-group aggregates handed to the renderer and to `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub count: usize,
    pub amount_sum: Money,
    /// Only for variants that read a commission column.
    pub commission_sum: Option<Money>,
    pub period: Period,
}

/// Computes the aggregates of one group. `now` becomes the period when no
/// row has a valid timestamp.
pub fn summarize(
    key: &str,
    rows: &[TransactionRow],
    variant: &ReportVariant,
    now: NaiveDateTime,
) -> GroupSummary {
    let amount_sum: Money = rows.iter().map(|r| r.amount).sum();
    let commission_sum: Option<Money> = variant
        .commission_column
        .as_ref()
        .map(|_| rows.iter().filter_map(|r| r.commission).sum());

    let period = Period::spanning(rows.iter().map(|r| &r.timestamp)).unwrap_or_else(|| {
        tracing::warn!(key, "No valid date in group; using processing time as period");
        Period::fallback(now)
    });

    GroupSummary {
        key: key.to_string(),
        count: rows.len(),
        amount_sum,
        commission_sum,
        period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use releve_core::{Timestamp, VariantKind};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::from_decimal(Decimal::from_str(s).unwrap())
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn row(line: usize, timestamp: Timestamp, amount: &str, commission: Option<&str>) -> TransactionRow {
        TransactionRow {
            line,
            id: line.to_string(),
            timestamp,
            key: "KSAR".to_string(),
            counterparty: String::new(),
            operation: String::new(),
            amount: money(amount),
            commission: commission.map(money),
        }
    }

    #[test]
    fn sums_and_counts() {
        let rows = vec![
            row(2, Timestamp::Valid(at(10, 9)), "100", None),
            row(3, Timestamp::Valid(at(23, 8)), "200.5", None),
            row(4, Timestamp::Valid(at(15, 0)), "0", None),
        ];
        let centres = ReportVariant::preset(VariantKind::Centres);
        let summary = summarize("KSAR", &rows, &centres, at(30, 0));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.amount_sum, money("300.5"));
        assert_eq!(summary.commission_sum, None);
        assert_eq!(summary.period, Period::new(at(10, 9), at(23, 8)));
    }

    #[test]
    fn summary_does_not_depend_on_row_order() {
        let rows = vec![
            row(2, Timestamp::Valid(at(10, 9)), "100", Some("1")),
            row(3, Timestamp::Valid(at(23, 8)), "200.5", Some("2.5")),
            row(4, Timestamp::invalid("x"), "0", None),
        ];
        let agents = ReportVariant::preset(VariantKind::Agents);
        let expected = summarize("A007", &rows, &agents, at(30, 0));
        for order in [[2, 0, 1], [1, 2, 0], [2, 1, 0]] {
            let permuted: Vec<TransactionRow> = order.iter().map(|&i| rows[i].clone()).collect();
            assert_eq!(summarize("A007", &permuted, &agents, at(30, 0)), expected);
        }
        assert_eq!(expected.amount_sum, money("300.5"));
        assert_eq!(expected.commission_sum, Some(money("3.5")));
    }

    #[test]
    fn invalid_dates_do_not_affect_sums_or_period() {
        let rows = vec![
            row(2, Timestamp::invalid("not-a-date"), "50", Some("1.5")),
            row(3, Timestamp::Valid(at(12, 10)), "25", Some("0.5")),
        ];
        let agents = ReportVariant::preset(VariantKind::Agents);
        let summary = summarize("A007", &rows, &agents, at(30, 0));
        assert_eq!(summary.count, 2);
        assert_eq!(summary.amount_sum, money("75"));
        assert_eq!(summary.commission_sum, Some(money("2")));
        assert_eq!(summary.period.start, at(12, 10));
        assert!(!summary.period.substituted);
    }

    #[test]
    fn period_falls_back_to_now() {
        let rows = vec![row(2, Timestamp::invalid(""), "10", None)];
        let centres = ReportVariant::preset(VariantKind::Centres);
        let now = at(30, 17);
        let summary = summarize("KSAR", &rows, &centres, now);
        assert!(summary.period.substituted);
        assert_eq!(summary.period.start, now);
    }
}
