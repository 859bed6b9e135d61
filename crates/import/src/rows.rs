use releve_core::{Money, ReportVariant, TransactionRow};

use crate::date;
use crate::table::{Cell, Table};

/// Maps every table row to a [`TransactionRow`] using the variant's column
/// names. Absent columns read as empty text or zero.
pub fn map_rows(table: &Table, variant: &ReportVariant) -> Vec<TransactionRow> {
    let id = table.column_index(&variant.id_column);
    let timestamp = table.column_index(&variant.timestamp_column);
    let key = table.column_index(&variant.key_column);
    let counterparty = table.column_index(&variant.counterparty_column);
    let amount = table.column_index(&variant.amount_column);
    let commission = variant
        .commission_column
        .as_deref()
        .map(|c| table.column_index(c));
    let operation = variant
        .operation_column
        .as_deref()
        .and_then(|c| table.column_index(c));

    table
        .rows()
        .iter()
        .zip(table.lines())
        .map(|(cells, &line)| {
            let text = |idx: Option<usize>| idx.map(|j| cells[j].to_text()).unwrap_or_default();
            TransactionRow {
                line,
                id: text(id),
                timestamp: timestamp
                    .map(|j| date::normalize(&cells[j]))
                    .unwrap_or_else(|| releve_core::Timestamp::invalid("")),
                key: text(key),
                counterparty: text(counterparty),
                operation: text(operation),
                amount: amount.map_or(Money::zero(), |j| coerce_money(&cells[j], line, &variant.amount_column)),
                commission: commission.map(|idx| match (idx, variant.commission_column.as_deref()) {
                    (Some(j), Some(name)) => coerce_money(&cells[j], line, name),
                    _ => Money::zero(),
                }),
            }
        })
        .collect()
}

/// Numbers are taken as-is, text is parsed leniently, anything else is zero.
pub fn coerce_money(cell: &Cell, line: usize, column: &str) -> Money {
    let parsed = match cell {
        Cell::Empty => return Money::zero(),
        Cell::Int(i) => Some(Money::from_decimal((*i).into())),
        Cell::Number(f) => Money::from_f64(*f),
        Cell::Text(s) if s.trim().is_empty() => return Money::zero(),
        Cell::Text(s) => Money::parse(s),
        Cell::Bool(_) | Cell::DateTime(_) => None,
    };
    parsed.unwrap_or_else(|| {
        tracing::warn!(line, column, value = %cell.to_text(), "Non-numeric amount treated as zero");
        Money::zero()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use releve_core::VariantKind;

    fn centres_table() -> Table {
        let mut t = Table::new(["ID", "DATEP", "CLIENT", "CENTRE", "MONTANT"]);
        t.push_row(vec![
            Cell::from("0625062308383599295"),
            Cell::from("2025-06-23 08:38:35"),
            Cell::from("C1"),
            Cell::from("KSAR"),
            Cell::Number(100.0),
        ]);
        t.push_row(vec![
            Cell::from("0002"),
            Cell::from("not-a-date"),
            Cell::from("C2"),
            Cell::from("KSAR"),
            Cell::from("1 200.5"),
        ]);
        t.push_row(vec![
            Cell::from("0003"),
            Cell::Empty,
            Cell::from("C3"),
            Cell::from("TEVRAGH"),
            Cell::from("n/a"),
        ]);
        t
    }

    #[test]
    fn maps_columns_and_line_numbers() {
        let rows = map_rows(&centres_table(), &ReportVariant::preset(VariantKind::Centres));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].id, "0625062308383599295");
        assert_eq!(rows[0].key, "KSAR");
        assert!(rows[0].timestamp.is_valid());
        assert_eq!(rows[0].commission, None);
        assert_eq!(rows[0].operation, "");
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn line_numbers_follow_the_worksheet() {
        let mut t = Table::new(["CENTRE", "MONTANT"]);
        t.push_row_at(2, vec![Cell::from("KSAR"), Cell::Number(1.0)]);
        // Lines 3 and 4 were blank in the worksheet.
        t.push_row_at(5, vec![Cell::from("KSAR"), Cell::from("200,5")]);
        let rows = map_rows(&t, &ReportVariant::preset(VariantKind::Centres));
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 5);
        assert!(rows[1].amount.is_zero());
    }

    #[test]
    fn bad_values_are_substituted_not_dropped() {
        let rows = map_rows(&centres_table(), &ReportVariant::preset(VariantKind::Centres));
        assert!(!rows[1].timestamp.is_valid());
        assert_eq!(rows[1].amount, Money::parse("1200.5").unwrap());
        assert!(rows[2].amount.is_zero());
    }

    #[test]
    fn agents_read_commission_and_operation() {
        let mut t = Table::new([
            "DATE_TRS", "ID_TRS", "TYPE_OPERATION", "CLIENT", "COMMISSION", "MONTANT", "CODE_AGENT",
        ]);
        t.push_row(vec![
            Cell::from("10-JUN-25 12.49.35.212000 PM"),
            Cell::from("T1"),
            Cell::from("RETRAIT"),
            Cell::from("C1"),
            Cell::Number(2.5),
            Cell::Int(1000),
            Cell::from("A007"),
        ]);
        let rows = map_rows(&t, &ReportVariant::preset(VariantKind::Agents));
        assert_eq!(rows[0].operation, "RETRAIT");
        assert_eq!(rows[0].commission, Money::from_f64(2.5));
        assert_eq!(rows[0].amount, Money::from_f64(1000.0).unwrap());
        assert_eq!(rows[0].key, "A007");
    }

    #[test]
    fn absent_optional_columns_default() {
        let mut t = Table::new(["CENTRE", "MONTANT"]);
        t.push_row(vec![Cell::from("KSAR"), Cell::Number(5.0)]);
        let rows = map_rows(&t, &ReportVariant::preset(VariantKind::Centres));
        assert_eq!(rows[0].id, "");
        assert_eq!(rows[0].counterparty, "");
        assert!(!rows[0].timestamp.is_valid());
    }

    #[test]
    fn coerce_money_handles_cell_kinds() {
        assert!(coerce_money(&Cell::Empty, 2, "MONTANT").is_zero());
        assert!(coerce_money(&Cell::Bool(true), 2, "MONTANT").is_zero());
        assert_eq!(
            coerce_money(&Cell::from("1 234 MRU"), 2, "MONTANT"),
            Money::parse("1234").unwrap()
        );
        assert!(coerce_money(&Cell::Number(f64::NAN), 2, "MONTANT").is_zero());
    }
}
