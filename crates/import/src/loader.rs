use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use releve_core::ReportVariant;
use thiserror::Error;

use crate::table::{Cell, Table};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Workbook has no worksheet")]
    NoWorksheet,
    #[error("Worksheet has no header row")]
    EmptySheet,
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

/// Reads the first worksheet of `path`. The first row is the header.
/// Cells of `text_columns` are coerced to text right after reading.
pub fn load_table(path: &Path, text_columns: &[&str]) -> Result<Table, LoadError> {
    if !path.is_file() {
        return Err(LoadError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    // Ranges start at the first used cell, not necessarily at A1.
    let header_line = range.start().map_or(1, |(row, _)| row as usize + 1);
    let mut rows = range.rows();
    let header = rows.next().ok_or(LoadError::EmptySheet)?;
    let columns: Vec<String> = header.iter().map(|d| convert(d).to_text()).collect();
    if columns.iter().all(|c| c.trim().is_empty()) {
        return Err(LoadError::EmptySheet);
    }

    let mut table = Table::new(columns);
    for (offset, row) in rows.enumerate() {
        let cells: Vec<Cell> = row.iter().map(convert).collect();
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        table.push_row_at(header_line + offset + 1, cells);
    }

    for column in text_columns {
        if let Some(n) = table.coerce_to_text(column) {
            if n > 0 {
                tracing::debug!(column, cells = n, "Coerced non-text cells to text");
            }
        }
    }

    tracing::info!(
        file = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "Loaded worksheet"
    );
    Ok(table)
}

/// Fails when a column the run cannot do without is absent. Other declared
/// columns are tolerated with one warning each.
pub fn validate_columns(table: &Table, variant: &ReportVariant) -> Result<(), LoadError> {
    for column in variant.mandatory_columns() {
        if !table.has_column(column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }
    for column in variant.declared_columns() {
        if !table.has_column(column) {
            tracing::warn!(column, "Column absent; values default to empty or zero");
        }
    }
    Ok(())
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::DateTime(naive),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}
