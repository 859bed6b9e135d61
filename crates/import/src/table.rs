use chrono::NaiveDateTime;

/// Integers above this cannot be represented exactly by an `f64` cell.
const F64_EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// One spreadsheet value, detached from the reader library.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text rendition used for identifier-like values. Integral numbers are
    /// printed without a fractional part or exponent.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Number(f) => number_to_text(*f),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Number(f)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

fn number_to_text(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

/// Header plus data rows. Every row has exactly `columns().len()` cells and
/// remembers the 1-based worksheet line it was read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
    lines: Vec<usize>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Table {
            columns: columns.into_iter().map(|c| c.into().trim().to_string()).collect(),
            rows: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Appends a row on the line after the previous one (line 2 for the
    /// first row, right under the header).
    pub fn push_row(&mut self, row: Vec<Cell>) {
        let line = self.lines.last().map_or(2, |l| l + 1);
        self.push_row_at(line, row);
    }

    /// Appends a row read from worksheet `line`, padding with empty cells or
    /// truncating to the header width.
    pub fn push_row_at(&mut self, line: usize, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
        self.lines.push(line);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Worksheet line of each row, parallel to [`Table::rows`].
    pub fn lines(&self) -> &[usize] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Rewrites every cell of `column` as text. Returns the number of cells
    /// that were not already text, or `None` if the column is absent.
    pub fn coerce_to_text(&mut self, column: &str) -> Option<usize> {
        let idx = self.column_index(column)?;
        let mut coerced = 0;
        for (row, &line) in self.rows.iter_mut().zip(&self.lines) {
            let cell = &mut row[idx];
            match cell {
                Cell::Text(_) | Cell::Empty => continue,
                Cell::Number(f) if f.abs() > F64_EXACT_INT_LIMIT => {
                    tracing::warn!(
                        column,
                        line,
                        value = *f,
                        "Numeric identifier exceeds float precision; trailing digits may be lost"
                    );
                }
                _ => {}
            }
            *cell = Cell::Text(cell.to_text());
            coerced += 1;
        }
        Some(coerced)
    }
}
