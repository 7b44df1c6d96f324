use calamine::{Data, Range};
use chrono::{NaiveDate, NaiveDateTime};

/// A cell value as the tracker sees it. Styling is not kept; the layout
/// re-applies it on save.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDateTime),
    /// Formula without the leading `=`, plus the last value Excel computed.
    Formula { expr: String, cached: String },
}

impl Cell {
    pub fn date(day: NaiveDate) -> Self {
        Cell::Date(day.and_time(chrono::NaiveTime::MIN))
    }

    /// Calendar day of a date cell, ignoring any time of day.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(dt) => Some(dt.date()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(Cell::Date)
                .unwrap_or(Cell::Number(dt.as_f64())),
            Data::DateTimeIso(s) => s
                .parse::<NaiveDateTime>()
                .ok()
                .or_else(|| s.parse::<NaiveDate>().ok().map(|d| d.and_time(chrono::NaiveTime::MIN)))
                .map(Cell::Date)
                .unwrap_or_else(|| Cell::Text(s.clone())),
            Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(err) => Cell::Text(err.to_string()),
            _ => Cell::Empty,
        }
    }

    /// Text form of a value, as stored in a formula's cached result.
    fn render(data: &Data) -> String {
        match data {
            Data::Empty => String::new(),
            Data::Bool(true) => "TRUE".to_string(),
            Data::Bool(false) => "FALSE".to_string(),
            other => other.to_string(),
        }
    }
}

static EMPTY: Cell = Cell::Empty;

/// Dense grid of one worksheet, zero-based.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Build a sheet from calamine's value range and formula range. A cell
    /// holding a formula keeps it, with the value as its cached result.
    pub fn from_ranges(name: impl Into<String>, values: &Range<Data>, formulas: &Range<String>) -> Self {
        let mut sheet = Sheet::new(name);
        let (row0, col0) = values.start().unwrap_or((0, 0));
        for (row, col, data) in values.used_cells() {
            let cell = Cell::from_data(data);
            if !cell.is_empty() {
                sheet.set(row0 as usize + row, col0 as usize + col, cell);
            }
        }

        let (row0, col0) = formulas.start().unwrap_or((0, 0));
        for (row, col, expr) in formulas.used_cells() {
            let (row, col) = (row0 as usize + row, col0 as usize + col);
            let cached = values
                .get_value((row as u32, col as u32))
                .map(Cell::render)
                .unwrap_or_default();
            let expr = expr.trim_start_matches('=').to_string();
            sheet.set(row, col, Cell::Formula { expr, cached });
        }
        sheet
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = cell;
    }

    /// Rows up to and including the last one holding a value.
    pub fn row_count(&self) -> usize {
        self.rows
            .iter()
            .rposition(|cells| cells.iter().any(|c| !c.is_empty()))
            .map_or(0, |last| last + 1)
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = (usize, &[Cell])> {
        self.rows.iter().enumerate().map(|(i, cells)| (i, cells.as_slice()))
    }
}
