pub mod layout;
pub mod sheet;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet, XlsxError};
use tempfile::NamedTempFile;

use crate::config::Target;
use crate::error::{Result, TrackerError};
use crate::metrics::DailyMetrics;
pub use sheet::{Cell, Sheet};

const MIN_WORKBOOK_BYTES: u64 = 1000;
const ZIP_SIGNATURE: [u8; 4] = *b"PK\x03\x04";

/// Reject anything that cannot be an .xlsx before handing it to the reader.
pub fn validate_path(path: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return Err(TrackerError::StoreNotFound(path.to_path_buf())),
    };
    if metadata.is_dir() {
        return Err(TrackerError::StoreIsDirectory(path.to_path_buf()));
    }
    if metadata.len() < MIN_WORKBOOK_BYTES {
        return Err(TrackerError::StoreTooSmall {
            path: path.to_path_buf(),
            size: metadata.len(),
        });
    }

    let mut signature = [0u8; 4];
    File::open(path)?.read_exact(&mut signature)?;
    if signature != ZIP_SIGNATURE {
        return Err(TrackerError::StoreNotZip(path.to_path_buf()));
    }
    Ok(())
}

/// The tracker workbook held in memory between open and save.
#[derive(Debug, Clone)]
pub struct TrackerStore {
    path: PathBuf,
    sheets: Vec<Sheet>,
    data: usize,
    config: usize,
}

impl TrackerStore {
    /// Open an existing workbook. Both the data sheet and the Config sheet
    /// must be present.
    pub fn open(path: &Path, data_sheet: &str) -> Result<Self> {
        validate_path(path)?;

        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let values = workbook.worksheet_range(&name)?;
            let formulas = workbook.worksheet_formula(&name)?;
            sheets.push(Sheet::from_ranges(name, &values, &formulas));
        }

        let position = |name: &str| sheets.iter().position(|s| s.name == name);
        let data = position(data_sheet).ok_or_else(|| TrackerError::MissingSheet(data_sheet.to_string()))?;
        let config = position(layout::CONFIG_SHEET)
            .ok_or_else(|| TrackerError::MissingSheet(layout::CONFIG_SHEET.to_string()))?;

        Ok(TrackerStore {
            path: path.to_path_buf(),
            sheets,
            data,
            config,
        })
    }

    /// A fresh tracker with only the header row and a filled-in Config sheet.
    pub fn create(path: &Path, data_sheet: &str, target: &Target, timezone: &str) -> Self {
        let mut data = Sheet::new(data_sheet);
        for (col, header) in layout::HEADERS.iter().enumerate() {
            data.set(layout::HEADER_ROW, col, Cell::Text(header.to_string()));
        }

        let mut config = Sheet::new(layout::CONFIG_SHEET);
        for (row, label) in layout::CONFIG_LABELS.iter().enumerate() {
            config.set(row, 0, Cell::Text(label.to_string()));
        }
        config.set(layout::CONFIG_OWNER, 1, Cell::Text(target.owner.clone()));
        config.set(layout::CONFIG_REPO, 1, Cell::Text(target.repo.clone()));
        config.set(layout::CONFIG_USERNAME, 1, Cell::Text(target.username.clone()));
        config.set(layout::CONFIG_TIMEZONE, 1, Cell::Text(timezone.to_string()));

        TrackerStore {
            path: path.to_path_buf(),
            sheets: vec![data, config],
            data: 0,
            config: 1,
        }
    }

    pub fn data_sheet(&self) -> &Sheet {
        &self.sheets[self.data]
    }

    pub fn config_sheet(&self) -> &Sheet {
        &self.sheets[self.config]
    }

    /// Owner, repo and username recorded on the Config sheet, if all present.
    pub fn recorded_target(&self) -> Option<Target> {
        let config = self.config_sheet();
        let value = |row| config.get(row, 1).as_text().map(str::to_string);
        Some(Target {
            owner: value(layout::CONFIG_OWNER)?,
            repo: value(layout::CONFIG_REPO)?,
            username: value(layout::CONFIG_USERNAME)?,
        })
    }

    pub fn find_row(&self, day: NaiveDate) -> Option<usize> {
        self.data_sheet()
            .rows()
            .skip(layout::HEADER_ROW + 1)
            .find(|(_, cells)| cells.first().and_then(Cell::as_date) == Some(day))
            .map(|(row, _)| row)
    }

    /// Zero-based index of the row dated `day`, appending one if needed.
    pub fn find_or_create_row(&mut self, day: NaiveDate) -> usize {
        if let Some(row) = self.find_row(day) {
            return row;
        }
        let sheet = &mut self.sheets[self.data];
        let row = sheet.row_count().max(layout::HEADER_ROW + 1);
        sheet.set(row, layout::DATE, Cell::date(day));
        row
    }

    /// Overwrite the automated columns of `row`. Manual columns are left
    /// alone.
    pub fn write_metrics(&mut self, row: usize, metrics: &DailyMetrics) {
        let sheet = &mut self.sheets[self.data];
        let values = [
            (layout::ISSUES_TRIAGED, metrics.issues_triaged),
            (layout::ISSUES_RESOLVED, metrics.issues_resolved),
            (layout::PRS_CREATED, metrics.prs_created),
            (layout::PRS_MERGED, metrics.prs_merged),
            (layout::COMMITS, metrics.commits),
            (layout::OPEN_ISSUES, metrics.open_issues),
            (layout::OPEN_PRS, metrics.open_prs),
        ];
        for (col, value) in values {
            sheet.set(row, col, Cell::Number(value as f64));
        }
    }

    /// Locate or append the row for `day` and write `metrics` into it.
    pub fn record(&mut self, day: NaiveDate, metrics: &DailyMetrics) -> usize {
        let row = self.find_or_create_row(day);
        self.write_metrics(row, metrics);
        row
    }

    pub fn touch_last_updated(&mut self, now: DateTime<Utc>) {
        let stamp = now.format(layout::LAST_UPDATED_FORMAT).to_string();
        self.sheets[self.config].set(layout::CONFIG_LAST_UPDATED, 1, Cell::Text(stamp));
    }

    /// Write every sheet back to the workbook file, restoring the tracker
    /// styling on the data and Config sheets. The new file is written next to
    /// the old one and renamed over it, so a failed save leaves the old file.
    pub fn save(&self) -> Result<()> {
        let mut workbook = Workbook::new();
        let header = layout::header_format();
        let label = layout::label_format();

        for (index, sheet) in self.sheets.iter().enumerate() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            if index == self.data {
                write_cells(worksheet, sheet, |row, _| (row == layout::HEADER_ROW).then_some(&header))?;
                for (col, width) in layout::WIDTHS.iter().enumerate() {
                    worksheet.set_column_width(col as u16, *width)?;
                }
                worksheet.set_freeze_panes(1, 0)?;
            } else if index == self.config {
                write_cells(worksheet, sheet, |_, col| (col == 0).then_some(&label))?;
                for (col, width) in layout::CONFIG_WIDTHS.iter().enumerate() {
                    worksheet.set_column_width(col as u16, *width)?;
                }
            } else {
                write_cells(worksheet, sheet, |_, _| None)?;
            }
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = NamedTempFile::new_in(dir)?;
        workbook.save(staged.path())?;
        staged.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

fn write_cells<'f, F>(worksheet: &mut Worksheet, sheet: &Sheet, style: F) -> Result<(), XlsxError>
where
    F: Fn(usize, usize) -> Option<&'f Format>,
{
    let date = layout::date_format();
    let datetime = layout::datetime_format();

    for (row, cells) in sheet.rows() {
        for (col, cell) in cells.iter().enumerate() {
            let (r, c) = (row as u32, col as u16);
            let format = style(row, col);
            match (cell, format) {
                (Cell::Empty, _) => {}
                (Cell::Number(n), Some(f)) => {
                    worksheet.write_number_with_format(r, c, *n, f)?;
                }
                (Cell::Number(n), None) => {
                    worksheet.write_number(r, c, *n)?;
                }
                (Cell::Text(s), Some(f)) => {
                    worksheet.write_string_with_format(r, c, s, f)?;
                }
                (Cell::Text(s), None) => {
                    worksheet.write_string(r, c, s)?;
                }
                (Cell::Bool(b), Some(f)) => {
                    worksheet.write_boolean_with_format(r, c, *b, f)?;
                }
                (Cell::Bool(b), None) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                (Cell::Formula { expr, cached }, format) => {
                    let formula = Formula::new(expr).set_result(cached);
                    match format {
                        Some(f) => worksheet.write_formula_with_format(r, c, formula, f)?,
                        None => worksheet.write_formula(r, c, formula)?,
                    };
                }
                (Cell::Date(dt), _) => {
                    let f = if dt.time().num_seconds_from_midnight() == 0 {
                        &date
                    } else {
                        &datetime
                    };
                    worksheet.write_datetime_with_format(r, c, dt, f)?;
                }
            }
        }
    }
    Ok(())
}
