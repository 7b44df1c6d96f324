use chrono::{Local, NaiveDate};

use crate::error::{Result, TrackerError};

const ISO_FORMAT: &str = "%Y-%m-%d";
const DMY_LONG_FORMAT: &str = "%d/%m/%Y";
const DMY_SHORT_FORMAT: &str = "%d/%m/%y";

/// Resolve the day to record. Without an argument this is today on the
/// invoking machine's local clock; every comparison after this point is UTC.
pub fn resolve_target_date(arg: Option<&str>) -> Result<NaiveDate> {
    match arg.map(str::trim).filter(|s| !s.is_empty()) {
        Some(input) => parse_target_date(input),
        None => Ok(Local::now().date_naive()),
    }
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` and `DD/MM/YY`.
pub fn parse_target_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();

    // chrono's %Y happily takes a short year, so the width of the year
    // component decides the format.
    let invalid = || TrackerError::InvalidDate(input.to_string());
    let format = if input.contains('/') {
        match input.rsplit('/').next().map(str::len) {
            Some(4) => DMY_LONG_FORMAT,
            Some(2) => DMY_SHORT_FORMAT,
            _ => return Err(invalid()),
        }
    } else {
        let year = input.split('-').next().unwrap_or_default();
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        ISO_FORMAT
    };

    NaiveDate::parse_from_str(input, format).map_err(|_| invalid())
}
