//! Fixed shape of the tracker workbook.

use rust_xlsxwriter::{Color, Format, FormatAlign};

pub const CONFIG_SHEET: &str = "Config";

/// Row 1 is the header row; dated rows follow.
pub const HEADER_ROW: usize = 0;

pub const DATE: usize = 0;
pub const ISSUES_TRIAGED: usize = 1;
pub const ISSUES_RESOLVED: usize = 2;
pub const PRS_CREATED: usize = 3;
pub const PRS_MERGED: usize = 4;
pub const COMMITS: usize = 5;
pub const OPEN_ISSUES: usize = 6;
pub const OPEN_PRS: usize = 7;
// ADO Tests, Release and Notes (8..=10) are filled in by hand.

pub const HEADERS: [&str; 11] = [
    "Date",
    "Issues Triaged",
    "Issues Resolved",
    "PRs Created",
    "PRs Merged",
    "Commits",
    "Open Issues",
    "Open PRs",
    "ADO Tests",
    "Release",
    "Notes",
];

pub const WIDTHS: [f64; 11] = [12.0, 14.0, 15.0, 12.0, 12.0, 10.0, 12.0, 10.0, 14.0, 12.0, 60.0];

pub const CONFIG_OWNER: usize = 0;
pub const CONFIG_REPO: usize = 1;
pub const CONFIG_USERNAME: usize = 2;
pub const CONFIG_TIMEZONE: usize = 3;
pub const CONFIG_LAST_UPDATED: usize = 4;

pub const CONFIG_LABELS: [&str; 5] = [
    "GitHub Owner",
    "GitHub Repo",
    "GitHub Username",
    "Timezone",
    "Last Updated (UTC)",
];

pub const CONFIG_WIDTHS: [f64; 2] = [22.0, 28.0];

pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

pub fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x305496))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

pub fn date_format() -> Format {
    Format::new().set_num_format("dd/mm/yyyy")
}

pub fn datetime_format() -> Format {
    Format::new().set_num_format("yyyy-mm-dd hh:mm:ss")
}

pub fn label_format() -> Format {
    Format::new().set_bold()
}
