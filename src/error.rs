use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("configuration key {key} is missing or blank")]
    MissingConfig { key: &'static str },

    #[error("unsupported date format: {0}. Use YYYY-MM-DD, DD/MM/YYYY or DD/MM/YY")]
    InvalidDate(String),

    #[error("workbook not found: {0}")]
    StoreNotFound(PathBuf),

    #[error("workbook path is a directory, not a file: {0}")]
    StoreIsDirectory(PathBuf),

    #[error("workbook file looks too small ({size} bytes): {path}")]
    StoreTooSmall { path: PathBuf, size: u64 },

    #[error("workbook is not a valid .xlsx (zip) file: {0}")]
    StoreNotZip(PathBuf),

    #[error("workbook has no sheet named {0:?}")]
    MissingSheet(String),

    #[error("workbook already exists: {0} (use --force to overwrite)")]
    StoreExists(PathBuf),

    #[error("failed to read workbook: {0}")]
    WorkbookRead(#[from] calamine::XlsxError),

    #[error("failed to write workbook: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("GitHub rate limit hit (403). Try later or use a token with higher limits")]
    RateLimited,

    #[error("HTTP {status} from {url} after {attempts} attempts")]
    RetriesExhausted {
        status: StatusCode,
        url: String,
        attempts: u32,
    },

    #[error("HTTP {status} from {url}")]
    Http { status: StatusCode, url: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Errors that must abort the whole run no matter who observes them.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TrackerError::RateLimited | TrackerError::RetriesExhausted { .. })
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
