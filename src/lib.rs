//! Daily GitHub contribution tracker.
//!
//! Collects one user's per-day counters for one repository (issues triaged
//! and resolved, PRs created and merged, commits pushed, open issue and PR
//! snapshots) and records them in a row of an Excel workbook keyed by date.

pub mod app;
pub mod config;
pub mod date;
pub mod error;
pub mod github;
pub mod metrics;
pub mod store;

pub use error::TrackerError;
