use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

use crate::config::{InitSettings, Settings};
use crate::error::TrackerError;
use crate::github::{GitHubClient, RetryPolicy};
use crate::metrics::{AggregatorConfig, DailyAggregator, DailyMetrics};
use crate::store::TrackerStore;

/// Knobs the entry point leaves at their defaults and tests turn down.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub retry: RetryPolicy,
    pub aggregator: AggregatorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub day: NaiveDate,
    /// One-based spreadsheet row number.
    pub row: usize,
    pub metrics: DailyMetrics,
}

/// Compute the metrics for `day` and write them into the tracker. The file
/// is only saved once every counter is known.
pub async fn update(settings: &Settings, day: NaiveDate, options: RunOptions) -> Result<UpdateOutcome> {
    let path = &settings.workbook.path;
    tracing::info!("Using workbook: {}", path.display());

    let mut store = TrackerStore::open(path, &settings.workbook.sheet)
        .with_context(|| format!("cannot use workbook {}", path.display()))?;

    if let Some(recorded) = store.recorded_target() {
        if recorded != settings.target {
            tracing::warn!(
                "Config sheet names {}/{} ({}) but the environment says {}/{} ({}); using the environment",
                recorded.owner,
                recorded.repo,
                recorded.username,
                settings.target.owner,
                settings.target.repo,
                settings.target.username
            );
        }
    }

    tracing::info!(
        "Target date: {} | Repo: {} | User: {}",
        day,
        settings.target.full_name(),
        settings.target.username
    );

    let client = GitHubClient::new(settings.api_url.clone(), settings.token.clone())?
        .with_retry_policy(options.retry);
    let aggregator = DailyAggregator::new(client, settings.target.clone(), options.aggregator);
    let metrics = aggregator
        .aggregate(day)
        .await
        .context("failed to collect GitHub metrics")?;

    let row = store.record(day, &metrics);
    tracing::info!("Writing metrics into row {}...", row + 1);
    store.touch_last_updated(Utc::now());

    tracing::info!("Saving workbook...");
    store.save().context("failed to save workbook")?;

    Ok(UpdateOutcome {
        day,
        row: row + 1,
        metrics,
    })
}

/// Create a new, empty tracker workbook.
pub fn init(settings: &InitSettings, force: bool) -> Result<()> {
    let path = &settings.workbook.path;
    if path.exists() && !force {
        return Err(TrackerError::StoreExists(path.clone()).into());
    }

    TrackerStore::create(path, &settings.workbook.sheet, &settings.target, &settings.timezone)
        .save()
        .with_context(|| format!("failed to create {}", path.display()))?;
    tracing::info!("Created workbook: {}", path.display());
    Ok(())
}
