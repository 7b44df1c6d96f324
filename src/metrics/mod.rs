pub mod commits;
pub mod feed;
pub mod search;

use chrono::NaiveDate;

use crate::config::Target;
use crate::error::Result;
use crate::github::client::GitHubClient;
use commits::CommitCounter;

#[derive(Debug, Clone, Copy)]
pub struct AggregatorConfig {
    /// Pages of the events feed to read. The feed only keeps recent history.
    pub event_pages: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig { event_pages: 3 }
    }
}

/// The automated columns of one tracker row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyMetrics {
    pub issues_triaged: u64,
    pub issues_resolved: u64,
    pub prs_created: u64,
    pub prs_merged: u64,
    pub commits: u64,
    pub open_issues: u64,
    pub open_prs: u64,
}

pub struct DailyAggregator {
    client: GitHubClient,
    target: Target,
    config: AggregatorConfig,
}

impl DailyAggregator {
    pub fn new(client: GitHubClient, target: Target, config: AggregatorConfig) -> Self {
        Self {
            client,
            target,
            config,
        }
    }

    /// Gather every counter for `day`. Any error aborts the whole pass, so a
    /// caller never sees a partial result.
    pub async fn aggregate(&self, day: NaiveDate) -> Result<DailyMetrics> {
        let target = &self.target;
        let repo = target.full_name();

        tracing::info!("Fetching PR counts (created / merged) via search...");
        let prs_created = self.client.search_count(&search::prs_created(target, day), false).await?;
        let prs_merged = self.client.search_count(&search::prs_merged(target, day), false).await?;

        tracing::info!("Fetching recent user events (triage / issue closes / pushes)...");
        let events = self
            .client
            .user_events(&target.username, self.config.event_pages)
            .await?;
        tracing::debug!("{} events in the feed", events.len());

        let issues_triaged = feed::issues_triaged(&events, day, &repo);
        let issues_resolved = feed::issues_resolved(&events, day, &repo);

        let pushes = feed::pushes_on(&events, day, &repo);
        tracing::info!("Resolving commit ranges for {} push(es)...", pushes.len());
        let commits = CommitCounter::new(&self.client, target)
            .count_pushes(&pushes)
            .await?;

        tracing::info!("Fetching open issues/PRs counts as-of target day...");
        let open_issues = self
            .client
            .search_count(&search::open_issues_as_of(target, day), true)
            .await?;
        let open_prs = self
            .client
            .search_count(&search::open_prs_as_of(target, day), true)
            .await?;

        Ok(DailyMetrics {
            issues_triaged,
            issues_resolved,
            prs_created,
            prs_merged,
            commits,
            open_issues,
            open_prs,
        })
    }
}
