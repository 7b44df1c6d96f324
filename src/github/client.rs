use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::pagination::next_link;
use super::types::{ActivityEvent, CommitSummary, Comparison, RawEvent, Repository, SearchResults};
use crate::config::AccessToken;
use crate::error::{Result, TrackerError};

const USER_AGENT: &str = concat!("daily-tracker/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

pub type Params<'a> = [(&'a str, String)];

/// How often a transient failure is retried and how long to wait in between.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Multiplied by the attempt number before each retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Pause before retrying after failed attempt number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: AccessToken,
    retry: RetryPolicy,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, token: AccessToken) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authenticated GET with bounded retry on transient statuses.
    ///
    /// A 403 whose body mentions the rate limit fails with
    /// [`TrackerError::RateLimited`] straight away. Any other unsuccessful
    /// status fails with [`TrackerError::Http`].
    pub async fn get(&self, url: &str, params: &Params<'_>) -> Result<Response> {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let mut request = self.http.get(url).bearer_auth(self.token.expose());
            if !params.is_empty() {
                request = request.query(params);
            }
            let response = request.send().await?;
            let status = response.status();

            if is_transient(status) {
                tracing::warn!(
                    "HTTP {} from GitHub. Retry {}/{}...",
                    status.as_u16(),
                    attempt,
                    attempts
                );
                if attempt >= attempts {
                    return Err(TrackerError::RetriesExhausted {
                        status,
                        url: url.to_string(),
                        attempts,
                    });
                }
                tokio::time::sleep(self.retry.delay(attempt)).await;
                attempt += 1;
                continue;
            }

            if status == StatusCode::FORBIDDEN {
                let body = response.text().await.unwrap_or_default();
                if body.to_lowercase().contains("rate limit") {
                    return Err(TrackerError::RateLimited);
                }
                return Err(TrackerError::Http {
                    status,
                    url: url.to_string(),
                });
            }

            if !status.is_success() {
                return Err(TrackerError::Http {
                    status,
                    url: url.to_string(),
                });
            }

            return Ok(response);
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, params: &Params<'_>) -> Result<T> {
        let body = self.get(url, params).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Follow `rel="next"` links, concatenating the JSON arrays of each page,
    /// for at most `max_pages` requests. `params` only apply to the first
    /// request: later URLs come from the server with their query included.
    pub async fn get_all_pages(
        &self,
        url: &str,
        params: &Params<'_>,
        max_pages: usize,
    ) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        let mut params = params;
        let mut fetched = 0;

        while let Some(page_url) = next.take() {
            if fetched >= max_pages {
                break;
            }
            let response = self.get(&page_url, params).await?;
            next = next_link(response.headers());
            let body = response.bytes().await?;
            let page: Vec<Value> = serde_json::from_slice(&body)?;
            items.extend(page);
            params = &[];
            fetched += 1;
        }

        Ok(items)
    }

    /// `total_count` of an issue search. `advanced` enables AND/OR and
    /// parentheses in the query.
    pub async fn search_count(&self, query: &str, advanced: bool) -> Result<u64> {
        let mut params = vec![("q", query.to_string()), ("per_page", "1".to_string())];
        if advanced {
            params.push(("advanced_search", "true".to_string()));
        }
        let results: SearchResults = self.get_json(&self.url("/search/issues"), &params).await?;
        Ok(results.total_count)
    }

    /// Recent public and private activity of `username`, newest first.
    pub async fn user_events(&self, username: &str, max_pages: usize) -> Result<Vec<ActivityEvent>> {
        let url = self.url(&format!("/users/{}/events", username));
        let raw = self
            .get_all_pages(&url, &[("per_page", "100".to_string())], max_pages)
            .await?;

        let mut events = Vec::with_capacity(raw.len());
        for value in raw {
            let decoded = serde_json::from_value::<RawEvent>(value).and_then(ActivityEvent::from_raw);
            match decoded {
                Ok(event) => events.push(event),
                Err(err) => tracing::warn!("Skipping unreadable event: {}", err),
            }
        }
        Ok(events)
    }

    pub async fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let url = self.url(&format!("/repos/{}/{}", owner, repo));
        let repository: Repository = self.get_json(&url, &[]).await?;
        Ok(repository.default_branch)
    }

    /// SHA of the newest commit on `branch`, `None` for an empty branch.
    pub async fn branch_head(&self, owner: &str, repo: &str, branch: &str) -> Result<Option<String>> {
        let url = self.url(&format!("/repos/{}/{}/commits", owner, repo));
        let params = [("sha", branch.to_string()), ("per_page", "1".to_string())];
        let commits: Vec<CommitSummary> = self.get_json(&url, &params).await?;
        Ok(commits.into_iter().next().map(|c| c.sha))
    }

    /// Number of commits reachable from `head` but not from `base`.
    pub async fn compare_commit_count(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<u64> {
        let url = self.url(&format!("/repos/{}/{}/compare/{}...{}", owner, repo, base, head));
        let comparison: Comparison = self.get_json(&url, &[]).await?;
        Ok(comparison.total_commits)
    }
}
