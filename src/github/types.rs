use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;

/// `before` SHA of a push that created a new branch.
pub const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

/// One entry of `/users/{user}/events` as it comes off the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_at: DateTime<Utc>,
    pub repo: EventRepo,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

/// A feed event with its payload decoded for the kinds the tracker counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub repo: String,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Push(PushPayload),
    IssueComment(IssueCommentPayload),
    Issues(IssuesPayload),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub push_id: Option<u64>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub head: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueCommentPayload {
    pub issue: IssueRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssuesPayload {
    pub action: String,
    pub issue: IssueRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueRef {
    pub number: u64,
    /// Present (with any value) only when the "issue" is a pull request.
    #[serde(default)]
    pub pull_request: Option<Value>,
}

impl IssueRef {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl ActivityEvent {
    /// Decode the payload of a raw event. Unknown types become
    /// [`EventKind::Other`]; a known type with a payload that does not match
    /// its shape is an error so the caller can decide to skip it.
    pub fn from_raw(raw: RawEvent) -> Result<Self, serde_json::Error> {
        let kind = match raw.event_type.as_str() {
            "PushEvent" => EventKind::Push(serde_json::from_value(raw.payload)?),
            "IssueCommentEvent" => EventKind::IssueComment(serde_json::from_value(raw.payload)?),
            "IssuesEvent" => EventKind::Issues(serde_json::from_value(raw.payload)?),
            _ => EventKind::Other,
        };

        Ok(ActivityEvent {
            id: raw.id,
            created_at: raw.created_at,
            repo: raw.repo.name,
            kind,
        })
    }

    /// Calendar day of the event in UTC.
    pub fn utc_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    pub fn happened_on(&self, day: NaiveDate, repo: &str) -> bool {
        self.utc_date() == day && self.repo == repo
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub default_branch: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comparison {
    pub total_commits: u64,
}
