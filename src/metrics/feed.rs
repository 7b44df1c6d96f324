use std::collections::HashSet;

use chrono::NaiveDate;

use crate::github::types::{ActivityEvent, EventKind, PushPayload};

/// Distinct non-PR issues commented on that day.
pub fn issues_triaged(events: &[ActivityEvent], day: NaiveDate, repo: &str) -> u64 {
    let issues: HashSet<u64> = events
        .iter()
        .filter(|event| event.happened_on(day, repo))
        .filter_map(|event| match &event.kind {
            EventKind::IssueComment(payload) if !payload.issue.is_pull_request() => {
                Some(payload.issue.number)
            }
            _ => None,
        })
        .collect();
    issues.len() as u64
}

/// Closing actions that day. A reopened and reclosed issue counts twice.
pub fn issues_resolved(events: &[ActivityEvent], day: NaiveDate, repo: &str) -> u64 {
    events
        .iter()
        .filter(|event| event.happened_on(day, repo))
        .filter(|event| matches!(&event.kind, EventKind::Issues(payload) if payload.action == "closed"))
        .count() as u64
}

/// Pushes to `repo` on `day`, each push at most once. The feed can repeat a
/// push, so entries are keyed by `push_id` (or the event id when the payload
/// has none).
pub fn pushes_on<'a>(events: &'a [ActivityEvent], day: NaiveDate, repo: &str) -> Vec<&'a PushPayload> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|event| event.happened_on(day, repo))
        .filter_map(|event| match &event.kind {
            EventKind::Push(payload) => {
                let key = payload
                    .push_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| event.id.clone());
                seen.insert(key).then_some(payload)
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{IssueCommentPayload, IssueRef, IssuesPayload};
    use chrono::{DateTime, Utc};
    use serde_json::json;

    const REPO: &str = "o/r";

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()
    }

    fn at(ts: &str) -> DateTime<Utc> {
        ts.parse().unwrap()
    }

    fn event(id: &str, ts: &str, repo: &str, kind: EventKind) -> ActivityEvent {
        ActivityEvent {
            id: id.to_string(),
            created_at: at(ts),
            repo: repo.to_string(),
            kind,
        }
    }

    fn comment(number: u64, pr: bool) -> EventKind {
        EventKind::IssueComment(IssueCommentPayload {
            issue: IssueRef {
                number,
                pull_request: pr.then(|| json!({"url": "https://example.invalid"})),
            },
        })
    }

    fn issues(action: &str, number: u64) -> EventKind {
        EventKind::Issues(IssuesPayload {
            action: action.to_string(),
            issue: IssueRef {
                number,
                pull_request: None,
            },
        })
    }

    fn push(push_id: Option<u64>) -> EventKind {
        EventKind::Push(PushPayload {
            push_id,
            before: Some("a".into()),
            head: Some("b".into()),
        })
    }

    #[test]
    fn repeated_comments_on_one_issue_count_once() {
        let events = vec![
            event("1", "2026-01-13T08:00:00Z", REPO, comment(5, false)),
            event("2", "2026-01-13T09:00:00Z", REPO, comment(5, false)),
            event("3", "2026-01-13T10:00:00Z", REPO, comment(6, false)),
            event("4", "2026-01-13T11:00:00Z", REPO, comment(5, false)),
        ];
        assert_eq!(issues_triaged(&events, day(), REPO), 2);
    }

    #[test]
    fn pull_request_comments_are_not_triage() {
        let events = vec![
            event("1", "2026-01-13T08:00:00Z", REPO, comment(5, true)),
            event("2", "2026-01-13T09:00:00Z", REPO, comment(9, true)),
        ];
        assert_eq!(issues_triaged(&events, day(), REPO), 0);
    }

    #[test]
    fn only_the_utc_day_and_target_repo_count() {
        let events = vec![
            event("1", "2026-01-12T23:59:59Z", REPO, comment(1, false)),
            event("2", "2026-01-14T00:00:00Z", REPO, comment(2, false)),
            event("3", "2026-01-13T12:00:00Z", "o/other", comment(3, false)),
            event("4", "2026-01-13T00:00:00Z", REPO, comment(4, false)),
            event("5", "2026-01-13T23:59:59Z", REPO, issues("closed", 4)),
            event("6", "2026-01-12T23:00:00Z", REPO, issues("closed", 8)),
        ];
        assert_eq!(issues_triaged(&events, day(), REPO), 1);
        assert_eq!(issues_resolved(&events, day(), REPO), 1);
    }

    #[test]
    fn every_closing_action_counts() {
        let events = vec![
            event("1", "2026-01-13T08:00:00Z", REPO, issues("closed", 3)),
            event("2", "2026-01-13T08:30:00Z", REPO, issues("reopened", 3)),
            event("3", "2026-01-13T09:00:00Z", REPO, issues("closed", 3)),
            event("4", "2026-01-13T09:30:00Z", REPO, issues("opened", 11)),
        ];
        assert_eq!(issues_resolved(&events, day(), REPO), 2);
    }

    #[test]
    fn duplicate_push_ids_collapse() {
        let events = vec![
            event("1", "2026-01-13T08:00:00Z", REPO, push(Some(77))),
            event("2", "2026-01-13T08:00:00Z", REPO, push(Some(77))),
            event("3", "2026-01-13T09:00:00Z", REPO, push(Some(78))),
            event("4", "2026-01-13T10:00:00Z", REPO, push(None)),
            event("5", "2026-01-13T10:00:00Z", "x/y", push(Some(79))),
        ];
        assert_eq!(pushes_on(&events, day(), REPO).len(), 3);
    }
}
