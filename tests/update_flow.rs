use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use mockito::{Matcher, Mock, ServerGuard};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use daily_tracker::app::{self, RunOptions};
use daily_tracker::config::{AccessToken, InitSettings, Settings, Target, WorkbookSettings};
use daily_tracker::github::RetryPolicy;
use daily_tracker::metrics::{AggregatorConfig, DailyMetrics};
use daily_tracker::store::{layout, Cell, TrackerStore};
use daily_tracker::TrackerError;

const SHEET: &str = "Ansible.Azcollection";

fn target() -> Target {
    Target {
        owner: "o".into(),
        repo: "r".into(),
        username: "octocat".into(),
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()
}

fn options() -> RunOptions {
    RunOptions {
        retry: RetryPolicy {
            max_attempts: 1,
            backoff: Duration::ZERO,
        },
        aggregator: AggregatorConfig::default(),
    }
}

fn new_workbook(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("tracker.xlsx");
    let init = InitSettings {
        target: target(),
        workbook: WorkbookSettings {
            path: path.clone(),
            sheet: SHEET.into(),
        },
        timezone: "Asia/Kuala_Lumpur".into(),
    };
    app::init(&init, false).unwrap();
    path
}

fn settings(server: &ServerGuard, path: &Path, sheet: &str) -> Settings {
    Settings {
        token: AccessToken::new("t0ken"),
        api_url: server.url(),
        target: target(),
        workbook: WorkbookSettings {
            path: path.to_path_buf(),
            sheet: sheet.into(),
        },
    }
}

async fn search(server: &mut ServerGuard, query: &str, total: u64) -> Mock {
    server
        .mock("GET", "/search/issues")
        .match_query(Matcher::UrlEncoded("q".into(), query.into()))
        .with_status(200)
        .with_body(json!({"total_count": total, "incomplete_results": false, "items": []}).to_string())
        .create_async()
        .await
}

async fn simulated_day(server: &mut ServerGuard) -> Vec<Mock> {
    let events = json!([
        {
            "id": "5001",
            "type": "PushEvent",
            "created_at": "2026-01-13T09:15:00Z",
            "repo": {"id": 1, "name": "o/r"},
            "payload": {"push_id": 900, "ref": "refs/heads/fix", "before": "aaa", "head": "bbb"}
        },
        {
            "id": "5002",
            "type": "IssueCommentEvent",
            "created_at": "2026-01-13T10:00:00Z",
            "repo": {"id": 1, "name": "o/r"},
            "payload": {"action": "created", "issue": {"number": 10}}
        },
        {
            "id": "5003",
            "type": "IssueCommentEvent",
            "created_at": "2026-01-13T11:00:00Z",
            "repo": {"id": 1, "name": "o/r"},
            "payload": {"action": "created", "issue": {"number": 11, "pull_request": {"url": "https://example.invalid/pulls/11"}}}
        },
        {
            "id": "5004",
            "type": "IssuesEvent",
            "created_at": "2026-01-13T12:00:00Z",
            "repo": {"id": 1, "name": "o/r"},
            "payload": {"action": "closed", "issue": {"number": 12}}
        }
    ]);

    vec![
        search(server, "repo:o/r is:pr author:octocat created:2026-01-13", 1).await,
        search(server, "repo:o/r is:pr author:octocat merged:2026-01-13", 0).await,
        search(
            server,
            "repo:o/r is:issue created:<=2026-01-13 AND (is:open OR closed:>2026-01-13)",
            7,
        )
        .await,
        search(
            server,
            "repo:o/r is:pr created:<=2026-01-13 AND (is:open OR closed:>2026-01-13)",
            3,
        )
        .await,
        server
            .mock("GET", "/users/octocat/events")
            .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
            .with_status(200)
            .with_body(events.to_string())
            .create_async()
            .await,
        server
            .mock("GET", "/repos/o/r/compare/aaa...bbb")
            .with_status(200)
            .with_body(json!({"status": "ahead", "total_commits": 2}).to_string())
            .create_async()
            .await,
    ]
}

#[tokio::test]
async fn writes_the_simulated_day() {
    let mut server = mockito::Server::new_async().await;
    let mocks = simulated_day(&mut server).await;
    let dir = TempDir::new().unwrap();
    let path = new_workbook(&dir);

    let outcome = app::update(&settings(&server, &path, SHEET), day(), options())
        .await
        .unwrap();

    let expected = DailyMetrics {
        issues_triaged: 1,
        issues_resolved: 1,
        prs_created: 1,
        prs_merged: 0,
        commits: 2,
        open_issues: 7,
        open_prs: 3,
    };
    assert_eq!(outcome.metrics, expected);
    assert_eq!(outcome.row, 2);

    let store = TrackerStore::open(&path, SHEET).unwrap();
    let row = store.find_row(day()).unwrap();
    let cells = store.data_sheet().row(row);
    let numbers: Vec<Cell> = [1.0, 1.0, 1.0, 0.0, 2.0, 7.0, 3.0]
        .into_iter()
        .map(Cell::Number)
        .collect();
    assert_eq!(&cells[1..8], numbers.as_slice());
    assert!(store
        .config_sheet()
        .get(layout::CONFIG_LAST_UPDATED, 1)
        .as_text()
        .is_some());

    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn running_twice_converges_on_the_same_row() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = simulated_day(&mut server).await;
    let dir = TempDir::new().unwrap();
    let path = new_workbook(&dir);
    let settings = settings(&server, &path, SHEET);

    app::update(&settings, day(), options()).await.unwrap();
    let first = TrackerStore::open(&path, SHEET).unwrap();

    app::update(&settings, day(), options()).await.unwrap();
    let second = TrackerStore::open(&path, SHEET).unwrap();

    assert_eq!(first.data_sheet(), second.data_sheet());
    assert_eq!(second.data_sheet().row_count(), 2);
    for row in 0..layout::CONFIG_LAST_UPDATED {
        assert_eq!(first.config_sheet().row(row), second.config_sheet().row(row));
    }
}

#[tokio::test]
async fn missing_sheet_fails_before_any_request() {
    let mut server = mockito::Server::new_async().await;
    let events = server
        .mock("GET", "/users/octocat/events")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let path = new_workbook(&dir);
    let before = std::fs::read(&path).unwrap();

    let err = app::update(&settings(&server, &path, "No.Such.Sheet"), day(), options())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::MissingSheet(name)) if name == "No.Such.Sheet"
    ));
    assert_eq!(std::fs::read(&path).unwrap(), before);
    events.assert_async().await;
}

#[tokio::test]
async fn rate_limit_aborts_without_writing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/search/issues")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"message": "API rate limit exceeded for user ID 1."}"#)
        .create_async()
        .await;
    let dir = TempDir::new().unwrap();
    let path = new_workbook(&dir);
    let before = std::fs::read(&path).unwrap();

    let err = app::update(&settings(&server, &path, SHEET), day(), options())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::RateLimited)
    ));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = new_workbook(&dir);
    let init = InitSettings {
        target: target(),
        workbook: WorkbookSettings {
            path: path.clone(),
            sheet: SHEET.into(),
        },
        timezone: "UTC".into(),
    };

    let err = app::init(&init, false).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TrackerError>(),
        Some(TrackerError::StoreExists(_))
    ));
    app::init(&init, true).unwrap();
}
