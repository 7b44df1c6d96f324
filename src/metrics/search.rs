//! Issue-search queries. The platform's result count is taken as is.

use chrono::NaiveDate;

use crate::config::Target;

fn day_str(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn prs_created(target: &Target, day: NaiveDate) -> String {
    format!(
        "repo:{} is:pr author:{} created:{}",
        target.full_name(),
        target.username,
        day_str(day)
    )
}

pub fn prs_merged(target: &Target, day: NaiveDate) -> String {
    format!(
        "repo:{} is:pr author:{} merged:{}",
        target.full_name(),
        target.username,
        day_str(day)
    )
}

/// Items that existed by the end of `day` and were still open then, judged by
/// today's index: created on or before the day and either open now or closed
/// after it. Needs advanced search.
fn open_as_of(target: &Target, kind: &str, day: NaiveDate) -> String {
    let day = day_str(day);
    format!(
        "repo:{} is:{} created:<={} AND (is:open OR closed:>{})",
        target.full_name(),
        kind,
        day,
        day
    )
}

pub fn open_issues_as_of(target: &Target, day: NaiveDate) -> String {
    open_as_of(target, "issue", day)
}

pub fn open_prs_as_of(target: &Target, day: NaiveDate) -> String {
    open_as_of(target, "pr", day)
}
