use std::sync::OnceLock;

use regex::Regex;
use reqwest::header::{HeaderMap, LINK};

fn next_rel() -> &'static Regex {
    static NEXT: OnceLock<Regex> = OnceLock::new();
    NEXT.get_or_init(|| {
        Regex::new(r#"<([^>]+)>\s*;\s*rel=(?:"next"|next(?:[\s;]|$))"#).expect("next-link pattern is valid")
    })
}

/// URL of the `rel="next"` entry in a `Link` header, if any.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',')
        .find_map(|part| next_rel().captures(part))
        .map(|caps| caps[1].to_string())
}
