pub mod types;

use std::path::{Path, PathBuf};

pub use types::{AccessToken, InitSettings, Settings, Target, WorkbookSettings};
use types::{DEFAULT_API_URL, DEFAULT_TIMEZONE};

use crate::error::{Result, TrackerError};

pub const TOKEN_KEY: &str = "GITHUB_TOKEN";
pub const OWNER_KEY: &str = "GITHUB_OWNER";
pub const REPO_KEY: &str = "GITHUB_REPO";
pub const USERNAME_KEY: &str = "GITHUB_USERNAME";
pub const XLSX_KEY: &str = "TRACKER_XLSX";
pub const SHEET_KEY: &str = "TRACKER_SHEET";
pub const API_URL_KEY: &str = "GITHUB_API_URL";
pub const TIMEZONE_KEY: &str = "TRACKER_TIMEZONE";

/// Load `path` into the process environment if it exists. Variables that are
/// already set take precedence over the file.
pub fn load_env_file(path: &Path) {
    match dotenv::from_path(path) {
        Ok(()) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(err) if path.exists() => {
            tracing::warn!("Could not parse {}: {}", path.display(), err)
        }
        Err(_) => tracing::debug!("No env file at {}", path.display()),
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(TrackerError::MissingConfig { key })
}

fn optional<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn target<F>(lookup: &F) -> Result<Target>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(Target {
        owner: required(lookup, OWNER_KEY)?,
        repo: required(lookup, REPO_KEY)?,
        username: required(lookup, USERNAME_KEY)?,
    })
}

fn workbook<F>(lookup: &F) -> Result<WorkbookSettings>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(WorkbookSettings {
        path: PathBuf::from(required(lookup, XLSX_KEY)?),
        sheet: required(lookup, SHEET_KEY)?,
    })
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = AccessToken::new(required(&lookup, TOKEN_KEY)?);
        Ok(Settings {
            token,
            api_url: optional(&lookup, API_URL_KEY, DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            target: target(&lookup)?,
            workbook: workbook(&lookup)?,
        })
    }
}

impl InitSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(InitSettings {
            target: target(&lookup)?,
            workbook: workbook(&lookup)?,
            timezone: optional(&lookup, TIMEZONE_KEY, DEFAULT_TIMEZONE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            (TOKEN_KEY, "ghp_secret"),
            (OWNER_KEY, "ansible-collections"),
            (REPO_KEY, "azure"),
            (USERNAME_KEY, "octocat"),
            (XLSX_KEY, "tracker.xlsx"),
            (SHEET_KEY, "Ansible.Azcollection"),
        ]
    }

    #[test]
    fn loads_all_required_keys() {
        let settings = Settings::from_lookup(lookup_from(&complete())).unwrap();
        assert_eq!(settings.target.full_name(), "ansible-collections/azure");
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.workbook.sheet, "Ansible.Azcollection");
        assert_eq!(settings.token.expose(), "ghp_secret");
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let pairs: Vec<_> = complete()
            .into_iter()
            .filter(|(k, _)| *k != REPO_KEY)
            .collect();
        let err = Settings::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, TrackerError::MissingConfig { key } if key == REPO_KEY));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut pairs = complete();
        pairs.retain(|(k, _)| *k != SHEET_KEY);
        pairs.push((SHEET_KEY, "   "));
        let err = Settings::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, TrackerError::MissingConfig { key } if key == SHEET_KEY));
    }

    #[test]
    fn api_url_override_drops_trailing_slash() {
        let mut pairs = complete();
        pairs.push((API_URL_KEY, "http://127.0.0.1:1234/"));
        let settings = Settings::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(settings.api_url, "http://127.0.0.1:1234");
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let settings = Settings::from_lookup(lookup_from(&complete())).unwrap();
        assert!(!format!("{:?}", settings).contains("ghp_secret"));
    }

    #[test]
    fn init_does_not_need_a_token() {
        let pairs: Vec<_> = complete()
            .into_iter()
            .filter(|(k, _)| *k != TOKEN_KEY)
            .collect();
        let settings = InitSettings::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(settings.timezone, "UTC");
    }
}
