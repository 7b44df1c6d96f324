use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Personal access token. Never printed.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// The repository and user whose activity is tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub owner: String,
    pub repo: String,
    pub username: String,
}

impl Target {
    /// `owner/repo`, the form used by search qualifiers and event payloads.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

#[derive(Debug, Clone)]
pub struct WorkbookSettings {
    pub path: PathBuf,
    pub sheet: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub token: AccessToken,
    pub api_url: String,
    pub target: Target,
    pub workbook: WorkbookSettings,
}

/// What `init` needs: no token, but the timezone label for the Config sheet.
#[derive(Debug, Clone)]
pub struct InitSettings {
    pub target: Target,
    pub workbook: WorkbookSettings,
    pub timezone: String,
}
