//! Remote repository configuration.
//!
//! # Invariants
//! - Every field of a constructed `GitHubConfig` is non-empty.
//! - The access token never appears in `Debug` output or logs.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub const ENV_OWNER: &str = "ROADMAP_GITHUB_OWNER";
pub const ENV_REPO: &str = "ROADMAP_GITHUB_REPO";
pub const ENV_TOKEN: &str = "ROADMAP_GITHUB_TOKEN";
pub const ENV_BRANCH: &str = "ROADMAP_GITHUB_BRANCH";
pub const ENV_API_URL: &str = "ROADMAP_GITHUB_API_URL";

const DEFAULT_BRANCH: &str = "main";
const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
const DEFAULT_USER_AGENT: &str = concat!("roadmap-core/", env!("CARGO_PKG_VERSION"));

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing required setting `{name}`"),
            Self::Invalid { field, reason } => write!(f, "invalid setting `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Target repository and credentials for the content client.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub token: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Debug for GitHubConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl GitHubConfig {
    /// Builds a validated config for `owner/repo` on the default branch.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: default_branch(),
            token: token.into(),
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Reads the `ROADMAP_GITHUB_*` process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`; blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let config = Self {
            owner: read(ENV_OWNER).ok_or(ConfigError::Missing(ENV_OWNER))?,
            repo: read(ENV_REPO).ok_or(ConfigError::Missing(ENV_REPO))?,
            token: read(ENV_TOKEN).ok_or(ConfigError::Missing(ENV_TOKEN))?,
            branch: read(ENV_BRANCH).unwrap_or_else(default_branch),
            api_base_url: read(ENV_API_URL).unwrap_or_else(default_api_base_url),
            user_agent: default_user_agent(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is usable in a request URL or header.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("branch", &self.branch),
            ("token", &self.token),
            ("user_agent", &self.user_agent),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }
        for (field, value) in [("owner", &self.owner), ("repo", &self.repo)] {
            if value.contains('/') || value.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("`{value}` must be a single path segment"),
                });
            }
        }
        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"))
        {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                reason: format!("`{}` is not an http(s) url", self.api_base_url),
            });
        }
        Ok(())
    }

    /// `https://api.github.com/repos/<owner>/<repo>/contents/<path>`
    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            path
        )
    }
}
