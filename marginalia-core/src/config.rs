// Comment store configuration
// Built explicitly by the caller; nothing here reads the environment

use std::time::Duration;

use color_eyre::{eyre::eyre, Result};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_LOG_PATH: &str = "data/comments.jsonl";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the comment log lives and how to reach it
#[derive(Clone)]
pub struct StoreConfig {
    token: Option<String>,
    pub owner: String,
    pub repo: String,
    /// Path of the log file inside the repository
    pub path: String,
    pub branch: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl StoreConfig {
    /// Create a config for `owner/repo` with default path, branch and API base
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        StoreConfig {
            token: None,
            owner: owner.into(),
            repo: repo.into(),
            path: DEFAULT_LOG_PATH.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a config from an "owner/repo" slug
    pub fn from_slug(slug: &str) -> Result<Self> {
        let (owner, repo) = Self::parse_repo(slug)?;
        Ok(Self::new(owner, repo))
    }

    pub fn parse_repo(slug: &str) -> Result<(String, String)> {
        match slug.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok((owner.to_string(), repo.to_string()))
            }
            _ => Err(eyre!("Invalid repository '{}', expected owner/name", slug)),
        }
    }

    /// Set the bearer token. Blank tokens count as no token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into().trim_matches('/').to_string();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Contents API URL of the log file
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, self.path
        )
    }

    /// Human-readable location, e.g. "owner/repo:data/comments.jsonl@main"
    pub fn location(&self) -> String {
        format!("{}/{}:{}@{}", self.owner, self.repo, self.path, self.branch)
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("path", &self.path)
            .field("branch", &self.branch)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}
