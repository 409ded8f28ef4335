// GitHub contents API backend
// GET/PUT of one file at a fixed branch; the blob sha is the version token

use async_trait::async_trait;
use base64::prelude::*;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{LogBackend, LogWrite, RemoteLog};
use crate::config::StoreConfig;
use crate::error::StoreError;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("marginalia/", env!("CARGO_PKG_VERSION"));

/// Response body of `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Request body of `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

pub struct GitHubContents {
    config: StoreConfig,
    http: reqwest::Client,
}

impl GitHubContents {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(GitHubContents { config, http })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn token(&self) -> Result<&str, StoreError> {
        self.config.token().ok_or_else(StoreError::missing_credential)
    }

    /// Map 401/403 to an auth failure. A 403 from rate limiting is transient.
    fn auth_failure(status: StatusCode, body: &str) -> Option<StoreError> {
        match status {
            StatusCode::UNAUTHORIZED => Some(StoreError::Auth(format!(
                "token rejected (HTTP {})",
                status.as_u16()
            ))),
            StatusCode::FORBIDDEN if !body.to_lowercase().contains("rate limit") => Some(
                StoreError::Auth(format!("token lacks access (HTTP {})", status.as_u16())),
            ),
            _ => None,
        }
    }
}

/// Decode a contents API payload. GitHub wraps the base64 text at 60 columns.
fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Encoding(format!("invalid base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Encoding(format!("invalid UTF-8: {}", e)))
}

#[async_trait]
impl LogBackend for GitHubContents {
    fn name(&self) -> &'static str {
        "github"
    }

    fn has_credential(&self) -> bool {
        self.config.has_token()
    }

    fn location(&self) -> String {
        self.config.location()
    }

    async fn fetch(&self) -> Result<Option<RemoteLog>, StoreError> {
        let token = self.token()?;
        let url = self.config.contents_url();
        tracing::debug!(url = %url, branch = %self.config.branch, "Fetching comment log");

        let response = self
            .http
            .get(&url)
            .query(&[("ref", self.config.branch.as_str())])
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Comment log does not exist yet");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::auth_failure(status, &body)
                .unwrap_or_else(|| StoreError::http_status(status.as_u16(), &body)));
        }

        let body: ContentsResponse = response.json().await?;
        if body.encoding.as_deref() == Some("none") {
            // Files over 1 MB come back without inline content
            return Err(StoreError::Encoding(format!(
                "{} is too large for the contents API",
                self.config.path
            )));
        }

        let content = decode_content(&body.content)?;
        tracing::debug!(sha = %body.sha, bytes = content.len(), "Fetched comment log");

        Ok(Some(RemoteLog {
            content,
            version: body.sha,
        }))
    }

    async fn write(&self, write: LogWrite<'_>) -> Result<(), StoreError> {
        let token = self.token()?;
        let url = self.config.contents_url();

        let request = PutContentsRequest {
            message: write.message,
            content: BASE64_STANDARD.encode(write.content.as_bytes()),
            branch: &self.config.branch,
            sha: write.expected_version,
        };

        tracing::debug!(
            url = %url,
            sha = write.expected_version.unwrap_or("<create>"),
            bytes = write.content.len(),
            "Writing comment log"
        );

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_ACCEPT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let conflict = status == StatusCode::CONFLICT
            // Creating without a sha when someone else created it first
            || (status == StatusCode::UNPROCESSABLE_ENTITY && write.expected_version.is_none());

        if conflict {
            tracing::warn!(status = status.as_u16(), location = %self.location(), "Comment log write rejected as stale");
            return Err(StoreError::Conflict {
                path: self.config.path.clone(),
            });
        }

        Err(Self::auth_failure(status, &body)
            .unwrap_or_else(|| StoreError::http_status(status.as_u16(), &body)))
    }
}
