//! Error types for the comment store
//!
//! The transcript parser has no error type: it degrades to fewer messages
//! instead of failing.

/// Failure of a comment store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No credential configured, or the remote rejected it
    #[error("not authorized: {0}")]
    Auth(String),

    /// Network failure, timeout, or unexpected API status
    #[error("transport error: {message}")]
    Transport {
        /// HTTP status, when the remote answered at all
        status: Option<u16>,
        message: String,
    },

    /// The log changed between our read and our write
    #[error("comment log {path} changed since it was read; reload and retry")]
    Conflict { path: String },

    /// A line of the stored log is not a valid comment record
    #[error("malformed comment log at line {line_number}: {source}")]
    Format {
        line_number: usize,
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// The stored payload could not be decoded into text
    #[error("undecodable comment log payload: {0}")]
    Encoding(String),

    #[error("comment text is empty")]
    EmptyComment,
}

impl StoreError {
    pub fn missing_credential() -> Self {
        StoreError::Auth("no access token configured".to_string())
    }

    /// Creates a transport error from a non-success HTTP status.
    pub fn http_status(status: u16, body: &str) -> Self {
        // GitHub error bodies are `{"message": "...", "documentation_url": "..."}`
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| json.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| body.trim().to_string());

        let message = if detail.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, detail)
        };

        StoreError::Transport {
            status: Some(status),
            message,
        }
    }

    /// Whether the caller may reasonably retry the same call unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Transport { .. })
    }

    /// Whether the failure indicates corrupt stored data.
    pub fn is_format(&self) -> bool {
        matches!(self, StoreError::Format { .. } | StoreError::Encoding(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("Request timed out: {}", e)
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else if e.is_decode() {
            format!("Invalid response body: {}", e)
        } else {
            format!("Network error: {}", e)
        };

        StoreError::Transport {
            status: e.status().map(|s| s.as_u16()),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_extracts_github_message() {
        let err = StoreError::http_status(
            500,
            r#"{"message":"Server Error","documentation_url":"https://docs.github.com"}"#,
        );
        match err {
            StoreError::Transport { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "HTTP 500: Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_http_status_plain_body() {
        let err = StoreError::http_status(502, "");
        assert_eq!(err.to_string(), "transport error: HTTP 502");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classification() {
        assert!(!StoreError::missing_credential().is_retryable());
        assert!(!StoreError::Conflict { path: "x".into() }.is_retryable());
        assert!(StoreError::Encoding("bad".into()).is_format());
    }
}
