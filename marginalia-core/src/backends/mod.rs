// Backend trait and implementations for where the comment log is stored

use async_trait::async_trait;

use crate::error::StoreError;

pub mod github;
pub mod memory;

pub use github::GitHubContents;
pub use memory::MemoryLog;

/// Current content of the log together with its version token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLog {
    pub content: String,
    pub version: String,
}

/// A full-content write of the log
#[derive(Debug, Clone, Copy)]
pub struct LogWrite<'a> {
    pub content: &'a str,
    /// Version the content was derived from. `None` means "create"; the
    /// write must fail with a conflict if the log already exists.
    pub expected_version: Option<&'a str>,
    /// Commit message recorded alongside the write
    pub message: &'a str,
}

/// Trait for a versioned single-file store holding the comment log
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// Name of the backend (e.g., "github", "memory")
    fn name(&self) -> &'static str;

    /// Whether a credential is configured. Must not touch the network.
    fn has_credential(&self) -> bool;

    /// Where the log lives, for messages and logs
    fn location(&self) -> String;

    /// Read the log. `Ok(None)` when it does not exist yet.
    async fn fetch(&self) -> Result<Option<RemoteLog>, StoreError>;

    /// Replace the log content, conditioned on `expected_version`
    async fn write(&self, write: LogWrite<'_>) -> Result<(), StoreError>;
}
