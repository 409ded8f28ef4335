//! Comment store
//!
//! Loads the whole comment log into threads and appends single comments
//! with an optimistic read-then-write. A write is conditioned on the
//! version that was read; if another writer got there first the call fails
//! with [`StoreError::Conflict`] and nothing is retried here.

use chrono::{DateTime, Utc};

use crate::backends::{GitHubContents, LogBackend, LogWrite};
use crate::comment_log::{append_line, parse_log, render_line, CommentThreads};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::types::Comment;

pub struct CommentStore<B: LogBackend> {
    backend: B,
}

impl CommentStore<GitHubContents> {
    /// Store backed by the GitHub contents API
    pub fn github(config: StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::new(GitHubContents::new(config)?))
    }
}

impl<B: LogBackend> CommentStore<B> {
    pub fn new(backend: B) -> Self {
        CommentStore { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether comments are enabled at all. Never touches the network.
    pub fn has_credential(&self) -> bool {
        self.backend.has_credential()
    }

    fn require_credential(&self) -> Result<(), StoreError> {
        if self.backend.has_credential() {
            Ok(())
        } else {
            Err(StoreError::missing_credential())
        }
    }

    /// Load every comment, grouped by (transcript, message).
    ///
    /// A log that does not exist yet is an empty result, not an error.
    pub async fn load_comments(&self) -> Result<CommentThreads, StoreError> {
        self.require_credential()?;

        let Some(log) = self.backend.fetch().await? else {
            return Ok(CommentThreads::default());
        };

        let threads = parse_log(&log.content)?;
        tracing::debug!(
            threads = threads.len(),
            comments = threads.total(),
            version = %log.version,
            "Loaded comments"
        );
        Ok(threads)
    }

    /// Append a comment stamped with the current time
    pub async fn save_comment(
        &self,
        transcript_id: &str,
        message_index: usize,
        text: &str,
    ) -> Result<Comment, StoreError> {
        self.save_comment_at(transcript_id, message_index, text, Utc::now())
            .await
    }

    /// Append a comment with a caller-supplied timestamp.
    ///
    /// Performs exactly one read and at most one conditional write.
    pub async fn save_comment_at(
        &self,
        transcript_id: &str,
        message_index: usize,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Comment, StoreError> {
        self.require_credential()?;

        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyComment);
        }

        let comment = Comment {
            transcript_id: transcript_id.to_string(),
            message_index,
            text: text.to_string(),
            timestamp,
        };
        let line = render_line(&comment)?;

        let current = self.backend.fetch().await?;
        let (content, expected_version) = match &current {
            None => (format!("{}\n", line), None),
            Some(log) => (append_line(&log.content, &line), Some(log.version.as_str())),
        };

        let message = format!("Add comment on {}", comment.key());
        self.backend
            .write(LogWrite {
                content: &content,
                expected_version,
                message: &message,
            })
            .await?;

        tracing::debug!(key = %comment.key(), location = %self.backend.location(), "Saved comment");
        Ok(comment)
    }
}
