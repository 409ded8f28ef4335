// Core type definitions for Marginalia

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Markers that open an assistant turn in a raw transcript
pub const ASSISTANT_MARKERS: [&str; 3] = ["A:", "AI:", "Assistant:"];

/// Markers that open a user turn in a raw transcript
pub const USER_MARKERS: [&str; 1] = ["User:"];

/// Role of a message in a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Assistant,
    User,
}

impl Role {
    /// Map a line-start marker (e.g. "AI:") to its role
    pub fn from_marker(marker: &str) -> Option<Role> {
        if ASSISTANT_MARKERS.contains(&marker) {
            Some(Role::Assistant)
        } else if USER_MARKERS.contains(&marker) {
            Some(Role::User)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Assistant => "assistant",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of a parsed transcript. Content is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
        }
    }
}

/// A comment attached to one message of one transcript.
///
/// This is also the wire record: one of these per line in the comment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub transcript_id: String,
    pub message_index: usize,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    pub fn key(&self) -> CommentKey {
        CommentKey::new(self.transcript_id.clone(), self.message_index)
    }
}

/// Composite key a comment thread hangs off
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommentKey {
    pub transcript_id: String,
    pub message_index: usize,
}

impl CommentKey {
    pub fn new(transcript_id: impl Into<String>, message_index: usize) -> Self {
        CommentKey {
            transcript_id: transcript_id.into(),
            message_index,
        }
    }
}

impl std::fmt::Display for CommentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transcript_id, self.message_index)
    }
}

/// One row of a transcript dataset export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub transcript_id: String,
    pub text: String,
    #[serde(default)]
    pub split: Option<String>,
}
