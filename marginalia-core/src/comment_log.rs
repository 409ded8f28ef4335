// Line-delimited JSON comment log
// One Comment record per line, appended at the tail, no enclosing array

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::types::{Comment, CommentKey};

/// Comments grouped by (transcript, message), in log order within each group.
///
/// Always rebuilt from the full log; there is no way to insert into it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentThreads {
    threads: BTreeMap<CommentKey, Vec<Comment>>,
}

impl CommentThreads {
    /// Comments on one message, oldest first. Empty if there are none.
    pub fn get(&self, transcript_id: &str, message_index: usize) -> &[Comment] {
        self.threads
            .get(&CommentKey::new(transcript_id, message_index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All threads of one transcript, ordered by message index
    pub fn for_transcript<'a>(
        &'a self,
        transcript_id: &'a str,
    ) -> impl Iterator<Item = (usize, &'a [Comment])> + 'a {
        self.threads
            .iter()
            .filter(move |(key, _)| key.transcript_id == transcript_id)
            .map(|(key, comments)| (key.message_index, comments.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CommentKey, &[Comment])> {
        self.threads.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of threads (distinct keys)
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Number of comments across all threads
    pub fn total(&self) -> usize {
        self.threads.values().map(Vec::len).sum()
    }
}

impl FromIterator<Comment> for CommentThreads {
    fn from_iter<I: IntoIterator<Item = Comment>>(iter: I) -> Self {
        let mut threads: BTreeMap<CommentKey, Vec<Comment>> = BTreeMap::new();
        for comment in iter {
            threads.entry(comment.key()).or_default().push(comment);
        }
        CommentThreads { threads }
    }
}

/// Serialize a comment as a single log line (no terminator)
pub fn render_line(comment: &Comment) -> Result<String, StoreError> {
    serde_json::to_string(comment).map_err(|e| StoreError::Encoding(e.to_string()))
}

/// Append one line to existing log content.
///
/// Trailing line terminators on `existing` collapse to one, so repeated
/// appends never accumulate blank lines.
pub fn append_line(existing: &str, line: &str) -> String {
    let head = existing.trim_end_matches(['\n', '\r']);

    let mut content = String::with_capacity(head.len() + line.len() + 2);
    if !head.is_empty() {
        content.push_str(head);
        content.push('\n');
    }
    content.push_str(line);
    content.push('\n');
    content
}

/// Parse a whole log into threads.
///
/// Blank lines are ignored. The first line that is not a valid record
/// aborts the parse; nothing is grouped from a corrupt log.
pub fn parse_log(content: &str) -> Result<CommentThreads, StoreError> {
    let mut comments = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let comment: Comment = serde_json::from_str(line).map_err(|source| {
            tracing::warn!(line_number = idx + 1, line, error = %source, "Malformed comment log line");
            StoreError::Format {
                line_number: idx + 1,
                line: line.to_string(),
                source,
            }
        })?;
        comments.push(comment);
    }

    Ok(comments.into_iter().collect())
}
