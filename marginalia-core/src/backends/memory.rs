// In-process backend
// Same version-token semantics as the remote store, without the network

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LogBackend, LogWrite, RemoteLog};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct State {
    log: Option<RemoteLog>,
    revision: u64,
}

impl State {
    fn replace(&mut self, content: &str) {
        self.revision += 1;
        self.log = Some(RemoteLog {
            content: content.to_string(),
            version: format!("rev-{}", self.revision),
        });
    }
}

/// Log held in memory. Every write bumps the version token.
#[derive(Debug)]
pub struct MemoryLog {
    state: Mutex<State>,
    credentialed: bool,
    fetches: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryLog {
    /// Empty log (the file does not exist yet)
    pub fn new() -> Self {
        MemoryLog {
            state: Mutex::new(State::default()),
            credentialed: true,
            fetches: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Log that already exists with the given content
    pub fn with_content(content: &str) -> Self {
        let log = Self::new();
        log.lock().replace(content);
        log
    }

    /// Backend that behaves as if no token were configured
    pub fn without_credential() -> Self {
        MemoryLog {
            credentialed: false,
            ..Self::new()
        }
    }

    /// Current content, `None` if the log was never created
    pub fn content(&self) -> Option<String> {
        self.lock().log.as_ref().map(|log| log.content.clone())
    }

    /// Unconditional write, as another process would do it
    pub fn overwrite(&self, content: &str) {
        self.lock().replace(content);
    }

    /// Number of `fetch` calls that reached the backend
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `write` calls that reached the backend
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // State is replaced wholesale, so a poisoned lock still holds a valid log
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogBackend for MemoryLog {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn has_credential(&self) -> bool {
        self.credentialed
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn fetch(&self) -> Result<Option<RemoteLog>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if !self.credentialed {
            return Err(StoreError::missing_credential());
        }
        Ok(self.lock().log.clone())
    }

    async fn write(&self, write: LogWrite<'_>) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if !self.credentialed {
            return Err(StoreError::missing_credential());
        }

        let mut state = self.lock();
        let current = state.log.as_ref().map(|log| log.version.as_str());
        if current != write.expected_version {
            return Err(StoreError::Conflict {
                path: self.location(),
            });
        }

        state.replace(write.content);
        Ok(())
    }
}
