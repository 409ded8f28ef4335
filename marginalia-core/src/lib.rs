// Marginalia Core Library
// Transcript parsing and the remote comment log store

pub mod types;
pub mod transcript;
pub mod comment_log;
pub mod config;
pub mod error;
pub mod backends;
pub mod store;
pub mod dataset;

// Re-export commonly used types
pub use types::*;
pub use transcript::parse_transcript;
pub use comment_log::CommentThreads;
pub use config::StoreConfig;
pub use error::StoreError;
pub use backends::{GitHubContents, LogBackend, MemoryLog};
pub use store::CommentStore;
