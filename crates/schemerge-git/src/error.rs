//! Error types for git operations.
//!
//! Absence of a path at a revision is not an error — those lookups return
//! `Ok(None)`. These variants cover failures of the git transport itself,
//! which are fatal for the invocation and surfaced to the caller without
//! internal retries.

use thiserror::Error;

/// Errors returned by revision-content and staging operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Spawning the git binary failed.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// git exited nonzero for a reason other than a missing path.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// git produced output that was not valid UTF-8.
    #[error("git {command} produced non-UTF-8 output")]
    NonUtf8Output { command: String },
}
