//! Git plumbing for the merge orchestrator.
//!
//! Everything the resolver needs from version control goes through the
//! [`RevisionSource`] trait: the text of a path at a revision, or `None`
//! when the path does not exist there. [`GitCli`] implements it by
//! shelling out to the `git` binary; the same channel carries fetch,
//! changed-path enumeration, merge-base resolution, and index staging.

pub mod error;

pub use error::GitError;

use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::debug;

/// Read-only access to file content at named revisions.
///
/// Object-safe so the orchestrator can hold a `&dyn RevisionSource` and
/// tests can substitute an in-memory double.
pub trait RevisionSource {
    /// Text of `path` at `revision`, or `None` if the path does not exist
    /// at that revision.
    fn read_at(&self, path: &str, revision: &str) -> Result<Option<String>, GitError>;
}

/// [`RevisionSource`] backed by the `git` command-line tool, rooted at a
/// working directory inside the repository.
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, GitError> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()?;
        Ok(output)
    }

    fn run_ok(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        String::from_utf8(output.stdout).map_err(|_| GitError::NonUtf8Output {
            command: args.join(" "),
        })
    }

    /// `git fetch origin <branch>`.
    pub fn fetch_origin(&self, branch: &str) -> Result<(), GitError> {
        self.run_ok(&["fetch", "origin", branch]).map(|_| ())
    }

    /// Paths changed between `from` and `to`, one per line from
    /// `git diff --name-only`.
    pub fn changed_paths(&self, from: &str, to: &str) -> Result<Vec<String>, GitError> {
        let range = format!("{from}..{to}");
        let out = self.run_ok(&["diff", "--name-only", &range])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Resolve the merge base of two revisions.
    pub fn merge_base(&self, a: &str, b: &str) -> Result<String, GitError> {
        Ok(self.run_ok(&["merge-base", a, b])?.trim().to_string())
    }

    /// Stage a path in the index.
    pub fn stage(&self, path: &str) -> Result<(), GitError> {
        self.run_ok(&["add", "--", path]).map(|_| ())
    }
}

impl RevisionSource for GitCli {
    fn read_at(&self, path: &str, revision: &str) -> Result<Option<String>, GitError> {
        let target = format!("{revision}:{path}");
        let output = self.run(&["show", &target])?;
        if output.status.success() {
            return String::from_utf8(output.stdout)
                .map(Some)
                .map_err(|_| GitError::NonUtf8Output {
                    command: format!("show {target}"),
                });
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_missing_path(&stderr) {
            debug!(path, revision, "absent at revision");
            return Ok(None);
        }
        Err(GitError::CommandFailed {
            command: format!("show {target}"),
            stderr: stderr.into_owned(),
        })
    }
}

/// `git show` exits 128 both for a missing path and for a broken
/// repository or bad revision; the stderr text is the only discriminator.
/// Only a missing *path* counts as absence.
fn is_missing_path(stderr: &str) -> bool {
    stderr.contains("does not exist") || stderr.contains("exists on disk, but not in")
}
