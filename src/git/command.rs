//! Version control capability used by the fetcher

use core::fmt;
use std::io;
use std::path::Path;

/// One of the four git invocations a fetch performs, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum GitStep {
    Clone,
    SparseCheckoutInit,
    SparseCheckoutSet,
    Checkout,
}

impl fmt::Display for GitStep {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Clone => "clone",
            Self::SparseCheckoutInit => "sparse-checkout init",
            Self::SparseCheckoutSet => "sparse-checkout set",
            Self::Checkout => "checkout",
        };
        f.write_str(name)
    }
}

/// Captured result of one git invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct CommandOutput {
    /// Exit status, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a command that exited with status 0
    #[must_use]
    #[inline]
    pub fn succeeded() -> Self {
        Self {
            status: Some(0),
            ..Self::default()
        }
    }

    /// Output of a command that exited with `status`, writing `stderr`
    #[must_use]
    #[inline]
    pub fn failed<S: Into<String>>(status: i32, stderr: S) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    #[must_use]
    #[inline]
    pub const fn success(&self) -> bool {
        matches!(self.status, Some(0))
    }
}

/// The version control operations a subfolder fetch needs
///
/// Each method returns the captured output of the command; an `Err` means the
/// command could not be launched at all.
///
/// # Implementations
/// - `GitCli`: runs the `git` binary
/// - `MockVersionControl`: serves an in-memory tree for tests
pub trait VersionControl {
    /// Clone `repository` into `target` without checking out any files
    fn clone_no_checkout(&self, repository: &str, target: &Path) -> io::Result<CommandOutput>;

    /// Enable cone-mode sparse checkout in the clone at `repo_path`
    fn sparse_checkout_init(&self, repo_path: &Path) -> io::Result<CommandOutput>;

    /// Restrict the sparse checkout at `repo_path` to `subfolder`
    fn sparse_checkout_set(&self, repo_path: &Path, subfolder: &str) -> io::Result<CommandOutput>;

    /// Check out `branch`, materializing only the sparse selection
    fn checkout_branch(&self, repo_path: &Path, branch: &str) -> io::Result<CommandOutput>;
}
