//! Custom error types with exit codes

use crate::git::GitStep;
use core::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Filesystem operation that failed during a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FsOp {
    CreateWorkspace,
    CreateDir,
    Remove,
    Move,
    ReadDir,
    CleanupWorkspace,
}

impl fmt::Display for FsOp {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::CreateWorkspace => "create workspace",
            Self::CreateDir => "create directory",
            Self::Remove => "remove",
            Self::Move => "move",
            Self::ReadDir => "read directory",
            Self::CleanupWorkspace => "clean up workspace",
        };
        f.write_str(name)
    }
}

/// Main error type for subfetch operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// A git invocation exited non-zero or could not be launched
    #[error("Git {step} failed{}: {stderr}", format_status(.status))]
    VersionControlCommandFailed {
        step: GitStep,
        status: Option<i32>,
        stderr: String,
    },

    /// The requested subfolder is absent after checkout
    #[error(
        "Subfolder '{}' not found on branch '{branch}' (check the subfolder name and branch)",
        .path.display()
    )]
    SubfolderNotFound { path: PathBuf, branch: String },

    /// A remove, move or create on the local filesystem failed
    ///
    /// The underlying `io::Error` is the source, not part of the message.
    #[error("Filesystem error: failed to {op} '{}'", .path.display())]
    FilesystemOperationFailed {
        op: FsOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid input rejected before anything runs
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

fn format_status(status: &Option<i32>) -> String {
    status.map_or_else(String::new, |code| format!(" with exit status {code}"))
}

impl FetchError {
    /// Get the process exit code for this error
    ///
    /// Git failures propagate git's own status when there is one.
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::VersionControlCommandFailed {
                status: Some(code), ..
            } if code != 0 => code,
            _ => 1,
        }
    }

    /// Create a git step failure
    #[inline]
    pub fn version_control<S: Into<String>>(step: GitStep, status: Option<i32>, stderr: S) -> Self {
        Self::VersionControlCommandFailed {
            step,
            status,
            stderr: stderr.into(),
        }
    }

    /// Create a missing subfolder error
    #[inline]
    pub fn subfolder_not_found<P: Into<PathBuf>, S: Into<String>>(path: P, branch: S) -> Self {
        Self::SubfolderNotFound {
            path: path.into(),
            branch: branch.into(),
        }
    }

    /// Create a filesystem error
    #[inline]
    pub fn filesystem<P: Into<PathBuf>>(op: FsOp, path: P, source: io::Error) -> Self {
        Self::FilesystemOperationFailed {
            op,
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    #[inline]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
