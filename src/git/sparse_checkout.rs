//! Git sparse checkout through the `git` binary

use crate::error::FetchError;
use crate::git::{CommandOutput, VersionControl};
use anyhow::{Context as _, Result};
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Oldest git release with `sparse-checkout init --cone`
pub const MIN_GIT_VERSION: (u32, u32, u32) = (2, 25, 0);

/// Runs sparse checkout steps with the `git` executable
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GitCli {
    pub program: String,
}

impl GitCli {
    /// Create a runner for the given git executable
    #[must_use]
    #[inline]
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run<I, S>(&self, args: I, repo_path: Option<&Path>) -> io::Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        if let Some(path) = repo_path {
            command.arg("-C").arg(path);
        }
        command.args(args);
        debug!("Running {command:?}");

        let output = command.output()?;
        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        };

        if !result.success() {
            debug!("git exited with {:?}: {}", result.status, result.stderr);
        }
        Ok(result)
    }

    /// Check that git is available and meets the minimum version requirement
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The git command is not found
    /// - The git command failed to execute properly
    /// - The git version is older than 2.25.0
    #[inline]
    pub fn check_availability(&self) -> Result<()> {
        let output = self.run(["--version"], None).with_context(|| {
            format!(
                "Git command '{}' not found. Please ensure Git is installed and available in PATH",
                self.program
            )
        })?;

        if !output.success() {
            return Err(
                FetchError::configuration("Git command failed to execute properly").into(),
            );
        }

        // "git version 2.39.2" or "git version 2.39.2.windows.1"
        if let Some(version_part) = output.stdout.split_whitespace().nth(2)
            && let Ok(version) = parse_git_version(version_part)
            && version < MIN_GIT_VERSION
        {
            return Err(FetchError::configuration(format!(
                "Git version {version_part} is too old. subfetch requires Git 2.25.0 or later for cone-mode sparse checkout"
            ))
            .into());
        }

        debug!("Using {}", output.stdout);
        Ok(())
    }
}

impl Default for GitCli {
    #[inline]
    fn default() -> Self {
        Self::new("git")
    }
}

impl VersionControl for GitCli {
    #[inline]
    fn clone_no_checkout(&self, repository: &str, target: &Path) -> io::Result<CommandOutput> {
        self.run(
            [
                OsStr::new("clone"),
                OsStr::new("--filter=blob:none"),
                OsStr::new("--no-checkout"),
                OsStr::new("--"),
                OsStr::new(repository),
                target.as_os_str(),
            ],
            None,
        )
    }

    #[inline]
    fn sparse_checkout_init(&self, repo_path: &Path) -> io::Result<CommandOutput> {
        self.run(["sparse-checkout", "init", "--cone"], Some(repo_path))
    }

    #[inline]
    fn sparse_checkout_set(&self, repo_path: &Path, subfolder: &str) -> io::Result<CommandOutput> {
        self.run(["sparse-checkout", "set", subfolder], Some(repo_path))
    }

    #[inline]
    fn checkout_branch(&self, repo_path: &Path, branch: &str) -> io::Result<CommandOutput> {
        self.run(["checkout", branch], Some(repo_path))
    }
}

/// Parse Git version string into tuple (major, minor, patch)
///
/// # Errors
///
/// Returns an error if the version string is not `major.minor.patch[...]`
#[inline]
pub fn parse_git_version(version: &str) -> Result<(u32, u32, u32)> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() >= 3 {
        let major = parts[0].parse().context("Invalid major version")?;
        let minor = parts[1].parse().context("Invalid minor version")?;
        let patch = parts[2].parse().context("Invalid patch version")?;
        Ok((major, minor, patch))
    } else {
        Err(anyhow::anyhow!("Invalid version format: '{version}'"))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    #[test]
    fn test_parse_git_version_with_platform_suffix() {
        assert_eq!(parse_git_version("2.39.2.windows.1").unwrap(), (2, 39, 2));
        assert!(parse_git_version("2.39").is_err());
        assert!(parse_git_version("two.39.1").is_err());
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let git = GitCli::new("subfetch-no-such-git-binary");
        let err = git
            .sparse_checkout_init(Path::new("."))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(git.check_availability().is_err());
    }

    #[test]
    fn test_default_program_is_git() {
        assert_eq!(GitCli::default().program, "git");
    }
}
