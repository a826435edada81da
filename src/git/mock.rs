//! In-memory version control for testing the fetch orchestration

use super::{CommandOutput, GitStep, VersionControl};
use crate::system::{MockSystem, System as _};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A recorded call against [`MockVersionControl`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub step: GitStep,
    pub repo_path: PathBuf,
    pub argument: String,
}

#[derive(Default)]
struct MockVcsState {
    calls: Vec<RecordedCall>,
    cone: bool,
    sparse_path: Option<String>,
}

/// Version control double that materializes files into a [`MockSystem`]
///
/// Serves one repository URL whose branches are in-memory trees. Checkout
/// honors cone-mode semantics: top-level files plus everything under the
/// sparse path.
///
/// # Example
/// ```
/// use subfetch::git::{GitStep, MockVersionControl};
/// use subfetch::system::MockSystem;
///
/// let system = MockSystem::new();
/// let vcs = MockVersionControl::new(system, "https://example.com/org/repo.git")
///     .with_file("main", "tools/widget/a.txt", b"a")
///     .failing_at(GitStep::Checkout, 1, "error: pathspec 'main' did not match");
/// assert!(vcs.calls().unwrap().is_empty());
/// ```
pub struct MockVersionControl {
    system: MockSystem,
    url: String,
    branches: HashMap<String, Vec<(String, Vec<u8>)>>,
    links: HashMap<String, Vec<(String, String)>>,
    failure: Option<(GitStep, CommandOutput)>,
    state: Mutex<MockVcsState>,
}

impl MockVersionControl {
    /// Create a mock serving `url`, writing checkouts through `system`
    #[must_use]
    #[inline]
    pub fn new<S: Into<String>>(system: MockSystem, url: S) -> Self {
        Self {
            system,
            url: url.into(),
            branches: HashMap::new(),
            links: HashMap::new(),
            failure: None,
            state: Mutex::new(MockVcsState::default()),
        }
    }

    /// Add a file at `path` (relative, `/`-separated) on `branch` (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_file(mut self, branch: &str, path: &str, contents: &[u8]) -> Self {
        self.branches
            .entry(branch.to_owned())
            .or_default()
            .push((path.to_owned(), contents.to_vec()));
        self
    }

    /// Add a symbolic link at `path` pointing to `target` on `branch` (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_symlink(mut self, branch: &str, path: &str, target: &str) -> Self {
        self.links
            .entry(branch.to_owned())
            .or_default()
            .push((path.to_owned(), target.to_owned()));
        self
    }

    /// Make `step` exit with `status` and `stderr` (builder pattern)
    #[must_use]
    #[inline]
    pub fn failing_at(mut self, step: GitStep, status: i32, stderr: &str) -> Self {
        self.failure = Some((step, CommandOutput::failed(status, stderr)));
        self
    }

    /// Calls made so far, in order
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn calls(&self) -> io::Result<Vec<RecordedCall>> {
        Ok(self.lock()?.calls.clone())
    }

    /// Steps invoked so far, in order
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn steps(&self) -> io::Result<Vec<GitStep>> {
        Ok(self.lock()?.calls.iter().map(|call| call.step).collect())
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, MockVcsState>> {
        self.state
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    /// Record the call and return the configured failure for `step`, if any
    fn record(&self, step: GitStep, repo_path: &Path, argument: &str) -> io::Result<Option<CommandOutput>> {
        self.lock()?.calls.push(RecordedCall {
            step,
            repo_path: repo_path.to_path_buf(),
            argument: argument.to_owned(),
        });
        Ok(self
            .failure
            .as_ref()
            .filter(|(failing, _)| *failing == step)
            .map(|(_, output)| output.clone()))
    }

    fn not_a_repository(&self, repo_path: &Path) -> Option<CommandOutput> {
        (!self.system.is_dir(&repo_path.join(".git"))).then(|| {
            CommandOutput::failed(
                128,
                format!(
                    "fatal: not a git repository: '{}'",
                    repo_path.display()
                ),
            )
        })
    }

    fn in_cone(sparse_path: &str, file: &str) -> bool {
        // Cone mode always includes files at the repository root
        !file.contains('/') || file.starts_with(&format!("{sparse_path}/"))
    }
}

impl VersionControl for MockVersionControl {
    fn clone_no_checkout(&self, repository: &str, target: &Path) -> io::Result<CommandOutput> {
        if let Some(failure) = self.record(GitStep::Clone, target, repository)? {
            return Ok(failure);
        }
        if repository != self.url {
            return Ok(CommandOutput::failed(
                128,
                format!("fatal: repository '{repository}' not found"),
            ));
        }
        if self.system.exists(target) && !self.system.read_dir(target)?.is_empty() {
            return Ok(CommandOutput::failed(
                128,
                format!(
                    "fatal: destination path '{}' already exists and is not an empty directory.",
                    target.display()
                ),
            ));
        }

        self.system.create_dir_all(&target.join(".git"))?;
        self.system
            .write(&target.join(".git/HEAD"), b"ref: refs/heads/main\n")?;
        Ok(CommandOutput::succeeded())
    }

    fn sparse_checkout_init(&self, repo_path: &Path) -> io::Result<CommandOutput> {
        if let Some(failure) = self.record(GitStep::SparseCheckoutInit, repo_path, "--cone")? {
            return Ok(failure);
        }
        if let Some(failure) = self.not_a_repository(repo_path) {
            return Ok(failure);
        }
        self.lock()?.cone = true;
        Ok(CommandOutput::succeeded())
    }

    fn sparse_checkout_set(&self, repo_path: &Path, subfolder: &str) -> io::Result<CommandOutput> {
        if let Some(failure) = self.record(GitStep::SparseCheckoutSet, repo_path, subfolder)? {
            return Ok(failure);
        }
        if let Some(failure) = self.not_a_repository(repo_path) {
            return Ok(failure);
        }
        let mut state = self.lock()?;
        if !state.cone {
            return Ok(CommandOutput::failed(
                1,
                "fatal: sparse-checkout is not initialized",
            ));
        }
        state.sparse_path = Some(subfolder.to_owned());
        drop(state);
        Ok(CommandOutput::succeeded())
    }

    fn checkout_branch(&self, repo_path: &Path, branch: &str) -> io::Result<CommandOutput> {
        if let Some(failure) = self.record(GitStep::Checkout, repo_path, branch)? {
            return Ok(failure);
        }
        if let Some(failure) = self.not_a_repository(repo_path) {
            return Ok(failure);
        }
        let Some(files) = self.branches.get(branch) else {
            return Ok(CommandOutput::failed(
                1,
                format!("error: pathspec '{branch}' did not match any file(s) known to git"),
            ));
        };

        let sparse_path = self.lock()?.sparse_path.clone();
        for (path, contents) in files {
            if let Some(sparse) = sparse_path.as_deref()
                && !Self::in_cone(sparse, path)
            {
                continue;
            }
            let target = repo_path.join(path);
            if let Some(parent) = target.parent() {
                self.system.create_dir_all(parent)?;
            }
            self.system.write(&target, contents)?;
        }

        for (path, link_target) in self.links.get(branch).into_iter().flatten() {
            if let Some(sparse) = sparse_path.as_deref()
                && !Self::in_cone(sparse, path)
            {
                continue;
            }
            let link = repo_path.join(path);
            if let Some(parent) = link.parent() {
                self.system.create_dir_all(parent)?;
            }
            self.system.symlink(Path::new(link_target), &link)?;
        }

        Ok(CommandOutput::succeeded())
    }
}
