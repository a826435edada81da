//! Subfolder fetch coordination

use crate::cli::Args;
use crate::error::{FetchError, FsOp};
use crate::git::{
    CommandOutput, GitStep, Repository, VersionControl, validate_reference,
};
use crate::operations::relocate::{RelocationMode, relocate};
use crate::system::System;
use crate::utils::fs::remove_existing;
use crate::utils::path::{resolve_destination, subfolder_leaf_name, validate_subfolder};
use anyhow::Result;
use core::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the clone directory inside the temporary workspace
const CHECKOUT_DIR: &str = "checkout";

/// Branch used when none is given
pub const DEFAULT_BRANCH: &str = "main";

/// Validated input of a single fetch
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct FetchRequest {
    pub repository: Repository,
    /// Normalized, `/`-separated path inside the repository
    pub subfolder: String,
    pub branch: String,
    /// Absolute destination directory
    pub destination: PathBuf,
    pub mode: RelocationMode,
}

impl FetchRequest {
    /// Validate raw inputs into a request
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the repository location, subfolder,
    /// branch or destination is invalid
    #[inline]
    pub fn new(
        system: &dyn System,
        repo_location: &str,
        subfolder: &str,
        branch: &str,
        destination: &str,
        unpack: bool,
    ) -> Result<Self> {
        let repository = Repository::new(system, repo_location)?;
        let subfolder = validate_subfolder(subfolder)?;
        validate_reference(branch)?;
        let destination = resolve_destination(system, destination)?;

        Ok(Self {
            repository,
            subfolder,
            branch: branch.to_owned(),
            destination,
            mode: RelocationMode::from_unpack(unpack),
        })
    }

    /// Build a request from parsed command-line arguments
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any argument is invalid
    #[inline]
    pub fn from_args(system: &dyn System, args: &Args) -> Result<Self> {
        Self::new(
            system,
            &args.repo_url,
            &args.subfolder_name,
            &args.branch,
            &args.dest_dir,
            args.unpack(),
        )
    }

    /// Folder name used in nested mode
    #[must_use]
    #[inline]
    pub fn leaf_name(&self) -> &str {
        subfolder_leaf_name(&self.subfolder)
    }
}

/// Outcome of a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct FetchReport {
    pub subfolder: String,
    pub repository: String,
    pub branch: String,
    pub destination: PathBuf,
    pub mode: RelocationMode,
    /// Top-level paths created in the destination
    pub relocated: Vec<PathBuf>,
}

/// Fetches one subfolder of a repository into a local directory
#[non_exhaustive]
pub struct SubfolderFetcher<'src> {
    system: &'src dyn System,
    vcs: &'src dyn VersionControl,
}

impl<'src> SubfolderFetcher<'src> {
    #[must_use]
    #[inline]
    pub fn new(system: &'src dyn System, vcs: &'src dyn VersionControl) -> Self {
        Self { system, vcs }
    }

    /// Run the whole fetch: clone, sparse checkout, relocate, clean up
    ///
    /// The temporary workspace is created in the destination, or its nearest
    /// existing ancestor, so relocation is a rename on one filesystem. It is
    /// removed on every return path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A git step exits non-zero or cannot be launched
    /// - The subfolder does not exist on the requested branch
    /// - The workspace or destination cannot be modified
    #[inline]
    pub fn fetch(&self, request: &FetchRequest) -> Result<FetchReport> {
        let workspace_parent = self.workspace_parent(&request.destination);
        let workspace = self
            .system
            .create_temp_dir(&workspace_parent)
            .map_err(|e| FetchError::filesystem(FsOp::CreateWorkspace, &workspace_parent, e))?;
        let workspace_path = workspace.path().to_path_buf();
        debug!("Temporary workspace: {}", workspace_path.display());

        // On error the handle is dropped here and removes the workspace
        let relocated = self.fetch_in(request, &workspace_path.join(CHECKOUT_DIR))?;

        workspace
            .close()
            .map_err(|e| FetchError::filesystem(FsOp::CleanupWorkspace, &workspace_path, e))?;
        debug!("Temporary workspace removed");

        match request.mode {
            RelocationMode::Unpack => info!(
                "\u{2713} Unpacked '{}' from '{}' (branch {}) into '{}'",
                request.subfolder,
                request.repository.original_location(),
                request.branch,
                request.destination.display()
            ),
            RelocationMode::Nested => info!(
                "\u{2713} Fetched '{}' from '{}' (branch {}) to '{}'",
                request.subfolder,
                request.repository.original_location(),
                request.branch,
                request.destination.join(request.leaf_name()).display()
            ),
        }

        Ok(FetchReport {
            subfolder: request.subfolder.clone(),
            repository: request.repository.original_location().to_owned(),
            branch: request.branch.clone(),
            destination: request.destination.clone(),
            mode: request.mode,
            relocated,
        })
    }

    /// `destination` if it is a directory, else its nearest existing ancestor
    fn workspace_parent(&self, destination: &Path) -> PathBuf {
        destination
            .ancestors()
            .find(|dir| self.system.is_dir(dir))
            .map_or_else(|| destination.to_path_buf(), Path::to_path_buf)
    }

    /// Steps from clone to relocation, inside an already acquired workspace
    fn fetch_in(&self, request: &FetchRequest, checkout_path: &Path) -> Result<Vec<PathBuf>> {
        if self.system.exists(checkout_path) {
            remove_existing(self.system, checkout_path)?;
        }

        let clone_url = request.repository.clone_url();
        info!(
            "Cloning {} into temporary workspace",
            request.repository.original_location()
        );
        Self::check_step(
            GitStep::Clone,
            self.vcs.clone_no_checkout(&clone_url, checkout_path),
        )?;

        info!(
            "Initializing sparse checkout for subfolder: {}",
            request.subfolder
        );
        Self::check_step(
            GitStep::SparseCheckoutInit,
            self.vcs.sparse_checkout_init(checkout_path),
        )?;
        Self::check_step(
            GitStep::SparseCheckoutSet,
            self.vcs.sparse_checkout_set(checkout_path, &request.subfolder),
        )?;

        info!("Checking out branch: {}", request.branch);
        Self::check_step(
            GitStep::Checkout,
            self.vcs.checkout_branch(checkout_path, &request.branch),
        )?;

        let source_path = checkout_path.join(&request.subfolder);
        if !self.system.is_dir(&source_path) {
            debug!("{}", self.checkout_diagnostics(request, checkout_path));
            return Err(
                FetchError::subfolder_not_found(&request.subfolder, &request.branch).into(),
            );
        }

        match request.mode {
            RelocationMode::Unpack => info!(
                "Unpacking contents of {} into {}",
                request.subfolder,
                request.destination.display()
            ),
            RelocationMode::Nested => info!(
                "Moving {} into {}",
                request.subfolder,
                request.destination.display()
            ),
        }

        relocate(
            self.system,
            &source_path,
            &request.destination,
            request.mode,
            request.leaf_name(),
        )
    }

    /// Turn a command result into an error unless git exited successfully
    fn check_step(step: GitStep, result: io::Result<CommandOutput>) -> Result<()> {
        let output = result.map_err(|e| {
            FetchError::version_control(step, None, format!("failed to run git: {e}"))
        })?;

        if !output.success() {
            return Err(FetchError::version_control(step, output.status, output.stderr).into());
        }

        debug!("git {step} done");
        Ok(())
    }

    /// Describe what the checkout actually produced, for a missing subfolder
    fn checkout_diagnostics(&self, request: &FetchRequest, checkout_path: &Path) -> String {
        let mut diagnostics = String::new();

        let _ = writeln!(
            diagnostics,
            "Sparse checkout diagnostics:\n  Repository: {}\n  Branch: {}\n  Requested path: {}",
            request.repository.original_location(),
            request.branch,
            request.subfolder
        );
        diagnostics.push_str("  Checked out entries:\n");

        match self.system.read_dir(checkout_path) {
            Ok(entries) => {
                let found: Vec<String> = entries
                    .iter()
                    .filter_map(|entry| entry.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .filter(|name| name != ".git")
                    .collect();
                if found.is_empty() {
                    diagnostics.push_str("    (empty - no files were checked out)\n");
                }
                for name in found {
                    let _ = writeln!(diagnostics, "    - {name}");
                }
            }
            Err(e) => {
                let _ = writeln!(diagnostics, "    (unable to read directory: {e})");
            }
        }

        diagnostics
    }

    /// Describe the steps `fetch` would run, without running anything
    #[must_use]
    #[inline]
    pub fn preview(&self, request: &FetchRequest) -> Vec<String> {
        let relocation = match request.mode {
            RelocationMode::Unpack => format!(
                "Unpack contents of '{}' into {}, replacing entries with the same names",
                request.subfolder,
                request.destination.display()
            ),
            RelocationMode::Nested => format!(
                "Move '{}' to {}",
                request.subfolder,
                request.destination.join(request.leaf_name()).display()
            ),
        };

        vec![
            format!(
                "Create temporary workspace in {}",
                self.workspace_parent(&request.destination).display()
            ),
            format!(
                "git clone --filter=blob:none --no-checkout {} <workspace>/{CHECKOUT_DIR}",
                request.repository.clone_url()
            ),
            "git sparse-checkout init --cone".to_owned(),
            format!("git sparse-checkout set {}", request.subfolder),
            format!("git checkout {}", request.branch),
            relocation,
            "Remove temporary workspace".to_owned(),
        ]
    }
}
