//! `subfetch` - A CLI tool for fetching a single subfolder from a Git repository
//!
//! This library clones a repository without checking out files, restricts a
//! cone-mode sparse checkout to one subfolder, checks out a branch, and moves
//! the subfolder into a destination directory, either unpacked or nested.

pub mod cli;
pub mod error;
pub mod git;
pub mod operations;
pub mod system;
pub mod utils;

use anyhow::{Context as _, Result};
use cli::Args;
use git::GitCli;
use operations::{FetchRequest, SubfolderFetcher};
use system::RealSystem;
use tracing::info;

/// Main entry point for the subfetch library
///
/// # Errors
///
/// Returns an error if the arguments are invalid, git is unavailable, or the
/// fetch fails
pub fn run(args: &Args) -> Result<()> {
    let system = RealSystem;
    let git = GitCli::new(args.git.clone());
    let request = FetchRequest::from_args(&system, args)?;
    let fetcher = SubfolderFetcher::new(&system, &git);

    if args.dry_run {
        return preview(&fetcher, &request);
    }

    git.check_availability().context("Git validation failed")?;
    fetcher.fetch(&request)?;

    Ok(())
}

/// Log the planned steps without executing them
fn preview(fetcher: &SubfolderFetcher<'_>, request: &FetchRequest) -> Result<()> {
    info!("Dry run preview - no files will be modified:");
    info!("");
    info!("Planned operations:");
    for (index, step) in fetcher.preview(request).iter().enumerate() {
        info!("  [{}] {}", index + 1, step);
    }
    info!("");
    info!("Run without --dry-run to execute these operations.");

    Ok(())
}
