use crate::operations::DEFAULT_BRANCH;
use clap::Parser;

/// Command-line arguments for subfetch
#[derive(Parser, Debug, Clone)]
#[command(name = "subfetch")]
#[command(about = "A CLI tool for fetching a single subfolder from a Git repository")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Git repository URL, org/repo shorthand, or local repository path
    #[arg(
        long = "repo_url",
        visible_alias = "repo-url",
        value_name = "REPO",
        env = "SUBFETCH_REPO_URL"
    )]
    pub repo_url: String,

    /// Path of the subfolder to fetch, relative to the repository root
    #[arg(
        long = "subfolder_name",
        visible_alias = "subfolder-name",
        value_name = "PATH",
        env = "SUBFETCH_SUBFOLDER_NAME"
    )]
    pub subfolder_name: String,

    /// Branch to check out
    #[arg(long, value_name = "REF", default_value = DEFAULT_BRANCH, env = "SUBFETCH_BRANCH")]
    pub branch: String,

    /// Directory that receives the fetched content
    #[arg(
        long = "dest_dir",
        visible_alias = "dest-dir",
        value_name = "DIR",
        default_value = "./",
        env = "SUBFETCH_DEST_DIR"
    )]
    pub dest_dir: String,

    /// Unpack the subfolder's contents directly into the destination (default)
    #[arg(long = "is_unpack", conflicts_with = "no_unpack")]
    pub is_unpack: bool,

    /// Keep the subfolder as a nested directory inside the destination
    #[arg(long = "no_unpack")]
    pub no_unpack: bool,

    /// Preview operations without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Git executable to run
    #[arg(long, value_name = "PATH", default_value = "git", env = "SUBFETCH_GIT")]
    pub git: String,
}

impl Args {
    /// Whether the subfolder contents are merged into the destination
    #[must_use]
    pub const fn unpack(&self) -> bool {
        !self.no_unpack
    }
}
