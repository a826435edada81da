//! # `subfetch`
//!
//! `subfetch` extracts a single subfolder from a Git repository without
//! downloading unrelated paths, using a blob-less clone and a cone-mode sparse
//! checkout, then places it into a destination directory.
//!
//! ## Usage
//!
//! **Unpack `tools/widget` into `./out`:**
//! ```sh
//! subfetch --repo_url https://example.com/org/repo.git --subfolder_name tools/widget --dest_dir ./out
//! ```
//!
//! **Keep the folder itself (`./out/widget`):**
//! ```sh
//! subfetch --repo_url org/repo --subfolder_name tools/widget --dest_dir ./out --no_unpack
//! ```
//!
//! See `subfetch --help` for more options.

use anyhow::Result;
use clap::Parser as _;
use subfetch::cli::Args;
use subfetch::error::FetchError;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over the verbose flag
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_target(false).with_env_filter(filter).init();

    match subfetch::run(&args) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            error!("{:#}", err);
            std::process::exit(
                err.downcast_ref::<FetchError>()
                    .map_or(1, FetchError::exit_code),
            );
        }
    }
}
