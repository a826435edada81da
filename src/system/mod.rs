//! System abstraction for environment and filesystem operations
//!
//! This module provides a unified trait for all external system interactions,
//! allowing the fetch orchestration to be tested against an in-memory filesystem.

use std::io;
use std::path::{Path, PathBuf};

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// Entry from directory walking
#[derive(Debug, Clone)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub is_file: bool,
    pub is_dir: bool,
    /// The entry is a symbolic link; `is_file` and `is_dir` are then false
    pub is_symlink: bool,
}

/// Temporary directory handle that cleans up on drop
///
/// For `RealSystem`, this wraps `tempfile::TempDir` and uses the real filesystem.
/// For `MockSystem`, this manages an in-memory temporary directory.
pub trait TempDirHandle {
    /// Get the path to the temporary directory
    fn path(&self) -> &Path;

    /// Remove the directory now, reporting any failure instead of ignoring it
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Unified trait for system operations (environment + filesystem)
///
/// # Implementations
/// - `RealSystem`: Production implementation using `std::env` and `std::fs`
/// - `MockSystem`: Test implementation using in-memory storage
pub trait System: Send + Sync {
    // ==================== Environment Operations ====================

    /// Get the current working directory
    fn current_dir(&self) -> io::Result<PathBuf>;

    /// Get the home directory of the current user, if known
    fn home_dir(&self) -> Option<PathBuf>;

    // ==================== Filesystem Operations ====================

    /// Read entire file contents
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write bytes to a file, creating it if it doesn't exist
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Recursively create a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and all its contents
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Rename a file or directory, failing if `to` is on another filesystem
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy a file from source to destination
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path points to a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path points to a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path is a symbolic link, without following it
    fn is_symlink(&self, path: &Path) -> bool;

    /// Read the target of a symbolic link
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create a symbolic link at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Read directory entries, returning paths of all entries
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Recursively walk a directory, returning all entries
    ///
    /// The root itself is excluded. Entries are sorted by path so that parents
    /// come before their children. Symbolic links are reported, not followed.
    fn walk_dir(&self, path: &Path) -> io::Result<Vec<WalkEntry>>;

    /// Create a uniquely named temporary directory inside `parent` that is
    /// removed on drop
    fn create_temp_dir(&self, parent: &Path) -> io::Result<Box<dyn TempDirHandle>>;
}
