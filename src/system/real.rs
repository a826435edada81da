//! Real system implementation using `std::env` and `std::fs`

use super::{System, TempDirHandle, WalkEntry};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Prefix of every workspace directory
const TEMP_DIR_PREFIX: &str = ".subfetch-";

/// Production implementation of System trait
///
/// This implementation directly delegates to the standard library's
/// environment and filesystem functions.
#[derive(Debug, Clone, Copy)]
pub struct RealSystem;

impl RealSystem {
    /// Create a new `RealSystem` instance
    #[must_use]
    pub const fn new() -> Self {
        return Self;
    }
}

impl Default for RealSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Temporary directory on the real filesystem
struct RealTempDir {
    inner: TempDir,
}

impl TempDirHandle for RealTempDir {
    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        self.inner.close()
    }
}

impl System for RealSystem {
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        fs::copy(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        // Dangling symlinks still occupy the name
        path.symlink_metadata().is_ok()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.is_symlink()
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        create_symlink(target, link)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn walk_dir(&self, path: &Path) -> io::Result<Vec<WalkEntry>> {
        WalkDir::new(path)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                let entry = entry.map_err(io::Error::from)?;
                let file_type = entry.file_type();
                Ok(WalkEntry {
                    path: entry.into_path(),
                    is_file: file_type.is_file(),
                    is_dir: file_type.is_dir(),
                    is_symlink: file_type.is_symlink(),
                })
            })
            .collect()
    }

    fn create_temp_dir(&self, parent: &Path) -> io::Result<Box<dyn TempDirHandle>> {
        let inner = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(parent)?;
        Ok(Box::new(RealTempDir { inner }))
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    // Windows needs to know the link kind up front; relative targets resolve
    // against the link's directory
    let resolved = link
        .parent()
        .map_or_else(|| target.to_path_buf(), |dir| dir.join(target));
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
