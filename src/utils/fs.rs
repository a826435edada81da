//! File system utilities

use crate::error::{FetchError, FsOp};
use crate::system::System;
use anyhow::Result;
use std::io;
use std::path::Path;
use tracing::debug;

/// Create parent directories for a file path if they don't exist
pub fn create_parent_directories(system: &dyn System, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent()
        && !system.exists(parent)
    {
        system
            .create_dir_all(parent)
            .map_err(|e| FetchError::filesystem(FsOp::CreateDir, parent, e))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir_exists(system: &dyn System, dir_path: &Path) -> Result<()> {
    if !system.exists(dir_path) {
        system
            .create_dir_all(dir_path)
            .map_err(|e| FetchError::filesystem(FsOp::CreateDir, dir_path, e))?;
    } else if !system.is_dir(dir_path) {
        return Err(FetchError::filesystem(
            FsOp::CreateDir,
            dir_path,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        )
        .into());
    }
    Ok(())
}

/// Remove whatever occupies `path`: directories recursively, anything else as a file
///
/// A symbolic link is removed itself, never the directory it points to.
pub fn remove_existing(system: &dyn System, path: &Path) -> Result<()> {
    let removed = if system.is_dir(path) && !system.is_symlink(path) {
        system.remove_dir_all(path)
    } else {
        system.remove_file(path)
    };
    removed.map_err(|e| FetchError::filesystem(FsOp::Remove, path, e))?;
    Ok(())
}

/// Move a file or directory to `to`, which must not exist yet
///
/// Falls back to copy-then-remove when the two paths are on different
/// filesystems.
pub fn move_path(system: &dyn System, from: &Path, to: &Path) -> Result<()> {
    match system.rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "Cross-device move of {}, copying instead",
                from.display()
            );
            copy_tree(system, from, to)?;
            remove_existing(system, from)
        }
        Err(e) => Err(FetchError::filesystem(FsOp::Move, from, e).into()),
    }
}

/// Recreate the symbolic link `from` at `to` with the same target
fn copy_symlink(system: &dyn System, from: &Path, to: &Path) -> Result<()> {
    let target = system
        .read_link(from)
        .map_err(|e| FetchError::filesystem(FsOp::Move, from, e))?;
    create_parent_directories(system, to)?;
    system
        .symlink(&target, to)
        .map_err(|e| FetchError::filesystem(FsOp::Move, to, e))?;
    Ok(())
}

/// Copy a file or a directory tree, returning the number of files copied
///
/// Symbolic links are recreated as links, dangling ones included, and count
/// as files.
pub fn copy_tree(system: &dyn System, from: &Path, to: &Path) -> Result<usize> {
    let copy_err = |e: io::Error| FetchError::filesystem(FsOp::Move, from, e);

    if system.is_symlink(from) {
        copy_symlink(system, from, to)?;
        return Ok(1);
    }
    if !system.is_dir(from) {
        create_parent_directories(system, to)?;
        system.copy(from, to).map_err(copy_err)?;
        return Ok(1);
    }

    system
        .create_dir_all(to)
        .map_err(|e| FetchError::filesystem(FsOp::CreateDir, to, e))?;

    let mut files_copied = 0;
    for entry in system.walk_dir(from).map_err(copy_err)? {
        let relative_path = entry.path.strip_prefix(from).map_err(|e| {
            FetchError::filesystem(FsOp::Move, &entry.path, io::Error::other(e))
        })?;
        let target_path = to.join(relative_path);

        if entry.is_symlink {
            copy_symlink(system, &entry.path, &target_path)?;
            files_copied += 1;
        } else if entry.is_dir {
            system
                .create_dir_all(&target_path)
                .map_err(|e| FetchError::filesystem(FsOp::CreateDir, &target_path, e))?;
        } else {
            create_parent_directories(system, &target_path)?;
            system.copy(&entry.path, &target_path).map_err(copy_err)?;
            files_copied += 1;
        }
    }

    Ok(files_copied)
}
