//! Moving a fetched subfolder into the destination directory

use crate::error::{FetchError, FsOp};
use crate::system::System;
use crate::utils::fs::{ensure_dir_exists, move_path, remove_existing};
use anyhow::Result;
use core::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the fetched subfolder lands in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationMode {
    /// Merge the subfolder's immediate children into the destination
    Unpack,
    /// Move the subfolder itself under the destination
    Nested,
}

impl RelocationMode {
    #[must_use]
    #[inline]
    pub const fn from_unpack(unpack: bool) -> Self {
        if unpack { Self::Unpack } else { Self::Nested }
    }
}

impl fmt::Display for RelocationMode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unpack => f.write_str("unpack"),
            Self::Nested => f.write_str("nested"),
        }
    }
}

/// Relocate `source` into `destination`, returning the top-level paths created
///
/// # Errors
///
/// Returns a filesystem error if the destination cannot be created, an entry
/// cannot be replaced or moved, or (nested mode) the destination already
/// holds an entry named `leaf_name`
pub fn relocate(
    system: &dyn System,
    source: &Path,
    destination: &Path,
    mode: RelocationMode,
    leaf_name: &str,
) -> Result<Vec<PathBuf>> {
    ensure_dir_exists(system, destination)?;

    match mode {
        RelocationMode::Unpack => unpack_into(system, source, destination),
        RelocationMode::Nested => {
            move_nested(system, source, destination, leaf_name).map(|target| vec![target])
        }
    }
}

/// Move every immediate child of `source` into `destination`, replacing collisions
fn unpack_into(system: &dyn System, source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    let children = system
        .read_dir(source)
        .map_err(|e| FetchError::filesystem(FsOp::ReadDir, source, e))?;

    let mut relocated = Vec::with_capacity(children.len());
    for child in children {
        let Some(name) = child.file_name() else {
            continue;
        };
        let target = destination.join(name);

        if system.exists(&target) {
            debug!("Replacing existing {}", target.display());
            remove_existing(system, &target)?;
        }

        move_path(system, &child, &target)?;
        relocated.push(target);
    }

    relocated.sort();
    Ok(relocated)
}

/// Move `source` to `destination/leaf_name`, which must not exist
fn move_nested(
    system: &dyn System,
    source: &Path,
    destination: &Path,
    leaf_name: &str,
) -> Result<PathBuf> {
    let target = destination.join(leaf_name);

    if system.exists(&target) {
        return Err(FetchError::filesystem(
            FsOp::Move,
            &target,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "destination already contains an entry with this name; remove it or use unpack mode",
            ),
        )
        .into());
    }

    move_path(system, source, &target)?;
    Ok(target)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    fn fetched_tree() -> MockSystem {
        MockSystem::new()
            .with_file("/ws/tools/widget/a.txt", b"new a")
            .unwrap()
            .with_file("/ws/tools/widget/nested/b.txt", b"new b")
            .unwrap()
    }

    #[test]
    fn test_unpack_merges_children() {
        let system = fetched_tree().with_file("/out/keep.txt", b"keep").unwrap();

        let relocated = relocate(
            &system,
            Path::new("/ws/tools/widget"),
            Path::new("/out"),
            RelocationMode::Unpack,
            "widget",
        )
        .unwrap();

        assert_eq!(
            relocated,
            vec![PathBuf::from("/out/a.txt"), PathBuf::from("/out/nested")]
        );
        assert_eq!(system.read(Path::new("/out/a.txt")).unwrap(), b"new a");
        assert_eq!(system.read(Path::new("/out/nested/b.txt")).unwrap(), b"new b");
        assert_eq!(system.read(Path::new("/out/keep.txt")).unwrap(), b"keep");
        assert!(!system.exists(Path::new("/out/tools")));
    }

    #[test]
    fn test_unpack_replaces_file_and_directory_collisions() {
        let system = fetched_tree()
            .with_file("/out/a.txt", b"old a")
            .unwrap()
            .with_file("/out/nested/stale.txt", b"stale")
            .unwrap();

        relocate(
            &system,
            Path::new("/ws/tools/widget"),
            Path::new("/out"),
            RelocationMode::Unpack,
            "widget",
        )
        .unwrap();

        assert_eq!(system.read(Path::new("/out/a.txt")).unwrap(), b"new a");
        assert!(!system.exists(Path::new("/out/nested/stale.txt")));
        assert_eq!(
            system.files_under("/out").unwrap(),
            vec![PathBuf::from("/out/a.txt"), PathBuf::from("/out/nested/b.txt")]
        );
    }

    #[test]
    fn test_unpack_replaces_directory_with_file_of_same_name() {
        let system = fetched_tree().with_file("/out/a.txt/inner", b"dir").unwrap();

        relocate(
            &system,
            Path::new("/ws/tools/widget"),
            Path::new("/out"),
            RelocationMode::Unpack,
            "widget",
        )
        .unwrap();

        assert!(system.is_file(Path::new("/out/a.txt")));
        assert!(!system.exists(Path::new("/out/a.txt/inner")));
    }

    #[test]
    fn test_nested_keeps_subfolder_name() {
        let system = fetched_tree();

        let relocated = relocate(
            &system,
            Path::new("/ws/tools/widget"),
            Path::new("/out/deeper"),
            RelocationMode::Nested,
            "widget",
        )
        .unwrap();

        assert_eq!(relocated, vec![PathBuf::from("/out/deeper/widget")]);
        assert_eq!(
            system.read(Path::new("/out/deeper/widget/nested/b.txt")).unwrap(),
            b"new b"
        );
        assert!(!system.exists(Path::new("/ws/tools/widget")));
    }

    #[test]
    fn test_nested_refuses_existing_entry() {
        let system = fetched_tree().with_file("/out/widget/old.txt", b"old").unwrap();

        let err = relocate(
            &system,
            Path::new("/ws/tools/widget"),
            Path::new("/out"),
            RelocationMode::Nested,
            "widget",
        )
        .unwrap_err();

        assert!(err.to_string().contains("failed to move '/out/widget'"));
        assert_eq!(system.read(Path::new("/out/widget/old.txt")).unwrap(), b"old");
    }
}
