//! Path manipulation and validation utilities

use crate::error::FetchError;
use crate::system::System;
use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` components
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {
                // Skip '.' components
            }
            Component::ParentDir => {
                // Keep leading '..', never climb above the root
                match components.last() {
                    None | Some(Component::ParentDir) => components.push(component),
                    Some(Component::RootDir | Component::Prefix(_)) => {}
                    Some(_) => {
                        components.pop();
                    }
                }
            }
            _ => {
                components.push(component);
            }
        }
    }

    components.iter().collect()
}

/// Validate a subfolder path inside the repository and return it normalized
///
/// The result uses `/` separators, as git expects for sparse checkout paths.
///
/// # Errors
///
/// Returns a configuration error if the path is empty, absolute, escapes the
/// repository root, or looks like a command-line option
pub fn validate_subfolder(subfolder: &str) -> Result<String> {
    let trimmed = subfolder.trim().trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        return Err(FetchError::configuration("Subfolder name cannot be empty").into());
    }

    if trimmed.starts_with('-') {
        return Err(FetchError::configuration(format!(
            "Subfolder name must not start with '-': '{subfolder}'"
        ))
        .into());
    }

    let path = Path::new(trimmed);
    if path.is_absolute() || trimmed.starts_with('/') {
        return Err(FetchError::configuration(format!(
            "Subfolder must be relative to the repository root: '{subfolder}'"
        ))
        .into());
    }

    let normalized = normalize_path(path);
    if normalized.as_os_str().is_empty() {
        return Err(FetchError::configuration(format!(
            "Subfolder resolves to the repository root: '{subfolder}'"
        ))
        .into());
    }
    if normalized.starts_with("..") {
        return Err(FetchError::configuration(format!(
            "Subfolder contains unsafe directory traversal: '{subfolder}' -> '{}'",
            normalized.display()
        ))
        .into());
    }

    let parts: Vec<String> = normalized
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Last path component of a validated subfolder, used as the nested folder name
#[must_use]
pub fn subfolder_leaf_name(subfolder: &str) -> &str {
    subfolder.rsplit('/').next().unwrap_or(subfolder)
}

/// Expand a leading `~` to the user's home directory
///
/// # Errors
///
/// Returns a configuration error if the path starts with `~` and the home
/// directory cannot be determined
pub fn expand_home(system: &dyn System, path: &str) -> Result<PathBuf> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };

    // "~user" is not expanded
    if !rest.is_empty() && !rest.starts_with(['/', '\\']) {
        return Ok(PathBuf::from(path));
    }

    let home = system
        .home_dir()
        .ok_or_else(|| FetchError::configuration("Cannot determine home directory for ~ expansion"))?;

    Ok(home.join(rest.trim_start_matches(['/', '\\'])))
}

/// Resolve the destination directory to a normalized absolute path
///
/// # Errors
///
/// Returns an error if the destination is empty, `~` cannot be expanded, or
/// the current directory is unavailable
pub fn resolve_destination(system: &dyn System, dest_dir: &str) -> Result<PathBuf> {
    if dest_dir.trim().is_empty() {
        return Err(FetchError::configuration("Destination directory cannot be empty").into());
    }

    let expanded = expand_home(system, dest_dir)?;
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        system
            .current_dir()
            .map_err(|e| FetchError::configuration(format!("Cannot get current directory: {e}")))?
            .join(expanded)
    };

    Ok(normalize_path(&absolute))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize_path(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_path(Path::new("/out/./x/..")), PathBuf::from("/out"));
    }

    #[test]
    fn test_validate_subfolder_normalizes() {
        assert_eq!(validate_subfolder("tools/widget").unwrap(), "tools/widget");
        assert_eq!(validate_subfolder("tools/widget/").unwrap(), "tools/widget");
        assert_eq!(validate_subfolder("./tools/./widget").unwrap(), "tools/widget");
        assert_eq!(validate_subfolder("a/b/../c").unwrap(), "a/c");
    }

    #[test]
    fn test_validate_subfolder_rejects_unsafe_paths() {
        for subfolder in ["", "  ", "/", "/etc", "..", "../outside", "a/../..", ".", "-x"] {
            assert!(
                validate_subfolder(subfolder).is_err(),
                "{subfolder:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_subfolder_leaf_name() {
        assert_eq!(subfolder_leaf_name("tools/widget"), "widget");
        assert_eq!(subfolder_leaf_name("utils"), "utils");
    }

    #[test]
    fn test_expand_home() {
        let system = MockSystem::new().with_home("/home/dev").unwrap();

        assert_eq!(expand_home(&system, "~").unwrap(), PathBuf::from("/home/dev"));
        assert_eq!(
            expand_home(&system, "~/out").unwrap(),
            PathBuf::from("/home/dev/out")
        );
        assert_eq!(expand_home(&system, "~other/x").unwrap(), PathBuf::from("~other/x"));
        assert_eq!(expand_home(&system, "./out").unwrap(), PathBuf::from("./out"));

        let homeless = MockSystem::new();
        assert!(expand_home(&homeless, "~/out").is_err());
    }

    #[test]
    fn test_resolve_destination() {
        let system = MockSystem::new()
            .with_current_dir("/work")
            .unwrap()
            .with_home("/home/dev")
            .unwrap();

        assert_eq!(resolve_destination(&system, "./").unwrap(), PathBuf::from("/work"));
        assert_eq!(
            resolve_destination(&system, "./out").unwrap(),
            PathBuf::from("/work/out")
        );
        assert_eq!(
            resolve_destination(&system, "../shared").unwrap(),
            PathBuf::from("/shared")
        );
        assert_eq!(
            resolve_destination(&system, "~/lib").unwrap(),
            PathBuf::from("/home/dev/lib")
        );
        assert!(resolve_destination(&system, "").is_err());
    }
}
