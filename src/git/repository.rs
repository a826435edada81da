//! Git repository location handling and URL parsing

use crate::error::FetchError;
use crate::system::System;
use crate::utils::path::expand_home;
use anyhow::Result;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// `<scheme>://...` or `<transport>::...`, both handed to git untouched
static URL_PREFIX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*(://|::)"));

/// Where the repository lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositorySource {
    /// Remote repository reached over a network transport
    Remote {
        /// URL handed to `git clone`
        url: String,
    },
    /// Repository on the local filesystem
    Local {
        /// Resolved absolute path handed to `git clone`
        resolved_path: PathBuf,
    },
}

/// Represents a repository location as given by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub location: String,
    pub source: RepositorySource,
}

impl Repository {
    /// Create a new repository from a URL or local path
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the location is empty or in an
    /// unsupported format
    pub fn new(system: &dyn System, location: &str) -> Result<Self> {
        let source = detect_source_type(system, location.trim())?;

        return Ok(Self {
            location: location.to_owned(),
            source,
        });
    }

    /// Location string passed to `git clone`
    #[must_use]
    pub fn clone_url(&self) -> String {
        match &self.source {
            RepositorySource::Remote { url } => url.clone(),
            RepositorySource::Local { resolved_path } => {
                resolved_path.to_string_lossy().into_owned()
            }
        }
    }

    /// Get the original location as provided
    #[must_use]
    pub fn original_location(&self) -> &str {
        &self.location
    }

    /// Check if this is a local filesystem repository
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self.source, RepositorySource::Local { .. })
    }
}

/// Detect whether the location is a remote URL or a local repository path
fn detect_source_type(system: &dyn System, location: &str) -> Result<RepositorySource> {
    if location.is_empty() {
        return Err(FetchError::configuration("Repository location cannot be empty").into());
    }

    if location.starts_with('-') {
        return Err(FetchError::configuration(format!(
            "Repository location must not start with '-': '{location}'"
        ))
        .into());
    }

    let url_prefix = URL_PREFIX
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Invalid URL pattern: {e}"))?;
    if url_prefix.is_match(location) {
        return Ok(RepositorySource::Remote {
            url: location.to_owned(),
        });
    }

    // Like `git clone`, an existing directory wins over scp syntax and shorthand
    let expanded = expand_home(system, location)?;
    let candidate = if expanded.is_absolute() {
        expanded
    } else {
        system
            .current_dir()
            .map_err(|e| FetchError::configuration(format!("Cannot get current directory: {e}")))?
            .join(expanded)
    };
    if system.is_dir(&candidate) {
        return Ok(RepositorySource::Local {
            resolved_path: candidate,
        });
    }

    if is_scp_like(location) {
        return Ok(RepositorySource::Remote {
            url: location.to_owned(),
        });
    }

    // Short format: myorg/repo -> https://github.com/myorg/repo.git
    if location.matches('/').count() == 1
        && !location.contains(':')
        && !location.starts_with(['/', '.', '~'])
        && !location.ends_with('/')
    {
        let url = if location.ends_with(".git") {
            format!("https://github.com/{location}")
        } else {
            format!("https://github.com/{location}.git")
        };
        return Ok(RepositorySource::Remote { url });
    }

    Err(FetchError::configuration(format!(
        "Unsupported repository location: '{location}'\n\
        Supported formats:\n\
        - Short: myorg/repo\n\
        - HTTPS: https://github.com/myorg/repo.git\n\
        - SSH: git@github.com:myorg/repo.git or host:path/repo.git\n\
        - Any git transport: ftp://host/repo.git, ext::<command>\n\
        - Local: file:///path/to/repo or an existing directory"
    ))
    .into())
}

/// `[user@]host:path`, the scp-like syntax git accepts for SSH
///
/// Git takes any location with a colon before the first slash as scp-like,
/// apart from Windows drive letters.
fn is_scp_like(location: &str) -> bool {
    let Some((host_part, path_part)) = location.split_once(':') else {
        return false;
    };
    if cfg!(windows) && host_part.len() == 1 && host_part.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    !host_part.is_empty() && !host_part.contains('/') && !path_part.is_empty()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    fn remote_url(location: &str) -> String {
        let system = MockSystem::new();
        let repo = Repository::new(&system, location).unwrap();
        assert!(!repo.is_local());
        repo.clone_url()
    }

    #[test]
    fn test_remote_urls_pass_through() {
        assert_eq!(
            remote_url("https://example.com/org/repo.git"),
            "https://example.com/org/repo.git"
        );
        assert_eq!(
            remote_url("https://github.com/myorg/repo"),
            "https://github.com/myorg/repo"
        );
        assert_eq!(
            remote_url("git@github.com:myorg/repo.git"),
            "git@github.com:myorg/repo.git"
        );
        assert_eq!(
            remote_url("ssh://git@host:2222/repo.git"),
            "ssh://git@host:2222/repo.git"
        );
        assert_eq!(remote_url("file:///srv/git/repo"), "file:///srv/git/repo");
    }

    #[test]
    fn test_any_git_transport_passes_through() {
        for location in [
            "github.com:org/repo.git",
            "myserver:repos/tool.git",
            "ftp://host/r.git",
            "ftps://host/r.git",
            "git+ssh://git@host/repo.git",
            "ext::ssh -p 2222 host %S repo.git",
            "fd::3",
        ] {
            assert_eq!(remote_url(location), location);
        }
    }

    #[test]
    fn test_existing_directory_with_colon_is_local() {
        let system = MockSystem::new()
            .with_current_dir("/work")
            .unwrap()
            .with_dir("/work/mirror:tool")
            .unwrap();

        let repo = Repository::new(&system, "mirror:tool").unwrap();
        assert!(repo.is_local());
        assert_eq!(repo.clone_url(), "/work/mirror:tool");
    }

    #[test]
    fn test_short_format_expands_to_github() {
        assert_eq!(remote_url("myorg/repo"), "https://github.com/myorg/repo.git");
        assert_eq!(remote_url("myorg/repo.git"), "https://github.com/myorg/repo.git");
    }

    #[test]
    fn test_existing_directory_is_local() {
        let system = MockSystem::new()
            .with_current_dir("/work")
            .unwrap()
            .with_dir("/work/myorg/repo")
            .unwrap()
            .with_home("/home/dev")
            .unwrap()
            .with_dir("/home/dev/src/tool")
            .unwrap();

        let relative = Repository::new(&system, "myorg/repo").unwrap();
        assert!(relative.is_local());
        assert_eq!(relative.clone_url(), "/work/myorg/repo");
        assert_eq!(relative.original_location(), "myorg/repo");

        let home = Repository::new(&system, "~/src/tool").unwrap();
        assert_eq!(
            home.source,
            RepositorySource::Local {
                resolved_path: PathBuf::from("/home/dev/src/tool")
            }
        );
    }

    #[test]
    fn test_invalid_locations() {
        let system = MockSystem::new();
        for location in [
            "",
            "invalid",
            "too/many/slashes",
            "--upload-pack=evil",
            "/missing/dir",
            "dir/with:colon",
            "host:",
            ":path",
        ] {
            assert!(
                Repository::new(&system, location).is_err(),
                "{location:?} should be rejected"
            );
        }
    }
}
