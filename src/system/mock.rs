//! Mock system implementation for testing

#![expect(clippy::module_name_repetitions)]

use tracing::error;

use super::{System, TempDirHandle, WalkEntry};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// Global counter for generating unique temp directory IDs
static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// In-memory implementation of System trait for testing
///
/// `MockSystem` provides an in-memory filesystem and environment,
/// for fast, isolated unit tests without side effects. Clones share state.
///
/// # Example
/// ```
/// use subfetch::system::{mock::MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_home("/home/user").unwrap()
///     .with_file("/test/file.txt", b"Hello, world!").unwrap()
///     .with_dir("/test/subdir").unwrap();
///
/// assert_eq!(system.home_dir().unwrap(), Path::new("/home/user"));
/// assert!(system.exists(Path::new("/test/file.txt")));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    home_dir: Option<PathBuf>,
    current_dir: PathBuf,
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    /// Link path to link target, stored verbatim
    symlinks: HashMap<PathBuf, PathBuf>,
    /// Make every rename fail as if crossing filesystems
    cross_device_renames: bool,
}

fn not_found(what: &str, path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{what} not found: {}", path.display()),
    )
}

impl MockSystem {
    /// Create a new `MockSystem` with default state
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                home_dir: None,
                current_dir: PathBuf::from("/"),
                files: HashMap::new(),
                dirs: HashSet::from([PathBuf::from("/")]),
                symlinks: HashMap::new(),
                cross_device_renames: false,
            })),
        }
    }

    fn read_state(&self) -> io::Result<RwLockReadGuard<'_, MockSystemState>> {
        self.state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn write_state(&self) -> io::Result<RwLockWriteGuard<'_, MockSystemState>> {
        self.state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    /// Set the home directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_home<P: AsRef<Path>>(self, dir: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.home_dir = Some(dir.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    /// Set the current working directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_current_dir<P: AsRef<Path>>(self, dir: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        let dir = dir.as_ref().to_path_buf();
        Self::ensure_parent_dirs(&mut state.dirs, &dir);
        state.current_dir = dir;
        drop(state);
        Ok(self)
    }

    /// Add a file with contents, creating parent directories (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;

        if let Some(parent) = path_buf.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }

        state.files.insert(path_buf, contents.to_vec());
        drop(state);
        Ok(self)
    }

    /// Add a directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;
        Self::ensure_parent_dirs(&mut state.dirs, &path_buf);
        drop(state);
        Ok(self)
    }

    /// Add a symbolic link at `link` pointing to `target` (builder pattern)
    ///
    /// The target is stored as given and need not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_symlink<P: AsRef<Path>, T: AsRef<Path>>(self, link: P, target: T) -> io::Result<Self> {
        let link = link.as_ref().to_path_buf();
        let mut state = self.write_state()?;
        if let Some(parent) = link.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }
        state.symlinks.insert(link, target.as_ref().to_path_buf());
        drop(state);
        Ok(self)
    }

    /// Make renames fail with `CrossesDevices`, as between two filesystems
    /// (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn with_cross_device_renames(self) -> io::Result<Self> {
        let mut state = self.write_state()?;
        state.cross_device_renames = true;
        drop(state);
        Ok(self)
    }

    /// List every file path currently stored under `root`, sorted
    ///
    /// # Errors
    ///
    /// Returns an error if the state lock is poisoned
    #[inline]
    pub fn files_under<P: AsRef<Path>>(&self, root: P) -> io::Result<Vec<PathBuf>> {
        let state = self.read_state()?;
        let mut files: Vec<PathBuf> = state
            .files
            .keys()
            .filter(|p| p.starts_with(root.as_ref()))
            .cloned()
            .collect();
        drop(state);
        files.sort();
        Ok(files)
    }

    #[inline]
    fn ensure_parent_dirs(dirs: &mut HashSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor == Path::new("") {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn rebase(path: &Path, from: &Path, to: &Path) -> PathBuf {
        path.strip_prefix(from)
            .map_or_else(|_| path.to_path_buf(), |rel| to.join(rel))
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.read_state()?.current_dir.clone())
    }

    #[inline]
    fn home_dir(&self) -> Option<PathBuf> {
        self.read_state().ok()?.home_dir.clone()
    }

    #[inline]
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let state = self.read_state()?;
        let bytes = state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("File", path))?;
        drop(state);
        Ok(bytes)
    }

    #[inline]
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.write_state()?;

        if let Some(parent) = path.parent()
            && !state.dirs.contains(parent)
        {
            return Err(not_found("Parent directory", parent));
        }
        if state.dirs.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("Is a directory: {}", path.display()),
            ));
        }

        state.files.insert(path.to_path_buf(), contents.to_vec());
        drop(state);
        Ok(())
    }

    #[inline]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        if state.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("File exists: {}", path.display()),
            ));
        }
        Self::ensure_parent_dirs(&mut state.dirs, path);
        drop(state);
        Ok(())
    }

    #[inline]
    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;

        if !state.dirs.contains(path) {
            return Err(not_found("Directory", path));
        }

        // Remove the directory, its files and its subdirectories
        state.files.retain(|p, _| !p.starts_with(path));
        state.dirs.retain(|p| !p.starts_with(path));
        state.symlinks.retain(|p, _| !p.starts_with(path));
        drop(state);
        Ok(())
    }

    #[inline]
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;

        if state.files.remove(path).is_none() && state.symlinks.remove(path).is_none() {
            return Err(not_found("File", path));
        }

        drop(state);
        Ok(())
    }

    #[inline]
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;

        if state.cross_device_renames {
            return Err(io::Error::new(
                io::ErrorKind::CrossesDevices,
                format!("Invalid cross-device link: {}", to.display()),
            ));
        }
        if state.files.contains_key(to) || state.dirs.contains(to) || state.symlinks.contains_key(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Destination exists: {}", to.display()),
            ));
        }
        if let Some(parent) = to.parent()
            && !state.dirs.contains(parent)
        {
            return Err(not_found("Parent directory", parent));
        }

        if let Some(contents) = state.files.remove(from) {
            state.files.insert(to.to_path_buf(), contents);
            drop(state);
            return Ok(());
        }
        if let Some(target) = state.symlinks.remove(from) {
            state.symlinks.insert(to.to_path_buf(), target);
            drop(state);
            return Ok(());
        }

        if !state.dirs.contains(from) {
            return Err(not_found("Path", from));
        }

        let moved_files: Vec<PathBuf> = state
            .files
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for path in moved_files {
            if let Some(contents) = state.files.remove(&path) {
                state.files.insert(Self::rebase(&path, from, to), contents);
            }
        }

        let moved_dirs: Vec<PathBuf> = state
            .dirs
            .iter()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for path in moved_dirs {
            state.dirs.remove(&path);
            state.dirs.insert(Self::rebase(&path, from, to));
        }

        let moved_links: Vec<PathBuf> = state
            .symlinks
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for path in moved_links {
            if let Some(target) = state.symlinks.remove(&path) {
                state.symlinks.insert(Self::rebase(&path, from, to), target);
            }
        }

        drop(state);
        Ok(())
    }

    #[inline]
    #[expect(clippy::as_conversions, reason = "This is for usize to u64 conversion")]
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let contents = self.read(from)?;
        let size = contents.len() as u64;
        self.write(to, &contents)?;
        Ok(size)
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| {
                state.files.contains_key(path)
                    || state.dirs.contains(path)
                    || state.symlinks.contains_key(path)
            })
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.files.contains_key(path))
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.dirs.contains(path))
    }

    #[inline]
    fn is_symlink(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.symlinks.contains_key(path))
    }

    #[inline]
    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        let state = self.read_state()?;
        let target = state
            .symlinks
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("Symlink", path))?;
        drop(state);
        Ok(target)
    }

    #[inline]
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;

        if let Some(parent) = link.parent()
            && !state.dirs.contains(parent)
        {
            return Err(not_found("Parent directory", parent));
        }
        if state.files.contains_key(link) || state.dirs.contains(link) || state.symlinks.contains_key(link) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("File exists: {}", link.display()),
            ));
        }

        state.symlinks.insert(link.to_path_buf(), target.to_path_buf());
        drop(state);
        Ok(())
    }

    #[inline]
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.read_state()?;

        if !state.dirs.contains(path) {
            return Err(not_found("Directory", path));
        }

        // Direct children only
        let mut entries: Vec<PathBuf> = state
            .files
            .keys()
            .chain(state.dirs.iter())
            .chain(state.symlinks.keys())
            .filter(|p| p.parent() == Some(path) && p.as_path() != path)
            .cloned()
            .collect();
        drop(state);

        entries.sort();
        Ok(entries)
    }

    #[inline]
    fn walk_dir(&self, path: &Path) -> io::Result<Vec<WalkEntry>> {
        let state = self.read_state()?;

        if !state.dirs.contains(path) {
            return Err(not_found("Directory", path));
        }

        let mut entries: Vec<WalkEntry> = state
            .dirs
            .iter()
            .filter(|p| p.starts_with(path) && p.as_path() != path)
            .map(|p| WalkEntry {
                path: p.clone(),
                is_file: false,
                is_dir: true,
                is_symlink: false,
            })
            .chain(
                state
                    .files
                    .keys()
                    .filter(|p| p.starts_with(path))
                    .map(|p| WalkEntry {
                        path: p.clone(),
                        is_file: true,
                        is_dir: false,
                        is_symlink: false,
                    }),
            )
            .chain(
                state
                    .symlinks
                    .keys()
                    .filter(|p| p.starts_with(path))
                    .map(|p| WalkEntry {
                        path: p.clone(),
                        is_file: false,
                        is_dir: false,
                        is_symlink: true,
                    }),
            )
            .collect();
        drop(state);

        // Sort entries by path for deterministic output
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }

    #[inline]
    fn create_temp_dir(&self, parent: &Path) -> io::Result<Box<dyn TempDirHandle>> {
        if !self.is_dir(parent) {
            return Err(not_found("Directory", parent));
        }

        let id = TEMP_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_path = parent.join(format!(".subfetch-mock_{id}"));

        self.create_dir_all(&temp_path)?;

        Ok(Box::new(MockTempDir {
            path: temp_path,
            system: self.clone(),
        }))
    }
}

/// Mock temporary directory handle that cleans up on drop
#[non_exhaustive]
pub struct MockTempDir {
    path: PathBuf,
    system: MockSystem,
}

impl MockTempDir {
    fn remove(&self) -> io::Result<()> {
        if self.system.is_dir(&self.path) {
            self.system.remove_dir_all(&self.path)?;
        }
        Ok(())
    }
}

impl TempDirHandle for MockTempDir {
    #[inline]
    fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    fn close(self: Box<Self>) -> io::Result<()> {
        // Drop runs afterwards and finds nothing left to remove
        self.remove()
    }
}

impl Drop for MockTempDir {
    #[inline]
    fn drop(&mut self) {
        match self.remove() {
            Ok(()) => (),
            Err(e) => error!("Failed to remove temporary directory: {e}"),
        }
    }
}
