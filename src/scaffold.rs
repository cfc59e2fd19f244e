//! Disposable directory trees for filesystem-dependent tests.
//!
//! Some things cannot be faked without a real filesystem: symlinks,
//! permission bits, modification times. [`Scaffold`] builds a throwaway
//! tree under a configurable root and guarantees the whole tree is removed
//! again when the scaffold goes out of scope.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tracing::debug;

use crate::error::FsError;

/// A disposable directory tree rooted at a single owned directory.
///
/// The root is created on construction if it does not exist. All operation
/// paths are interpreted relative to the root; leading and trailing
/// separators are stripped before joining. The join is deliberately
/// permissive: a relative path containing `..` components can escape the
/// root, which is occasionally useful for building intentionally broken
/// fixtures. Callers who need containment must validate their own inputs.
///
/// Teardown is recursive, includes the root itself, and runs from `Drop` on
/// every exit path. It may also be invoked explicitly and is idempotent.
#[derive(Debug)]
pub struct Scaffold {
    root: PathBuf,
    torn_down: bool,
}

impl Scaffold {
    /// Create a scaffold rooted at `root`, creating the directory (and any
    /// missing parents) if it does not exist yet.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, FsError> {
        let root = normalize_root(root.as_ref());

        if !root.is_dir() {
            fs::create_dir_all(&root).map_err(|e| FsError::io(&root, e))?;
        }

        Ok(Scaffold {
            root,
            torn_down: false,
        })
    }

    /// The scaffold root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a root-relative path to its full on-disk path.
    ///
    /// Leading and trailing separators on `path` are stripped, so
    /// `"/a/b/"` and `"a/b"` resolve identically. `..` components are not
    /// rejected (see the type-level docs).
    pub fn full_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let trimmed = path
            .as_ref()
            .to_string_lossy()
            .trim_matches(['/', '\\'])
            .to_string();
        self.root.join(trimmed)
    }

    /// Create a directory (and any missing parents) under the root.
    ///
    /// Idempotent: if the directory already exists its path is returned
    /// without error.
    pub fn create_directory(&self, path: impl AsRef<Path>) -> Result<PathBuf, FsError> {
        let full = self.full_path(path);

        if full.is_dir() {
            return Ok(full);
        }

        fs::create_dir_all(&full).map_err(|e| FsError::io(&full, e))?;
        Ok(full)
    }

    /// Create a file under the root, creating parent directories as needed.
    ///
    /// With `Some(content)` the bytes are written out; with `None` the file
    /// is created empty, truncating any previous content.
    pub fn create_file(
        &self,
        path: impl AsRef<Path>,
        content: Option<&[u8]>,
    ) -> Result<PathBuf, FsError> {
        let rel = path.as_ref();
        if let Some(parent) = rel.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_directory(parent)?;
            }
        }

        let full = self.full_path(rel);
        fs::write(&full, content.unwrap_or_default()).map_err(|e| FsError::io(&full, e))?;
        Ok(full)
    }

    /// Apply a permission bitmask to an existing path under the root.
    ///
    /// Returns whether the change was applied. Only meaningful on Unix;
    /// elsewhere this always returns `false`.
    pub fn chmod(&self, path: impl AsRef<Path>, mode: u32) -> bool {
        let full = self.full_path(path);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            match fs::set_permissions(&full, fs::Permissions::from_mode(mode)) {
                Ok(()) => true,
                Err(e) => {
                    debug!("chmod {:o} on {} failed: {}", mode, full.display(), e);
                    false
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = mode;
            debug!("chmod is a no-op on this platform: {}", full.display());
            false
        }
    }

    /// Set modification and access time of a path to a Unix timestamp.
    ///
    /// Creates the file empty if it does not exist yet, matching `touch`
    /// semantics. Returns whether the times were applied.
    pub fn set_modification_time(&self, path: impl AsRef<Path>, unix_secs: i64) -> bool {
        let full = self.full_path(path);

        if !full.exists() {
            if let Err(e) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&full)
            {
                debug!("touch of {} failed: {}", full.display(), e);
                return false;
            }
        }

        let ft = FileTime::from_unix_time(unix_secs, 0);
        match filetime::set_file_times(&full, ft, ft) {
            Ok(()) => true,
            Err(e) => {
                debug!("set times on {} failed: {}", full.display(), e);
                false
            }
        }
    }

    /// Create a symlink at the root-relative `link` path pointing at
    /// `target`.
    ///
    /// `target` is used verbatim and is NOT resolved against the root, so
    /// both absolute and dangling targets can be produced. Returns the full
    /// path of the created link.
    pub fn create_symlink(
        &self,
        link: impl AsRef<Path>,
        target: impl AsRef<Path>,
    ) -> Result<PathBuf, FsError> {
        let full = self.full_path(link);
        symlink(target.as_ref(), &full).map_err(|e| FsError::io(&full, e))?;
        Ok(full)
    }

    /// Recursively remove the whole tree, including the root itself.
    ///
    /// Safe to call multiple times; a second call (or a call after the root
    /// was removed externally) is a no-op. Also invoked from `Drop`.
    pub fn tear_down(&mut self) {
        if self.torn_down {
            return;
        }

        match fs::remove_dir_all(&self.root) {
            Ok(()) => self.torn_down = true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.torn_down = true,
            Err(e) => {
                // Leave `torn_down` unset so Drop gets another chance.
                debug!("teardown of {} failed: {}", self.root.display(), e);
            }
        }
    }
}

impl Drop for Scaffold {
    fn drop(&mut self) {
        self.tear_down();
    }
}

// Strip trailing separators so joins never produce doubled slashes.
fn normalize_root(root: &Path) -> PathBuf {
    let s = root.to_string_lossy();
    let trimmed = s.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        PathBuf::from(std::path::MAIN_SEPARATOR.to_string())
    } else {
        PathBuf::from(trimmed)
    }
}

/// Create a symbolic link at `link` pointing at `target`.
///
/// On Unix this delegates to `std::os::unix::fs::symlink`. On Windows the
/// link kind is chosen from the target's metadata, defaulting to a file
/// symlink when the target does not exist.
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::{symlink_dir, symlink_file};

        let use_dir = target.metadata().map(|m| m.is_dir()).unwrap_or(false);
        if use_dir {
            symlink_dir(target, link)
        } else {
            symlink_file(target, link)
        }
    }
}
