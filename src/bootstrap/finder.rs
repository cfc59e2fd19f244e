//! Directory discovery for the bootstrap sequencer.

use std::env;
use std::path::{Path, PathBuf};

use crate::bootstrap::METADATA_FILE;

/// Read-only directory oracle consulted by the bootstrap sequencer.
///
/// The sequencer never inspects the filesystem layout itself; it asks this
/// collaborator where the vendor directory, the shop base directory and the
/// current module directory are, and whether the tests are being run from
/// the shop base rather than from inside a single module.
pub trait DirectoryFinder {
    fn vendor_dir(&self) -> PathBuf;
    fn shop_base_dir(&self) -> PathBuf;
    fn module_dir(&self) -> PathBuf;
    fn is_call_from_shop_base_dir(&self) -> bool;
}

/// Default [`DirectoryFinder`] that resolves directories from a test
/// directory by walking up the ancestor chain.
///
/// - the module directory is the nearest ancestor (the test directory
///   included) carrying a metadata descriptor;
/// - the shop base directory is the nearest ancestor containing a
///   `modules` directory;
/// - the vendor directory is the nearest ancestor containing a `vendor`
///   directory, falling back to `vendor` under the shop base.
///
/// When a marker is absent the test directory itself is used as a fallback,
/// which keeps the sequencer's best-effort steps harmless.
#[derive(Debug, Clone)]
pub struct Layout {
    test_dir: PathBuf,
}

impl Layout {
    /// Build a layout around `test_dir`, defaulting to the current working
    /// directory.
    pub fn new(test_dir: Option<PathBuf>) -> Self {
        let test_dir = test_dir
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Layout { test_dir }
    }

    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    fn nearest_ancestor_with(&self, marker: &str, is_dir: bool) -> Option<PathBuf> {
        self.test_dir
            .ancestors()
            .find(|dir| {
                let candidate = dir.join(marker);
                if is_dir {
                    candidate.is_dir()
                } else {
                    candidate.is_file()
                }
            })
            .map(Path::to_path_buf)
    }
}

impl DirectoryFinder for Layout {
    fn vendor_dir(&self) -> PathBuf {
        self.nearest_ancestor_with("vendor", true)
            .map(|dir| dir.join("vendor"))
            .unwrap_or_else(|| self.shop_base_dir().join("vendor"))
    }

    fn shop_base_dir(&self) -> PathBuf {
        self.nearest_ancestor_with("modules", true)
            .unwrap_or_else(|| self.test_dir.clone())
    }

    fn module_dir(&self) -> PathBuf {
        self.nearest_ancestor_with(METADATA_FILE, false)
            .unwrap_or_else(|| self.test_dir.clone())
    }

    fn is_call_from_shop_base_dir(&self) -> bool {
        self.test_dir == self.shop_base_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::Scaffold;
    use tempfile::tempdir;

    fn shop_tree() -> (tempfile::TempDir, Scaffold) {
        let td = tempdir().expect("tempdir");
        let sc = Scaffold::new(td.path().join("shop")).expect("scaffold");
        sc.create_directory("vendor").expect("vendor");
        sc.create_file("modules/foo/metadata.toml", Some(b"[module]\nid = \"foo\"\n"))
            .expect("metadata");
        sc.create_directory("modules/foo/tests").expect("tests dir");
        (td, sc)
    }

    #[test]
    fn resolves_from_shop_base() {
        let (_td, sc) = shop_tree();
        let layout = Layout::new(Some(sc.root().to_path_buf()));

        assert!(layout.is_call_from_shop_base_dir());
        assert_eq!(layout.shop_base_dir(), sc.root());
        assert_eq!(layout.vendor_dir(), sc.root().join("vendor"));
    }

    #[test]
    fn resolves_from_module_test_dir() {
        let (_td, sc) = shop_tree();
        let layout = Layout::new(Some(sc.full_path("modules/foo/tests")));

        assert!(!layout.is_call_from_shop_base_dir());
        assert_eq!(layout.shop_base_dir(), sc.root());
        assert_eq!(layout.module_dir(), sc.full_path("modules/foo"));
        assert_eq!(layout.vendor_dir(), sc.root().join("vendor"));
    }

    #[test]
    fn falls_back_to_test_dir_without_markers() {
        let td = tempdir().expect("tempdir");
        let layout = Layout::new(Some(td.path().to_path_buf()));

        assert_eq!(layout.shop_base_dir(), td.path());
        assert_eq!(layout.module_dir(), td.path());
        assert_eq!(layout.vendor_dir(), td.path().join("vendor"));
        assert!(layout.is_call_from_shop_base_dir());
    }
}
