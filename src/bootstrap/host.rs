//! Host framework loading.

use std::fs;

use tracing::{debug, warn};

use crate::bootstrap::finder::DirectoryFinder;
use crate::bootstrap::HOST_BOOTSTRAP_MANIFEST;

/// Collaborator that brings up the host shop framework for tests that need
/// its runtime environment.
///
/// `load` is best-effort and must not panic on a missing framework; the
/// outcome is queried afterwards via `is_loaded`.
pub trait HostLoader {
    fn load(&mut self, finder: &dyn DirectoryFinder);
    fn is_loaded(&self) -> bool;
}

/// Default [`HostLoader`] that locates the host framework through its
/// bootstrap manifest under the shop base directory.
///
/// The framework counts as loaded when `bootstrap.toml` exists there and
/// parses as TOML. A missing manifest is silent; an unparsable one is
/// logged, since it usually means a broken installation rather than an
/// absent one.
#[derive(Debug, Default)]
pub struct ManifestHostLoader {
    loaded: bool,
}

impl ManifestHostLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostLoader for ManifestHostLoader {
    fn load(&mut self, finder: &dyn DirectoryFinder) {
        let path = finder.shop_base_dir().join(HOST_BOOTSTRAP_MANIFEST);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("no host bootstrap manifest at {}: {}", path.display(), e);
                return;
            }
        };

        match toml::from_str::<toml::Table>(&raw) {
            Ok(_) => self.loaded = true,
            Err(e) => warn!("host bootstrap manifest {} is invalid: {}", path.display(), e),
        }
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}
