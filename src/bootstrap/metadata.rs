//! Module metadata descriptors.
//!
//! Every module carries a `metadata.toml` at its root describing the module
//! and mapping the type names it provides to source files inside the
//! module. The module resolver consults these maps to turn a name into a
//! file path.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

/// Parsed `metadata.toml` of a single module.
///
/// ```toml
/// [module]
/// id = "srfoo"
/// title = "Foo module"
/// version = "1.2.0"
///
/// [files]
/// "FooController" = "controllers/foo.rs"
/// ```
#[derive(Debug, Deserialize)]
pub struct ModuleMetadata {
    pub module: ModuleInfo,
    /// Type name to module-relative source path.
    #[serde(default)]
    pub files: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct ModuleInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ModuleMetadata {
    /// Load and parse a descriptor.
    ///
    /// A missing file is benign (descriptors are collected before they need
    /// to exist) and reported as `None`; an unreadable or unparsable one is
    /// logged and also reported as `None` so resolution stays best-effort.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("metadata descriptor {} not present", path.display());
                return None;
            }
            Err(e) => {
                warn!("could not read metadata descriptor {}: {}", path.display(), e);
                return None;
            }
        };

        match toml::from_str(&raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!("invalid metadata descriptor {}: {}", path.display(), e);
                None
            }
        }
    }

    /// The file map with every path anchored at `base` (normally the
    /// descriptor's directory).
    pub fn files_under(&self, base: &Path) -> BTreeMap<String, PathBuf> {
        self.files
            .iter()
            .map(|(name, rel)| (name.clone(), base.join(rel)))
            .collect()
    }
}
