//! Name-to-file resolvers.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::bootstrap::metadata::ModuleMetadata;

/// Resolves a type name to the source file providing it.
///
/// Resolvers are registered with a
/// [`ResolverRegistry`](crate::bootstrap::registry::ResolverRegistry);
/// `resolve` takes `&mut self` so implementations may populate themselves
/// lazily on first use.
pub trait Resolver: Send {
    fn resolve(&mut self, name: &str) -> Option<PathBuf>;
}

/// Plain callbacks are resolvers too.
impl<F> Resolver for F
where
    F: FnMut(&str) -> Option<PathBuf> + Send,
{
    fn resolve(&mut self, name: &str) -> Option<PathBuf> {
        self(name)
    }
}

/// Resolver backed by module metadata descriptors.
///
/// Construction only records the descriptor paths; the descriptors are read
/// and merged on the first resolution attempt, so they need not exist at
/// bootstrap time. Missing or broken descriptors are skipped. When two
/// modules claim the same name the first descriptor in collection order
/// wins.
pub struct ModuleResolver {
    descriptors: Vec<PathBuf>,
    table: Option<BTreeMap<String, PathBuf>>,
}

impl ModuleResolver {
    pub fn new(descriptors: Vec<PathBuf>) -> Self {
        ModuleResolver {
            descriptors,
            table: None,
        }
    }

    fn table(&mut self) -> &BTreeMap<String, PathBuf> {
        if self.table.is_none() {
            let mut merged: BTreeMap<String, PathBuf> = BTreeMap::new();
            for descriptor in &self.descriptors {
                let Some(meta) = ModuleMetadata::load(descriptor) else {
                    continue;
                };
                let base = descriptor.parent().unwrap_or_else(|| Path::new(""));
                for (name, path) in meta.files_under(base) {
                    if merged.contains_key(&name) {
                        debug!(
                            "duplicate entry for `{}` in {}, keeping earlier one",
                            name,
                            descriptor.display()
                        );
                        continue;
                    }
                    merged.insert(name, path);
                }
            }
            debug!(
                "module resolver loaded {} entries from {} descriptor(s)",
                merged.len(),
                self.descriptors.len()
            );
            self.table = Some(merged);
        }
        self.table.as_ref().unwrap()
    }
}

impl Resolver for ModuleResolver {
    fn resolve(&mut self, name: &str) -> Option<PathBuf> {
        self.table().get(name).cloned()
    }
}

#[derive(Debug, Deserialize)]
struct AutoloadManifest {
    #[serde(default)]
    files: BTreeMap<String, PathBuf>,
}

/// Resolver backed by a vendor `autoload.toml` manifest.
///
/// The manifest maps names to paths relative to its own directory:
///
/// ```toml
/// [files]
/// "Logger" = "lib/logger.rs"
/// ```
pub struct ManifestResolver {
    table: BTreeMap<String, PathBuf>,
}

impl ManifestResolver {
    /// Load the manifest at `path`. A missing file yields `None` so callers
    /// can skip registration silently; an invalid one is logged and also
    /// yields `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no autoload manifest at {}", path.display());
                return None;
            }
            Err(e) => {
                warn!("could not read autoload manifest {}: {}", path.display(), e);
                return None;
            }
        };

        let manifest: AutoloadManifest = match toml::from_str(&raw) {
            Ok(m) => m,
            Err(e) => {
                warn!("invalid autoload manifest {}: {}", path.display(), e);
                return None;
            }
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let table = manifest
            .files
            .into_iter()
            .map(|(name, rel)| (name, base.join(rel)))
            .collect();

        Some(ManifestResolver { table })
    }
}

impl Resolver for ManifestResolver {
    fn resolve(&mut self, name: &str) -> Option<PathBuf> {
        self.table.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::Scaffold;
    use tempfile::tempdir;

    #[test]
    fn module_resolver_is_lazy_and_merges() {
        let td = tempdir().expect("tempdir");
        let sc = Scaffold::new(td.path()).expect("scaffold");
        let foo = sc
            .create_file(
                "modules/foo/metadata.toml",
                Some(b"[module]\nid = \"foo\"\n[files]\n\"Shared\" = \"foo.rs\"\n"),
            )
            .expect("foo descriptor");
        let bar = td.path().join("modules/bar/metadata.toml");

        // `bar` does not exist yet when the resolver is built; it appears
        // before the first resolution and must still be picked up.
        let mut resolver = ModuleResolver::new(vec![foo.clone(), bar.clone()]);
        sc.create_file(
            "modules/bar/metadata.toml",
            Some(b"[module]\nid = \"bar\"\n[files]\n\"Shared\" = \"bar.rs\"\n\"BarOnly\" = \"b.rs\"\n"),
        )
        .expect("bar descriptor");

        // First descriptor wins on conflicts.
        assert_eq!(
            resolver.resolve("Shared"),
            Some(foo.parent().unwrap().join("foo.rs"))
        );
        assert_eq!(
            resolver.resolve("BarOnly"),
            Some(bar.parent().unwrap().join("b.rs"))
        );
        assert_eq!(resolver.resolve("Nope"), None);
    }

    #[test]
    fn module_resolver_tolerates_missing_descriptors() {
        let td = tempdir().expect("tempdir");
        let mut resolver = ModuleResolver::new(vec![td.path().join("metadata.toml")]);
        assert_eq!(resolver.resolve("Anything"), None);
    }

    #[test]
    fn manifest_resolver_loads_and_anchors() {
        let td = tempdir().expect("tempdir");
        let sc = Scaffold::new(td.path()).expect("scaffold");
        let manifest = sc
            .create_file(
                "vendor/autoload.toml",
                Some(b"[files]\n\"Logger\" = \"lib/logger.rs\"\n"),
            )
            .expect("manifest");

        let mut resolver = ManifestResolver::load(&manifest).expect("loaded");
        assert_eq!(
            resolver.resolve("Logger"),
            Some(sc.full_path("vendor/lib/logger.rs"))
        );
        assert_eq!(resolver.resolve("Missing"), None);
    }

    #[test]
    fn manifest_resolver_missing_file_is_none() {
        let td = tempdir().expect("tempdir");
        assert!(ManifestResolver::load(&td.path().join("autoload.toml")).is_none());
    }
}
