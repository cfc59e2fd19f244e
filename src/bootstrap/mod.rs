//! Bootstrapping of module test environments.
//!
//! [`Bootstrap`] runs the ordered setup steps a module test suite needs
//! before its first test: load the vendor autoload manifest, optionally
//! bring up the host shop framework, and register a resolver for the
//! modules under test. All steps are best-effort except one: a host
//! framework that was declared mandatory but did not load fails the whole
//! bootstrap.

pub mod finder;
pub mod host;
pub mod metadata;
pub mod registry;
pub mod resolver;

use std::path::PathBuf;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::BootstrapError;
use finder::{DirectoryFinder, Layout};
use host::{HostLoader, ManifestHostLoader};
use registry::{ResolverId, ResolverRegistry};
use resolver::{ManifestResolver, ModuleResolver};

/// File name of a module's metadata descriptor.
pub const METADATA_FILE: &str = "metadata.toml";
/// File name of the vendor autoload manifest.
pub const VENDOR_AUTOLOAD_MANIFEST: &str = "autoload.toml";
/// File name of the host framework's bootstrap manifest.
pub const HOST_BOOTSTRAP_MANIFEST: &str = "bootstrap.toml";

/// Host framework loading state.
///
/// `Loaded` is only ever reached through an actual load attempt;
/// `RequiredButMissing` is the single failing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// The host framework was never requested; the loader is not invoked.
    NotRequested,
    /// Requested, load not yet attempted.
    Required,
    /// Requested and the loader reported success.
    Loaded,
    /// Requested but the loader did not report success.
    RequiredButMissing,
}

/// Outcome of a successful bootstrap: the resolver registrations that were
/// made, so the caller can revoke them again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    /// Registration of the vendor autoload manifest, if one was found.
    pub vendor_resolver: Option<ResolverId>,
    /// Registration of the module metadata resolver.
    pub module_resolver: ResolverId,
}

/// Sequencer for module test environment setup.
pub struct Bootstrap {
    finder: Box<dyn DirectoryFinder>,
    loader: Box<dyn HostLoader>,
    host: HostState,
}

impl Bootstrap {
    /// Build a sequencer around `test_dir` (defaulting to the current
    /// directory) with the default directory layout and host loader.
    pub fn create(test_dir: Option<PathBuf>) -> Self {
        Self::with_collaborators(
            Box::new(Layout::new(test_dir)),
            Box::new(ManifestHostLoader::new()),
        )
    }

    /// Build a sequencer with injected collaborators.
    pub fn with_collaborators(
        finder: Box<dyn DirectoryFinder>,
        loader: Box<dyn HostLoader>,
    ) -> Self {
        Bootstrap {
            finder,
            loader,
            host: HostState::NotRequested,
        }
    }

    /// Mark the host framework as mandatory for this test environment.
    ///
    /// Idempotent; an already attempted load outcome is never downgraded.
    pub fn load_host_framework(&mut self) -> &mut Self {
        if self.host == HostState::NotRequested {
            self.host = HostState::Required;
        }
        self
    }

    pub fn host_state(&self) -> HostState {
        self.host
    }

    /// Run the bootstrap sequence.
    ///
    /// Steps, in order: register the vendor autoload manifest if present,
    /// load the host framework if it was marked mandatory, then register a
    /// resolver over the discovered module metadata descriptors. Fails only
    /// when the host framework was mandatory and did not load.
    pub fn bootstrap(&mut self, registry: &ResolverRegistry) -> Result<Ready, BootstrapError> {
        let vendor_resolver = self.register_vendor_autoload(registry);
        self.load_host();
        let module_resolver = self.register_module_resolver(registry);

        if self.host == HostState::RequiredButMissing {
            return Err(BootstrapError::HostNotLoaded);
        }

        Ok(Ready {
            vendor_resolver,
            module_resolver,
        })
    }

    fn register_vendor_autoload(&self, registry: &ResolverRegistry) -> Option<ResolverId> {
        let path = self.finder.vendor_dir().join(VENDOR_AUTOLOAD_MANIFEST);
        let resolver = ManifestResolver::load(&path)?;
        Some(registry.register(Box::new(resolver)))
    }

    fn load_host(&mut self) {
        match self.host {
            HostState::Required | HostState::RequiredButMissing => {
                self.loader.load(self.finder.as_ref());
                self.host = if self.loader.is_loaded() {
                    HostState::Loaded
                } else {
                    HostState::RequiredButMissing
                };
            }
            HostState::NotRequested | HostState::Loaded => {}
        }
    }

    fn register_module_resolver(&self, registry: &ResolverRegistry) -> ResolverId {
        let descriptors = self.discover_metadata();
        debug!("registering module resolver over {} descriptor(s)", descriptors.len());
        registry.register(Box::new(ModuleResolver::new(descriptors)))
    }

    /// Collect metadata descriptor paths.
    ///
    /// From the shop base directory every `modules/*/metadata.toml` is
    /// collected; from inside a module only that module's descriptor. The
    /// files need not exist yet, the module resolver reads them lazily.
    fn discover_metadata(&self) -> Vec<PathBuf> {
        if self.finder.is_call_from_shop_base_dir() {
            let modules = self.finder.shop_base_dir().join("modules");
            WalkDir::new(&modules)
                .min_depth(2)
                .max_depth(2)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file() && e.file_name() == METADATA_FILE)
                .map(|e| e.into_path())
                .collect()
        } else {
            vec![self.finder.module_dir().join(METADATA_FILE)]
        }
    }
}
