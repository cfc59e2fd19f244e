//! Test bootstrapping and filesystem scaffolding for shop-module test
//! suites.
//!
//! Two independent utilities, both meant to be called from test setup code:
//!
//! - [`Bootstrap`] sequences environment setup for a module test run:
//!   vendor autoload manifest, optional host framework, module resolver
//!   registration.
//! - [`Scaffold`] builds a disposable directory tree for tests that need a
//!   real filesystem (symlinks, permissions, timestamps) and removes it
//!   again when dropped.

pub mod bootstrap;
pub mod error;
pub mod scaffold;

pub use bootstrap::finder::{DirectoryFinder, Layout};
pub use bootstrap::host::{HostLoader, ManifestHostLoader};
pub use bootstrap::metadata::ModuleMetadata;
pub use bootstrap::registry::{ResolverId, ResolverRegistry};
pub use bootstrap::resolver::{ManifestResolver, ModuleResolver, Resolver};
pub use bootstrap::{Bootstrap, HostState, Ready};
pub use error::{BootstrapError, FsError};
pub use scaffold::Scaffold;
