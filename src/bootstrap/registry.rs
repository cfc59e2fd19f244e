//! Explicit, revocable resolver registration.
//!
//! Instead of mutating process-wide resolution state behind the caller's
//! back, the sequencer registers its resolvers here and hands the resulting
//! ids back to the caller, who may revoke them again. Test harnesses query
//! the registry to turn type names into file paths.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use crate::bootstrap::resolver::Resolver;

/// Handle identifying one registered resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolverId(u64);

#[derive(Default)]
struct Entries {
    next_id: u64,
    resolvers: Vec<(ResolverId, Box<dyn Resolver>)>,
}

/// Ordered collection of [`Resolver`]s.
///
/// Resolution walks resolvers in registration order and the first hit wins.
/// The interior mutex exists so a registry can be shared with test
/// harnesses; the expected usage pattern is still a single thread.
#[derive(Default)]
pub struct ResolverRegistry {
    entries: Mutex<Entries>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, for test suites that bootstrap once and
    /// resolve from many places.
    pub fn global() -> &'static ResolverRegistry {
        static GLOBAL: OnceLock<ResolverRegistry> = OnceLock::new();
        GLOBAL.get_or_init(ResolverRegistry::new)
    }

    pub fn register(&self, resolver: Box<dyn Resolver>) -> ResolverId {
        let mut entries = self.entries.lock().unwrap();
        entries.next_id += 1;
        let id = ResolverId(entries.next_id);
        entries.resolvers.push((id, resolver));
        id
    }

    /// Remove a previously registered resolver. Returns whether anything
    /// was removed; revoking twice is harmless.
    pub fn unregister(&self, id: ResolverId) -> bool {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.resolvers.len();
        entries.resolvers.retain(|(rid, _)| *rid != id);
        entries.resolvers.len() != before
    }

    /// Resolve `name` through the registered resolvers, first hit wins.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let mut entries = self.entries.lock().unwrap();
        entries
            .resolvers
            .iter_mut()
            .find_map(|(_, resolver)| resolver.resolve(name))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
