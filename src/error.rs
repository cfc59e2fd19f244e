use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while bootstrapping a module test environment.
///
/// Everything else the sequencer does is best-effort: a missing vendor
/// manifest or an absent metadata descriptor is absorbed silently.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The host framework was declared mandatory but the loader did not
    /// report it as loaded.
    #[error("could not bootstrap test environment: host framework required but not loaded")]
    HostNotLoaded,
}

/// Errors returned from scaffold filesystem operations.
///
/// Wraps the underlying `std::io::Error` together with the full path the
/// operation was applied to.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("I/O error at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsError::Io {
            path: path.into(),
            source,
        }
    }
}
