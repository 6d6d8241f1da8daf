use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No running emulators discovered")]
    NoEmulators,
}

impl DiscoveryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DiscoveryError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = DiscoveryError> = std::result::Result<T, E>;
