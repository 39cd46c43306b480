//! Error types for bootstrap, locking and config persistence

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BootError>;

#[derive(Debug, Error)]
pub enum BootError {
    /// Missing or invalid boot parameters (programmer error)
    #[error("invalid boot configuration: {0}")]
    Configuration(String),

    /// Lock file is held by this or another process
    #[error("lock {} is held by another instance", path.display())]
    Busy { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed config file {}: {source}", path.display())]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Encode(#[source] serde_json::Error),

    /// Operator pointed at a config file that doesn't exist
    #[error("no user-provided configuration file was found at {}", path.display())]
    MissingExplicitConfig { path: PathBuf },
}

impl BootError {
    pub(crate) fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        BootError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether the embedding application must not continue after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BootError::Configuration(_) | BootError::MissingExplicitConfig { .. }
        )
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, BootError::Busy { .. })
    }
}
