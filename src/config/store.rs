//! Lock-guarded config load/save
//!
//! Load and save each take the lock for their own critical section only.
//! A first-run load therefore acquires the lock twice: once to write the
//! default file, once to read it back.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tracing::info;

use super::{Config, codec};
use crate::error::{BootError, Result};
use crate::lock::with_lock;

/// Where the config path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Canonical location under the config directory; created when missing
    Default,
    /// Supplied by the operator; must already exist
    Explicit,
}

/// Load `config_path` into `config`, generating a default file on first run
pub fn load<C: Config>(
    config: &mut C,
    config_path: &Path,
    lock_path: &Path,
    origin: ConfigOrigin,
) -> Result<()> {
    info!(path = %config_path.display(), "Loading config");

    match fs::metadata(config_path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if origin == ConfigOrigin::Explicit {
                return Err(BootError::MissingExplicitConfig {
                    path: config_path.to_path_buf(),
                });
            }
            info!(path = %config_path.display(), "Config file not found, generating one");
            config.set_first_run(true);
            save(config, config_path, lock_path)?;
        }
        Err(e) => return Err(BootError::io(config_path, e)),
    }

    with_lock(lock_path, || {
        let mut bytes = Vec::new();
        fs::File::open(config_path)
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(|e| BootError::io(config_path, e))?;

        codec::decode_into(config, &bytes, config_path)
    })
}

/// Apply defaults and write `config` to `config_path`, replacing any content
pub fn save<C: Config>(config: &mut C, config_path: &Path, lock_path: &Path) -> Result<()> {
    let bytes = codec::encode(config)?;
    info!(path = %config_path.display(), "Saving config");

    with_lock(lock_path, || {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(crate::constants::config::FILE_MODE);
        }

        options
            .open(config_path)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.flush()
            })
            .map_err(|e| BootError::io(config_path, e))
    })
}
