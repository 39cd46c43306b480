//! Per-application directory resolution
//!
//! Resolves cache/config/data/runtime directories from the platform base
//! directories (XDG on Linux), a single `~/.<app>` directory in dot-home mode,
//! or `/var/lib/<app>` when daemon mode is active.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::paths::{DAEMON_BASE, DOT_HOME_PREFIX, RUNTIME_FALLBACK};
use crate::error::{BootError, Result};

/// Platform base directories that application directories are joined onto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirs {
    pub home: PathBuf,
    pub cache: PathBuf,
    pub config: PathBuf,
    pub data: PathBuf,
    /// Volatile runtime base (`$XDG_RUNTIME_DIR` or `~/.local/run`)
    pub runtime: PathBuf,
    pub daemon_base: PathBuf,
}

impl BaseDirs {
    /// Detect base directories for the current user
    pub fn detect() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            cache: dirs::cache_dir().unwrap_or_else(|| home.join(".cache")),
            config: dirs::config_dir().unwrap_or_else(|| home.join(".config")),
            data: dirs::data_dir().unwrap_or_else(|| home.join(".local/share")),
            runtime: dirs::runtime_dir().unwrap_or_else(|| home.join(RUNTIME_FALLBACK)),
            daemon_base: PathBuf::from(DAEMON_BASE),
            home,
        }
    }

    /// XDG-style layout rooted at `home`, used when bases must not be read
    /// from the environment
    pub fn under_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            cache: home.join(".cache"),
            config: home.join(".config"),
            data: home.join(".local/share"),
            runtime: home.join(RUNTIME_FALLBACK),
            daemon_base: PathBuf::from(DAEMON_BASE),
            home,
        }
    }
}

/// Resolved application directories
/// Computed once at startup, immutable thereafter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySet {
    pub cache: PathBuf,
    pub config: PathBuf,
    pub data: PathBuf,
    pub runtime: PathBuf,
    pub daemon: PathBuf,
}

/// Subdirectory names to create under each resolved directory
#[derive(Debug, Clone, Default)]
pub struct Subdirs {
    pub cache: Vec<String>,
    pub config: Vec<String>,
    pub data: Vec<String>,
    pub runtime: Vec<String>,
}

impl DirectorySet {
    pub fn resolve(base: &BaseDirs, app_dir_name: &str, dot_home: bool) -> Result<Self> {
        if app_dir_name.is_empty() {
            return Err(BootError::Configuration(
                "application directory name is required".to_string(),
            ));
        }

        let (cache, config, data) = if dot_home {
            let dot = base.home.join(format!("{DOT_HOME_PREFIX}{app_dir_name}"));
            (dot.clone(), dot.clone(), dot)
        } else {
            (
                base.cache.join(app_dir_name),
                base.config.join(app_dir_name),
                base.data.join(app_dir_name),
            )
        };

        let set = Self {
            cache,
            config,
            data,
            runtime: base.runtime.join(app_dir_name),
            daemon: base.daemon_base.join(app_dir_name),
        };
        debug!(dirs = ?set, dot_home = dot_home, "Resolved application directories");
        Ok(set)
    }

    /// Point cache/config/data/runtime at the daemon directory
    pub fn collapse_to_daemon(&mut self) {
        info!(daemon_dir = %self.daemon.display(), "Applying daemon mode");
        self.cache = self.daemon.clone();
        self.config = self.daemon.clone();
        self.data = self.daemon.clone();
        self.runtime = self.daemon.clone();
    }

    pub fn config_file(&self, filename: &str) -> PathBuf {
        self.config.join(filename)
    }

    pub fn lock_file(&self, filename: &str) -> PathBuf {
        self.runtime.join(filename)
    }

    /// Base directories in creation order, deduplicated
    pub fn bases(&self) -> Vec<PathBuf> {
        let mut list: Vec<PathBuf> = Vec::with_capacity(4);
        for dir in [&self.cache, &self.config, &self.data, &self.runtime] {
            if !list.contains(dir) {
                list.push(dir.clone());
            }
        }
        list
    }

    /// Join declared subdirectory names onto their bases
    pub fn subdirs(&self, subdirs: &Subdirs) -> Vec<PathBuf> {
        let groups = [
            (&self.cache, &subdirs.cache),
            (&self.config, &subdirs.config),
            (&self.data, &subdirs.data),
            (&self.runtime, &subdirs.runtime),
        ];
        groups
            .into_iter()
            .flat_map(|(base, names)| names.iter().map(move |name| base.join(name)))
            .collect()
    }
}

/// Create every directory in `list` (and its parents)
pub fn create_dirs<P: AsRef<Path>>(list: &[P]) -> Result<()> {
    for dir in list {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| BootError::io(dir, e))?;
        debug!(dir = %dir.display(), "Ensured directory exists");
    }
    Ok(())
}
