//! Application-wide constants
//!
//! This module contains the file names, directory names and modes used
//! throughout the crate, providing a single source of truth for constant values.

/// Directory layout constants
pub mod paths {
    /// Base directory for daemon-mode state (all platforms)
    pub const DAEMON_BASE: &str = "/var/lib";

    /// Fallback runtime base, relative to the home directory, when the
    /// platform has no volatile runtime directory
    pub const RUNTIME_FALLBACK: &str = ".local/run";

    /// Prefix for the collapsed "dot home" directory (`~/.<app>`)
    pub const DOT_HOME_PREFIX: &str = ".";
}

/// Configuration file constants
pub mod config {
    /// Default configuration filename inside the config directory
    pub const DEFAULT_FILENAME: &str = "config.json";

    /// Default application name when the embedder doesn't provide one
    pub const DEFAULT_APP_NAME: &str = "app";

    /// Permissions for written config files (owner rw, group/other r)
    pub const FILE_MODE: u32 = 0o644;
}

/// Lock file constants
pub mod lock {
    /// Extension appended to the instance name to build the lock filename
    pub const EXTENSION: &str = "lock";
}

/// Log file constants
pub mod logging {
    /// Extension appended to the instance name to build the log filename
    pub const EXTENSION: &str = "log";

    /// Number of rotated log files kept on disk
    pub const MAX_LOG_FILES: usize = 5;

    /// Fallback instance name when argv0 has no usable file name
    pub const FALLBACK_INSTANCE: &str = "app";
}
