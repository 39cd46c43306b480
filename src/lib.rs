//! Runtime bootstrap for long-running applications
//!
//! Resolves per-application directories, persists a JSON configuration file
//! under an inter-process advisory lock, and coordinates startup/shutdown.
//!
//! ```no_run
//! use bootkit::{BootSpec, Config, Runtime};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct AppConfig {
//!     #[serde(default)]
//!     first_run: bool,
//!     #[serde(default)]
//!     workers: u32,
//! }
//!
//! impl Config for AppConfig {
//!     fn first_run(&self) -> bool { self.first_run }
//!     fn set_first_run(&mut self, first_run: bool) { self.first_run = first_run; }
//!     fn set_defaults(&mut self) {
//!         if self.workers == 0 { self.workers = 4; }
//!     }
//! }
//!
//! let mut rt = Runtime::load(BootSpec::new("myapp", AppConfig::default()))?;
//! rt.register_unloader("flush caches", || Ok(()));
//! rt.unload();
//! # Ok::<(), bootkit::BootError>(())
//! ```

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod lifecycle;
pub mod lock;
pub mod logging;
pub mod paths;
pub mod unload;

pub use cli::RuntimeArgs;
pub use config::{Config, ConfigOrigin, Resolve};
pub use error::{BootError, Result};
pub use lifecycle::{BootSpec, Runtime};
pub use lock::{LockGuard, with_lock};
pub use paths::{BaseDirs, DirectorySet, Subdirs};
pub use unload::{Unloader, UnloaderCallback, Unloaders};
