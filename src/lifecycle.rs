//! Startup/shutdown coordination
//!
//! [`Runtime::load`] resolves directories, applies daemon mode, loads the
//! config file and hands back a runtime context owning the live
//! configuration. [`Runtime::unload`] persists the cleared first-run flag and
//! runs the registered unloaders.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::RuntimeArgs;
use crate::config::{Config, ConfigOrigin, store};
use crate::constants;
use crate::error::{BootError, Result};
use crate::logging;
use crate::paths::{self, BaseDirs, DirectorySet, Subdirs};
use crate::unload::Unloaders;

/// Boot parameters supplied by the embedding application
#[derive(Debug, Clone)]
pub struct BootSpec<C> {
    /// Application directory name (required)
    pub app_dir_name: String,
    /// Application configuration (required)
    pub config: Option<C>,
    /// Application name (default: app)
    pub app_name: Option<String>,
    /// Config filename (default: config.json)
    pub config_filename: Option<String>,
    /// Parse runtime flags from the arguments
    pub parse_args: bool,
    /// Arguments to use instead of the process arguments, argv0 included
    pub argv: Option<Vec<OsString>>,
    /// Use a single `~/.<app>` directory instead of the platform layout
    pub dot_home: bool,
    /// Honor `--daemon`. Overrides `dot_home` when the flag is passed
    pub allow_daemon: bool,
    pub subdirs: Subdirs,
    /// Base directories to resolve against (default: detected)
    pub base_dirs: Option<BaseDirs>,
    /// Install the file logger at startup
    pub logging: bool,
}

impl<C: Config> BootSpec<C> {
    pub fn new(app_dir_name: impl Into<String>, config: C) -> Self {
        Self {
            app_dir_name: app_dir_name.into(),
            config: Some(config),
            app_name: None,
            config_filename: None,
            parse_args: true,
            argv: None,
            dot_home: false,
            allow_daemon: false,
            subdirs: Subdirs::default(),
            base_dirs: None,
            logging: true,
        }
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_config_filename(mut self, filename: impl Into<String>) -> Self {
        self.config_filename = Some(filename.into());
        self
    }

    pub fn with_args<I, T>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.argv = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    pub fn no_parse_args(mut self) -> Self {
        self.parse_args = false;
        self
    }

    pub fn with_dot_home(mut self) -> Self {
        self.dot_home = true;
        self
    }

    pub fn with_daemon(mut self) -> Self {
        self.allow_daemon = true;
        self
    }

    pub fn with_subdirs(mut self, subdirs: Subdirs) -> Self {
        self.subdirs = subdirs;
        self
    }

    pub fn with_base_dirs(mut self, base: BaseDirs) -> Self {
        self.base_dirs = Some(base);
        self
    }

    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }
}

/// Process-wide runtime context owning the instance configuration
pub struct Runtime<C: Config> {
    app_dir_name: String,
    app_name: String,
    app_instance: String,
    dirs: DirectorySet,
    daemon: bool,
    config: C,
    config_file: PathBuf,
    lock_file: PathBuf,
    flags: RuntimeArgs,
    args: Vec<String>,
    unloaders: Unloaders,
    _log_guard: Option<WorkerGuard>,
}

impl<C: Config> Runtime<C> {
    /// Bootstrap the application and load its configuration
    ///
    /// `Configuration` and `MissingExplicitConfig` errors are fatal; the
    /// caller must not continue with defaults.
    pub fn load(spec: BootSpec<C>) -> Result<Self> {
        let mut config = spec.config.ok_or_else(|| {
            BootError::Configuration("application configuration is required".to_string())
        })?;

        let argv = spec.argv.unwrap_or_else(|| std::env::args_os().collect());
        let argv0 = argv
            .first()
            .map(|a| a.to_string_lossy().into_owned())
            .unwrap_or_default();
        let flags = if spec.parse_args {
            RuntimeArgs::parse_argv(argv)
        } else {
            RuntimeArgs::default()
        };
        let app_instance = instance_name(&argv0);

        let base = spec.base_dirs.unwrap_or_else(BaseDirs::detect);
        let mut dirs = DirectorySet::resolve(&base, &spec.app_dir_name, spec.dot_home)?;
        let daemon = spec.allow_daemon && flags.daemon;
        if daemon {
            dirs.collapse_to_daemon();
        }
        paths::create_dirs(&dirs.bases())?;

        let log_guard = if spec.logging {
            let log_file = dirs
                .data
                .join(format!("{app_instance}.{}", constants::logging::EXTENSION));
            logging::init(&log_file, logging::resolve_level(&flags), flags.echo_logging)?
        } else {
            None
        };
        info!(
            flag_daemon_mode = flags.daemon,
            allow_daemon_mode = spec.allow_daemon,
            "Daemon mode status"
        );

        let config_filename = spec
            .config_filename
            .unwrap_or_else(|| constants::config::DEFAULT_FILENAME.to_string());
        let config_file = dirs.config_file(&config_filename);
        let (load_path, origin) = match &flags.use_config {
            Some(path) => {
                info!(config_file = %path.display(), "Using provided config file instead");
                (path.clone(), ConfigOrigin::Explicit)
            }
            None => (config_file.clone(), ConfigOrigin::Default),
        };
        info!(config_file = %load_path.display(), "Using configuration file");

        let lock_file =
            dirs.lock_file(&format!("{app_instance}.{}", constants::lock::EXTENSION));
        info!(lock_file = %lock_file.display(), "Using lock file");

        let subdirs = dirs.subdirs(&spec.subdirs);
        if !subdirs.is_empty() {
            paths::create_dirs(&subdirs)?;
        }

        store::load(&mut config, &load_path, &lock_file, origin)?;

        if origin == ConfigOrigin::Explicit {
            info!(config_file = %config_file.display(), "Restored configuration file to its default");
        }

        if let Some(resolver) = config.resolver() {
            resolver.resolve();
        }

        let mut args = vec![argv0];
        args.extend(flags.args.iter().cloned());

        Ok(Self {
            app_dir_name: spec.app_dir_name,
            app_name: spec
                .app_name
                .unwrap_or_else(|| constants::config::DEFAULT_APP_NAME.to_string()),
            app_instance,
            dirs,
            daemon,
            config,
            config_file,
            lock_file,
            flags,
            args,
            unloaders: Unloaders::new(),
            _log_guard: log_guard,
        })
    }

    /// Register a callback to run at [`Runtime::unload`]
    pub fn register_unloader<F>(&mut self, description: impl Into<String>, callback: F)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        self.unloaders.register(description, callback);
    }

    /// Save the instance configuration to its canonical location
    pub fn save_config(&mut self) -> Result<()> {
        store::save(&mut self.config, &self.config_file, &self.lock_file)
    }

    /// Save the instance configuration to `path`
    pub fn save_config_to(&mut self, path: &Path) -> Result<()> {
        store::save(&mut self.config, path, &self.lock_file)
    }

    /// Save another configuration value under this runtime's lock
    pub fn save_this_config<D: Config>(&self, config: &mut D, path: &Path) -> Result<()> {
        store::save(config, path, &self.lock_file)
    }

    /// Shut down: clear and persist the first-run flag, then run unloaders
    /// in reverse registration order
    pub fn unload(self) {
        info!("Unloading application");
        let Runtime {
            mut config,
            config_file,
            lock_file,
            unloaders,
            _log_guard,
            ..
        } = self;

        if config.first_run() {
            config.set_first_run(false);
            if let Err(e) = store::save(&mut config, &config_file, &lock_file) {
                error!(error = %e, "Failed to persist cleared first-run flag");
            }
        }

        unloaders.run_all();
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut C {
        &mut self.config
    }

    pub fn dirs(&self) -> &DirectorySet {
        &self.dirs
    }

    /// Canonical config path used for saves
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn lock_file(&self) -> &Path {
        &self.lock_file
    }

    pub fn app_dir_name(&self) -> &str {
        &self.app_dir_name
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Binary name of the running instance (argv0 file name)
    pub fn app_instance(&self) -> &str {
        &self.app_instance
    }

    pub fn flags(&self) -> &RuntimeArgs {
        &self.flags
    }

    /// argv0 followed by the positional arguments left after flag parsing
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_daemon(&self) -> bool {
        self.daemon
    }

    pub fn set_test_mode(&mut self, enabled: bool) {
        self.flags.test_mode = enabled;
    }
}

impl<C: Config + std::fmt::Debug> std::fmt::Debug for Runtime<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("app_dir_name", &self.app_dir_name)
            .field("app_instance", &self.app_instance)
            .field("dirs", &self.dirs)
            .field("daemon", &self.daemon)
            .field("config", &self.config)
            .field("config_file", &self.config_file)
            .field("lock_file", &self.lock_file)
            .field("unloaders", &self.unloaders)
            .finish_non_exhaustive()
    }
}

fn instance_name(argv0: &str) -> String {
    Path::new(argv0)
        .file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(constants::logging::FALLBACK_INSTANCE)
        .to_string()
}
