//! Runtime flags shared by every embedding application

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(about = None, long_about = None)]
pub struct RuntimeArgs {
    /// Dry run
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Daemon mode. Uses /var/lib as base directory (Unix-like only)
    #[arg(long)]
    pub daemon: bool,

    /// Start with logging debug level
    #[arg(long)]
    pub debug: bool,

    /// Start in test mode
    #[arg(long = "test")]
    pub test_mode: bool,

    /// Bump logging level
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging level (trace|debug|info|warn|error|fatal)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Echo logs to stderr
    #[arg(short, long)]
    pub echo_logging: bool,

    /// Use provided config file
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub use_config: Option<PathBuf>,

    /// Remaining positional arguments, passed through to the application
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

impl RuntimeArgs {
    /// Parse flags from `argv`; prints usage and exits on `--help` or bad input
    pub fn parse_argv<I, T>(argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::parse_from(argv)
    }
}
