#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use bootkit::{BootSpec, Config, Runtime};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Demo application settings persisted to config.json
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DemoConfig {
    #[serde(default)]
    first_run: bool,
    #[serde(default)]
    greeting: String,
    /// Heartbeat interval in seconds
    #[serde(default)]
    interval_secs: u64,
}

impl Config for DemoConfig {
    fn first_run(&self) -> bool {
        self.first_run
    }

    fn set_first_run(&mut self, first_run: bool) {
        self.first_run = first_run;
    }

    fn set_defaults(&mut self) {
        if self.greeting.is_empty() {
            self.greeting = "hello".to_string();
        }
        if self.interval_secs == 0 {
            self.interval_secs = 30;
        }
    }
}

#[cfg(unix)]
fn wait_for_shutdown() -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal = signal, "Received shutdown signal");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown() -> Result<()> {
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(())
}

fn main() -> Result<()> {
    let spec = BootSpec::new("demo", DemoConfig::default())
        .with_app_name("bootkit-demo")
        .with_daemon();
    let mut rt = Runtime::load(spec).context("Failed to bootstrap demo")?;

    println!("config file: {}", rt.config_file().display());
    println!("lock file:   {}", rt.lock_file().display());
    println!("data dir:    {}", rt.dirs().data.display());
    println!("first run:   {}", rt.config().first_run);
    println!("greeting:    {}", rt.config().greeting);

    let instance = rt.app_instance().to_string();
    rt.register_unloader("say goodbye", move || {
        info!(instance = %instance, "Goodbye");
        Ok(())
    });

    if rt.flags().dry_run {
        info!("Dry run, not waiting for a signal");
    } else {
        println!("running; press Ctrl-C to stop");
        wait_for_shutdown()?;
    }

    rt.unload();
    Ok(())
}
