//! mousetrap - component host.
//!
//! Loads the configured components, fires `tick` on a timer and maps OS
//! signals onto the engine's lifecycle operations.
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`MOUSETRAP_*`)
//! 3. `--config <PATH>`, or else `~/.mousetrap/config.toml`
//! 4. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `MOUSETRAP_DEBUG`: Enable debug mode (`true`/`false`)
//! - `MOUSETRAP_LOG_LEVEL`: Log filter directive
//! - `MOUSETRAP_COMPONENTS`: Components to load (comma-separated)
//! - `MOUSETRAP_TICK_INTERVAL_MS`: Milliseconds between ticks
//!
//! # Signals
//!
//! `SIGHUP` reloads the configuration, `SIGUSR1` pauses and `SIGUSR2`
//! resumes all components. `SIGINT` and `SIGTERM` shut down.

mod signals;

use anyhow::{Context, Result};
use clap::Parser;
use mousetrap_runtime::logging::filter_directive;
use mousetrap_runtime::{
    ComponentRegistry, ConfigError, ConfigLoader, ConfigResolver, Engine, MousetrapConfig,
};
use signals::{Control, Signals};
use std::path::PathBuf;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// mousetrap - event-driven component host
#[derive(Parser, Debug)]
#[command(name = "mousetrap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (replaces ~/.mousetrap/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Components to load, replacing the configured list
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    components: Option<Vec<String>>,

    /// Shut down after this many ticks
    #[arg(long, value_name = "N")]
    ticks: Option<u64>,

    /// Print the available component identifiers and exit
    #[arg(long)]
    list_components: bool,
}

/// CLI-based configuration resolver.
///
/// Loads file/env config via [`ConfigLoader`] and applies CLI argument
/// overrides as the highest-priority layer. Re-reads everything on each
/// call, which is what makes `SIGHUP` pick up edits.
struct CliConfigResolver {
    config_file: Option<PathBuf>,
    debug: bool,
    components: Option<Vec<String>>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        Self {
            config_file: args.config.clone(),
            debug: args.debug,
            components: args.components.clone(),
        }
    }
}

impl ConfigResolver for CliConfigResolver {
    fn resolve(&self) -> Result<MousetrapConfig, ConfigError> {
        let mut loader = ConfigLoader::new();
        if let Some(ref path) = self.config_file {
            loader = loader.with_config_file(path);
        }

        let mut config = loader.load()?;

        if self.debug {
            config.debug = true;
        }
        if let Some(ref components) = self.components {
            config.components.load = components
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }
}

/// Terminal filter: --debug > --verbose > RUST_LOG env > config.
fn terminal_filter(args: &Args, config: &MousetrapConfig) -> EnvFilter {
    if args.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(config)))
    }
}

fn tick_timer(config: &MousetrapConfig) -> Interval {
    let mut timer = interval(config.engine.tick_interval());
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_components {
        for identifier in ComponentRegistry::with_builtins().identifiers() {
            println!("{identifier}");
        }
        return Ok(());
    }

    let resolver = CliConfigResolver::from_args(&args);
    let config = resolver.resolve().context("Config error")?;

    let (filter_layer, filter) = reload::Layer::new(terminal_filter(&args, &config));
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(false))
        .init();

    println!("mousetrap v{}", env!("CARGO_PKG_VERSION"));

    let mut engine = Engine::new(config);
    engine.start().context("Failed to start components")?;
    for status in engine.components() {
        info!(component = %status.identifier, id = %status.id, state = %status.state, "Component ready");
    }

    let result = run(&args, &resolver, &filter, &mut engine).await;

    let shutdown = engine.shutdown().context("Shutdown failed");
    result.and(shutdown)
}

/// Ticks the engine and reacts to signals until asked to stop.
async fn run(
    args: &Args,
    resolver: &CliConfigResolver,
    filter: &FilterHandle,
    engine: &mut Engine,
) -> Result<()> {
    let mut signals = Signals::new().context("Failed to register signal handlers")?;
    let mut timer = tick_timer(engine.config());

    loop {
        tokio::select! {
            _ = timer.tick() => {
                match engine.tick() {
                    Ok(seq) => {
                        if args.ticks.is_some_and(|limit| seq >= limit) {
                            info!(ticks = seq, "Tick limit reached");
                            return Ok(());
                        }
                    }
                    Err(e) => warn!(error = %e, "Tick dispatch failed"),
                }
            }
            control = signals.recv() => {
                info!(?control, "Signal received");
                match control {
                    Control::Reload => {
                        let previous = engine.config().engine.tick_interval();
                        reload(args, resolver, filter, engine);
                        if engine.config().engine.tick_interval() != previous {
                            timer = tick_timer(engine.config());
                        }
                    }
                    Control::Pause => {
                        if let Err(e) = engine.pause() {
                            warn!(error = %e, "Pause failed");
                        }
                    }
                    Control::Resume => {
                        if let Err(e) = engine.resume() {
                            warn!(error = %e, "Resume failed");
                        }
                    }
                    Control::Shutdown => return Ok(()),
                }
            }
        }
    }
}

/// Re-resolves the configuration and applies it.
///
/// A config error keeps everything as it was. A failed engine reload
/// resumes whatever survived it.
fn reload(args: &Args, resolver: &CliConfigResolver, filter: &FilterHandle, engine: &mut Engine) {
    let config = match resolver.resolve() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Reload aborted, keeping current configuration");
            return;
        }
    };

    if let Err(e) = filter.reload(terminal_filter(args, &config)) {
        warn!(error = %e, "Failed to update log filter");
    }

    if let Err(e) = engine.reload(config) {
        error!(error = %e, "Reload failed, resuming remaining components");
        if let Err(e) = engine.resume() {
            error!(error = %e, "Resume after failed reload failed");
        }
    }
}
