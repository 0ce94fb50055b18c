//! daysim — one simulated day of multi-modal travel.
//!
//! Usage: `daysim [CONFIG.json]`
//!
//! Without an argument, `daysim.json` in the working directory is used if it
//! exists, otherwise the built-in defaults.  Log verbosity follows
//! `RUST_LOG` (default `info`).
//!
//! # Steps
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load and validate the run configuration
//! 3. Size the Rayon pool (`parallel` feature)
//! 4. Load networks, buildings, agents, and trips
//! 5. Route every trip, build the dispatch table
//! 6. Simulate and stream outputs, then write the manifest

mod config;
mod pipeline;


use std::path::PathBuf;

use anyhow::{Result, bail};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::RunConfig;

const DEFAULT_CONFIG: &str = "daysim.json";

fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // 2. Load configuration.
    let mut args = std::env::args_os().skip(1);
    let config = match (args.next().map(PathBuf::from), args.next()) {
        (_, Some(_)) => bail!("usage: daysim [CONFIG.json]"),
        (Some(path), None) => RunConfig::load(&path)?,
        (None, None) if PathBuf::from(DEFAULT_CONFIG).is_file() => {
            RunConfig::load(&PathBuf::from(DEFAULT_CONFIG))?
        }
        (None, None) => {
            info!("no config file; using defaults");
            let config = RunConfig::default();
            config.validate()?;
            config
        }
    };
    info!(
        tick_minutes = config.sim.tick_minutes,
        total_ticks = config.sim.total_ticks(),
        output_interval_ticks = config.sim.output_interval_ticks,
        walk_threshold_m = config.routing.walk_threshold_m,
        "configuration loaded"
    );

    // 3. Thread pool.
    #[cfg(feature = "parallel")]
    if let Some(n) = config.sim.num_threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
        info!(threads = n, "rayon pool sized");
    }

    // 4–6. Run.
    let manifest = pipeline::run(&config)?;
    info!(
        agents = manifest.agents,
        trips = manifest.trips,
        unroutable = manifest.routing.unroutable,
        dropped = manifest.dropped_trips.len(),
        arrivals = manifest.simulation.arrivals,
        "daysim finished"
    );
    Ok(())
}
