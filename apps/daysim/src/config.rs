//! Run configuration, read from a JSON file.  Every field has a default, so
//! `{}` is a valid config.
//!
//! ```json
//! {
//!   "sim":     { "tick_minutes": 5, "duration_minutes": 1440, "output_interval_ticks": 1 },
//!   "routing": { "walk_threshold_m": 500, "fallback_order": ["rail", "road", "mixed"] },
//!   "road":    { "mode": "road", "speed_kmh": 20, "cost_per_km": 1.0 },
//!   "rail":    { "mode": "rail", "speed_kmh": 30, "cost_per_km": 1.5 },
//!   "inputs":  { "buildings": "input/buildings.csv", "road_dir": "input/road" },
//!   "output_dir": "output"
//! }
//! ```
//!
//! Relative paths are resolved against the config file's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use tt_core::{SimConfig, TransportMode};
use tt_spatial::{NetworkProfile, RoutingConfig};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputPaths {
    pub buildings: PathBuf,
    pub agents:    PathBuf,
    pub trips:     PathBuf,
    /// Directory with the road network's `stops` and `stop_times` tables.
    pub road_dir:  PathBuf,
    pub rail_dir:  PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            buildings: "input/buildings.csv".into(),
            agents:    "input/agents.csv".into(),
            trips:     "input/trips.csv".into(),
            road_dir:  "input/road".into(),
            rail_dir:  "input/rail".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub sim:        SimConfig,
    pub routing:    RoutingConfig,
    pub road:       NetworkProfile,
    pub rail:       NetworkProfile,
    pub inputs:     InputPaths,
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sim:        SimConfig::default(),
            routing:    RoutingConfig::default(),
            road:       NetworkProfile::road(),
            rail:       NetworkProfile::rail(),
            inputs:     InputPaths::default(),
            output_dir: "output".into(),
        }
    }
}

impl RunConfig {
    /// Read and validate `path`; relative paths inside are rebased onto the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: RunConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the run cannot start with.
    pub fn validate(&self) -> Result<()> {
        self.sim.validate().context("sim")?;
        self.routing.validate().context("routing")?;
        self.road.validate().context("road")?;
        self.rail.validate().context("rail")?;
        if self.road.mode != TransportMode::Road {
            bail!("road profile must have mode \"road\", got {}", self.road.mode);
        }
        if self.rail.mode != TransportMode::Rail {
            bail!("rail profile must have mode \"rail\", got {}", self.rail.mode);
        }
        Ok(())
    }

    fn rebase(&mut self, base: &Path) {
        let inputs = &mut self.inputs;
        for p in [
            &mut inputs.buildings,
            &mut inputs.agents,
            &mut inputs.trips,
            &mut inputs.road_dir,
            &mut inputs.rail_dir,
            &mut self.output_dir,
        ] {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
}
