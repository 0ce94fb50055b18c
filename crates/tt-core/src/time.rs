//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter starting
//! at local midnight.  The mapping to clock time is held in `SimClock`:
//!
//!   minutes_since_midnight = tick * tick_minutes
//!
//! Schedules are compared in whole ticks; minutes only appear at the edges
//! (departure parsing, travel-time rounding).
//!
//! The default tick length is 5 minutes over a 24-hour day, i.e. 288 ticks.

use std::fmt;

use crate::{CoreError, CoreResult};

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 1_440;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and minutes since midnight.
///
/// Heap-free; the sim owns one and advances it once per tick.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many simulated minutes one tick represents.  Default: 5.
    pub tick_minutes: u32,
    /// The current tick, advanced by `SimClock::advance()`.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_minutes: u32) -> Self {
        Self { tick_minutes, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated minutes since tick 0.
    #[inline]
    pub fn elapsed_minutes(&self) -> u64 {
        self.current_tick.0 * self.tick_minutes as u64
    }

    /// Break elapsed time into (day, hour, minute) for human-readable logs.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total = self.elapsed_minutes();
        let days = total / MINUTES_PER_DAY as u64;
        let hours = ((total % MINUTES_PER_DAY as u64) / 60) as u32;
        let minutes = (total % 60) as u32;
        (days, hours, minutes)
    }

    // ── Tick-count helpers ────────────────────────────────────────────────

    /// Tick containing `minutes` since midnight (floor division).
    #[inline]
    pub fn tick_for_minutes(&self, minutes: u32) -> Tick {
        Tick((minutes / self.tick_minutes) as u64)
    }

    /// How many ticks a journey of `minutes` occupies (rounds up, so an agent
    /// never arrives early).
    ///
    /// A 1e-9 tick tolerance absorbs float noise from summed edge times, so
    /// 35.000_000_1 minutes at 5-minute ticks is 7 ticks, not 8.
    #[inline]
    pub fn ticks_for_minutes(&self, minutes: f64) -> u64 {
        let raw = minutes / self.tick_minutes as f64;
        (raw - 1e-9).ceil().max(0.0) as u64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        if d == 0 {
            write!(f, "{} ({:02}:{:02})", self.current_tick, h, m)
        } else {
            write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
        }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation clock configuration.
///
/// Typically loaded from the run's JSON config by the application crate and
/// passed to the simulation builder.  Call [`validate`](Self::validate)
/// before use; the builder does so and refuses to run on error.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Minutes per tick.  Default: 5.
    pub tick_minutes: u32,

    /// Total simulated span in minutes.  Must be a multiple of
    /// `tick_minutes`.  Default: 1440 (24 h → 288 ticks at 5 min/tick).
    pub duration_minutes: u32,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Write agent snapshots every N ticks.  1 = every tick.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_minutes:          5,
            duration_minutes:      MINUTES_PER_DAY,
            num_threads:           None,
            output_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// Number of ticks in the run (`duration / tick length`).
    #[inline]
    pub fn total_ticks(&self) -> u64 {
        if self.tick_minutes == 0 {
            return 0;
        }
        (self.duration_minutes / self.tick_minutes) as u64
    }

    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_minutes)
    }

    /// Reject configurations that would make every downstream result invalid.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_minutes == 0 {
            return Err(CoreError::Config("tick_minutes must be > 0".into()));
        }
        if self.duration_minutes == 0 {
            return Err(CoreError::Config("duration_minutes must be > 0".into()));
        }
        if self.duration_minutes % self.tick_minutes != 0 {
            return Err(CoreError::Config(format!(
                "duration_minutes ({}) is not a multiple of tick_minutes ({})",
                self.duration_minutes, self.tick_minutes
            )));
        }
        if self.output_interval_ticks == 0 {
            return Err(CoreError::Config("output_interval_ticks must be > 0".into()));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be > 0 when set".into()));
        }
        Ok(())
    }
}
