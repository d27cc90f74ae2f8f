//! Fixed-rate tick clock
//!
//! The host loop advances the clock once per iteration and hands the
//! resulting [`Tick`] to every updater as its input.

use std::fmt;
use std::time::Duration;

/// Input passed to updaters on each dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    pub index: u64,
    pub elapsed: Duration,
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick #{} @ {:?}", self.index, self.elapsed)
    }
}

/// Simulation time tracker
pub struct TickClock {
    tick_duration: Duration,
    tick_count: u64,
    elapsed: Duration,
}

impl TickClock {
    pub fn new(tick_hz: u32) -> Self {
        Self {
            tick_duration: Duration::from_secs(1) / tick_hz.max(1),
            tick_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn advance(&mut self) -> Tick {
        self.tick_count += 1;
        self.elapsed += self.tick_duration;
        Tick {
            index: self.tick_count,
            elapsed: self.elapsed,
        }
    }
}
