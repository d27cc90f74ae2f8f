//! Per-updater dispatch timing

use crate::DispatchStats;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct DispatchProfiler {
    timings: BTreeMap<String, DispatchStats>,
}

impl DispatchProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` and charge its wall time to `name`.
    pub fn time<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        match self.timings.get_mut(name) {
            Some(stats) => stats.record(elapsed),
            None => {
                let mut stats = DispatchStats::default();
                stats.record(elapsed);
                self.timings.insert(name.to_string(), stats);
            }
        }
        result
    }

    pub fn stats(&self, name: &str) -> Option<DispatchStats> {
        self.timings.get(name).copied()
    }

    /// Every updater's stats, ordered by name.
    pub fn summary(&self) -> Vec<(String, DispatchStats)> {
        self.timings
            .iter()
            .map(|(name, stats)| (name.clone(), *stats))
            .collect()
    }

    pub fn reset(&mut self) {
        self.timings.clear();
    }
}
