//! Articular Metrics - dispatch profiling for the host loop
//!
//! Tracks how long each updater takes and counts named events. Everything
//! here compiles down to nothing unless the `metrics` feature is enabled.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use articular_metrics::{profile_dispatch, DispatchProfiler};
//!
//! let mut profiler = DispatchProfiler::new();
//! profile_dispatch!(profiler, "mouse", world.update_system_components(&mut mouse, &tick))?;
//! for (name, stats) in profiler.summary() {
//!     println!("{name}: {} calls, {:?} mean", stats.calls, stats.mean());
//! }
//! ```

#[cfg(feature = "metrics")]
mod counter;
#[cfg(feature = "metrics")]
mod dispatch_profiler;

#[cfg(feature = "metrics")]
pub use counter::Counter;
#[cfg(feature = "metrics")]
pub use dispatch_profiler::DispatchProfiler;

use std::time::Duration;

/// Accumulated timings of one updater.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub calls: u64,
    pub total: Duration,
    pub max: Duration,
}

impl DispatchStats {
    /// Mean time per call, zero before the first call.
    pub fn mean(&self) -> Duration {
        match u32::try_from(self.calls) {
            Ok(0) => Duration::ZERO,
            Ok(calls) => self.total / calls,
            Err(_) => Duration::from_secs_f64(self.total.as_secs_f64() / self.calls as f64),
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.calls += 1;
        self.total += elapsed;
        self.max = self.max.max(elapsed);
    }
}

/// Time `$body` under `$name` (a plain call when metrics are disabled).
#[macro_export]
macro_rules! profile_dispatch {
    ($profiler:expr, $name:expr, $body:expr) => {
        $profiler.time($name, || $body)
    };
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct DispatchProfiler;

#[cfg(not(feature = "metrics"))]
impl DispatchProfiler {
    pub fn new() -> Self { Self }
    #[inline(always)]
    pub fn time<F, R>(&mut self, _name: &str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn stats(&self, _name: &str) -> Option<DispatchStats> { None }
    pub fn summary(&self) -> Vec<(String, DispatchStats)> { Vec::new() }
    pub fn reset(&mut self) {}
}

#[cfg(not(feature = "metrics"))]
#[derive(Debug, Default)]
pub struct Counter;

#[cfg(not(feature = "metrics"))]
impl Counter {
    pub fn new() -> Self { Self }
    pub fn increment(&mut self, _name: &str, _value: u64) {}
    pub fn set(&mut self, _name: &str, _value: u64) {}
    pub fn get(&self, _name: &str) -> u64 { 0 }
    pub fn summary(&self) -> Vec<(String, u64)> { Vec::new() }
    pub fn reset_all(&mut self) {}
}
