//! Articular Runtime
//!
//! Host loop driving a small device world through the dispatch contracts

mod clock;
mod hid;
mod sensors;
mod settings;

use anyhow::Result;
use articular_core::ecs::World;
use articular_metrics::{profile_dispatch, Counter, DispatchProfiler};
use std::path::PathBuf;
use std::thread;
use tracing::info;

use clock::TickClock;
use settings::RuntimeSettings;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Articular v{}", articular_core::VERSION);
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = RuntimeSettings::load(path.as_deref())?;
    info!(?settings, "settings loaded");

    let world = World::new(settings.world.clone());
    hid::allocate(&world)?;
    let mouse = hid::spawn_mouse(&world)?;
    sensors::spawn_board(&world)?;

    let mut scanner = hid::MouseScanner::default();
    let mut auditor = hid::FeatureAuditor::default();
    let mut census = hid::Census;
    let mut collector = sensors::SensorCollector;
    let mut post_processor = sensors::SensorPostProcessor::default();

    let mut clock = TickClock::new(settings.tick_hz);
    let mut profiler = DispatchProfiler::new();
    let mut counter = Counter::new();

    for _ in 0..settings.ticks {
        let tick = clock.advance();
        profile_dispatch!(profiler, "mouse-scanner", world.update_system_components(&mut scanner, &tick))?;
        profile_dispatch!(
            profiler,
            "feature-auditor",
            world.update_entity_components(&mut auditor, &mouse, &tick)
        )?;
        profile_dispatch!(profiler, "sensor-collector", world.update_system_components(&mut collector, &tick))?;
        profile_dispatch!(
            profiler,
            "sensor-postprocessing",
            world.update_system_components(&mut post_processor, &tick)
        )?;
        profile_dispatch!(profiler, "census", world.update_systems(&mut census, &tick));
        counter.increment("ticks", 1);
        thread::sleep(clock.tick_duration());
    }

    for (name, stats) in profiler.summary() {
        info!(
            updater = %name,
            calls = stats.calls,
            mean = ?stats.mean(),
            max = ?stats.max,
            "dispatch summary"
        );
    }
    info!(
        ticks = counter.get("ticks"),
        presses = scanner.presses(),
        last_sensor = ?post_processor.last(),
        entities = world.entity_count(),
        "runtime finished"
    );

    Ok(())
}
