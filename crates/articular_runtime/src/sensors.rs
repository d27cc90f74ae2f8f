//! Sensor board: one updater publishes a data pipe, another consumes it.

use anyhow::Result;
use articular_core::define_component;
use articular_core::ecs::{
    AssociatedSystem, Component, ComponentId, DataPipe, Entity, EntityComponentMap, Manager,
    Module, SystemController, SystemEntitiesUpdater, World,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Tick;

const COLLECTOR_NAME: &str = "Sensor-module-data-collector";
const POST_PROCESSING_NAME: &str = "Sensor-module-data-postprocessing";

pub const COLLECTOR: AssociatedSystem = AssociatedSystem::new(COLLECTOR_NAME);
pub const POST_PROCESSING: AssociatedSystem = AssociatedSystem::new(POST_PROCESSING_NAME);

const PROXIMITY: &str = "ProximityData";
const ACCELEROMETER: &str = "AccelerometerData";

pub struct ProximityData {
    pub signal: f32,
}

define_component! {
    ProximityData,
    id(_data) => ComponentId::from_name(PROXIMITY),
    fields { signal }
}

#[derive(Clone, Copy)]
pub struct AccelerometerData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

define_component! {
    AccelerometerData,
    id(_data) => ComponentId::from_name(ACCELEROMETER),
    fields { x, y, z }
}

/// Create the board and share its module between both sensor systems.
pub fn spawn_board(world: &World) -> Result<Entity> {
    world.allocate_memory_map(&COLLECTOR)?;
    world.allocate_memory_map(&POST_PROCESSING)?;

    let board = world.create_entity(&[], "Sensors")?;
    let module = Arc::new(Module::for_entity(&board));
    module.register_entity(&Entity::new(PROXIMITY), Arc::new(ProximityData { signal: 0.33 }));
    world.register(&board, module.clone(), &COLLECTOR)?;
    world.register(&board, module, &POST_PROCESSING)?;
    info!(%board, "sensor board attached");
    Ok(board)
}

/// Stores fresh accelerometer data and publishes a scaling pipe keyed by the module.
pub struct SensorCollector;

impl SystemController for SensorCollector {
    fn associated_system(&self) -> &str {
        COLLECTOR_NAME
    }
}

impl SystemEntitiesUpdater<Tick> for SensorCollector {
    fn update_entities(&mut self, entities: &EntityComponentMap, manager: &dyn Manager, tick: &Tick) {
        for (_, component) in entities.snapshot() {
            let Some(module) = component.as_module() else {
                continue;
            };
            let sample = AccelerometerData {
                x: 2.0,
                y: 3.0,
                z: 5.0,
            };
            module.register_entity(&Entity::new(ACCELEROMETER), Arc::new(sample));

            let gain = sample.x;
            let pipe = DataPipe::new(module.id(), move |signal: f32| signal * 0.005 * gain);
            debug!(%tick, sample = pipe.apply(1.0), "raw data in processing");
            manager.data_pipes().register(pipe);
        }
    }
}

/// Runs the published pipe over the proximity signal, then retires the pipe.
#[derive(Default)]
pub struct SensorPostProcessor {
    last: Option<f32>,
}

impl SensorPostProcessor {
    pub fn last(&self) -> Option<f32> {
        self.last
    }
}

impl SystemController for SensorPostProcessor {
    fn associated_system(&self) -> &str {
        POST_PROCESSING_NAME
    }
}

impl SystemEntitiesUpdater<Tick> for SensorPostProcessor {
    fn update_entities(&mut self, entities: &EntityComponentMap, manager: &dyn Manager, tick: &Tick) {
        for (_, component) in entities.snapshot() {
            let Some(module) = component.as_module() else {
                continue;
            };
            let Some(signal) = module
                .get_entity(&Entity::new(PROXIMITY))
                .and_then(|data| data.downcast_ref::<ProximityData>().map(|data| data.signal))
            else {
                continue;
            };
            match manager.data_pipes().get::<f32, f32>(module.id()) {
                Ok(pipe) => {
                    let raw = pipe.apply(signal);
                    info!(%tick, raw, "raw data post processing");
                    manager.data_pipes().unregister(pipe.id());
                    self.last = Some(raw);
                }
                Err(err) => warn!(%tick, %err, "no sensor pipe to consume"),
            }
        }
    }
}
