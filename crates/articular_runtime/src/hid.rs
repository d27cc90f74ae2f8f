//! Human interface devices: a mouse whose buttons live in one module.

use anyhow::Result;
use articular_core::define_component;
use articular_core::ecs::{
    ComponentId, ComponentUpdater, Entity, EntityComponentMap, FieldValue, Manager, Module,
    SystemComponentMap, SystemController, SystemEntitiesUpdater, SystemMap, SystemsUpdater, World,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Tick;

/// Systems processing HID data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hid {
    Input,
    Output,
    Feature,
}

impl Hid {
    pub const ALL: [Hid; 3] = [Hid::Input, Hid::Output, Hid::Feature];

    pub const fn name(self) -> &'static str {
        match self {
            Hid::Input => "InputData-processing",
            Hid::Output => "OutputData-processing",
            Hid::Feature => "FeatureData-processing",
        }
    }
}

impl SystemController for Hid {
    fn associated_system(&self) -> &str {
        self.name()
    }
}

/// Button names double as the entities that key them inside the mouse module.
pub const BUTTONS: [(&str, u32); 3] = [("LeftButton", 1), ("RightButton", 2), ("WheelButton", 3)];

pub struct Button {
    pub pin: u32,
    pub pressed: bool,
}

define_component! {
    Button,
    id(button) => ComponentId::derive(button.pin),
    fields { pin, pressed }
}

pub fn allocate(world: &World) -> Result<()> {
    for system in Hid::ALL {
        world.allocate_memory_map(&system)?;
    }
    Ok(())
}

/// Create the mouse and register its button module under the input system.
pub fn spawn_mouse(world: &World) -> Result<Entity> {
    let mouse = world.create_entity(&[&Hid::Input, &Hid::Output, &Hid::Feature], "Mouse")?;
    let module = Module::for_entity(&mouse);
    for (name, pin) in BUTTONS {
        let provider = world.create_entity(&[], name)?;
        module.register_entity(&provider, Arc::new(Button { pin, pressed: false }));
    }
    world.register(&mouse, Arc::new(module), &Hid::Input)?;
    info!(%mouse, buttons = BUTTONS.len(), "mouse attached");
    Ok(mouse)
}

/// Polls every button module in the input row.
#[derive(Default)]
pub struct MouseScanner {
    presses: u64,
}

impl MouseScanner {
    pub fn presses(&self) -> u64 {
        self.presses
    }
}

impl SystemController for MouseScanner {
    fn associated_system(&self) -> &str {
        Hid::Input.name()
    }
}

impl SystemEntitiesUpdater<Tick> for MouseScanner {
    fn update_entities(&mut self, entities: &EntityComponentMap, _manager: &dyn Manager, tick: &Tick) {
        for (entity, component) in entities.snapshot() {
            let Some(module) = component.as_module() else {
                continue;
            };
            for (slot, button) in module.components().snapshot() {
                let Some(button) = button.downcast_ref::<Button>() else {
                    continue;
                };
                let pressed = (tick.index + u64::from(button.pin)) % 2 == 0;
                if pressed {
                    self.presses += 1;
                }
                module.register_as(slot, Arc::new(Button { pin: button.pin, pressed }));
            }
            debug!(%entity, %tick, "buttons polled");
        }
    }
}

/// Reads one entity's view across every system.
#[derive(Default)]
pub struct FeatureAuditor {
    buttons: u64,
    unreadable: u64,
}

impl FeatureAuditor {
    /// Buttons counted across all audits.
    pub fn buttons(&self) -> u64 {
        self.buttons
    }

    /// Audits whose input component exposed no button count.
    pub fn unreadable(&self) -> u64 {
        self.unreadable
    }
}

impl SystemController for FeatureAuditor {
    fn associated_system(&self) -> &str {
        Hid::Feature.name()
    }
}

impl ComponentUpdater<Tick> for FeatureAuditor {
    fn update_components(
        &mut self,
        components: &SystemComponentMap,
        entity: &Entity,
        manager: &dyn Manager,
        tick: &Tick,
    ) {
        let input = match manager.component(entity, &Hid::Input) {
            Ok(input) => input,
            Err(err) => {
                warn!(%entity, %err, "feature audit without input component");
                return;
            }
        };
        match input.get_data("len") {
            Ok(FieldValue::UInt(buttons)) => {
                self.buttons += buttons;
                debug!(%entity, %tick, systems = components.len(), buttons, "feature audit");
            }
            Ok(other) => {
                self.unreadable += 1;
                warn!(%entity, %tick, value = %other, "feature audit found a non-count length");
            }
            Err(err) => {
                self.unreadable += 1;
                warn!(%entity, %tick, %err, "feature audit could not count buttons");
            }
        }
    }
}

/// Logs the size of the primary index.
pub struct Census;

impl SystemController for Census {
    fn associated_system(&self) -> &str {
        "Census"
    }
}

impl SystemsUpdater<Tick> for Census {
    fn update_systems(&mut self, systems: &SystemMap, _manager: &dyn Manager, tick: &Tick) {
        let entries: usize = systems.snapshot().iter().map(|(_, row)| row.len()).sum();
        debug!(%tick, systems = systems.len(), entries, "census");
    }
}
