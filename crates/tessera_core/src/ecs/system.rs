//! # Systems
//!
//! A system declares the component types it needs and is handed exactly
//! the live entities carrying all of them, once per tick.

use std::any::{type_name, Any};

use super::command::{Command, CommandDispatcher};
use super::component::{Component, ComponentMask};
use super::entity::EntityId;
use super::world::World;
use crate::message::{Message, MessageBus, MessageId};

/// Dynamic downcasting for boxed systems and directors.
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny {
    /// Upcasts to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Upcasts to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Type name, for diagnostics.
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

type Registrar = fn(&mut World) -> ComponentMask;

/// The component set a system requires.
///
/// ```rust,ignore
/// fn requirements(&self) -> Requirements {
///     Requirements::new().with::<Transform>().with::<Velocity>()
/// }
/// ```
#[derive(Clone, Default)]
pub struct Requirements {
    registrars: Vec<Registrar>,
}

impl Requirements {
    /// No requirements: the system receives messages but no entities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required component type.
    #[must_use]
    pub fn with<C: Component>(mut self) -> Self {
        self.registrars.push(World::register::<C>);
        self
    }

    /// True if nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrars.is_empty()
    }

    /// Registers every required type with `world` and returns the combined mask.
    pub fn resolve(&self, world: &mut World) -> ComponentMask {
        self.registrars
            .iter()
            .fold(ComponentMask::EMPTY, |mask, register| mask.with(register(world)))
    }
}

/// A unit of per-tick logic.
///
/// Every method receives the entity list the scene cached for this system;
/// the list is refreshed whenever the world's structure changed since the
/// last call, so it never contains an entity that lost a required component.
pub trait System: AsAny {
    /// Component types an entity must carry to be processed.
    fn requirements(&self) -> Requirements;

    /// Runs once per tick while the system is active.
    fn process(&mut self, entities: &[EntityId], ctx: &mut SceneContext<'_>);

    /// Called once for every message delivered this tick.
    fn handle_message(
        &mut self,
        _message: &Message,
        _entities: &[EntityId],
        _ctx: &mut SceneContext<'_>,
    ) {
    }

    /// An entity started matching the requirements.
    fn on_entity_added(&mut self, _entity: EntityId, _ctx: &mut SceneContext<'_>) {}

    /// An entity stopped matching (destroyed or lost a component).
    ///
    /// The handle may already be stale.
    fn on_entity_removed(&mut self, _entity: EntityId) {}

    /// Draw pass, run after `simulate` for active systems.
    fn render(&mut self, _entities: &[EntityId], _world: &World) {}
}

/// Everything a system or director may touch during its turn.
pub struct SceneContext<'a> {
    world: &'a mut World,
    bus: &'a mut MessageBus,
    dispatcher: &'a mut CommandDispatcher,
    dt: f32,
}

impl<'a> SceneContext<'a> {
    pub(crate) fn new(
        world: &'a mut World,
        bus: &'a mut MessageBus,
        dispatcher: &'a mut CommandDispatcher,
        dt: f32,
    ) -> Self {
        Self {
            world,
            bus,
            dispatcher,
            dt,
        }
    }

    /// Seconds simulated by this tick. Zero outside `simulate`.
    #[inline]
    #[must_use]
    pub const fn dt(&self) -> f32 {
        self.dt
    }

    /// The scene's registry.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &World {
        &*self.world
    }

    /// The scene's registry, for structural changes.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    /// Creates an entity. Returns [`EntityId::NULL`] when the world is full.
    pub fn create_entity(&mut self) -> EntityId {
        self.world.create()
    }

    /// Destroys an entity. Systems holding it see it removed on their next turn.
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        self.world.destroy(entity)
    }

    /// Posts a message for the next delivery pass and returns it to be filled.
    pub fn post<T: Any + Send + Sync + Default>(&mut self, id: MessageId) -> &mut T {
        self.bus.post(id)
    }

    /// Posts a fully built message for the next delivery pass.
    pub fn post_value<T: Any + Send + Sync>(&mut self, id: MessageId, payload: T) {
        self.bus.post_value(id, payload);
    }

    /// Runs `command` on every tagged entity now. Returns how many matched.
    pub fn send_command(&mut self, command: &mut Command<'_>) -> usize {
        self.dispatcher.dispatch(&*self.world, command, self.dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Transform, Velocity};

    #[test]
    fn test_requirements_resolve_registers_types() {
        let mut world = World::new(4);
        let mask = Requirements::new()
            .with::<Transform>()
            .with::<Velocity>()
            .resolve(&mut world);

        let tx = world.mask_of::<Transform>().unwrap();
        let vel = world.mask_of::<Velocity>().unwrap();
        assert_eq!(mask, tx.with(vel));
    }

    #[test]
    fn test_empty_requirements() {
        let mut world = World::new(4);
        let requirements = Requirements::new();
        assert!(requirements.is_empty());
        assert!(requirements.resolve(&mut world).is_empty());
    }
}
