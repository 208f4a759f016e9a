//! # Scene
//!
//! A scene owns one world, one message bus, its systems and directors,
//! and drives them through one synchronous tick per `simulate` call.
//!
//! ## Tick order
//!
//! 1. Message delivery: everything posted since the previous pass goes to
//!    every system (insertion order) and then every director, one message
//!    at a time in post order. Selected ids are also copied into attached
//!    relays. Messages posted while handlers run wait for the next pass.
//! 2. Every director's `process`.
//! 3. Every active system's `process`, in insertion order.
//!
//! Nothing runs in parallel: a component written by one system is visible
//! to every later system in the same tick.

use std::any::{Any, TypeId};

use super::command::{CommandDispatcher, DispatchStats};
use super::component::ComponentMask;
use super::director::{Director, InputEvent};
use super::entity::EntityId;
use super::system::{SceneContext, System};
use super::world::World;
use crate::config::EngineConfig;
use crate::message::{Message, MessageBus, MessageId, RelaySender};

/// The parts of a scene handed to systems and directors.
struct SceneState {
    world: World,
    bus: MessageBus,
    dispatcher: CommandDispatcher,
}

impl SceneState {
    fn context(&mut self, dt: f32) -> SceneContext<'_> {
        SceneContext::new(&mut self.world, &mut self.bus, &mut self.dispatcher, dt)
    }
}

struct SystemEntry {
    system: Box<dyn System>,
    type_id: TypeId,
    mask: ComponentMask,
    /// Matching entities in index order.
    entities: Vec<EntityId>,
    /// World structure version `entities` was computed at.
    seen_version: Option<u64>,
    active: bool,
}

/// Scratch buffers for membership refreshes.
#[derive(Default)]
struct MembershipDiff {
    matching: Vec<EntityId>,
    added: Vec<EntityId>,
    removed: Vec<EntityId>,
}

struct RelayLink {
    sender: RelaySender,
    /// Empty forwards every id.
    ids: Vec<MessageId>,
}

impl RelayLink {
    fn forwards(&self, id: MessageId) -> bool {
        self.ids.is_empty() || self.ids.contains(&id)
    }
}

/// A simulation context: world, systems, directors and message bus.
///
/// ```rust,ignore
/// let mut scene = Scene::new(&EngineConfig::default());
/// scene.add_system(MovementSystem::default());
/// scene.add_director(SpawnDirector::new(seed));
///
/// loop {
///     scene.forward_event(&input);
///     scene.simulate(1.0 / 60.0);
///     scene.render();
/// }
/// ```
pub struct Scene {
    state: SceneState,
    systems: Vec<SystemEntry>,
    directors: Vec<Box<dyn Director>>,
    relays: Vec<RelayLink>,
    /// Messages being delivered this pass.
    delivery: Vec<Message>,
    diff: MembershipDiff,
    tick: u64,
}

impl Scene {
    /// Creates an empty scene sized by `config`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: SceneState {
                world: World::new(config.entity_capacity),
                bus: MessageBus::new(config.message_capacity),
                dispatcher: CommandDispatcher::new(),
            },
            systems: Vec::new(),
            directors: Vec::new(),
            relays: Vec::new(),
            delivery: Vec::with_capacity(config.message_capacity),
            diff: MembershipDiff::default(),
            tick: 0,
        }
    }

    /// Creates an empty scene holding at most `entity_capacity` entities.
    #[must_use]
    pub fn with_capacity(entity_capacity: usize) -> Self {
        Self::new(&EngineConfig {
            entity_capacity,
            ..EngineConfig::default()
        })
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Appends a system. Insertion order is execution order.
    ///
    /// A scene holds at most one system of each type; adding a second one
    /// is ignored and returns `false`.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> bool {
        let type_id = TypeId::of::<S>();
        if self.systems.iter().any(|entry| entry.type_id == type_id) {
            tracing::warn!(system = system.type_name(), "system already added, ignoring");
            return false;
        }

        let requirements = system.requirements();
        let mask = if requirements.is_empty() {
            ComponentMask::EMPTY
        } else {
            requirements.resolve(&mut self.state.world)
        };
        tracing::info!(system = system.type_name(), order = self.systems.len(), "system added");

        self.systems.push(SystemEntry {
            system: Box::new(system),
            type_id,
            mask,
            entities: Vec::new(),
            seen_version: None,
            active: true,
        });
        true
    }

    /// Appends a director. Directors run in insertion order.
    pub fn add_director<D: Director + 'static>(&mut self, director: D) {
        tracing::info!(director = director.type_name(), "director added");
        self.directors.push(Box::new(director));
    }

    /// Copies delivered messages with the given ids into `sender`.
    ///
    /// An empty id list forwards everything.
    pub fn attach_relay(&mut self, sender: RelaySender, ids: &[MessageId]) {
        self.relays.push(RelayLink {
            sender,
            ids: ids.to_vec(),
        });
    }

    // =========================================================================
    // Lookup and activation
    // =========================================================================

    /// The system of type `T`, if added.
    #[must_use]
    pub fn system<T: System + 'static>(&self) -> Option<&T> {
        self.systems
            .iter()
            .find_map(|entry| (*entry.system).as_any().downcast_ref::<T>())
    }

    /// The system of type `T`, mutably.
    pub fn system_mut<T: System + 'static>(&mut self) -> Option<&mut T> {
        self.systems
            .iter_mut()
            .find_map(|entry| (*entry.system).as_any_mut().downcast_mut::<T>())
    }

    /// The director of type `T`, if added.
    #[must_use]
    pub fn director<T: Director + 'static>(&self) -> Option<&T> {
        self.directors
            .iter()
            .find_map(|director| (**director).as_any().downcast_ref::<T>())
    }

    /// The director of type `T`, mutably.
    pub fn director_mut<T: Director + 'static>(&mut self) -> Option<&mut T> {
        self.directors
            .iter_mut()
            .find_map(|director| (**director).as_any_mut().downcast_mut::<T>())
    }

    /// Enables or disables the system of type `T`. Returns `false` if absent.
    ///
    /// Inactive systems skip `process` and `render` but still receive messages.
    pub fn set_system_active<T: System + 'static>(&mut self, active: bool) -> bool {
        let type_id = TypeId::of::<T>();
        match self.systems.iter_mut().find(|entry| entry.type_id == type_id) {
            Some(entry) => {
                entry.active = active;
                true
            }
            None => false,
        }
    }

    /// True if a system of type `T` was added and is active.
    #[must_use]
    pub fn is_system_active<T: System + 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.systems
            .iter()
            .any(|entry| entry.type_id == type_id && entry.active)
    }

    /// Entities the system of type `T` matched at its last refresh.
    #[must_use]
    pub fn system_entities<T: System + 'static>(&self) -> &[EntityId] {
        let type_id = TypeId::of::<T>();
        self.systems
            .iter()
            .find(|entry| entry.type_id == type_id)
            .map(|entry| entry.entities.as_slice())
            .unwrap_or(&[])
    }

    /// Number of systems added.
    #[inline]
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // =========================================================================
    // Access from the application
    // =========================================================================

    /// The scene's registry.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &World {
        &self.state.world
    }

    /// The scene's registry, for building entities outside a tick.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.state.world
    }

    /// The scene's message bus.
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &MessageBus {
        &self.state.bus
    }

    /// Posts a message for the next delivery pass and returns it to be filled.
    pub fn post_message<T: Any + Send + Sync + Default>(&mut self, id: MessageId) -> &mut T {
        self.state.bus.post(id)
    }

    /// Enqueues a message from outside, e.g. one drained from a relay.
    pub fn forward_message(&mut self, message: Message) {
        self.state.bus.push(message);
    }

    /// Hands raw input to every director, immediately.
    pub fn forward_event(&mut self, event: &InputEvent) {
        for director in &mut self.directors {
            let mut ctx = self.state.context(0.0);
            director.handle_event(event, &mut ctx);
        }
    }

    /// Ticks completed so far.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Command dispatch statistics.
    #[inline]
    #[must_use]
    pub fn dispatch_stats(&self) -> DispatchStats {
        self.state.dispatcher.stats()
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Runs one tick: delivery, directors, then active systems.
    pub fn simulate(&mut self, dt: f32) {
        self.deliver_messages(dt);

        for director in &mut self.directors {
            let mut ctx = self.state.context(dt);
            director.process(&mut ctx);
        }

        for entry in &mut self.systems {
            if !entry.active {
                continue;
            }
            refresh_membership(entry, &mut self.state, &mut self.diff, dt);
            let mut ctx = self.state.context(dt);
            entry.system.process(&entry.entities, &mut ctx);
        }

        self.tick += 1;
    }

    /// Runs the render pass of every active system.
    pub fn render(&mut self) {
        for entry in &mut self.systems {
            if !entry.active {
                continue;
            }
            refresh_membership(entry, &mut self.state, &mut self.diff, 0.0);
            entry.system.render(&entry.entities, &self.state.world);
        }
    }

    fn deliver_messages(&mut self, dt: f32) {
        let mut delivery = std::mem::take(&mut self.delivery);
        self.state.bus.drain_into(&mut delivery);

        for message in &delivery {
            for link in &self.relays {
                if link.forwards(message.id()) {
                    link.sender.send(message.clone());
                }
            }

            for entry in &mut self.systems {
                refresh_membership(entry, &mut self.state, &mut self.diff, dt);
                let mut ctx = self.state.context(dt);
                entry.system.handle_message(message, &entry.entities, &mut ctx);
            }

            for director in &mut self.directors {
                let mut ctx = self.state.context(dt);
                director.handle_message(message, &mut ctx);
            }
        }

        delivery.clear();
        self.delivery = delivery;
    }
}

/// Brings a system's cached entity list up to date with the world.
///
/// Both lists are in index order, so one merge pass finds the difference.
/// A slot recycled since the last refresh shows up as a removal of the old
/// handle plus an addition of the new one.
fn refresh_membership(
    entry: &mut SystemEntry,
    state: &mut SceneState,
    diff: &mut MembershipDiff,
    dt: f32,
) {
    if entry.mask.is_empty() {
        return;
    }
    let version = state.world.structure_version();
    if entry.seen_version == Some(version) {
        return;
    }
    entry.seen_version = Some(version);

    state.world.matching(entry.mask, &mut diff.matching);
    diff.added.clear();
    diff.removed.clear();

    let (old, new) = (&entry.entities, &diff.matching);
    let (mut i, mut j) = (0, 0);
    loop {
        match (old.get(i), new.get(j)) {
            (Some(&o), Some(&n)) if o == n => {
                i += 1;
                j += 1;
            }
            (Some(&o), Some(&n)) if o.index() <= n.index() => {
                diff.removed.push(o);
                i += 1;
            }
            (Some(&o), None) => {
                diff.removed.push(o);
                i += 1;
            }
            (_, Some(&n)) => {
                diff.added.push(n);
                j += 1;
            }
            (None, None) => break,
        }
    }

    std::mem::swap(&mut entry.entities, &mut diff.matching);

    for &entity in &diff.removed {
        entry.system.on_entity_removed(entity);
    }
    for &entity in &diff.added {
        let mut ctx = state.context(dt);
        entry.system.on_entity_added(entity, &mut ctx);
    }
}
